use std::process::ExitCode;
use weather_agent::agent::WeatherAgent;
use weather_agent::cli::{ConsoleReader, run_repl};
use weather_agent::config::{Settings, dotenv_status};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    println!("{}", dotenv_status(&dotenv::dotenv()));

    let settings = Settings::from_env();
    let verbose = settings.as_ref().is_ok_and(|s| s.agent.verbose);
    let default_filter = if verbose {
        "weather_agent=info"
    } else {
        "weather_agent=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()))
        .init();

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Please set them in your .env file or system environment.");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", "=".repeat(50));
    println!("  Weather Agent");
    println!("{}", "=".repeat(50));

    println!("\nInitializing Weather Agent");
    let agent = match WeatherAgent::new(&settings) {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("Agent initialized ({})", agent.list_tools().join(", "));

    let result = match ConsoleReader::new() {
        Ok(mut reader) => run_repl(&agent, &mut reader, &mut std::io::stdout()).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
