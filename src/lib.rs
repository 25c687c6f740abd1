pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod testing;
pub mod tools;

pub mod prelude {
    pub use crate::agent::{AgentExecutor, AgentResponse, ReactExecutor, WeatherAgent};
    pub use crate::config::Settings;
    pub use crate::error::Result;
    pub use crate::tools::{Tool, ToolParameters, ToolResult};
}
