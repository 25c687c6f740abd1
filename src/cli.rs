//! 交互式命令行：读一行、交给 [`WeatherAgent`]、打印结果，直到用户退出。

use crate::agent::WeatherAgent;
use crate::error::{Error, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use tracing::debug;

pub const EXAMPLE_QUERIES: [&str; 4] = [
    "Find the capital of Madhya Pradesh, then find its current weather condition",
    "What's the weather like in Tokyo?",
    "Find the population of Paris and then check its weather",
    "Compare the weather between New York and London",
];

pub const PROMPT: &str = "> ";
pub const FAREWELL: &str = "Bye";

const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

/// 行输入源。`Ok(None)` 表示输入结束（EOF 或中断）。
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// 基于 rustyline 的终端输入，带历史记录
pub struct ConsoleReader {
    editor: DefaultEditor,
}

impl ConsoleReader {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(readline_error)?;
        Ok(Self { editor })
    }
}

impl LineReader for ConsoleReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    // 历史记录失败不影响本次输入
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(readline_error(e)),
        }
    }
}

fn readline_error(e: ReadlineError) -> Error {
    match e {
        ReadlineError::Io(e) => Error::Io(e),
        other => Error::Io(std::io::Error::other(other.to_string())),
    }
}

pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_COMMANDS.iter().any(|cmd| line.eq_ignore_ascii_case(cmd))
}

/// 主循环。每轮打印示例问题和提示符，处理一条查询；
/// 退出指令、EOF、Ctrl-C 都以告别语结束。
pub async fn run_repl<R, W>(agent: &WeatherAgent, reader: &mut R, out: &mut W) -> Result<()>
where
    R: LineReader,
    W: Write,
{
    loop {
        writeln!(out, "\n{}", "=".repeat(50))?;
        writeln!(out, "\nExample queries you can try:")?;
        for (i, query) in EXAMPLE_QUERIES.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, query)?;
        }
        writeln!(out, "\nEnter your query (or 'quit' to exit):")?;
        out.flush()?;

        let Some(line) = reader.read_line(PROMPT)? else {
            writeln!(out, "\n{}", FAREWELL)?;
            return Ok(());
        };
        let query = line.trim();

        if is_exit_command(query) {
            writeln!(out, "\n{}", FAREWELL)?;
            return Ok(());
        }
        if query.is_empty() {
            continue;
        }

        debug!(query, "processing query");
        writeln!(out, "\nProcessing: '{}'", query)?;
        writeln!(out, "{}", "-".repeat(30))?;
        out.flush()?;

        let response = agent.format(query).await;

        writeln!(out, "\nResponse:")?;
        writeln!(out, "{}", "-".repeat(30))?;
        writeln!(out, "{}", response)?;
        writeln!(out, "{}", "-".repeat(30))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::testing::MockExecutor;
    use std::collections::VecDeque;

    /// 按脚本逐行返回输入，脚本耗尽视为 EOF
    struct ScriptedReader {
        lines: VecDeque<String>,
        prompts: usize,
    }

    impl ScriptedReader {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                prompts: 0,
            }
        }
    }

    impl LineReader for ScriptedReader {
        fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
            assert_eq!(prompt, PROMPT);
            self.prompts += 1;
            Ok(self.lines.pop_front())
        }
    }

    async fn session(executor: MockExecutor, lines: &[&str]) -> (String, ScriptedReader) {
        let agent = WeatherAgent::with_executor(Box::new(executor));
        let mut reader = ScriptedReader::new(lines);
        let mut out = Vec::new();
        run_repl(&agent, &mut reader, &mut out).await.unwrap();
        (String::from_utf8(out).unwrap(), reader)
    }

    #[test]
    fn exit_commands_are_case_insensitive() {
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("  EXIT "));
        assert!(is_exit_command("Q"));
        assert!(!is_exit_command("quite"));
        assert!(!is_exit_command(""));
    }

    #[tokio::test]
    async fn quit_prints_farewell_and_stops() {
        let executor = MockExecutor::new();
        let inputs = executor.inputs_handle();
        let (out, reader) = session(executor, &["quit", "What's the weather like in Tokyo?"]).await;

        assert!(out.trim_end().ends_with(FAREWELL));
        assert_eq!(reader.prompts, 1);
        assert_eq!(reader.lines.len(), 1);
        assert!(inputs.lock().unwrap().is_empty());
        assert!(out.contains("1. Find the capital of Madhya Pradesh"));
        assert!(out.contains("4. Compare the weather between New York and London"));
    }

    #[tokio::test]
    async fn query_is_processed_and_printed() {
        let executor = MockExecutor::new().with_output("22°C and clear in Tokyo.");
        let inputs = executor.inputs_handle();
        let (out, _) = session(executor, &["  What's the weather like in Tokyo?  ", "exit"]).await;

        assert!(out.contains("Processing: 'What's the weather like in Tokyo?'"));
        assert!(out.contains("Response:\n------------------------------\n22°C and clear in Tokyo.\n"));
        assert_eq!(
            inputs.lock().unwrap().as_slice(),
            ["What's the weather like in Tokyo?".to_string()]
        );
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let executor = MockExecutor::new();
        let inputs = executor.inputs_handle();
        let (out, reader) = session(executor, &["", "   ", "q"]).await;

        assert_eq!(reader.prompts, 3);
        assert!(!out.contains("Processing:"));
        assert!(inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_query_keeps_loop_running() {
        let executor = MockExecutor::new()
            .with_error(LlmError::NetworkError("connection refused".to_string()).into())
            .with_output("second answer");
        let (out, reader) = session(executor, &["first", "second", "quit"]).await;

        assert!(out.contains("Error: Agent execution failed: LLM error: Network error: connection refused"));
        assert!(out.contains("second answer"));
        assert_eq!(reader.prompts, 3);
    }

    #[tokio::test]
    async fn end_of_input_says_bye() {
        let (out, reader) = session(MockExecutor::new(), &[]).await;
        assert!(out.trim_end().ends_with(FAREWELL));
        assert_eq!(reader.prompts, 1);
    }
}
