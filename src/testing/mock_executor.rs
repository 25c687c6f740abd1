//! Mock 执行器，实现 [`AgentExecutor`]，用于测试 [`WeatherAgent`](crate::agent::WeatherAgent)
//! 的结果归一化和 REPL，而不经过任何模型或工具。
//!
//! ```rust
//! use weather_agent::agent::WeatherAgent;
//! use weather_agent::testing::MockExecutor;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let agent = WeatherAgent::with_executor(Box::new(
//!     MockExecutor::new().with_output("It is sunny."),
//! ));
//! assert_eq!(agent.format("weather?").await, "It is sunny.");
//! # }
//! ```

use crate::agent::{AgentExecutor, ExecutorOutput};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum MockRun {
    Output(Option<String>),
    Err(Error),
    Panic(String),
}

/// 按顺序返回预设结果；队列耗尽后输出 `"mock output"`。
pub struct MockExecutor {
    runs: Arc<Mutex<VecDeque<MockRun>>>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            runs: Arc::new(Mutex::new(VecDeque::new())),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(self, run: MockRun) -> Self {
        self.runs.lock().unwrap().push_back(run);
        self
    }

    pub fn with_output(self, text: impl Into<String>) -> Self {
        self.push(MockRun::Output(Some(text.into())))
    }

    /// 成功但没有输出
    pub fn with_empty_output(self) -> Self {
        self.push(MockRun::Output(None))
    }

    pub fn with_error(self, err: Error) -> Self {
        self.push(MockRun::Err(err))
    }

    /// 下一次调用时直接 panic
    pub fn with_panic(self, msg: impl Into<String>) -> Self {
        self.push(MockRun::Panic(msg.into()))
    }

    /// 输入记录的共享句柄，执行器被装箱移交后仍可检查
    pub fn inputs_handle(&self) -> Arc<Mutex<Vec<String>>> {
        self.inputs.clone()
    }
}

#[async_trait]
impl AgentExecutor for MockExecutor {
    async fn invoke(&self, input: &str) -> Result<ExecutorOutput> {
        self.inputs.lock().unwrap().push(input.to_string());

        let run = self.runs.lock().unwrap().pop_front();
        match run {
            Some(MockRun::Output(output)) => Ok(ExecutorOutput {
                output,
                steps: Vec::new(),
            }),
            Some(MockRun::Err(e)) => Err(e),
            Some(MockRun::Panic(msg)) => panic!("{}", msg),
            None => Ok(ExecutorOutput {
                output: Some("mock output".to_string()),
                steps: Vec::new(),
            }),
        }
    }
}
