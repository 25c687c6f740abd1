use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod config;
pub mod react_agent;
mod weather_agent;

pub use config::{DEFAULT_SYSTEM_PROMPT, ExecutorConfig};
pub use react_agent::{ITERATION_LIMIT_MESSAGE, ReactExecutor};
pub use weather_agent::{NO_OUTPUT, WeatherAgent};

/// 推理循环执行一次工具调用的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStep {
    pub tool: String,
    /// 模型给出的原始参数字符串
    pub input: String,
    pub observation: String,
}

/// 执行器一次运行的产出
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutorOutput {
    pub output: Option<String>,
    pub steps: Vec<AgentStep>,
}

/// 推理循环（plan → act → observe）的唯一入口。
///
/// 适配层只通过这个方法驱动执行器，不关心其内部状态机。
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn invoke(&self, input: &str) -> Result<ExecutorOutput>;
}

/// 适配层对外的结果，成功与失败互斥
#[derive(Debug, Clone, PartialEq)]
pub enum AgentResponse {
    Success {
        output: Option<String>,
        steps: Vec<AgentStep>,
    },
    Error(String),
}

impl AgentResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, AgentResponse::Error(_))
    }
}
