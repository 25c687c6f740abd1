//! 天气 Agent：把 LLM 客户端、工具和执行器组装在一起。
//!
//! [`WeatherAgent::run`] 保证不会失败：执行器返回的任何错误、甚至执行器内部的 panic，
//! 都在这里被转换成 [`AgentResponse::Error`]。

use crate::agent::config::ExecutorConfig;
use crate::agent::react_agent::ReactExecutor;
use crate::agent::{AgentExecutor, AgentResponse};
use crate::config::Settings;
use crate::error::{AgentError, Result};
use crate::llm::OpenAiClient;
use crate::tools::search::WebSearchTool;
use crate::tools::weather::{WeatherClient, WeatherTool};
use futures::FutureExt;
use reqwest::Client;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::warn;

/// 执行成功但没有任何输出时的占位文本
pub const NO_OUTPUT: &str = "No output generated";

pub struct WeatherAgent {
    executor: Box<dyn AgentExecutor>,
    tools: Vec<String>,
}

impl WeatherAgent {
    /// 按配置组装：OpenAI 客户端 + `web_search` + `get_weather_data` + ReAct 执行器
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Arc::new(
            Client::builder()
                .user_agent(concat!("weather_agent/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| AgentError::InitializationFailed(e.to_string()))?,
        );

        let model = Arc::new(OpenAiClient::new(http.clone(), settings.llm.clone()));
        let config = ExecutorConfig::new("weather_agent")
            .max_iterations(settings.agent.max_iterations)
            .verbose(settings.agent.verbose);

        let mut executor = ReactExecutor::new(config, model);
        executor.add_tool(Box::new(WebSearchTool::new(
            http.clone(),
            settings.search.clone(),
        )));
        executor.add_tool(Box::new(WeatherTool::new(WeatherClient::new(
            http,
            settings.weather.clone(),
        ))));

        let tools = executor.list_tools().into_iter().map(str::to_string).collect();
        Ok(Self {
            executor: Box::new(executor),
            tools,
        })
    }

    /// 注入任意执行器（测试或替换推理框架时使用）
    pub fn with_executor(executor: Box<dyn AgentExecutor>) -> Self {
        Self {
            executor,
            tools: Vec::new(),
        }
    }

    /// 组装时注册的工具名
    pub fn list_tools(&self) -> &[String] {
        &self.tools
    }

    pub async fn run(&self, query: &str) -> AgentResponse {
        let outcome = AssertUnwindSafe(self.executor.invoke(query))
            .catch_unwind()
            .await;

        let err = match outcome {
            Ok(Ok(out)) => {
                return AgentResponse::Success {
                    output: out.output,
                    steps: out.steps,
                };
            }
            Ok(Err(e)) => e,
            Err(payload) => AgentError::Panicked(panic_message(payload)).into(),
        };

        warn!(query, "agent execution failed: {}", err);
        AgentResponse::Error(format!("Agent execution failed: {}", err))
    }

    pub async fn format(&self, query: &str) -> String {
        match self.run(query).await {
            AgentResponse::Error(msg) => format!("Error: {}", msg),
            AgentResponse::Success { output, .. } => {
                output.unwrap_or_else(|| NO_OUTPUT.to_string())
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
