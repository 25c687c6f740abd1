//! 原生 tool calling 的推理循环实现
//!
//! 每次 `invoke` 都从全新的上下文开始（系统提示 + 用户输入），不保留跨调用的记忆。
//! 模型返回工具调用时执行工具并把观察结果回传；返回纯文本时即为最终答案。
//! 工具参数解析失败、工具不存在、工具执行失败都会作为观察结果交还给模型，
//! 只有配置错误会中止本次运行。

use crate::agent::config::ExecutorConfig;
use crate::agent::{AgentExecutor, AgentStep, ExecutorOutput};
use crate::error::{AgentError, Result};
use crate::llm::ChatModel;
use crate::llm::types::{Message, ToolCall};
use crate::tools::{Tool, ToolManager, ToolParameters};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 步数用尽时返回的输出
pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

pub struct ReactExecutor {
    config: ExecutorConfig,
    model: Arc<dyn ChatModel>,
    tool_manager: ToolManager,
}

impl ReactExecutor {
    pub fn new(config: ExecutorConfig, model: Arc<dyn ChatModel>) -> Self {
        Self {
            config,
            model,
            tool_manager: ToolManager::new(),
        }
    }

    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.tool_manager.register(tool)
    }

    pub fn add_tools(&mut self, tools: Vec<Box<dyn Tool>>) {
        self.tool_manager.register_tools(tools)
    }

    pub fn list_tools(&self) -> Vec<&str> {
        self.tool_manager.list_tools()
    }

    fn system_message(&self) -> Message {
        let tools = self
            .list_tools()
            .into_iter()
            .filter_map(|name| self.tool_manager.get_tool(name))
            .map(|tool| format!("{}: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n");
        Message::system(self.config.system_prompt.replace("{tools}", &tools))
    }

    /// 执行一次工具调用，返回回传给模型的观察文本
    async fn run_tool(&self, call: &ToolCall) -> Result<String> {
        let name = call.function.name.as_str();

        let params = match parse_arguments(&call.function.arguments) {
            Ok(params) => params,
            Err(msg) => return Ok(format!("Invalid Format: {}", msg)),
        };

        if self.tool_manager.get_tool(name).is_none() {
            return Ok(format!(
                "{} is not a valid tool, try one of [{}].",
                name,
                self.list_tools().join(", ")
            ));
        }

        match self.tool_manager.execute_tool(name, params).await {
            Ok(result) => Ok(result.observation()),
            Err(e) if e.is_config() => Err(e),
            Err(e) => Ok(format!("Error: {}", e)),
        }
    }
}

/// 模型给出的参数应是 JSON 对象；空字符串按无参数处理
fn parse_arguments(raw: &str) -> std::result::Result<ToolParameters, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(ToolParameters::new());
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(other) => Err(format!("tool arguments must be a JSON object, got {}", other)),
        Err(e) => Err(format!("could not parse tool arguments {:?}: {}", raw, e)),
    }
}

#[async_trait]
impl AgentExecutor for ReactExecutor {
    async fn invoke(&self, input: &str) -> Result<ExecutorOutput> {
        let verbose = self.config.verbose;
        let tools = self.tool_manager.get_tool_definitions();
        let mut messages = vec![self.system_message(), Message::user(input)];
        let mut steps: Vec<AgentStep> = Vec::new();

        if verbose {
            info!(
                agent = %self.config.agent_name,
                model = self.model.model_name(),
                tools = ?self.list_tools(),
                "> Entering executor chain: {}",
                input
            );
        }

        for iteration in 0..self.config.max_iterations {
            debug!(iteration = iteration + 1, "calling model");

            let reply = self.model.chat(messages.clone(), tools.clone()).await?;
            let thought = reply
                .content
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string);

            if reply.has_tool_calls() {
                let calls = reply.tool_calls.clone().unwrap_or_default();
                if let (true, Some(thought)) = (verbose, &thought) {
                    info!("Thought: {}", thought);
                }
                messages.push(reply);

                for call in calls {
                    if verbose {
                        info!("Action: {} {}", call.function.name, call.function.arguments);
                    }
                    let observation = self.run_tool(&call).await?;
                    if verbose {
                        info!("Observation: {}", observation);
                    }

                    steps.push(AgentStep {
                        tool: call.function.name.clone(),
                        input: call.function.arguments.clone(),
                        observation: observation.clone(),
                    });
                    messages.push(Message::tool_result(
                        call.id,
                        call.function.name,
                        observation,
                    ));
                }
                continue;
            }

            return match thought {
                Some(answer) => {
                    if verbose {
                        info!("Final Answer: {}", answer);
                    }
                    Ok(ExecutorOutput {
                        output: Some(answer),
                        steps,
                    })
                }
                None => Err(AgentError::NoResponse.into()),
            };
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "executor stopped at iteration limit"
        );
        Ok(ExecutorOutput {
            output: Some(ITERATION_LIMIT_MESSAGE.to_string()),
            steps,
        })
    }
}
