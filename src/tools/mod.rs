//! 工具系统
//!
//! 定义 [`Tool`] trait 和 [`ToolManager`]（注册、查询、执行）。
//! 具体工具位于 [`weather`]（天气查询）和 [`search`]（网页搜索）。
//! 新工具只需实现 [`Tool`] 并注册，执行器和适配层都无需改动。

pub mod search;
pub mod weather;

use crate::error::{Result, ToolError};
use crate::llm::types::ToolDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// 工具执行结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error),
        }
    }

    /// 交给模型看的文本：成功时是输出，失败时是错误信息
    pub fn observation(&self) -> String {
        if self.success {
            self.output.clone()
        } else {
            self.error.clone().unwrap_or_default()
        }
    }
}

pub type ToolParameters = HashMap<String, serde_json::Value>;

/// 工具接口，推理循环按名字调用
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// 工具参数的 JSON Schema 定义
    fn parameters(&self) -> serde_json::Value;
    async fn execute(&self, parameters: ToolParameters) -> Result<ToolResult>;
}

/// 读取一个必填的非空字符串参数
pub(crate) fn required_str<'a>(parameters: &'a ToolParameters, name: &str) -> Result<&'a str> {
    let value = parameters
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::MissingParameter(name.to_string()))?;

    if value.trim().is_empty() {
        return Err(ToolError::InvalidParameter {
            name: name.to_string(),
            message: "must not be empty".to_string(),
        }
        .into());
    }
    Ok(value)
}

#[derive(Default)]
pub struct ToolManager {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        debug!("register tool: {}", tool.name());
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn register_tools(&mut self, tools: Vec<Box<dyn Tool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// 已注册的工具名（排序后返回，输出稳定）
    pub fn list_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn get_tool(&self, tool_name: &str) -> Option<&dyn Tool> {
        self.tools.get(tool_name).map(|tool| &**tool)
    }

    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.list_tools()
            .into_iter()
            .filter_map(|name| self.get_tool(name))
            .map(ToolDefinition::from_tool)
            .collect()
    }

    pub async fn execute_tool(
        &self,
        tool_name: &str,
        parameters: ToolParameters,
    ) -> Result<ToolResult> {
        let tool = self
            .get_tool(tool_name)
            .ok_or_else(|| ToolError::NotFound(tool_name.to_string()))?;

        tool.execute(parameters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::MockTool;
    use serde_json::json;

    #[tokio::test]
    async fn executes_registered_tool_by_name() {
        let mut manager = ToolManager::new();
        manager.register(Box::new(MockTool::new("echo").with_response("pong")));

        let result = manager.execute_tool("echo", HashMap::new()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.observation(), "pong");
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let manager = ToolManager::new();
        let err = manager
            .execute_tool("missing", HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::NotFound(name)) if name == "missing"));
    }

    #[test]
    fn definitions_follow_sorted_names() {
        let mut manager = ToolManager::new();
        manager.register_tools(vec![
            Box::new(MockTool::new("web_search")),
            Box::new(MockTool::new("get_weather_data")),
        ]);

        assert_eq!(manager.list_tools(), vec!["get_weather_data", "web_search"]);
        let defs = manager.get_tool_definitions();
        assert_eq!(defs[0].function.name, "get_weather_data");
        assert_eq!(defs[0].tool_type, "function");
    }

    #[test]
    fn required_str_rejects_blank() {
        let mut params = ToolParameters::new();
        params.insert("city".to_string(), json!("   "));
        let err = required_str(&params, "city").unwrap_err();
        assert!(matches!(
            err,
            Error::Tool(ToolError::InvalidParameter { .. })
        ));

        params.clear();
        assert!(matches!(
            required_str(&params, "city").unwrap_err(),
            Error::Tool(ToolError::MissingParameter(_))
        ));
    }

    #[test]
    fn failed_result_observation_is_error_text() {
        let result = ToolResult::error("Error: boom".to_string());
        assert_eq!(result.observation(), "Error: boom");
    }
}
