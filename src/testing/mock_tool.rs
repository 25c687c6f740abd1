//! Mock 工具，用于测试执行器的工具调用与容错行为。
//!
//! ```rust
//! use weather_agent::testing::MockTool;
//! use weather_agent::tools::Tool;
//! use std::collections::HashMap;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let tool = MockTool::new("get_weather_data")
//!     .with_response("Weather in Tokyo:")
//!     .with_failure("Error: Failed to fetch weather data: timeout");
//!
//! assert!(tool.execute(HashMap::new()).await.unwrap().success);
//! assert!(!tool.execute(HashMap::new()).await.unwrap().success);
//! assert_eq!(tool.call_count(), 2);
//! # }
//! ```

use crate::error::{Error, Result};
use crate::tools::{Tool, ToolParameters, ToolResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum MockToolResponse {
    Success(String),
    Failure(String),
    Err(Error),
}

/// 可脚本化的 Mock Tool。
///
/// 按顺序返回预设结果；队列耗尽后返回成功的 `"mock response"`。
pub struct MockTool {
    name: String,
    description: String,
    parameters: Value,
    responses: Arc<Mutex<VecDeque<MockToolResponse>>>,
    calls: Arc<Mutex<Vec<ToolParameters>>>,
}

impl MockTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "A mock tool for testing".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    fn push(self, response: MockToolResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// 追加一条成功输出
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(MockToolResponse::Success(text.into()))
    }

    /// 追加一条失败结果（`ToolResult::error`）
    pub fn with_failure(self, msg: impl Into<String>) -> Self {
        self.push(MockToolResponse::Failure(msg.into()))
    }

    /// 追加一次 `Err` 返回，模拟参数或配置错误
    pub fn with_error(self, err: Error) -> Self {
        self.push(MockToolResponse::Err(err))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// 调用记录的共享句柄，工具被装箱移交后仍可检查
    pub fn calls_handle(&self) -> Arc<Mutex<Vec<ToolParameters>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        self.parameters.clone()
    }

    async fn execute(&self, params: ToolParameters) -> Result<ToolResult> {
        self.calls.lock().unwrap().push(params);

        let response = self.responses.lock().unwrap().pop_front();
        match response {
            Some(MockToolResponse::Success(text)) => Ok(ToolResult::success(text)),
            Some(MockToolResponse::Failure(msg)) => Ok(ToolResult::error(msg)),
            Some(MockToolResponse::Err(e)) => Err(e),
            None => Ok(ToolResult::success("mock response".to_string())),
        }
    }
}
