//! Mock 对话模型，用于在不发起真实 HTTP 请求的情况下测试依赖 [`ChatModel`] 的组件。
//!
//! # 示例
//!
//! ```rust
//! use weather_agent::testing::MockLlmClient;
//! use weather_agent::llm::ChatModel;
//! use weather_agent::llm::types::Message;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = MockLlmClient::new()
//!     .with_tool_call("get_weather_data", r#"{"city":"Tokyo"}"#)
//!     .with_response("22°C and clear");
//!
//! let first = mock.chat(vec![Message::user("weather?")], vec![]).await.unwrap();
//! assert!(first.has_tool_calls());
//! let second = mock.chat(vec![Message::user("weather?")], vec![]).await.unwrap();
//! assert_eq!(second.content.as_deref(), Some("22°C and clear"));
//! assert_eq!(mock.call_count(), 2);
//! # }
//! ```

use crate::error::{Error, LlmError, Result};
use crate::llm::ChatModel;
use crate::llm::types::{Message, ToolCall, ToolDefinition};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// 单次调用时收到的消息和工具
type RecordedCall = (Vec<Message>, Vec<ToolDefinition>);

/// 可脚本化的 Mock 模型。
///
/// 按顺序返回预设的 assistant 消息；队列耗尽后返回 `EmptyResponse` 错误。
/// 工具调用的 id 依次为 `call_1`、`call_2`……
pub struct MockLlmClient {
    responses: Arc<Mutex<VecDeque<Result<Message>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    next_call_id: usize,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            next_call_id: 1,
        }
    }

    /// 追加任意一条 assistant 消息
    pub fn with_message(self, message: Message) -> Self {
        self.responses.lock().unwrap().push_back(Ok(message));
        self
    }

    /// 追加一条纯文本回复（即最终答案）
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_message(Message::assistant(text))
    }

    /// 追加一条只含单个工具调用的回复
    pub fn with_tool_call(mut self, name: &str, arguments: &str) -> Self {
        let id = format!("call_{}", self.next_call_id);
        self.next_call_id += 1;
        self.with_message(Message::assistant_with_tools(vec![ToolCall::new(
            id, name, arguments,
        )]))
    }

    /// 追加一条错误（用于测试错误处理路径）
    pub fn with_error(self, err: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn with_network_error(self, msg: impl Into<String>) -> Self {
        self.with_error(LlmError::NetworkError(msg.into()).into())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// 最后一次调用时传入的 messages
    pub fn last_messages(&self) -> Option<Vec<Message>> {
        self.calls.lock().unwrap().last().map(|(m, _)| m.clone())
    }

    /// 最后一次调用时传入的工具定义
    pub fn last_tools(&self) -> Option<Vec<ToolDefinition>> {
        self.calls.lock().unwrap().last().map(|(_, t)| t.clone())
    }

    /// 所有历史调用的 messages（按时序排列）
    pub fn all_calls(&self) -> Vec<Vec<Message>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }

    /// 剩余未消费的预设响应数量
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for MockLlmClient {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn chat(&self, messages: Vec<Message>, tools: Vec<ToolDefinition>) -> Result<Message> {
        self.calls.lock().unwrap().push((messages, tools));

        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or(Err(LlmError::EmptyResponse.into()))
    }
}
