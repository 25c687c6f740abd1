mod client;
pub mod types;

pub use client::{OpenAiClient, assemble_req_header};

use crate::error::Result;
use crate::llm::types::{Message, ToolDefinition};
use async_trait::async_trait;

/// 对话模型接口：给定消息历史和可用工具，返回一条 assistant 消息。
///
/// 返回的消息要么带 `content`（文本），要么带 `tool_calls`，也可能两者都有。
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn chat(&self, messages: Vec<Message>, tools: Vec<ToolDefinition>) -> Result<Message>;
}
