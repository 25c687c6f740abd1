//! 测试基础设施
//!
//! 在不访问真实 LLM、天气服务或搜索引擎的情况下测试各组件。
//!
//! | 类型 | 用途 |
//! |------|------|
//! | [`MockLlmClient`] | 替代真实模型，按脚本返回文本或工具调用 |
//! | [`MockTool`] | 替代真实工具，测试执行器的工具调用 / 错误处理 |
//! | [`MockExecutor`] | 替代整个推理循环，测试适配层和 REPL |
//! | [`MockHttpServer`] | 本地 HTTP 桩，测试天气 / 搜索 / OpenAI 客户端 |
//!
//! 所有 Mock 都通过 `with_*()` 构建器脚本化，内部使用 `Arc<Mutex<_>>` 记录调用，
//! 可在移交所有权之后继续检查。

mod mock_executor;
mod mock_http;
mod mock_llm;
mod mock_tool;

pub use mock_executor::MockExecutor;
pub use mock_http::{MockHttpServer, http_client};
pub use mock_llm::MockLlmClient;
pub use mock_tool::MockTool;
