use crate::config::LlmSettings;
use crate::error::{Error, LlmError, Result};
use crate::llm::ChatModel;
use crate::llm::types::{ChatCompletionRequest, ChatCompletionResponse, Message, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use tracing::debug;

pub fn assemble_req_header(api_key: &str) -> Result<HeaderMap> {
    let mut header_map = HeaderMap::new();

    header_map.insert(
        "Authorization",
        format!("Bearer {}", api_key).parse().map_err(|e| {
            LlmError::InvalidResponse(format!("Invalid Authorization header: {}", e))
        })?,
    );
    header_map.insert(
        "Content-Type",
        "application/json".parse().map_err(|e| {
            LlmError::InvalidResponse(format!("Invalid Content-Type header: {}", e))
        })?,
    );
    Ok(header_map)
}

pub async fn post(
    client: &Client,
    request_body: &ChatCompletionRequest,
    header_map: HeaderMap,
    url: &str,
) -> Result<ChatCompletionResponse> {
    let response = client
        .post(url)
        .headers(header_map)
        .json(request_body)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(LlmError::ApiError {
            status,
            message: error_text,
        }
        .into());
    }

    let completion_response = response
        .json::<ChatCompletionResponse>()
        .await
        .map_err(|e| LlmError::InvalidResponse(e.without_url().to_string()))?;

    debug!("chat completion response: {:?}", completion_response);

    Ok(completion_response)
}

/// OpenAI 兼容的 Chat Completions 客户端。
///
/// 模型推理调用不设超时。
pub struct OpenAiClient {
    client: Arc<Client>,
    settings: LlmSettings,
}

impl OpenAiClient {
    pub fn new(client: Arc<Client>, settings: LlmSettings) -> Self {
        Self { client, settings }
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.settings.model
    }

    async fn chat(&self, messages: Vec<Message>, tools: Vec<ToolDefinition>) -> Result<Message> {
        let (tools, tool_choice) = if tools.is_empty() {
            (None, None)
        } else {
            (Some(tools), Some("auto".to_string()))
        };

        let request_body = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages,
            tools,
            tool_choice,
            temperature: Some(self.settings.temperature),
        };

        let header_map = assemble_req_header(&self.settings.api_key)?;
        let response = post(&self.client, &request_body, header_map, &self.endpoint()).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(Error::Llm(LlmError::EmptyResponse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockHttpServer, http_client};

    fn client_for(server: &MockHttpServer) -> OpenAiClient {
        let mut settings = LlmSettings::new("sk-test");
        settings.base_url = server.url("/v1");
        OpenAiClient::new(http_client().unwrap(), settings)
    }

    #[tokio::test]
    async fn returns_first_choice_message() {
        let server = MockHttpServer::start(
            200,
            r#"{"id":"x","choices":[{"message":{"role":"assistant","content":"It is sunny."}}]}"#,
        )
        .await
        .unwrap();

        let reply = client_for(&server)
            .chat(vec![Message::user("weather?")], vec![])
            .await
            .unwrap();

        assert_eq!(reply.content.as_deref(), Some("It is sunny."));
        assert_eq!(server.request_count(), 1);
        let request = server.last_request().unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.contains("Bearer sk-test"));
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockHttpServer::start(401, r#"{"error":"bad key"}"#).await.unwrap();
        let err = client_for(&server)
            .chat(vec![Message::user("hi")], vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::ApiError { status: 401, .. })));
    }

    #[tokio::test]
    async fn no_choices_is_empty_response() {
        let server = MockHttpServer::start(200, r#"{"id":"x","choices":[]}"#).await.unwrap();
        let err = client_for(&server)
            .chat(vec![Message::user("hi")], vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::EmptyResponse)));
    }
}
