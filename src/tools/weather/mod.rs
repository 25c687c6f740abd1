//! 天气工具
//!
//! - [`lookup`]：HTTP 查询，返回 [`WeatherResult`]
//! - [`format`]：把 [`WeatherResult`] 渲染成可读文本
//! - [`WeatherTool`]：把两者包装成可被推理循环调用的 [`Tool`]

pub mod format;
pub mod lookup;

pub use format::{NO_CURRENT_DATA, NOT_AVAILABLE, format_weather};
pub use lookup::{CurrentConditions, Location, WeatherClient, WeatherReport, WeatherResult};

use crate::error::Result;
use crate::tools::{Tool, ToolParameters, ToolResult, required_str};
use serde_json::{Value, json};

pub struct WeatherTool {
    client: WeatherClient,
}

impl WeatherTool {
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather_data"
    }

    fn description(&self) -> &str {
        "Fetches the current weather conditions for a given city using the Weatherstack API. \
         Input should be a single city name."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "Name of the city, e.g. \"Tokyo\" or \"New York\""
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, parameters: ToolParameters) -> Result<ToolResult> {
        let city = required_str(&parameters, "city")?;

        // API key 缺失时这里直接返回 Err
        let result = self.client.lookup(city).await?;
        let text = format_weather(&result);

        if result.is_error() {
            Ok(ToolResult::error(text))
        } else {
            Ok(ToolResult::success(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherSettings;
    use crate::error::{ConfigError, Error, ToolError};
    use crate::testing::{MockHttpServer, http_client};
    use std::collections::HashMap;

    fn tool_for(server: &MockHttpServer, api_key: Option<&str>) -> WeatherTool {
        let settings = WeatherSettings {
            api_key: api_key.map(str::to_string),
            base_url: server.url("/current"),
            ..WeatherSettings::default()
        };
        WeatherTool::new(WeatherClient::new(http_client().unwrap(), settings))
    }

    fn city(name: &str) -> ToolParameters {
        HashMap::from([("city".to_string(), json!(name))])
    }

    #[tokio::test]
    async fn success_returns_formatted_text() {
        let server = MockHttpServer::start(
            200,
            r#"{"current": {"temperature": 9, "weather_descriptions": ["Rain"]}, "location": {"name": "Bergen"}}"#,
        )
        .await.unwrap();

        let result = tool_for(&server, Some("k")).execute(city("Bergen")).await.unwrap();
        assert!(result.success);
        assert!(result.output.starts_with("Weather in Bergen:"));
        assert!(result.output.contains("- Weather: Rain"));
    }

    #[tokio::test]
    async fn upstream_failure_is_failed_result_not_err() {
        let server = MockHttpServer::start(503, "").await.unwrap();
        let result = tool_for(&server, Some("k")).execute(city("Bergen")).await.unwrap();
        assert!(!result.success);
        assert!(result.observation().starts_with("Error: Failed to fetch weather data"));
    }

    #[tokio::test]
    async fn missing_key_propagates_as_config_error() {
        let server = MockHttpServer::start(200, "{}").await.unwrap();
        let err = tool_for(&server, None).execute(city("Bergen")).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingApiKey(_))));
        assert_eq!(server.request_count(), 0);
    }

    #[tokio::test]
    async fn empty_city_is_rejected_without_request() {
        let server = MockHttpServer::start(200, "{}").await.unwrap();
        let err = tool_for(&server, Some("k")).execute(city("")).await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::InvalidParameter { .. })));
        assert_eq!(server.request_count(), 0);
    }
}
