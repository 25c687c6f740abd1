//! 天气查询：调用 Weatherstack `current` 接口，把结果转换成 [`WeatherResult`]。
//!
//! 网络层的任何失败都会变成 [`WeatherResult::Error`] 返回，不会以 `Err` 形式抛给调用方。
//! 唯一的 `Err` 是 API key 缺失，这属于部署问题，在发请求之前就报告。

use crate::config::{WEATHERSTACK_API_KEY, WeatherSettings};
use crate::error::{ConfigError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// 一次天气查询的结果，成功和失败两种形态互斥
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherResult {
    Success(WeatherReport),
    Error(String),
}

/// 服务端返回的成功载荷；上游可能省略任意字段
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherReport {
    #[serde(default)]
    pub current: Option<CurrentConditions>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// 各观测值保留原始 JSON：上游偶尔把数字写成字符串，单个字段类型不对不应拖垮整份报告。
/// 渲染规则见 [`format_weather`](crate::tools::weather::format_weather)。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurrentConditions {
    /// 摄氏度
    pub temperature: Option<Value>,
    pub feelslike: Option<Value>,
    /// 通常是字符串数组，只取第一项
    pub weather_descriptions: Option<Value>,
    /// 百分比
    pub humidity: Option<Value>,
    /// km/h
    pub wind_speed: Option<Value>,
    pub wind_dir: Option<Value>,
    /// mb
    pub pressure: Option<Value>,
    /// km
    pub visibility: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Location {
    pub name: Option<Value>,
}

impl WeatherResult {
    /// 顶层出现 `error` 键即视为失败，其余字段一律忽略。
    pub fn from_json(value: Value) -> Self {
        if let Some(error) = value.get("error") {
            return WeatherResult::Error(error_message(error));
        }

        match serde_json::from_value::<WeatherReport>(value) {
            Ok(report) => WeatherResult::Success(report),
            Err(e) => WeatherResult::Error(format!("An unexpected error occurred: {}", e)),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, WeatherResult::Error(_))
    }
}

/// Weatherstack 的错误体形如 `{"code": 101, "type": "...", "info": "..."}`
fn error_message(error: &Value) -> String {
    match error {
        Value::String(msg) => msg.clone(),
        Value::Object(map) => map
            .get("info")
            .and_then(|info| info.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Arc<Client>,
    settings: WeatherSettings,
}

impl WeatherClient {
    pub fn new(http: Arc<Client>, settings: WeatherSettings) -> Self {
        Self { http, settings }
    }

    /// 查询 `city` 的当前天气。城市名原样透传，模糊匹配交给上游。
    pub async fn lookup(&self, city: &str) -> Result<WeatherResult> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(WEATHERSTACK_API_KEY.to_string()))?;

        debug!(city, "requesting current weather");

        let result = match self.fetch(api_key, city).await {
            Ok(body) => WeatherResult::from_json(body),
            // URL 里带着 access_key，不能出现在错误信息中
            Err(e) => WeatherResult::Error(format!(
                "Failed to fetch weather data: {}",
                e.without_url()
            )),
        };

        if let WeatherResult::Error(msg) = &result {
            warn!(city, "weather lookup failed: {}", msg);
        }
        Ok(result)
    }

    async fn fetch(&self, api_key: &str, city: &str) -> reqwest::Result<Value> {
        self.http
            .get(&self.settings.base_url)
            .query(&[("access_key", api_key), ("query", city)])
            .timeout(self.settings.timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}
