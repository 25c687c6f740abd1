//! 运行配置
//!
//! 所有配置在启动时一次性读出并组装成 [`Settings`]，之后以结构体形式注入各组件，
//! 业务代码不直接读取环境变量。
//!
//! ```text
//! OPENAI_API_KEY=sk-...            # 必填
//! WEATHERSTACK_API_KEY=...         # 必填
//! OPENAI_BASE_URL=https://api.openai.com/v1
//! AGENT_MODEL=gpt-3.5-turbo
//! AGENT_TEMPERATURE=0.7
//! AGENT_MAX_ITERATIONS=5
//! AGENT_VERBOSE=true
//! WEATHERSTACK_BASE_URL=https://api.weatherstack.com/current
//! WEATHER_TIMEOUT_SECS=10
//! SEARCH_BASE_URL=https://html.duckduckgo.com/html/
//! AGENT_CONFIG=./agent.yaml        # 可选 YAML 文件，只放非敏感项
//! ```
//!
//! 优先级：默认值 < YAML 文件 < 环境变量。

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const WEATHERSTACK_API_KEY: &str = "WEATHERSTACK_API_KEY";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SEARCH_RESULTS: usize = 5;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_WEATHER_BASE_URL: &str = "https://api.weatherstack.com/current";
const DEFAULT_SEARCH_BASE_URL: &str = "https://html.duckduckgo.com/html/";

/// LLM 连接配置
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    /// OpenAI 兼容接口的根地址，请求会发往 `<base_url>/chat/completions`
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl LlmSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// 天气服务配置
#[derive(Debug, Clone)]
pub struct WeatherSettings {
    /// `None` 时 lookup 会在发请求前直接报配置错误
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_WEATHER_TIMEOUT_SECS),
        }
    }
}

impl WeatherSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

/// 搜索服务配置
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub base_url: String,
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            max_results: DEFAULT_SEARCH_RESULTS,
        }
    }
}

/// 执行器配置
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// 推理/行动的最大步数
    pub max_iterations: usize,
    pub verbose: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub llm: LlmSettings,
    pub weather: WeatherSettings,
    pub search: SearchSettings,
    pub agent: AgentSettings,
}

/// YAML 配置文件内容，只允许非敏感项
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileOverrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_iterations: Option<usize>,
    pub verbose: Option<bool>,
    pub weather_timeout_secs: Option<u64>,
    pub search_max_results: Option<usize>,
}

impl FileOverrides {
    pub fn load(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_string()),
            _ => ConfigError::Unreadable {
                path: path.to_string(),
                source: e,
            },
        })?;
        let overrides: FileOverrides = serde_yaml::from_str(&text)?;
        Ok(overrides)
    }

    fn apply(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.llm.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            settings.llm.temperature = temperature;
        }
        if let Some(max_iterations) = self.max_iterations {
            settings.agent.max_iterations = max_iterations;
        }
        if let Some(verbose) = self.verbose {
            settings.agent.verbose = verbose;
        }
        if let Some(secs) = self.weather_timeout_secs {
            settings.weather.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = self.search_max_results {
            settings.search.max_results = n;
        }
    }
}

impl Settings {
    /// 从进程环境读取配置（调用前由 main 负责加载 `.env`）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 用任意 key → value 查找函数组装配置，测试时无需修改进程环境。
    ///
    /// 必填项缺失时一次性返回全部缺失的变量名。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_key = get(OPENAI_API_KEY);
        let weather_key = get(WEATHERSTACK_API_KEY);

        let missing: Vec<String> = [
            (OPENAI_API_KEY, openai_key.is_none()),
            (WEATHERSTACK_API_KEY, weather_key.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| name.to_string())
        .collect();

        let (Some(openai_key), Some(weather_key)) = (openai_key, weather_key) else {
            return Err(ConfigError::MissingEnv(missing).into());
        };

        let mut settings = Settings {
            llm: LlmSettings::new(openai_key),
            weather: WeatherSettings::new(weather_key),
            search: SearchSettings::default(),
            agent: AgentSettings::default(),
        };

        if let Some(path) = get("AGENT_CONFIG") {
            FileOverrides::load(&path)?.apply(&mut settings);
        }

        if let Some(url) = get("OPENAI_BASE_URL") {
            settings.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("AGENT_MODEL") {
            settings.llm.model = model;
        }
        if let Some(raw) = get("AGENT_TEMPERATURE") {
            settings.llm.temperature = parse_value("AGENT_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = get("AGENT_MAX_ITERATIONS") {
            settings.agent.max_iterations = parse_value("AGENT_MAX_ITERATIONS", &raw)?;
        }
        if let Some(raw) = get("AGENT_VERBOSE") {
            settings.agent.verbose = parse_flag(&raw);
        }
        if let Some(url) = get("WEATHERSTACK_BASE_URL") {
            settings.weather.base_url = url;
        }
        if let Some(raw) = get("WEATHER_TIMEOUT_SECS") {
            let secs: u64 = parse_value("WEATHER_TIMEOUT_SECS", &raw)?;
            settings.weather.timeout = Duration::from_secs(secs);
        }
        if let Some(url) = get("SEARCH_BASE_URL") {
            settings.search.base_url = url;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// 文件和环境变量合并之后统一校验
    fn validate(&self) -> Result<()> {
        let invalid = |field: &str, message: &str| -> Result<()> {
            Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: message.to_string(),
            }
            .into())
        };

        if self.agent.max_iterations == 0 {
            return invalid("max_iterations", "must be at least 1");
        }
        if !self.llm.temperature.is_finite() || self.llm.temperature < 0.0 {
            return invalid("temperature", "must be a finite, non-negative number");
        }
        if self.weather.timeout.is_zero() {
            return invalid("weather_timeout_secs", "must be at least 1 second");
        }
        Ok(())
    }
}

fn parse_value<T>(field: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("'{}': {}", raw, e),
        }
        .into()
    })
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// `dotenv::dotenv()` 结果对应的启动提示。没有 `.env` 是常态；文件存在却读不了要把原因说出来。
pub fn dotenv_status(result: &std::result::Result<PathBuf, dotenv::Error>) -> String {
    match result {
        Ok(_) => "✓ Environment variables loaded from .env file".to_string(),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            "⚠ .env file not found. Using system environment variables.".to_string()
        }
        Err(e) => format!(
            "⚠ Failed to load .env file ({}). Using system environment variables.",
            e
        ),
    }
}
