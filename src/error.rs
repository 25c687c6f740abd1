use std::fmt;

/// weather_agent 的统一错误类型
#[derive(Debug)]
pub enum Error {
    /// LLM 相关错误
    Llm(LlmError),
    /// 工具执行错误
    Tool(ToolError),
    /// 执行器（推理循环）错误
    Agent(AgentError),
    /// 配置错误
    Config(ConfigError),
    /// 内部解析错误（例如 HTML 选择器）
    Parse(String),
    /// IO 错误
    Io(std::io::Error),
}

/// LLM 相关错误
#[derive(Debug)]
pub enum LlmError {
    /// 网络请求失败
    NetworkError(String),
    /// API 返回错误状态码
    ApiError { status: u16, message: String },
    /// 响应格式无效
    InvalidResponse(String),
    /// 没有返回任何 choice
    EmptyResponse,
}

/// 工具执行错误
#[derive(Debug)]
pub enum ToolError {
    /// 工具未找到
    NotFound(String),
    /// 参数缺失
    MissingParameter(String),
    /// 参数值无效
    InvalidParameter { name: String, message: String },
}

/// 执行器错误
#[derive(Debug)]
pub enum AgentError {
    /// 模型既没有给出文本也没有发起工具调用
    NoResponse,
    /// 执行器内部 panic，已在适配层捕获
    Panicked(String),
    /// 组装 Agent 失败
    InitializationFailed(String),
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 缺少必需的环境变量（一次性列出全部）
    MissingEnv(Vec<String>),
    /// 调用时发现某个服务的 API key 缺失
    MissingApiKey(String),
    /// 配置值无效
    InvalidValue { field: String, message: String },
    /// 配置文件未找到
    FileNotFound(String),
    /// 配置文件存在但读不出来（权限、是目录等）
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    /// 配置文件解析失败
    ParseFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Llm(e) => write!(f, "LLM error: {}", e),
            Error::Tool(e) => write!(f, "Tool error: {}", e),
            Error::Agent(e) => write!(f, "Agent error: {}", e),
            Error::Config(e) => write!(f, "Config error: {}", e),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            LlmError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            LlmError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            LlmError::EmptyResponse => write!(f, "Empty response from LLM"),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::NotFound(name) => write!(f, "Tool '{}' not found", name),
            ToolError::MissingParameter(name) => write!(f, "Missing parameter: {}", name),
            ToolError::InvalidParameter { name, message } => {
                write!(f, "Invalid parameter '{}': {}", name, message)
            }
        }
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::NoResponse => write!(f, "No response from LLM"),
            AgentError::Panicked(msg) => write!(f, "Executor panicked: {}", msg),
            AgentError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingEnv(vars) => write!(
                f,
                "Missing required environment variables: {}",
                vars.join(", ")
            ),
            ConfigError::MissingApiKey(var) => {
                write!(f, "{} not found in environment variables", var)
            }
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for '{}': {}", field, message)
            }
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::Unreadable { path, source } => {
                write!(f, "Cannot read config file {}: {}", path, source)
            }
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Llm(e) => Some(e),
            Error::Tool(e) => Some(e),
            Error::Agent(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Parse(_) => None,
        }
    }
}

impl std::error::Error for LlmError {}
impl std::error::Error for ToolError {}
impl std::error::Error for AgentError {}
impl std::error::Error for ConfigError {}

impl Error {
    /// 配置类错误是致命的，其余错误都应在最近的边界转换为数据
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Llm(LlmError::NetworkError("Request timeout".to_string()))
        } else if err.is_connect() {
            Error::Llm(LlmError::NetworkError(format!(
                "Connection failed: {}",
                err.without_url()
            )))
        } else {
            Error::Llm(LlmError::NetworkError(err.without_url().to_string()))
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<LlmError> for Error {
    fn from(err: LlmError) -> Self {
        Error::Llm(err)
    }
}

impl From<ToolError> for Error {
    fn from(err: ToolError) -> Self {
        Error::Tool(err)
    }
}

impl From<AgentError> for Error {
    fn from(err: AgentError) -> Self {
        Error::Agent(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_lists_every_variable() {
        let err = Error::from(ConfigError::MissingEnv(vec![
            "OPENAI_API_KEY".to_string(),
            "WEATHERSTACK_API_KEY".to_string(),
        ]));
        let msg = err.to_string();
        assert!(msg.contains("OPENAI_API_KEY, WEATHERSTACK_API_KEY"));
        assert!(err.is_config());
    }

    #[test]
    fn runtime_errors_are_not_config() {
        let err = Error::from(LlmError::EmptyResponse);
        assert!(!err.is_config());
        assert_eq!(err.to_string(), "LLM error: Empty response from LLM");
    }
}
