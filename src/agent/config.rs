//! 执行器配置

use crate::config::DEFAULT_MAX_ITERATIONS;

/// ReAct 风格的默认系统提示词，`{tools}` 会被替换成已注册工具的列表
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Answer the following questions as best you can. You have access to the following tools:

{tools}

Work step by step. Think about what information you still need, call a tool to get it, \
read the observation, and repeat until you can answer. Use web_search for general facts \
(for example, to find which city a question is about) and get_weather_data for the current \
weather in a specific city. You may call tools several times, for example once per city \
when comparing. When you know the final answer, reply with it directly in plain text \
without calling any tool.";

/// 执行器运行时配置
///
/// 通过构建器链式调用设置各项参数，再传入 [`ReactExecutor::new`](super::react_agent::ReactExecutor::new)。
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub(crate) agent_name: String,
    pub(crate) system_prompt: String,
    /// 最大推理/行动步数，防止死循环
    pub(crate) max_iterations: usize,
    /// 打开后每一步的思考、调用和观察都会以 info 级别记录
    pub(crate) verbose: bool,
}

impl ExecutorConfig {
    pub fn new(agent_name: &str) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verbose: false,
        }
    }

    pub fn system_prompt(mut self, system_prompt: &str) -> Self {
        self.system_prompt = system_prompt.to_string();
        self
    }

    /// 至少为 1
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn get_max_iterations(&self) -> usize {
        self.max_iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_five_steps() {
        let config = ExecutorConfig::new("weather_agent");
        assert_eq!(config.get_max_iterations(), 5);
        assert!(config.system_prompt.contains("{tools}"));
    }

    #[test]
    fn zero_iterations_clamped() {
        let config = ExecutorConfig::new("a").max_iterations(0);
        assert_eq!(config.get_max_iterations(), 1);
    }
}
