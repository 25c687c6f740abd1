//! 网页搜索工具，使用 DuckDuckGo 的 HTML 页面（无需 API key）。

use crate::config::{DEFAULT_SEARCH_RESULTS, SearchSettings};
use crate::error::{Error, Result};
use crate::tools::{Tool, ToolParameters, ToolResult, required_str};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// 单条搜索结果
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

impl SearchHit {
    fn render(&self) -> String {
        format!("{}\n{}\nURL: {}", self.title, self.snippet, self.url)
    }
}

pub struct WebSearchTool {
    http: Arc<Client>,
    settings: SearchSettings,
}

impl WebSearchTool {
    pub fn new(http: Arc<Client>, settings: SearchSettings) -> Self {
        Self { http, settings }
    }

    async fn fetch_page(&self, query: &str) -> reqwest::Result<String> {
        self.http
            .get(&self.settings.base_url)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for general information. Returns titles, snippets and URLs. \
         Use it for facts the weather tool cannot answer, such as finding which city \
         is the capital of a region."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, parameters: ToolParameters) -> Result<ToolResult> {
        let query = required_str(&parameters, "query")?;
        let limit = parameters
            .get("num_results")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(self.settings.max_results.max(1))
            .clamp(1, DEFAULT_SEARCH_RESULTS * 2);

        debug!(query, limit, "web search");

        let html = match self.fetch_page(query).await {
            Ok(html) => html,
            Err(e) => {
                let e = e.without_url();
                warn!(query, "web search failed: {}", e);
                return Ok(ToolResult::error(format!("Error: web search failed: {}", e)));
            }
        };

        let hits = extract_results(&html, limit)?;
        if hits.is_empty() {
            return Ok(ToolResult::success(format!("No results found for: {}", query)));
        }

        let rendered: Vec<String> = hits.iter().map(SearchHit::render).collect();
        Ok(ToolResult::success(rendered.join("\n\n")))
    }
}

/// 从 DuckDuckGo HTML 结果页中按 `.result__body` 分块提取标题、摘要和链接，跳过广告
pub fn extract_results(html: &str, limit: usize) -> Result<Vec<SearchHit>> {
    let body_sel = selector(".result:not(.result--ad) .result__body")?;
    let title_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;
    let url_sel = selector(".result__url")?;

    let document = Html::parse_document(html);
    let hits = document
        .select(&body_sel)
        .filter_map(|result| {
            Some(SearchHit {
                title: first_text(result, &title_sel)?,
                snippet: first_text(result, &snippet_sel).unwrap_or_default(),
                url: first_text(result, &url_sel).unwrap_or_default(),
            })
        })
        .take(limit)
        .collect();
    Ok(hits)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Parse(format!("selector {}: {}", css, e)))
}

/// 第一个匹配元素的文本（实体已解码，空白折叠为单个空格）
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = scope.select(selector).next()?;
    let raw: String = element.text().collect();
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() { None } else { Some(text) }
}
