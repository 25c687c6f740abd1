//! 本地 HTTP 桩服务，用于在不访问真实天气 / 搜索 / LLM 服务的情况下测试 HTTP 客户端。
//!
//! 基于 axum `Router`，监听 `127.0.0.1` 的随机端口，对每个请求回复同一个预设响应并记录请求。
//! [`MockHttpServer::silent`] 收下请求但迟迟不回复，用来触发客户端超时。
//!
//! ```rust
//! use weather_agent::testing::{MockHttpServer, http_client};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let server = MockHttpServer::start(200, r#"{"ok":true}"#).await.unwrap();
//! let body = http_client()
//!     .unwrap()
//!     .get(server.url("/ping"))
//!     .send()
//!     .await
//!     .unwrap()
//!     .text()
//!     .await
//!     .unwrap();
//! assert_eq!(body, r#"{"ok":true}"#);
//! assert_eq!(server.request_count(), 1);
//! # }
//! ```

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

struct CannedResponse {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

struct Shared {
    /// `None` 表示静默模式
    response: Option<CannedResponse>,
    hits: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl Shared {
    fn requests(&self) -> MutexGuard<'_, Vec<String>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct MockHttpServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
    handle: JoinHandle<()>,
}

impl MockHttpServer {
    /// 启动一个对所有请求都返回 `status` + JSON `body` 的服务
    pub async fn start(status: u16, body: impl Into<String>) -> std::io::Result<Self> {
        Self::spawn(Some(CannedResponse {
            status: status_code(status),
            content_type: "application/json",
            body: body.into(),
        }))
        .await
    }

    /// 与 [`start`](MockHttpServer::start) 相同，但返回 HTML
    pub async fn start_html(status: u16, body: impl Into<String>) -> std::io::Result<Self> {
        Self::spawn(Some(CannedResponse {
            status: status_code(status),
            content_type: "text/html; charset=utf-8",
            body: body.into(),
        }))
        .await
    }

    /// 记录请求，然后一直不回复
    pub async fn silent() -> std::io::Result<Self> {
        Self::spawn(None).await
    }

    async fn spawn(response: Option<CannedResponse>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shared = Arc::new(Shared {
            response,
            hits: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(respond).with_state(shared.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            shared,
            handle,
        })
    }

    /// 拼出指向本服务的完整 URL，例如 `server.url("/current")`
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// 已收到的请求数
    pub fn request_count(&self) -> usize {
        self.shared.hits.load(Ordering::SeqCst)
    }

    /// 最后一个请求：`<METHOD> <path?query>`，随后每行一个头部，空行后是 body
    pub fn last_request(&self) -> Option<String> {
        self.shared.requests().last().cloned()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// 不走系统代理的 HTTP 客户端，保证请求真正打到本地桩服务
pub fn http_client() -> reqwest::Result<Arc<Client>> {
    Client::builder().no_proxy().build().map(Arc::new)
}

async fn respond(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut record = format!("{} {}\n", method, uri);
    for (name, value) in &headers {
        record.push_str(&format!(
            "{}: {}\n",
            name,
            String::from_utf8_lossy(value.as_bytes())
        ));
    }
    record.push('\n');
    record.push_str(&String::from_utf8_lossy(&body));

    shared.hits.fetch_add(1, Ordering::SeqCst);
    shared.requests().push(record);

    match &shared.response {
        Some(canned) => (
            canned.status,
            [(header::CONTENT_TYPE, canned.content_type)],
            canned.body.clone(),
        )
            .into_response(),
        None => {
            tokio::time::sleep(Duration::from_secs(60)).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
