use super::{StatsTransport, TransportError};
use crate::model::{ClientConfig, StatsRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::error::Error as _;
use url::Url;

/// reqwest-backed transport posting JSON to the configured endpoint.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// reqwest's message plus its source chain, for the log only.
fn source_chain(err: &reqwest::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        let text = s.to_string();
        if !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        source = s.source();
    }
    msg
}

#[async_trait]
impl StatsTransport for HttpTransport {
    async fn send(&self, request: &StatsRequest) -> Result<u16, TransportError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            entities = request.variations.len(),
            stat_type = request.stat_type.as_str(),
            "posting statistics request"
        );
        match self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
        {
            Ok(resp) => {
                let status = resp.status().as_u16();
                tracing::info!(status, "statistics service responded");
                Ok(status)
            }
            Err(e) => {
                tracing::warn!(error = %source_chain(&e), "statistics request failed");
                Err(TransportError::new(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StatisticType, SubmitResult};
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct ServerState {
        status: StatusCode,
        received: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    async fn handle_stats(
        State(state): State<ServerState>,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        state.received.lock().await.push(body);
        state.status
    }

    async fn spawn_stats_server(
        status: StatusCode,
    ) -> (Url, Arc<Mutex<Vec<serde_json::Value>>>) {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            status,
            received: received.clone(),
        };
        let app = Router::new()
            .route("/get_stats", post(handle_stats))
            .with_state(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        let url = Url::parse(&format!("http://{addr}/get_stats")).expect("url");
        (url, received)
    }

    fn config(endpoint: Url) -> ClientConfig {
        ClientConfig {
            endpoint,
            timeout: Duration::from_secs(5),
            user_agent: "entity-counter-test".into(),
        }
    }

    fn request() -> StatsRequest {
        StatsRequest {
            variations: vec!["gene-1".into(), "gene-2".into()],
            replyto: "user@example.com".into(),
            stat_type: StatisticType::PapersPerVar,
        }
    }

    #[tokio::test]
    async fn posts_json_payload_and_reports_success() {
        let (url, received) = spawn_stats_server(StatusCode::OK).await;
        let transport = HttpTransport::new(&config(url)).expect("transport");

        let result = transport.post_stats(&request()).await;
        assert_eq!(result, SubmitResult::Success);

        let bodies = received.lock().await;
        assert_eq!(bodies.len(), 1);
        assert_eq!(
            bodies[0],
            serde_json::json!({
                "variations": ["gene-1", "gene-2"],
                "replyto": "user@example.com",
                "type": "papers_per_var",
            })
        );
    }

    #[tokio::test]
    async fn non_200_status_is_a_protocol_error() {
        let (url, _) = spawn_stats_server(StatusCode::BAD_REQUEST).await;
        let transport = HttpTransport::new(&config(url)).expect("transport");
        assert_eq!(
            transport.post_stats(&request()).await,
            SubmitResult::ProtocolError(400)
        );
    }

    #[tokio::test]
    async fn unknown_route_is_a_protocol_error() {
        let (url, _) = spawn_stats_server(StatusCode::OK).await;
        let missing = url.join("/nowhere").expect("join");
        let transport = HttpTransport::new(&config(missing)).expect("transport");
        assert_eq!(
            transport.post_stats(&request()).await,
            SubmitResult::ProtocolError(404)
        );
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/get_stats")).expect("url");
        let transport = HttpTransport::new(&config(url)).expect("transport");
        match transport.post_stats(&request()).await {
            SubmitResult::TransportError(msg) => assert!(!msg.is_empty()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_error_text_is_reqwests_own() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/get_stats")).expect("url");
        let cfg = config(url.clone());
        let direct = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()
            .expect("client")
            .post(url)
            .json(&request())
            .send()
            .await
            .expect_err("nothing listens on the port");

        let transport = HttpTransport::new(&cfg).expect("transport");
        assert_eq!(
            transport.post_stats(&request()).await,
            SubmitResult::TransportError(direct.to_string())
        );
    }
}
