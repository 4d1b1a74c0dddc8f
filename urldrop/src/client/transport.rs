use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

use crate::api::models::submissions::{SubmitRequest, SubmitResponse};

/// What came back from the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A response envelope, whatever the HTTP status
    Answered(SubmitResponse),
    /// A response that is not an envelope (proxy error page, empty body...)
    Unrecognized,
}

/// The one outbound call a submission makes.
///
/// An `Err` means no response was received at all.
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    async fn send(&self, request: &SubmitRequest) -> anyhow::Result<Delivery>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "-submit/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SubmitTransport for HttpTransport {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn send(&self, request: &SubmitRequest) -> anyhow::Result<Delivery> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .with_context(|| format!("Could not reach {}", self.endpoint))?;

        let status = response.status();
        let body = response.bytes().await.context("Failed to read the response")?;

        match serde_json::from_slice::<SubmitResponse>(&body) {
            Ok(envelope) => Ok(Delivery::Answered(envelope)),
            Err(e) => {
                debug!(status = %status, error = %e, "Response is not a submission envelope");
                Ok(Delivery::Unrecognized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> SubmitRequest {
        SubmitRequest {
            url: "https://example.com".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_error_status_with_envelope_is_answered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "url": "https://example.com" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "ok": false, "error": "invalid_url" })))
            .expect(1)
            .mount(&server)
            .await;
        let transport = HttpTransport::new(server.uri().parse().unwrap()).unwrap();

        let delivery = transport.send(&request()).await.unwrap();

        assert_eq!(delivery, Delivery::Answered(SubmitResponse::rejected("invalid_url", None)));
    }

    #[tokio::test]
    async fn test_non_envelope_is_unrecognized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;
        let transport = HttpTransport::new(server.uri().parse().unwrap()).unwrap();

        assert_eq!(transport.send(&request()).await.unwrap(), Delivery::Unrecognized);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let transport = HttpTransport::new("http://127.0.0.1:1/api/submit".parse().unwrap()).unwrap();

        let err = transport.send(&request()).await.unwrap_err();
        assert!(format!("{err:#}").contains("Could not reach"));
    }
}
