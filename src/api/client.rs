use crate::api::models::{ReplyRequest, ReplyResponse};
use crate::error::Result;
use crate::utils::normalize_url;
use log::{debug, error};
use reqwest::Client as HttpClient;
use std::future::Future;
use url::Url;

pub const SERVER_ERROR_REPLY: &str = "Sorry, something went wrong on the server.";
pub const UNREACHABLE_REPLY: &str = "I couldn’t reach the server, but I’m still here.";
pub const EMPTY_REPLY: &str = "I’m here, talk to you.";

/// Produces reply text for a contact. Implementations never fail; they fall
/// back to fixed text instead.
pub trait ReplyService: Send + Sync + 'static {
    fn reply(&self, request: &ReplyRequest) -> impl Future<Output = String> + Send;
}

enum ReplyFailure {
    Status(reqwest::StatusCode),
    Transport(reqwest::Error),
}

pub struct ApiClient {
    pub http: HttpClient,
    endpoint: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(),
            endpoint: Self::message_endpoint(base_url)?,
        })
    }

    fn message_endpoint(base_url: &str) -> Result<Url> {
        let base = normalize_url(base_url);
        let base = Url::parse(base.trim_end_matches('/'))?;
        Ok(base.join("/api/message")?)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn request(&self, request: &ReplyRequest) -> std::result::Result<Option<String>, ReplyFailure> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(ReplyFailure::Transport)?;
        if !resp.status().is_success() {
            return Err(ReplyFailure::Status(resp.status()));
        }
        let body: ReplyResponse = resp.json().await.map_err(ReplyFailure::Transport)?;
        Ok(body.reply_text.filter(|t| !t.is_empty()))
    }
}

impl ReplyService for ApiClient {
    async fn reply(&self, request: &ReplyRequest) -> String {
        debug!("requesting reply for {} from {}", request.contact_id, self.endpoint);
        match self.request(request).await {
            Ok(Some(text)) => text,
            Ok(None) => EMPTY_REPLY.to_string(),
            Err(ReplyFailure::Status(status)) => {
                error!("reply service returned HTTP {status}");
                SERVER_ERROR_REPLY.to_string()
            }
            Err(ReplyFailure::Transport(e)) => {
                error!("error calling reply service: {e}");
                UNREACHABLE_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Contact, HistoryTurn, Role};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ReplyRequest {
        ReplyRequest {
            contact_id: Contact::Alex,
            user_text: "hi".into(),
            history: vec![HistoryTurn { role: Role::User, content: "hi".into() }],
        }
    }

    #[test]
    fn endpoint_gets_scheme_and_path() {
        let client = ApiClient::new("example.workers.dev/").unwrap();
        assert_eq!(client.endpoint().as_str(), "https://example.workers.dev/api/message");
    }

    #[tokio::test]
    async fn returns_reply_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/message"))
            .and(body_json(serde_json::json!({
                "contactId": "alex",
                "userText": "hi",
                "history": [{ "role": "user", "content": "hi" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "replyText": "hey love" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        assert_eq!(client.reply(&request()).await, "hey love");
    }

    #[tokio::test]
    async fn server_error_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        assert_eq!(client.reply(&request()).await, SERVER_ERROR_REPLY);
    }

    #[tokio::test]
    async fn missing_or_empty_reply_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "replyText": "" })))
            .mount(&server)
            .await;
        let client = ApiClient::new(&server.uri()).unwrap();
        assert_eq!(client.reply(&request()).await, EMPTY_REPLY);

        server.reset().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        assert_eq!(client.reply(&request()).await, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn undecodable_body_counts_as_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;
        let client = ApiClient::new(&server.uri()).unwrap();
        assert_eq!(client.reply(&request()).await, UNREACHABLE_REPLY);
    }

    #[tokio::test]
    async fn connection_failure_uses_fallback() {
        // Nothing listens on a port released right after binding it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let client = ApiClient::new(&format!("http://127.0.0.1:{port}")).unwrap();
        assert_eq!(client.reply(&request()).await, UNREACHABLE_REPLY);
    }
}
