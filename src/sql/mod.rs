use crate::controller::RequestDispatcher;
use crate::error::{StartupError, SubmissionError};
use crate::event::{AppEvent, RequestId, SubmissionOutcome};
use log::{debug, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::mpsc;
use tokio::runtime::Handle;

pub const GENERATE_SQL_ENDPOINT: &str = "http://127.0.0.1:8000/generate-sql";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateSqlRequest {
    pub schema_files: Vec<String>,
    pub user_prompt: String,
}

/// Issues `/generate-sql` calls on the tokio runtime and posts each result
/// back to the UI thread as an [`AppEvent`]. Requests are never cancelled
/// and no timeout is applied.
#[derive(Clone)]
pub struct SqlClient {
    endpoint: String,
    http: Client,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl SqlClient {
    pub fn new(endpoint: impl Into<String>, tx: mpsc::Sender<AppEvent>) -> Result<Self, StartupError> {
        let runtime_handle = Handle::try_current()?;
        let http = Client::builder().build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
            tx,
            runtime_handle,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RequestDispatcher for SqlClient {
    fn dispatch(&self, request_id: RequestId, request: GenerateSqlRequest) {
        let tx = self.tx.clone();
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();

        debug!(
            "dispatching request {request_id} to {endpoint} with {} schema file(s)",
            request.schema_files.len()
        );

        self.runtime_handle.spawn(async move {
            let outcome = generate_sql(&http, &endpoint, &request).await;
            if tx.send(AppEvent::SqlResponse { request_id, outcome }).is_err() {
                warn!("dropping response for request {request_id}: event channel closed");
            }
        });
    }
}

pub async fn generate_sql(
    http: &Client,
    endpoint: &str,
    request: &GenerateSqlRequest,
) -> SubmissionOutcome {
    let response = http
        .post(endpoint)
        .header(CONTENT_TYPE, "application/json")
        .json(request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SubmissionError::Status(status));
    }

    let body = response.text().await?;
    let payload: Value = serde_json::from_str(&body)?;
    Ok(extract_sql_query(&payload))
}

fn extract_sql_query(payload: &Value) -> Option<String> {
    payload
        .get("sql_query")
        .and_then(Value::as_str)
        .filter(|sql| !sql.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerateSqlRequest {
        GenerateSqlRequest {
            schema_files: vec!["session.json".to_string(), "appusers.json".to_string()],
            user_prompt: "average sessions per day".to_string(),
        }
    }

    async fn mock_service(response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-sql"))
            .respond_with(response)
            .mount(&server)
            .await;
        server
    }

    fn endpoint(server: &MockServer) -> String {
        format!("{}/generate-sql", server.uri())
    }

    #[test]
    fn extract_sql_query_treats_missing_null_and_empty_as_absent() {
        assert_eq!(extract_sql_query(&json!({})), None);
        assert_eq!(extract_sql_query(&json!({ "sql_query": null })), None);
        assert_eq!(extract_sql_query(&json!({ "sql_query": "" })), None);
        assert_eq!(extract_sql_query(&json!({ "sql_query": 42 })), None);
        assert_eq!(extract_sql_query(&json!([])), None);
        assert_eq!(
            extract_sql_query(&json!({ "sql_query": "SELECT 1;" })),
            Some("SELECT 1;".to_string())
        );
    }

    #[tokio::test]
    async fn posts_wire_contract_and_reads_sql_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-sql"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "schema_files": ["session.json", "appusers.json"],
                "user_prompt": "average sessions per day"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sql_query": "SELECT 1;" })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = generate_sql(&Client::new(), &endpoint(&server), &request()).await;
        assert_eq!(outcome.expect("request should succeed"), Some("SELECT 1;".to_string()));
    }

    #[tokio::test]
    async fn missing_field_is_not_an_error() {
        let server = mock_service(ResponseTemplate::new(200).set_body_json(json!({}))).await;
        let outcome = generate_sql(&Client::new(), &endpoint(&server), &request()).await;
        assert_eq!(outcome.expect("missing field should still succeed"), None);
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let server = mock_service(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "No valid schema data found." })),
        )
        .await;
        let outcome = generate_sql(&Client::new(), &endpoint(&server), &request()).await;
        assert!(matches!(outcome, Err(SubmissionError::Status(status)) if status.as_u16() == 400));
    }

    #[tokio::test]
    async fn non_json_body_is_a_failure() {
        let server = mock_service(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
        let outcome = generate_sql(&Client::new(), &endpoint(&server), &request()).await;
        assert!(matches!(outcome, Err(SubmissionError::MalformedBody(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral port should bind");
        let port = listener.local_addr().expect("listener should have an address").port();
        drop(listener);
        let endpoint = format!("http://127.0.0.1:{port}/generate-sql");

        let outcome = generate_sql(&Client::new(), &endpoint, &request()).await;
        assert!(matches!(outcome, Err(SubmissionError::Transport(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dispatch_posts_outcome_back_through_event_channel() {
        let server =
            mock_service(ResponseTemplate::new(200).set_body_json(json!({ "sql_query": "SELECT 2;" }))).await;
        let (tx, rx) = mpsc::channel();
        let client = SqlClient::new(endpoint(&server), tx).expect("client should build inside runtime");

        client.dispatch(7, request());

        let event = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .expect("blocking receive should join")
            .expect("event should arrive");
        let AppEvent::SqlResponse { request_id, outcome } = event;
        assert_eq!(request_id, 7);
        assert_eq!(outcome.expect("request should succeed"), Some("SELECT 2;".to_string()));
    }

    #[test]
    fn new_fails_outside_a_runtime() {
        let (tx, _rx) = mpsc::channel();
        assert!(matches!(
            SqlClient::new(GENERATE_SQL_ENDPOINT, tx),
            Err(StartupError::Runtime(_))
        ));
    }
}
