//! Execute prepared requests and normalize the responses

use indexmap::IndexMap;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::transport::{HttpTransport, TransportResponse};
use crate::types::{PreparedRequest, ResponseRecord};

/// Executor for prepared requests
pub struct RequestExecutor;

impl RequestExecutor {
    /// Send the request and capture the response.
    ///
    /// Any HTTP status produces a record; only a transport failure is an error.
    pub async fn execute(
        request: &PreparedRequest,
        transport: &dyn HttpTransport,
    ) -> Result<ResponseRecord> {
        info!(
            "Executing {} {} (body: {} bytes)",
            request.method,
            request.url,
            request.body.as_ref().map_or(0, String::len)
        );

        let started = Instant::now();
        let response = transport.send(request).await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let record = Self::normalize(response, elapsed_ms);

        if record.ok {
            debug!("Response status: {} in {}ms", record.status, elapsed_ms);
        } else {
            warn!("Request failed with status {} in {}ms", record.status, elapsed_ms);
        }

        Ok(record)
    }

    /// Turn a raw transport response into a record
    fn normalize(response: TransportResponse, elapsed_ms: u64) -> ResponseRecord {
        let ok = response.is_success();

        let mut headers: IndexMap<String, String> = IndexMap::new();
        for (name, value) in response.headers {
            headers
                .entry(name)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        // Best effort: a non-JSON body is kept as raw text only
        let body_parsed = serde_json::from_str::<Value>(&response.body).ok();

        ResponseRecord {
            status: response.status,
            ok,
            headers,
            elapsed_ms,
            body_raw: response.body,
            body_parsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplorerError;
    use crate::testing::ScriptedTransport;
    use crate::transport::TransportError;
    use serde_json::json;

    #[tokio::test]
    async fn test_success_parses_json() {
        let transport = ScriptedTransport::new().reply(200, r#"{"id": 42}"#);
        let request = PreparedRequest::get("http://localhost:8000/users/42");

        let record = RequestExecutor::execute(&request, &transport).await.unwrap();
        assert!(record.ok);
        assert_eq!(record.status, 200);
        assert_eq!(record.body_parsed, Some(json!({"id": 42})));
        assert_eq!(record.headers.get("content-type").map(String::as_str), Some("application/json"));
        assert_eq!(transport.requests(), vec![request]);
    }

    #[tokio::test]
    async fn test_not_found_is_a_record() {
        let transport = ScriptedTransport::new().reply(404, "Not Found");
        let request = PreparedRequest::get("http://localhost:8000/missing");

        let record = RequestExecutor::execute(&request, &transport).await.unwrap();
        assert!(!record.ok);
        assert_eq!(record.status, 404);
        assert_eq!(record.body_raw, "Not Found");
        assert_eq!(record.body_parsed, None);
    }

    #[tokio::test]
    async fn test_status_boundaries() {
        for (status, ok) in [(199, false), (200, true), (204, true), (299, true), (300, false), (500, false)] {
            let transport = ScriptedTransport::new().reply(status, "");
            let record = RequestExecutor::execute(&PreparedRequest::get("http://h/"), &transport)
                .await
                .unwrap();
            assert_eq!(record.ok, ok, "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let transport =
            ScriptedTransport::new().fail(TransportError::Connect("connection refused".to_string()));

        let err = RequestExecutor::execute(&PreparedRequest::get("http://h/"), &transport)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ExplorerError::Transport("connection failed: connection refused".to_string())
        );
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let response = TransportResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![
                ("set-cookie".to_string(), "a=1".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
            ],
            body: String::new(),
        };

        let record = RequestExecutor::normalize(response, 1);
        assert_eq!(record.headers["set-cookie"], "a=1, b=2");
        assert_eq!(record.body_raw, "");
    }
}
