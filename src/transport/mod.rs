use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Single-attempt HTTP adapter. The cookie store carries the session cookie
/// set on login; there is no retry or backoff policy.
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
}

impl Transport {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|err| ApiError::Internal(format!("failed to build http client: {err}")))?;

        let base_url = Url::parse(&config.api_base_url)
            .map_err(|err| ApiError::Internal(format!("invalid API_BASE_URL: {err}")))?;

        Ok(Self { http, base_url })
    }

    pub async fn get(&self, path: &str, query: &[(&'static str, String)]) -> Result<Value, ApiError> {
        self.send(Method::Get, path, query, None).await
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.join(path)?;
        let request_id = Uuid::new_v4();

        let mut request = self
            .http
            .request(method.as_reqwest(), url)
            .header("x-request-id", request_id.to_string());

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            warn!(%request_id, path, error = %err, "transport failure");
            ApiError::Transport(err.to_string())
        })?;

        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = backend_message(&payload, status);
            warn!(%request_id, path, status = status.as_u16(), message, "request rejected");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        debug!(%request_id, path, status = status.as_u16(), "request completed");
        Ok(unwrap_envelope(payload))
    }

    fn join(&self, path: &str) -> Result<Url, ApiError> {
        let trimmed = path.trim_start_matches('/');
        let mut url = self.base_url.clone();

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::Internal("API_BASE_URL cannot be a base".to_string()))?;
            segments.pop_if_empty();
            for segment in trimmed.split('/') {
                segments.push(segment);
            }
        }

        Ok(url)
    }
}

fn backend_message(payload: &Value, status: StatusCode) -> String {
    payload
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
}

// Unwrap the `{ success, data, meta? }` envelope. Some endpoints double-wrap
// (`data.data`) and some key the list by its family name (`data.drivers`);
// both flatten to one shape here.
fn unwrap_envelope(payload: Value) -> Value {
    let Value::Object(mut envelope) = payload else {
        return payload;
    };

    let Some(data) = envelope.remove("data") else {
        return Value::Object(envelope);
    };

    let data = unwrap_nested(data);

    match envelope.remove("meta") {
        Some(meta) => {
            let mut paged = serde_json::Map::new();
            paged.insert("data".to_string(), data);
            paged.insert("meta".to_string(), meta);
            Value::Object(paged)
        }
        None => data,
    }
}

fn unwrap_nested(data: Value) -> Value {
    const FAMILY_KEYS: [&str; 6] = ["data", "drivers", "rides", "users", "payments", "contacts"];

    if let Value::Object(obj) = &data {
        if obj.len() == 1 {
            if let Some((key, inner)) = obj.iter().next() {
                let family_list = FAMILY_KEYS.contains(&key.as_str()) && inner.is_array();
                if key == "data" || family_list {
                    return inner.clone();
                }
            }
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_unwraps_plain_data() {
        let unwrapped = unwrap_envelope(json!({
            "success": true,
            "data": {"_id": "u1", "name": "Asha"}
        }));

        assert_eq!(unwrapped["name"], "Asha");
    }

    #[test]
    fn envelope_keeps_meta_alongside_list() {
        let unwrapped = unwrap_envelope(json!({
            "success": true,
            "data": [{"_id": "r1"}],
            "meta": {"total": 1}
        }));

        assert_eq!(unwrapped["data"][0]["_id"], "r1");
        assert_eq!(unwrapped["meta"]["total"], 1);
    }

    #[test]
    fn envelope_flattens_double_wrapped_data() {
        let unwrapped = unwrap_envelope(json!({
            "success": true,
            "data": {"data": [{"_id": "r1"}]}
        }));

        assert_eq!(unwrapped[0]["_id"], "r1");
    }

    #[test]
    fn envelope_flattens_family_keyed_list() {
        let unwrapped = unwrap_envelope(json!({
            "success": true,
            "data": {"drivers": [{"_id": "d1"}]}
        }));

        assert_eq!(unwrapped[0]["_id"], "d1");
    }

    #[test]
    fn single_field_object_that_is_not_a_list_survives() {
        let unwrapped = unwrap_envelope(json!({
            "success": true,
            "data": {"drivers": {"online": 4}}
        }));

        assert_eq!(unwrapped["drivers"]["online"], 4);
    }

    #[test]
    fn backend_message_falls_back_to_status() {
        let message = backend_message(&Value::Null, StatusCode::BAD_GATEWAY);
        assert_eq!(message, "request failed with status 502");

        let message = backend_message(&json!({"message": "ride not found"}), StatusCode::NOT_FOUND);
        assert_eq!(message, "ride not found");
    }
}
