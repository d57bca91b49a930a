//! HTTP adapters for the hosted database (PostgREST) and identity (GoTrue) APIs.
//!
//! Requests are single-shot: a transport failure or non-success status is
//! returned to the caller immediately.

mod auth;
mod records;

pub use auth::SupabaseAuthClient;
pub use records::SupabaseWillRepository;

use reqwest::{RequestBuilder, Response, StatusCode};

use crate::config::SupabaseConfig;

/// Connection details shared by both adapters.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuses an existing connection pool.
    pub fn with_client(http: reqwest::Client, config: &SupabaseConfig) -> Self {
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request carrying the public key and, when given, the caller's token.
    /// Without a token the anon key doubles as bearer, which is what the
    /// identity endpoints expect.
    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        access_token: Option<&str>,
    ) -> RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

/// Status and body of a non-success response.
#[derive(Debug)]
struct Failure {
    status: StatusCode,
    message: String,
}

async fn failure(response: Response) -> Failure {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Failure {
        status,
        message: error_message(&body).unwrap_or(body),
    }
}

/// PostgREST and GoTrue both report errors as JSON with one of these keys.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_known_keys() {
        assert_eq!(
            error_message(r#"{"code":"42501","message":"permission denied"}"#).as_deref(),
            Some("permission denied")
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
                .as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = SupabaseClient::new(&SupabaseConfig {
            url: "https://demo.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
        });
        assert_eq!(
            client.url("/rest/v1/testamentos"),
            "https://demo.supabase.co/rest/v1/testamentos"
        );
    }
}
