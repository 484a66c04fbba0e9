// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Raw HTTP transport.
//!
//! Requests are described by a cloneable [`ApiRequest`] so a failed request
//! can be re-issued after its headers were adjusted.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::error::ApiError;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Outbound request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::InvalidResponse {
            method: self.method.clone(),
            path: self.path().to_string(),
            message: format!("failed to serialize request body: {e}"),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query_pair(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Replace the query string with `query`, unmodified.
    pub fn raw_query(mut self, query: &str) -> Self {
        self.url.set_query(Some(query));
        self
    }

    pub fn bearer(mut self, token: &str) -> Result<Self, ApiError> {
        self.set_bearer(token)?;
        Ok(self)
    }

    /// Set `Authorization: Bearer <token>`, replacing any previous value.
    pub fn set_bearer(&mut self, token: &str) -> Result<(), ApiError> {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::Auth(AuthError::MalformedToken))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Token of the `Authorization: Bearer` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }
}

/// Successful response with its JSON body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.body).map_err(|e| ApiError::InvalidResponse {
            method: self.method,
            path: self.path,
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::MissingConfig(format!("failed to build HTTP client: {e}")))?;

        Self::from_client(base_url, http)
    }

    /// Transport over an existing `reqwest` client.
    pub fn from_client(base_url: impl Into<String>, http: Client) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        parse_url(&base_url)?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a backend path such as `/auth/login/`.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        parse_url(&format!("{}{}", self.base_url.trim_end_matches('/'), path))
    }

    /// Send `request` once.
    ///
    /// Non-2xx responses become [`ApiError::Status`] carrying the body.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let request_id = Uuid::new_v4();
        let path = request.path().to_string();

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(%request_id, method = %request.method, path = %path, "sending request");

        let response = builder.send().await.map_err(|source| ApiError::Transport {
            method: request.method.clone(),
            path: path.clone(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ApiError::Transport {
            method: request.method.clone(),
            path: path.clone(),
            source,
        })?;
        let body = parse_body(text);

        if !status.is_success() {
            warn!(
                %request_id,
                method = %request.method,
                path = %path,
                status = status.as_u16(),
                "request rejected"
            );
            return Err(ApiError::Status {
                method: request.method.clone(),
                path,
                status,
                body,
            });
        }

        debug!(%request_id, status = status.as_u16(), "request succeeded");
        Ok(ApiResponse {
            method: request.method.clone(),
            path,
            status,
            body,
        })
    }
}

pub(crate) fn parse_url(raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })
}

/// JSON body, or the raw text as a JSON string when it is not JSON.
fn parse_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport() -> HttpTransport {
        HttpTransport::new("https://api.example.com/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let url = transport().endpoint("/auth/login/").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/auth/login/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = HttpTransport::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn query_pair_is_encoded() {
        let url = transport().endpoint("/auth/email-verify/").unwrap();
        let request = ApiRequest::new(Method::GET, url).query_pair("token", "a b&c");
        assert_eq!(
            request.url.as_str(),
            "https://api.example.com/auth/email-verify/?token=a+b%26c"
        );
    }

    #[test]
    fn raw_query_is_kept_verbatim() {
        let url = parse_url("https://api.example.com/auth/google/").unwrap();
        let request = ApiRequest::new(Method::GET, url).raw_query("state=s&code=4%2F0A");
        assert_eq!(request.url.query(), Some("state=s&code=4%2F0A"));
    }

    #[test]
    fn set_bearer_replaces_previous_token() {
        let url = transport().endpoint("/energy-audit/").unwrap();
        let mut request = ApiRequest::new(Method::POST, url).bearer("old").unwrap();
        assert_eq!(request.bearer_token(), Some("old"));

        request.set_bearer("new").unwrap();
        assert_eq!(request.bearer_token(), Some("new"));
        assert_eq!(request.headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn bearer_with_newline_is_malformed() {
        let url = transport().endpoint("/energy-audit/").unwrap();
        let err = ApiRequest::new(Method::POST, url).bearer("bad\ntoken").unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::MalformedToken)));
    }

    #[test]
    fn non_json_body_is_kept_as_text() {
        assert_eq!(parse_body(String::new()), Value::Null);
        assert_eq!(parse_body("{\"a\":1}".to_string()), json!({"a": 1}));
        assert_eq!(parse_body("Bad Gateway".to_string()), json!("Bad Gateway"));
    }
}
