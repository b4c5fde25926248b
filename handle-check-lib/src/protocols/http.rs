//! HTTP transport used by the profile-page and API probes.
//!
//! Probes never talk to `reqwest` directly. They build an [`HttpRequest`],
//! hand it to an [`HttpTransport`] and interpret the [`HttpResponse`]. Non-2xx
//! statuses are ordinary responses here, not errors: whether a 404 means
//! "available" is the extractor's call.

use crate::error::{HandleCheckError, ProbeError};
use crate::types::CheckConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An outbound request.
///
/// Header values and form values may carry secrets, so the `Debug` output
/// lists only their names.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    /// Whether the caller needs the body. Profile probes only need the status.
    pub read_body: bool,
}

impl HttpRequest {
    pub fn get<U: Into<String>>(url: U) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            form: Vec::new(),
            read_body: true,
        }
    }

    pub fn post<U: Into<String>>(url: U) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url)
        }
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add an `application/x-www-form-urlencoded` body field.
    pub fn form_field<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }

    pub fn without_body(mut self) -> Self {
        self.read_body = false;
        self
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        let form_names: Vec<&str> = self.form.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("form", &form_names)
            .finish()
    }
}

/// Status and (optionally) body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new<B: Into<String>>(status: u16, body: B) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ProbeError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Something that can perform one HTTP round trip.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request. Only transport-level faults are errors; every HTTP
    /// status, including 4xx and 5xx, is returned as a response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ProbeError>;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport honouring the configured timeout and user agent.
    ///
    /// Redirects are not followed: a 3xx reaches the caller as is.
    pub fn new(config: &CheckConfig) -> Result<Self, HandleCheckError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| HandleCheckError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    fn map_error(&self, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout(self.timeout)
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ProbeError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        tracing::debug!(method = ?request.method, url = %request.url, "sending request");

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();

        tracing::debug!(url = %request.url, status, "received response");

        let body = if request.read_body {
            response.text().await.map_err(|e| self.map_error(e))?
        } else {
            String::new()
        };

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_debug_hides_secret_values() {
        let request = HttpRequest::post("https://id.example/token")
            .header("Authorization", "Bearer top-secret")
            .form_field("client_secret", "hunter2");

        let debug = format!("{:?}", request);
        assert!(debug.contains("Authorization"));
        assert!(debug.contains("client_secret"));
        assert!(!debug.contains("top-secret"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }

    #[test]
    fn test_response_json_errors_are_unexpected_response() {
        let response = HttpResponse::new(200, "<html>");
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::UnexpectedResponse);
    }

    #[tokio::test]
    async fn test_reqwest_transport_creation() {
        let transport = ReqwestTransport::new(&CheckConfig::default());
        assert!(transport.is_ok());
    }
}
