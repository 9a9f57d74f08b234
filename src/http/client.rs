use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::api::parsers::extract_error_message;
use crate::errors::ClientError;

/// JSON-over-HTTP client for the tournament API
pub struct ApiHttpClient {
    client: Client,
}

impl ApiHttpClient {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout_secs)?;
        Ok(Self { client })
    }

    pub async fn get(&self, url: &str, token: Option<&str>) -> Result<Value, ClientError> {
        let request = self.request(Method::GET, url, token);
        Self::send(request, url).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<Value, ClientError> {
        let mut request = self.request(Method::POST, url, token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::send(request, url).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<Value, ClientError> {
        let request = self.request(Method::PUT, url, token).json(body);
        Self::send(request, url).await
    }

    pub async fn delete(&self, url: &str, token: Option<&str>) -> Result<Value, ClientError> {
        let request = self.request(Method::DELETE, url, token);
        Self::send(request, url).await
    }

    // --- Helper Methods ---

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    fn request(&self, method: Method, url: &str, token: Option<&str>) -> RequestBuilder {
        debug!("{} {}", method, url);
        let request = self.client.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder, url: &str) -> Result<Value, ClientError> {
        let response = request.send().await?;
        Self::read_body(response, url).await
    }

    async fn read_body(response: Response, url: &str) -> Result<Value, ClientError> {
        let status = response.status();
        let text = response.text().await?;
        let body = parse_body(&text);

        if status.is_success() {
            return Ok(body);
        }
        Err(classify_failure(status, &body, url))
    }
}

/// JSON when it parses, otherwise the raw text as a JSON string
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.trim().to_string()))
}

fn classify_failure(status: StatusCode, body: &Value, url: &str) -> ClientError {
    let message = extract_error_message(body).unwrap_or_default();

    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(url.to_string()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
            ClientError::Validation { message }
        }
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    }
}
