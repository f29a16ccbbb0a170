// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use shopfloor_app::{ResourceId, ResourceItem, ResourceService, ServiceError};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Shared HTTP settings for every collection under one API root.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base_url =
            Url::parse(&format!("{trimmed}/")).with_context(|| format!("parse api.base_url {trimmed:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            token: token
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_owned),
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Binds the client to one collection, e.g. `work-orders`.
    pub fn resource(&self, endpoint: &str) -> Result<RestService> {
        let endpoint = endpoint.trim().trim_matches('/');
        if endpoint.is_empty() {
            bail!("resource endpoint must not be empty");
        }
        let collection = self
            .base_url
            .join(&format!("{endpoint}/"))
            .with_context(|| format!("build URL for endpoint {endpoint:?}"))?;
        Ok(RestService {
            client: self.clone(),
            collection,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, "application/json");
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Token {token}")),
            None => request,
        }
    }
}

/// [`ResourceService`] over a REST collection: list and create at
/// `{base}/{endpoint}/`, update and delete at `{base}/{endpoint}/{id}/`.
#[derive(Debug, Clone)]
pub struct RestService {
    client: Client,
    collection: Url,
}

impl RestService {
    pub fn collection_url(&self) -> &str {
        self.collection.as_str()
    }

    pub fn record_url(&self, id: &ResourceId) -> Url {
        let mut url = self.collection.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string()).push("");
        }
        url
    }

    fn send(&self, method: &str, url: &Url, request: RequestBuilder) -> Result<Response, ServiceError> {
        debug!(method, url = %url, "sending request");
        let response = self
            .client
            .authorize(request)
            .send()
            .map_err(|error| connection_error(self.client.base_url(), error))?;

        let status = response.status();
        debug!(method, url = %url, status = status.as_u16(), "received response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(ServiceError::Status {
            status: status.as_u16(),
            body: parse_body(&body),
        })
    }

    fn read_json(&self, response: Response) -> Result<Value, ServiceError> {
        let body = response
            .text()
            .map_err(|error| ServiceError::Transport(format!("read response body: {error}")))?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|error| ServiceError::Transport(format!("decode response from {}: {error}", self.collection)))
    }
}

impl ResourceService for RestService {
    fn get_all(&self) -> Result<Value, ServiceError> {
        let url = &self.collection;
        let response = self.send("GET", url, self.client.http.get(url.clone()))?;
        self.read_json(response)
    }

    fn create(&self, data: &ResourceItem) -> Result<Value, ServiceError> {
        let url = &self.collection;
        let response = self.send("POST", url, self.client.http.post(url.clone()).json(data))?;
        self.read_json(response)
    }

    fn update(&self, id: &ResourceId, data: &ResourceItem) -> Result<Value, ServiceError> {
        let url = self.record_url(id);
        let response = self.send("PUT", &url, self.client.http.put(url.clone()).json(data))?;
        self.read_json(response)
    }

    fn delete(&self, id: &ResourceId) -> Result<(), ServiceError> {
        let url = self.record_url(id);
        self.send("DELETE", &url, self.client.http.delete(url.clone()))?;
        Ok(())
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> ServiceError {
    if error.is_timeout() {
        return ServiceError::Transport(format!(
            "request to {base_url} timed out -- raise api.timeout in your config"
        ));
    }
    ServiceError::Transport(format!(
        "cannot reach {base_url} -- check api.base_url in your config ({error})"
    ))
}

/// JSON bodies are kept structured; anything else becomes a string value.
fn parse_body(body: &str) -> Value {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::{Client, parse_body};
    use serde_json::json;
    use shopfloor_app::ResourceId;
    use std::time::Duration;

    fn client(base: &str) -> Client {
        Client::new(base, None, Duration::from_secs(1)).expect("client should initialize")
    }

    #[test]
    fn base_url_is_validated() {
        assert!(Client::new("", None, Duration::from_secs(1)).is_err());
        assert!(Client::new("not a url", None, Duration::from_secs(1)).is_err());
        let error = Client::new("ftp://example.com", None, Duration::from_secs(1))
            .expect_err("ftp is not http");
        assert!(error.to_string().contains("http or https"));
    }

    #[test]
    fn collection_and_record_urls_keep_trailing_slash() {
        let service = client("http://localhost:8000/api/")
            .resource("work-orders")
            .expect("resource");
        assert_eq!(
            service.collection_url(),
            "http://localhost:8000/api/work-orders/"
        );
        assert_eq!(
            service.record_url(&ResourceId::Int(7)).as_str(),
            "http://localhost:8000/api/work-orders/7/"
        );
    }

    #[test]
    fn base_without_trailing_slash_keeps_its_last_segment() {
        let service = client("http://localhost:8000/api")
            .resource("/materials/")
            .expect("resource");
        assert_eq!(service.collection_url(), "http://localhost:8000/api/materials/");
    }

    #[test]
    fn text_ids_are_escaped() {
        let service = client("http://localhost/api")
            .resource("products")
            .expect("resource");
        assert_eq!(
            service.record_url(&ResourceId::Text("a b/c".to_owned())).as_str(),
            "http://localhost/api/products/a%20b%2Fc/"
        );
    }

    #[test]
    fn blank_token_is_ignored() {
        let client = Client::new("http://localhost", Some("  "), Duration::from_secs(1))
            .expect("client should initialize");
        assert!(!client.has_token());
    }

    #[test]
    fn error_bodies_parse_as_json_or_text() {
        assert_eq!(parse_body(r#"{"detail":"x"}"#), json!({"detail": "x"}));
        assert_eq!(parse_body("Bad Gateway\n"), json!("Bad Gateway"));
        assert_eq!(parse_body(""), json!(null));
    }
}
