//! Hand-driven backend built directly on hyper-util's legacy client.
//!
//! Speaks plain HTTP/1.1 without TLS, which is all the internal
//! services it fronts require. Timeouts are applied around the whole
//! exchange with [`tokio::time::timeout`].

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use crate::common::{self, PreparedRequest};
use crate::retry::run_with_retry;
use crate::{HttpClient, HttpClientOptions, HttpError, HttpRequestConfig, HttpResponse};

pub struct HyperHttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
    options: HttpClientOptions,
}

impl HyperHttpClient {
    pub fn new(options: HttpClientOptions) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self { client, options }
    }

    async fn dispatch(&self, prepared: &PreparedRequest) -> Result<HttpResponse, HttpError> {
        if prepared.url.len() >= 8 && prepared.url[..8].eq_ignore_ascii_case("https://") {
            return Err(HttpError::InvalidRequest(
                "this backend speaks plain HTTP; use the pooled backend for https URLs".into(),
            ));
        }

        let uri: http::Uri = prepared
            .url
            .parse()
            .map_err(|e| HttpError::InvalidRequest(format!("invalid url {}: {e}", prepared.url)))?;

        let mut builder = http::Request::builder().method(prepared.method.clone()).uri(uri);
        for (name, value) in &prepared.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = match &prepared.body {
            Some(value) => {
                let has_content_type = prepared
                    .headers
                    .keys()
                    .any(|k| k.eq_ignore_ascii_case("content-type"));
                if !has_content_type {
                    builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                }
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;
                Full::new(Bytes::from(bytes))
            }
            None => Full::default(),
        };

        let request = builder
            .body(body)
            .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;

        let response =
            match tokio::time::timeout(prepared.timeout, self.client.request(request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    return Err(HttpError::Transport {
                        message: e.to_string(),
                        request_id: Some(prepared.request_id.clone()),
                    });
                }
                Err(_) => {
                    return Err(HttpError::Timeout {
                        request_id: Some(prepared.request_id.clone()),
                    });
                }
            };

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_owned(),
                    v.to_str().unwrap_or_default().to_owned(),
                )
            })
            .collect();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| HttpError::Transport {
                message: e.to_string(),
                request_id: Some(prepared.request_id.clone()),
            })?
            .to_bytes();

        common::finalize(status, headers, &bytes, &prepared.request_id)
    }
}

#[async_trait]
impl HttpClient for HyperHttpClient {
    async fn request(&self, config: HttpRequestConfig) -> Result<HttpResponse, HttpError> {
        let prepared = common::prepare(&self.options, config)?;
        run_with_retry(self.options.max_retries, prepared.retry_eligible, || {
            self.dispatch(&prepared)
        })
        .await
    }
}
