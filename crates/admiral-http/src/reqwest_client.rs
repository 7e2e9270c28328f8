//! Pooled backend built on [`reqwest`].
//!
//! This is the default backend: connection pooling, TLS, and redirect
//! handling come from the library. Timeouts are enforced per call.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::common::{self, PreparedRequest};
use crate::retry::run_with_retry;
use crate::{HttpClient, HttpClientOptions, HttpError, HttpRequestConfig, HttpResponse};

pub struct ReqwestHttpClient {
    client: reqwest::Client,
    options: HttpClientOptions,
}

impl ReqwestHttpClient {
    pub fn new(options: HttpClientOptions) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| HttpError::Transport {
                message: e.to_string(),
                request_id: None,
            })?;
        Ok(Self { client, options })
    }

    async fn dispatch(&self, prepared: &PreparedRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self
            .client
            .request(prepared.method.clone(), &prepared.url)
            .timeout(prepared.timeout);
        for (name, value) in &prepared.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &prepared.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            let request_id = Some(prepared.request_id.clone());
            if e.is_timeout() {
                HttpError::Timeout { request_id }
            } else {
                HttpError::Transport {
                    message: e.to_string(),
                    request_id,
                }
            }
        })?;

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
        let bytes = response.bytes().await.map_err(|e| HttpError::Transport {
            message: e.to_string(),
            request_id: Some(prepared.request_id.clone()),
        })?;

        common::finalize(status, headers, &bytes, &prepared.request_id)
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn request(&self, config: HttpRequestConfig) -> Result<HttpResponse, HttpError> {
        let prepared = common::prepare(&self.options, config)?;
        run_with_retry(self.options.max_retries, prepared.retry_eligible, || {
            self.dispatch(&prepared)
        })
        .await
    }
}
