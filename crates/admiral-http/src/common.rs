//! Request preparation and error mapping shared by both backends.

use std::collections::HashMap;
use std::time::Duration;

use http::Method;
use uuid::Uuid;

use crate::{
    HttpClientOptions, HttpError, HttpRequestConfig, HttpResponse, IDEMPOTENCY_KEY_HEADER,
    REQUEST_ID_HEADER,
};

/// A request after URL joining, query encoding, and request-id
/// injection. Backends only translate this into their own types.
#[derive(Debug)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
    pub timeout: Duration,
    pub request_id: String,
    pub retry_eligible: bool,
}

pub fn prepare(
    options: &HttpClientOptions,
    config: HttpRequestConfig,
) -> Result<PreparedRequest, HttpError> {
    let base = config.base_url.as_deref().or(options.base_url.as_deref());
    let mut url = build_url(base, &config.url)?;
    if !config.params.is_empty() {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&config.params)
            .finish();
        let separator = if url.contains('?') { '&' } else { '?' };
        url = format!("{url}{separator}{query}");
    }

    let mut headers = config.headers;
    let request_id = ensure_request_id(&mut headers);
    let retry_eligible = is_retry_eligible(&config.method, &headers);

    Ok(PreparedRequest {
        method: config.method,
        url,
        headers,
        body: config.body,
        timeout: config.timeout.unwrap_or(options.timeout),
        request_id,
        retry_eligible,
    })
}

/// Join `path` onto `base` with exactly one separating slash. A
/// scheme-qualified `path` is used verbatim.
pub fn build_url(base: Option<&str>, path: &str) -> Result<String, HttpError> {
    if is_absolute_url(path) {
        return Ok(path.to_owned());
    }
    let base = base.ok_or_else(|| {
        HttpError::InvalidRequest(format!("relative url {path:?} needs a base URL"))
    })?;
    Ok(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

/// Scheme matching is case-insensitive, like URL schemes themselves.
fn is_absolute_url(url: &str) -> bool {
    let scheme_end = match url.find("://") {
        Some(i) => i,
        None => return false,
    };
    let scheme = &url[..scheme_end];
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

/// Guarantee an `x-request-id` header, reusing a caller-supplied value
/// (matched case-insensitively) over generating a fresh one.
pub fn ensure_request_id(headers: &mut HashMap<String, String>) -> String {
    if let Some(existing) = header_value(headers, REQUEST_ID_HEADER) {
        return existing.to_owned();
    }
    let id = Uuid::new_v4().to_string();
    headers.insert(REQUEST_ID_HEADER.to_owned(), id.clone());
    id
}

/// A request may be re-sent only when its method is idempotent by
/// definition or the caller vouched for it with an idempotency key.
pub fn is_retry_eligible(method: &Method, headers: &HashMap<String, String>) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
        || header_value(headers, IDEMPOTENCY_KEY_HEADER).is_some()
}

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Map a non-success response to [`HttpError::Status`], pulling the
/// human message and provider code out of the body when present.
pub fn status_error(
    status: u16,
    headers: &HashMap<String, String>,
    body: serde_json::Value,
    sent_request_id: &str,
) -> HttpError {
    let message = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("request failed with status {status}"));
    let code = body
        .get("code")
        .and_then(|v| v.as_str())
        .map(str::to_owned);
    HttpError::Status {
        status,
        message,
        code,
        request_id: Some(response_request_id(headers, sent_request_id)),
        response: body,
    }
}

/// Prefer the server-echoed correlation id, falling back to the one we
/// sent so the caller can always grep for something.
pub fn response_request_id(headers: &HashMap<String, String>, sent_request_id: &str) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .cloned()
        .unwrap_or_else(|| sent_request_id.to_owned())
}

/// Turn a raw backend response into the normalized shape, mapping
/// non-success statuses to [`HttpError::Status`].
pub fn finalize(
    status: u16,
    headers: HashMap<String, String>,
    bytes: &[u8],
    sent_request_id: &str,
) -> Result<HttpResponse, HttpError> {
    let body = parse_body(bytes);
    if !(200..300).contains(&status) {
        return Err(status_error(status, &headers, body, sent_request_id));
    }
    let request_id = Some(response_request_id(&headers, sent_request_id));
    Ok(HttpResponse {
        data: body,
        status,
        headers,
        request_id,
    })
}

/// Parse a response body: empty becomes null, non-JSON text is kept as
/// a string value.
pub fn parse_body(bytes: &[u8]) -> serde_json::Value {
    if bytes.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_url_passes_through() {
        let url = build_url(Some("https://api.example.com"), "https://other.example.com/v1")
            .unwrap();
        assert_eq!(url, "https://other.example.com/v1");
    }

    #[test]
    fn absolute_url_scheme_is_matched_case_insensitively() {
        let url = build_url(Some("https://api.example.com"), "HTTPS://Other.example.com/v1")
            .unwrap();
        assert_eq!(url, "HTTPS://Other.example.com/v1");
        assert!(build_url(None, "ftp://other.example.com/v1").is_err());
    }

    #[test]
    fn request_base_url_overrides_client_base_url() {
        let options = HttpClientOptions {
            base_url: Some("https://api.example.com".to_owned()),
            ..HttpClientOptions::default()
        };
        let config = HttpRequestConfig::get("/v1/users").base_url("https://eu.example.com");
        let prepared = prepare(&options, config).unwrap();
        assert_eq!(prepared.url, "https://eu.example.com/v1/users");

        let prepared = prepare(&options, HttpRequestConfig::get("/v1/users")).unwrap();
        assert_eq!(prepared.url, "https://api.example.com/v1/users");
    }

    #[test]
    fn join_uses_exactly_one_slash() {
        for (base, path) in [
            ("https://api.example.com", "v1/users"),
            ("https://api.example.com/", "v1/users"),
            ("https://api.example.com", "/v1/users"),
            ("https://api.example.com/", "/v1/users"),
        ] {
            assert_eq!(
                build_url(Some(base), path).unwrap(),
                "https://api.example.com/v1/users"
            );
        }
    }

    #[test]
    fn relative_url_without_base_is_rejected() {
        assert!(matches!(
            build_url(None, "/v1/users"),
            Err(HttpError::InvalidRequest(_))
        ));
    }

    #[test]
    fn request_id_reuses_caller_value_case_insensitively() {
        let mut headers = HashMap::from([("X-Request-Id".to_owned(), "abc-123".to_owned())]);
        assert_eq!(ensure_request_id(&mut headers), "abc-123");
        // No duplicate lower-cased entry is added.
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn request_id_generated_when_absent() {
        let mut headers = HashMap::new();
        let id = ensure_request_id(&mut headers);
        assert_eq!(headers.get(REQUEST_ID_HEADER), Some(&id));
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn retry_eligibility_by_method_and_key() {
        let plain = HashMap::new();
        assert!(is_retry_eligible(&Method::GET, &plain));
        assert!(is_retry_eligible(&Method::HEAD, &plain));
        assert!(!is_retry_eligible(&Method::POST, &plain));
        assert!(!is_retry_eligible(&Method::DELETE, &plain));

        let keyed = HashMap::from([("Idempotency-Key".to_owned(), "k1".to_owned())]);
        assert!(is_retry_eligible(&Method::POST, &keyed));
    }

    #[test]
    fn status_error_extracts_message_and_code() {
        let body = serde_json::json!({"message": "quota exceeded", "code": "quota"});
        let error = status_error(429, &HashMap::new(), body, "sent-id");
        assert_eq!(error.status(), Some(429));
        assert_eq!(error.code(), Some("quota"));
        assert_eq!(error.request_id(), Some("sent-id"));
        assert_eq!(error.to_string(), "HTTP 429: quota exceeded");
    }

    #[test]
    fn body_parsing_degrades_gracefully() {
        assert_eq!(parse_body(b""), serde_json::Value::Null);
        assert_eq!(parse_body(b"{\"a\":1}"), serde_json::json!({"a": 1}));
        assert_eq!(
            parse_body(b"plain text"),
            serde_json::Value::String("plain text".into())
        );
    }
}
