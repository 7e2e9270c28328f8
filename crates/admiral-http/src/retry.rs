//! Retry driver shared by both backends.

use crate::{HttpError, HttpResponse};

/// Run `attempt` up to `1 + max_retries` times when the request is
/// retry-eligible, once otherwise. The last error is returned untouched
/// when the budget runs out.
pub async fn run_with_retry<F, Fut>(
    max_retries: u32,
    retry_eligible: bool,
    mut attempt: F,
) -> Result<HttpResponse, HttpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<HttpResponse, HttpError>>,
{
    let budget = if retry_eligible { max_retries } else { 0 };
    let mut last_error = None;

    for tries in 0..=budget {
        match attempt().await {
            Ok(response) => return Ok(response),
            Err(error) => {
                if tries < budget {
                    tracing::debug!(%error, attempt = tries + 1, "retrying request");
                }
                last_error = Some(error);
            }
        }
    }

    // The loop always runs at least once, so an error is present here.
    Err(last_error.unwrap_or(HttpError::Transport {
        message: "request was never attempted".into(),
        request_id: None,
    }))
}
