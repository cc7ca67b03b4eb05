//! Validation of redirect target URLs.

use url::Url;

/// Errors that can occur while validating a target URL.
#[derive(Debug, thiserror::Error)]
pub enum TargetUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Checks that `input` is an absolute `http`/`https` URL and returns it
/// trimmed.
///
/// The URL is otherwise stored as given: targets are opaque to the service
/// and are sent back verbatim in the `Location` header. `Url::parse` silently
/// drops tabs and newlines, so control characters are rejected up front to
/// keep the stored value a valid header value.
///
/// # Errors
///
/// Returns [`TargetUrlError::InvalidFormat`] for malformed URLs or URLs
/// containing control characters,
/// [`TargetUrlError::UnsupportedProtocol`] for other schemes and
/// [`TargetUrlError::MissingHost`] when no host is present.
pub fn validate_target_url(input: &str) -> Result<String, TargetUrlError> {
    let trimmed = input.trim();
    if trimmed.chars().any(char::is_control) {
        return Err(TargetUrlError::InvalidFormat(
            "control characters are not allowed".to_string(),
        ));
    }

    let url = Url::parse(trimmed).map_err(|e| TargetUrlError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(TargetUrlError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(TargetUrlError::MissingHost);
    }

    Ok(trimmed.to_string())
}
