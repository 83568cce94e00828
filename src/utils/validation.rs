use url::Url;
use validator::ValidationError;

/// Stored file links must be absolute http(s) URLs pointing at the blob store.
pub fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(ValidationError::new("invalid_http_url")),
    }
}
