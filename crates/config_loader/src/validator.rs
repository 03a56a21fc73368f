//! Settings validation
//!
//! Rules:
//! - http.url is an absolute http(s) URL
//! - index names are lowercase and free of reserved characters
//! - request.pipeline / request.routing are non-empty when given
//! - header names are non-empty
//!
//! Numeric limits (workers, flush_bytes) are normalized by the indexer, not
//! rejected here.

use contracts::{ContractError, IndexerSettings};

const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#', ':'];

/// Validate IndexerSettings
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(settings: &IndexerSettings) -> Result<(), ContractError> {
    validate_url(settings)?;
    validate_index(settings)?;
    validate_request(settings)?;
    validate_headers(settings)?;
    Ok(())
}

fn validate_url(settings: &IndexerSettings) -> Result<(), ContractError> {
    let url = settings.http.url.trim();
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| {
            ContractError::config_validation(
                "http.url",
                format!("url must start with http:// or https://, got '{url}'"),
            )
        })?;

    if rest.is_empty() || rest.starts_with('/') {
        return Err(ContractError::config_validation(
            "http.url",
            "url is missing a host",
        ));
    }
    Ok(())
}

/// Check a single index name
pub fn validate_index_name(field: &str, name: &str) -> Result<(), ContractError> {
    if name.is_empty() {
        return Err(ContractError::config_validation(
            field,
            "index name cannot be empty",
        ));
    }
    if name.chars().any(|c| c.is_uppercase()) {
        return Err(ContractError::config_validation(
            field,
            format!("index name '{name}' must be lowercase"),
        ));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_INDEX_CHARS.contains(c)) {
        return Err(ContractError::config_validation(
            field,
            format!("index name '{name}' contains forbidden character '{c}'"),
        ));
    }
    if name.starts_with(['-', '_', '+']) {
        return Err(ContractError::config_validation(
            field,
            format!("index name '{name}' cannot start with '-', '_' or '+'"),
        ));
    }
    Ok(())
}

fn validate_index(settings: &IndexerSettings) -> Result<(), ContractError> {
    match &settings.index {
        Some(index) => validate_index_name("index", index),
        None => Ok(()),
    }
}

fn validate_request(settings: &IndexerSettings) -> Result<(), ContractError> {
    let request = &settings.request;
    if request.pipeline.as_deref().is_some_and(str::is_empty) {
        return Err(ContractError::config_validation(
            "request.pipeline",
            "pipeline cannot be empty",
        ));
    }
    if request.routing.as_deref().is_some_and(str::is_empty) {
        return Err(ContractError::config_validation(
            "request.routing",
            "routing cannot be empty",
        ));
    }
    Ok(())
}

fn validate_headers(settings: &IndexerSettings) -> Result<(), ContractError> {
    for name in settings.http.headers.keys() {
        if name.trim().is_empty() {
            return Err(ContractError::config_validation(
                "http.headers",
                "header name cannot be empty",
            ));
        }
    }
    Ok(())
}
