//! Settings parsing
//!
//! TOML is the primary format, JSON is accepted as well.

use contracts::{ContractError, IndexerSettings};

/// Settings file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<IndexerSettings, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<IndexerSettings, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<IndexerSettings, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Refresh, DEFAULT_FLUSH_BYTES};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[http]
url = "http://localhost:9200"
"#;
        let settings = parse_toml(content).unwrap();
        assert_eq!(settings.workers, 0);
        assert_eq!(settings.flush_bytes, DEFAULT_FLUSH_BYTES);
        assert_eq!(settings.flush_interval(), None);
        assert_eq!(settings.http.request_timeout_ms, 30_000);
        assert!(settings.index.is_none());
    }

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
workers = 4
flush_bytes = 1048576
flush_interval_ms = 500
index = "books"

[request]
pipeline = "enrich"
refresh = "wait_for"
timeout_ms = 1500

[http]
url = "https://search.internal:9200"
request_timeout_ms = 10000
[http.headers]
x-tenant = "acme"
"#;
        let settings = parse_toml(content).unwrap();
        assert_eq!(settings.workers, 4);
        assert_eq!(settings.flush_bytes, 1_048_576);
        assert_eq!(settings.flush_interval_ms, 500);
        assert_eq!(settings.index.as_deref(), Some("books"));
        assert_eq!(settings.request.refresh, Some(Refresh::WaitFor));
        assert_eq!(settings.http.headers.get("x-tenant").map(String::as_str), Some("acme"));

        let params = settings.request.to_params();
        assert_eq!(params.pipeline.as_deref(), Some("enrich"));
        assert_eq!(params.timeout.map(|t| t.as_millis()), Some(1500));
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "workers": 2,
            "index": "logs",
            "http": { "url": "http://127.0.0.1:9200" }
        }"#;
        let settings = parse_json(content).unwrap();
        assert_eq!(settings.workers, 2);
        assert_eq!(settings.index.as_deref(), Some("logs"));
    }

    #[test]
    fn test_parse_toml_missing_http() {
        let err = parse_toml("workers = 1").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse_toml("invalid toml [[[").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
