//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::IndexerSettings;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    url: String,
    index: Option<String>,
    workers: usize,
    flush_bytes: usize,
    flush_interval_ms: u64,
    query: Vec<(String, String)>,
}

impl From<&IndexerSettings> for ConfigSummary {
    fn from(settings: &IndexerSettings) -> Self {
        Self {
            url: settings.http.url.clone(),
            index: settings.index.clone(),
            workers: settings.workers,
            flush_bytes: settings.flush_bytes,
            flush_interval_ms: settings.flush_interval_ms,
            query: settings
                .request
                .to_params()
                .query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(settings) => {
            let warnings = collect_warnings(&settings);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary::from(&settings)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(settings: &IndexerSettings) -> Vec<String> {
    let mut warnings = Vec::new();

    if settings.workers == 0 {
        warnings.push("workers = 0 - one worker per available CPU will be used".to_string());
    }
    if settings.flush_bytes == 0 {
        warnings.push("flush_bytes = 0 - the 5 MB default will be used".to_string());
    }
    if settings.flush_interval_ms == 0 {
        warnings.push(
            "flush_interval_ms = 0 - partial batches are only sent on size or shutdown"
                .to_string(),
        );
    }
    if settings.index.is_none() {
        warnings.push("No default index - every document must name its own".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  URL: {}", summary.url);
            println!("  Index: {}", summary.index.as_deref().unwrap_or("-"));
            println!("  Workers: {}", summary.workers);
            println!("  Flush bytes: {}", summary.flush_bytes);
            println!("  Flush interval (ms): {}", summary.flush_interval_ms);
            for (key, value) in &summary.query {
                println!("  ?{}={}", key, value);
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
