use std::time::Duration;

use colored::Colorize;
use meghai_api::{GeminiConfig, DEFAULT_BASE_URL};

use crate::cli::Cli;

/// Assemble the provider configuration once at startup. The session and
/// client never read the environment after this point; the key travels
/// as an explicit value.
pub fn build_client_config(cli: &Cli) -> GeminiConfig {
    let api_key = cli.api_key.clone().unwrap_or_default();
    if api_key.is_empty() {
        eprintln!(
            "{} GEMINI_API_KEY is not set - provider calls will fail with an authorization error",
            "⚠️".yellow()
        );
    }

    GeminiConfig {
        api_key,
        model: cli.model.clone(),
        base_url: cli
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        timeout: Duration::from_secs(cli.timeout_secs),
    }
}
