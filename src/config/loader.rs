use std::collections::HashMap;

use figment::Figment;
use figment::providers::{Env, Format, Toml};

use crate::config::types::Settings;
use crate::error::SentinelError;

// Embedded defaults keep the binary self-contained.
static CONFIGURATION_TOML: &str = include_str!("../../settings/configuration.toml");

/// Prefix for `SECTION__KEY` style environment overrides.
const ENV_PREFIX: &str = "PR_SENTINEL_";

/// Build the full configuration by merging layers:
///
/// 1. Embedded TOML defaults (`settings/configuration.toml`)
/// 2. Secrets file from filesystem (`.secrets.toml`, optional)
/// 3. CLI argument overrides (`--section.key=value`)
/// 4. Well-known env vars (`GITHUB_TOKEN`, `WEBHOOK_SECRET`, `GEMINI_API_KEY`, `HOST`, `PORT`)
/// 5. Prefixed env vars (`PR_SENTINEL_CHECKS__INSTALL_TIMEOUT=600`)
pub fn load_settings(cli_overrides: &HashMap<String, String>) -> Result<Settings, SentinelError> {
    // Layer 1: embedded defaults
    let mut figment = Figment::new().merge(Toml::string(CONFIGURATION_TOML));

    // Layer 2: secrets file (optional, from filesystem)
    figment = figment.merge(Toml::file(".secrets.toml"));
    figment = figment.merge(Toml::file("settings/.secrets.toml"));

    // Layer 3: CLI argument overrides
    for (key, value) in cli_overrides {
        // Figment has no "set dotted key" method, so each override becomes a
        // TOML fragment: `[section]\nkey = value`
        if let Some(toml_fragment) = cli_override_to_toml(key, value) {
            figment = figment.merge(Toml::string(&toml_fragment));
        }
    }

    // Layer 4: well-known env var names used by the deployment scripts
    figment = figment.merge(
        Env::raw()
            .only(&[
                "GITHUB_TOKEN",
                "WEBHOOK_SECRET",
                "GEMINI_API_KEY",
                "HOST",
                "PORT",
            ])
            .map(|key| match key.as_str().to_ascii_uppercase().as_str() {
                "GITHUB_TOKEN" => "github.token".into(),
                "WEBHOOK_SECRET" => "github.webhook_secret".into(),
                "GEMINI_API_KEY" => "gemini.key".into(),
                "HOST" => "server.host".into(),
                "PORT" => "server.port".into(),
                _ => key.into(),
            }),
    );

    // Layer 5: PR_SENTINEL_SECTION__KEY
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let settings: Settings = figment.extract()?;
    Ok(settings)
}

/// Convert a CLI override like "checks.install_timeout=600" into a TOML fragment.
fn cli_override_to_toml(key: &str, value: &str) -> Option<String> {
    let (section, field) = match key.split_once('.') {
        Some(pair) => pair,
        None => {
            tracing::warn!("ignoring CLI override with no section: {key}={value}");
            return None;
        }
    };
    // Try to detect type: bool, int, float, or string
    let is_literal = value == "true"
        || value == "false"
        || value.parse::<i64>().is_ok()
        || value.parse::<f64>().is_ok();
    let toml_value = if is_literal {
        value.to_string()
    } else {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t");
        format!("\"{escaped}\"")
    };
    Some(format!("[{section}]\n{field} = {toml_value}"))
}
