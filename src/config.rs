use std::path::PathBuf;

use crate::models::enums::ProviderKind;

/// Application-level constants
pub const APP_NAME: &str = "Outbound Engine";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Product the generated outreach is written for.
pub const DEFAULT_PRODUCT_NAME: &str = "Cursor";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Per-request HTTP timeout for generation backends.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Get the application data directory
/// ~/OutboundEngine/ on all platforms, falling back to the working directory
/// when no home directory can be resolved.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("OutboundEngine")
}

/// Default directory for CSV exports.
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Default directory for drafted sequences.
pub fn drafts_dir() -> PathBuf {
    app_data_dir().join("drafts")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "outbound_engine=info,outbound=info,warn"
}

// ═══════════════════════════════════════════════════════════
// Generator backends
// ═══════════════════════════════════════════════════════════

/// Credentials and endpoint for one generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// Everything the generator gateway needs, resolved from the environment.
///
/// Backends are listed in attempt order: the preferred provider first, the
/// other configured provider after it. A provider without an API key is left
/// out entirely, so an empty list means no generation is possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub backends: Vec<BackendConfig>,
    pub timeout_secs: u64,
    pub product_name: String,
}

impl GatewayConfig {
    /// Resolve from process environment, loading `.env` first when present.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded environment file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let preferred = get("OUTBOUND_PROVIDER")
            .and_then(|p| p.to_lowercase().parse::<ProviderKind>().ok())
            .unwrap_or(ProviderKind::OpenAi);

        let openai = get("OPENAI_API_KEY").map(|api_key| BackendConfig {
            provider: ProviderKind::OpenAi,
            api_key,
            model: get("OUTBOUND_OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
            base_url: get("OUTBOUND_OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
        });
        let gemini = get("GEMINI_API_KEY").map(|api_key| BackendConfig {
            provider: ProviderKind::Gemini,
            api_key,
            model: get("OUTBOUND_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            base_url: get("OUTBOUND_GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into()),
        });

        let mut backends: Vec<BackendConfig> = [openai, gemini].into_iter().flatten().collect();
        backends.sort_by_key(|b| b.provider != preferred);

        let timeout_secs = get("OUTBOUND_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            backends,
            timeout_secs,
            product_name: get("OUTBOUND_PRODUCT_NAME")
                .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.into()),
        }
    }

    /// Configuration with no backends: every generation degrades to canned content.
    pub fn demo() -> Self {
        Self {
            backends: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            product_name: DEFAULT_PRODUCT_NAME.into(),
        }
    }
}
