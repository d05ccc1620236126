use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Only the knobs with no safe default are required.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent key disables the vision strategy; the rest of the cascade
    /// still runs.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub pipeline_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub ocr_dpi: u32,
    pub ocr_max_pages: usize,
    pub ocr_lang: String,
    pub cache_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            pipeline_timeout_secs: parse_env("PIPELINE_TIMEOUT_SECS", 45u64)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
            ocr_dpi: parse_env("OCR_DPI", 300u32)?,
            ocr_max_pages: parse_env("OCR_MAX_PAGES", 10usize)?,
            ocr_lang: std::env::var("OCR_LANG").unwrap_or_else(|_| "eng".to_string()),
            cache_enabled: parse_env("CACHE_ENABLED", true)?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .ok()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
