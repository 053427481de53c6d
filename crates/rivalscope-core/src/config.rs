use crate::app_config::{AppConfig, ConfigError, Environment};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("RIVALSCOPE_ENV", "development"));

    let bind_addr = parse_addr("RIVALSCOPE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("RIVALSCOPE_LOG_LEVEL", "info");

    let provider_base_url = or_default(
        "RIVALSCOPE_PROVIDER_BASE_URL",
        "https://scan.rivalscope.internal/",
    );
    let provider_api_key = lookup("RIVALSCOPE_PROVIDER_API_KEY").ok();
    let provider_user_agent = or_default(
        "RIVALSCOPE_PROVIDER_USER_AGENT",
        "rivalscope/0.1 (competitor-intelligence)",
    );
    let provider_request_timeout_secs = parse_u64("RIVALSCOPE_PROVIDER_TIMEOUT_SECS", "30")?;
    let provider_max_retries = parse_u32("RIVALSCOPE_PROVIDER_MAX_RETRIES", "3")?;
    let provider_retry_backoff_base_ms =
        parse_u64("RIVALSCOPE_PROVIDER_RETRY_BACKOFF_BASE_MS", "1000")?;

    let fetch_timeout_secs = parse_u64("RIVALSCOPE_FETCH_TIMEOUT_SECS", "45")?;

    // Per-scan-type TTLs. Website content is long-lived; ad-library pulls
    // churn daily.
    let ttl_website_content_secs = parse_u64("RIVALSCOPE_TTL_WEBSITE_CONTENT_SECS", "604800")?;
    let ttl_reviews_secs = parse_u64("RIVALSCOPE_TTL_REVIEWS_SECS", "259200")?;
    let ttl_ad_library_secs = parse_u64("RIVALSCOPE_TTL_AD_LIBRARY_SECS", "86400")?;
    let ttl_research_secs = parse_u64("RIVALSCOPE_TTL_RESEARCH_SECS", "1209600")?;

    let sweep_max_concurrent = parse_usize("RIVALSCOPE_SWEEP_MAX_CONCURRENT", "4")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        provider_base_url,
        provider_api_key,
        provider_user_agent,
        provider_request_timeout_secs,
        provider_max_retries,
        provider_retry_backoff_base_ms,
        fetch_timeout_secs,
        ttl_website_content_secs,
        ttl_reviews_secs,
        ttl_ad_library_secs,
        ttl_research_secs,
        sweep_max_concurrent,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
