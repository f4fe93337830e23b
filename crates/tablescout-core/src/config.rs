use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any numeric env var fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if any numeric env var fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the real environment so it
/// can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.is_empty()) };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    Ok(AppConfig {
        data_dir: PathBuf::from(or_default("TABLESCOUT_DATA_DIR", "./data")),
        log_level: or_default("TABLESCOUT_LOG_LEVEL", "info"),

        search_area: or_default("TABLESCOUT_SEARCH_AREA", "Los Angeles, CA"),
        geocode: optional("TABLESCOUT_GEOCODE"),
        search_radius_km: parse_u32("TABLESCOUT_SEARCH_RADIUS_KM", "10")?,
        user_agent: or_default("TABLESCOUT_USER_AGENT", "tablescout/0.1 (lead-generation)"),
        request_timeout_secs: parse_u64("TABLESCOUT_REQUEST_TIMEOUT_SECS", "10")?,
        max_retries: parse_u32("TABLESCOUT_MAX_RETRIES", "3")?,
        retry_backoff_base_secs: parse_u64("TABLESCOUT_RETRY_BACKOFF_BASE_SECS", "1")?,

        max_reviews: parse_u32("TABLESCOUT_MAX_REVIEWS", "15")?,
        qualification_threshold: parse_u32("TABLESCOUT_QUALIFICATION_THRESHOLD", "40")?,
        probe_timeout_secs: parse_u64("TABLESCOUT_PROBE_TIMEOUT_SECS", "5")?,

        batch_size: parse_usize("TABLESCOUT_BATCH_SIZE", "5")?,
        batch_delay_ms: parse_u64("TABLESCOUT_BATCH_DELAY_MS", "3000")?,
        max_attempts: parse_usize("TABLESCOUT_MAX_ATTEMPTS", "3")?,
        from_email: or_default("FROM_EMAIL", "hello@tablescout.app"),
        from_name: or_default("FROM_NAME", "Tablescout"),

        google_places_api_key: optional("GOOGLE_PLACES_API_KEY"),
        yelp_api_key: optional("YELP_API_KEY"),
        outscraper_api_key: optional("OUTSCRAPER_API_KEY"),
        resend_api_key: optional("RESEND_API_KEY"),
        vapi_api_key: optional("VAPI_API_KEY"),
        vapi_phone_number_id: optional("VAPI_PHONE_NUMBER_ID"),
        facebook_access_token: optional("FACEBOOK_ACCESS_TOKEN"),
        facebook_page_id: optional("FACEBOOK_PAGE_ID"),
        instagram_access_token: optional("INSTAGRAM_ACCESS_TOKEN"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn defaults_with_empty_environment() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_reviews, 15);
        assert_eq!(cfg.qualification_threshold, 40);
        assert_eq!(cfg.search_radius_km, 10);
        assert_eq!(cfg.batch_size, 5);
        assert_eq!(cfg.batch_delay_ms, 3000);
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.probe_timeout_secs, 5);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.google_places_api_key.is_none());
        assert!(cfg.resend_api_key.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let mut map = HashMap::new();
        map.insert("TABLESCOUT_MAX_REVIEWS", "100");
        map.insert("TABLESCOUT_QUALIFICATION_THRESHOLD", "25");
        map.insert("TABLESCOUT_BATCH_SIZE", "10");
        map.insert("GOOGLE_PLACES_API_KEY", "gk");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_reviews, 100);
        assert_eq!(cfg.qualification_threshold, 25);
        assert_eq!(cfg.batch_size, 10);
        assert_eq!(cfg.google_places_api_key.as_deref(), Some("gk"));
    }

    #[test]
    fn invalid_numeric_value_is_rejected() {
        let mut map = HashMap::new();
        map.insert("TABLESCOUT_MAX_REVIEWS", "lots");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TABLESCOUT_MAX_REVIEWS"),
            "expected InvalidEnvVar(TABLESCOUT_MAX_REVIEWS), got: {result:?}"
        );
    }

    #[test]
    fn empty_credential_counts_as_absent() {
        let mut map = HashMap::new();
        map.insert("YELP_API_KEY", "");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.yelp_api_key.is_none());
    }

    #[test]
    fn debug_redacts_credentials() {
        let mut map = HashMap::new();
        map.insert("RESEND_API_KEY", "re_secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("re_secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
