use std::{env, path::PathBuf, str::FromStr, time::Duration};

use rust_decimal::Decimal;

use crate::pricing::PricingPolicy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub http_timeout: Duration,
    pub notice_ttl: Duration,
    pub pricing: PricingPolicy,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = env::var("STOREFRONT_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
        let session_file = env::var("STOREFRONT_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".storefront-session.json"));
        let http_timeout = Duration::from_secs(parse_or("STOREFRONT_HTTP_TIMEOUT_SECS", 30)?);
        let notice_ttl = Duration::from_millis(parse_or("STOREFRONT_NOTICE_TTL_MS", 3000)?);

        let defaults = PricingPolicy::default();
        let pricing = PricingPolicy {
            free_delivery_threshold: parse_or(
                "STOREFRONT_FREE_DELIVERY_THRESHOLD",
                defaults.free_delivery_threshold,
            )?,
            delivery_fee: parse_or::<Decimal>("STOREFRONT_DELIVERY_FEE", defaults.delivery_fee)?,
            protect_fee: parse_or::<Decimal>("STOREFRONT_PROTECT_FEE", defaults.protect_fee)?,
        };

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or::<u16>("APP_PORT", 3000)?;
        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "storefront-dev-secret".to_string());

        Ok(Self {
            api_base_url,
            session_file,
            http_timeout,
            notice_ttl,
            pricing,
            host,
            port,
            jwt_secret,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000".to_string(),
            session_file: PathBuf::from(".storefront-session.json"),
            http_timeout: Duration::from_secs(30),
            notice_ttl: Duration::from_millis(3000),
            pricing: PricingPolicy::default(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: "storefront-dev-secret".to_string(),
        }
    }
}

// Unset variables fall back to the default; set but malformed ones are an error.
fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, env::var(key).ok(), default)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
        None => Ok(default),
    }
}
