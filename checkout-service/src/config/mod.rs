use axum::http::HeaderValue;
use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

use crate::services::pricing::PricingRules;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub razorpay: RazorpayConfig,
    pub shiprocket: ShiprocketConfig,
    pub resend: ResendConfig,
    pub pricing: PricingRules,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RazorpayConfig {
    /// Public key id, also handed to the storefront for checkout.
    pub key_id: String,
    /// API secret. Signs `order_id|payment_id` on successful checkout.
    pub key_secret: Secret<String>,
    pub webhook_secret: Secret<String>,
    pub api_base_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ShiprocketConfig {
    pub email: String,
    pub password: Secret<String>,
    pub api_base_url: String,
    pub token_ttl_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ResendConfig {
    pub api_key: Secret<String>,
    pub api_base_url: String,
    pub from_email: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Allowed origins as header values. An origin that cannot be sent as a
    /// header is a configuration error.
    pub fn origin_values(&self) -> Result<Vec<HeaderValue>, AppError> {
        self.allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "Invalid CORS origin '{}': {}",
                        origin,
                        e
                    ))
                })
            })
            .collect()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let defaults = PricingRules::default();

        let cors = CorsConfig {
            allowed_origins: parse_origins(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default()),
        };
        cors.origin_values()?;

        Ok(Self {
            server: ServerConfig {
                host: get_env("CHECKOUT_SERVICE_HOST", Some("0.0.0.0"), false)?,
                port: common.port,
            },
            razorpay: RazorpayConfig {
                key_id: get_env("RAZORPAY_KEY_ID", Some(""), is_prod)?,
                key_secret: Secret::new(get_env("RAZORPAY_KEY_SECRET", Some(""), is_prod)?),
                webhook_secret: Secret::new(get_env(
                    "RAZORPAY_WEBHOOK_SECRET",
                    Some(""),
                    is_prod,
                )?),
                api_base_url: get_env(
                    "RAZORPAY_API_BASE_URL",
                    Some("https://api.razorpay.com/v1"),
                    false,
                )?,
            },
            shiprocket: ShiprocketConfig {
                email: get_env("SHIPROCKET_EMAIL", Some(""), false)?,
                password: Secret::new(get_env("SHIPROCKET_PASSWORD", Some(""), false)?),
                api_base_url: get_env(
                    "SHIPROCKET_API_BASE_URL",
                    Some("https://apiv2.shiprocket.in/v1/external"),
                    false,
                )?,
                token_ttl_secs: parse_env("SHIPROCKET_TOKEN_TTL_SECS", 9 * 24 * 60 * 60)?,
            },
            resend: ResendConfig {
                api_key: Secret::new(get_env("RESEND_API_KEY", Some(""), false)?),
                api_base_url: get_env("RESEND_API_BASE_URL", Some("https://api.resend.com"), false)?,
                from_email: get_env(
                    "NEWSLETTER_FROM_EMAIL",
                    Some("Storefront <newsletter@example.com>"),
                    false,
                )?,
            },
            pricing: PricingRules {
                max_item_price: parse_env("PRICING_MAX_ITEM_PRICE", defaults.max_item_price)?,
                max_item_quantity: parse_env(
                    "PRICING_MAX_ITEM_QUANTITY",
                    defaults.max_item_quantity,
                )?,
                max_cart_subtotal: parse_env(
                    "PRICING_MAX_CART_SUBTOTAL",
                    defaults.max_cart_subtotal,
                )?,
                ..defaults
            },
            cors,
            observability: ObservabilityConfig {
                log_level: common.log_level,
                otlp_endpoint: common.otlp_endpoint,
            },
            service_name: "checkout-service".to_string(),
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}

/// Comma-separated origins. A `*` anywhere in the list means any origin.
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.contains(&"*") {
        return Vec::new();
    }

    origins.into_iter().map(str::to_string).collect()
}
