//! Runtime configuration read from the environment (and `.env` via dotenvy)

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::domain::totals::DEFAULT_FREIGHT_AMOUNT;
use crate::domain::value_objects::Locale;
use crate::{InovalogError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    /// In-memory storage when unset.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub nats_url: Option<String>,
    /// Flat freight charge applied when a record carries no override.
    pub freight_amount: Decimal,
    pub default_locale: Locale,
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8083,
            database_url: None,
            database_max_connections: 10,
            nats_url: None,
            freight_amount: DEFAULT_FREIGHT_AMOUNT,
            default_locale: Locale::En,
            seed_demo_data: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Ok(Self {
            port: parse(get("PORT"), "PORT", defaults.port)?,
            database_url: get("DATABASE_URL"),
            database_max_connections: parse(get("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", defaults.database_max_connections)?,
            nats_url: get("NATS_URL"),
            freight_amount: match get("FREIGHT_AMOUNT") {
                Some(raw) => {
                    let amount = Decimal::from_str(&raw).map_err(|e| InovalogError::Config(format!("FREIGHT_AMOUNT: {}", e)))?;
                    if amount.is_sign_negative() && !amount.is_zero() {
                        return Err(InovalogError::Config("FREIGHT_AMOUNT must not be negative".into()));
                    }
                    amount
                }
                None => defaults.freight_amount,
            },
            default_locale: match get("DEFAULT_LOCALE") {
                Some(raw) => raw.parse().map_err(|e: InovalogError| InovalogError::Config(e.to_string()))?,
                None => defaults.default_locale,
            },
            seed_demo_data: parse(get("SEED_DEMO_DATA"), "SEED_DEMO_DATA", defaults.seed_demo_data)?,
        })
    }
}

fn parse<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e| InovalogError::Config(format!("{}: {}", key, e))),
        None => Ok(default),
    }
}
