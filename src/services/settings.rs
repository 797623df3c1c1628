use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Environment, Settings};
use crate::utils::parse_instant;

pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:5175";
pub const PRODUCTION_API_PREFIX: &str = "/cashflow-api";
pub const PRODUCTION_FALLBACK_BASE: &str = "http://185.151.29.141:3002";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: unknown environment '{value}' (expected development or production)")]
    UnknownEnvironment { key: &'static str, value: String },

    #[error("{key}: '{value}' is not a date or timestamp")]
    InvalidToday { key: &'static str, value: String },

    #[error("{key}: expected true or false, got '{value}'")]
    InvalidFlag { key: &'static str, value: String },
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            environment: Environment::Development,
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
            upload_bases: None,
            today: None,
            seed_demo_data: true,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from a key lookup so tests do not touch the process
    /// environment. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Settings::default();

        if let Some(value) = get("CASHDESK_ENV") {
            settings.environment = match value.to_ascii_lowercase().as_str() {
                "development" | "dev" => Environment::Development,
                "production" | "prod" => Environment::Production,
                _ => {
                    return Err(ConfigError::UnknownEnvironment {
                        key: "CASHDESK_ENV",
                        value,
                    })
                }
            };
        }

        if let Some(value) = get("CASHDESK_APP_ORIGIN") {
            settings.app_origin = value.trim_end_matches('/').to_string();
        }

        if let Some(value) = get("CASHDESK_UPLOAD_BASES") {
            let bases: Vec<String> = value
                .split(',')
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect();
            if !bases.is_empty() {
                settings.upload_bases = Some(bases);
            }
        }

        if let Some(value) = get("CASHDESK_TODAY") {
            settings.today = Some(parse_instant(&value).ok_or(ConfigError::InvalidToday {
                key: "CASHDESK_TODAY",
                value: value.clone(),
            })?);
        }

        if let Some(value) = get("CASHDESK_SEED_DEMO") {
            settings.seed_demo_data = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidFlag {
                        key: "CASHDESK_SEED_DEMO",
                        value,
                    })
                }
            };
        }

        Ok(settings)
    }

    /// Ordered upload bases: an explicit list wins, otherwise same-origin in
    /// development and the proxied API followed by the direct host in
    /// production.
    pub fn upload_bases(&self) -> Vec<String> {
        if let Some(bases) = &self.upload_bases {
            return bases.clone();
        }
        match self.environment {
            Environment::Development => vec![self.app_origin.clone()],
            Environment::Production => vec![
                format!("{}{}", self.app_origin, PRODUCTION_API_PREFIX),
                PRODUCTION_FALLBACK_BASE.to_string(),
            ],
        }
    }

    pub fn clock(&self) -> Clock {
        match self.today {
            Some(today) => Clock::Fixed(today),
            None => Clock::System,
        }
    }
}

/// Source of "now" for every date calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(now) => *now,
        }
    }
}
