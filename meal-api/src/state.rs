//! Application state for the API server

use meal_core::{Calendar, MealError, MealResult, TokenFormat, DEFAULT_TOKEN_PREFIX};
use meal_db::{
    AllocationService, AnalyticsService, AvailabilityService, MealDatabase, MealServices,
    RedemptionService, ServiceSettings,
};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

/// API server state
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<MealDatabase>,
    pub allocations: Arc<AllocationService>,
    pub availability: Arc<AvailabilityService>,
    pub redemption: Arc<RedemptionService>,
    pub analytics: Arc<AnalyticsService>,
    /// API version
    pub version: String,
}

impl AppState {
    /// Create new app state from database, initializing the schema
    pub async fn new(database: Arc<MealDatabase>, settings: ServiceSettings) -> MealResult<Self> {
        database.init_schema().await?;
        Ok(Self::from_services(MealServices::new(database, settings)))
    }

    pub fn from_services(services: MealServices) -> Self {
        Self {
            database: services.database,
            allocations: services.allocations,
            availability: services.availability,
            redemption: services.redemption,
            analytics: services.analytics,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    /// Prefix of scannable student tokens
    pub token_prefix: String,
    /// Offset of the school calendar day, minutes east of UTC
    pub utc_offset_minutes: i32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
            token_prefix: DEFAULT_TOKEN_PREFIX.to_string(),
            utc_offset_minutes: 0,
        }
    }
}

impl ApiConfig {
    /// Read `MEAL_API_HOST`, `MEAL_API_PORT`, `MEAL_ENABLE_CORS`,
    /// `MEAL_TOKEN_PREFIX` and `MEAL_UTC_OFFSET_MINUTES`. Unset variables keep
    /// their defaults; a value that does not parse is an error.
    pub fn from_env() -> MealResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MealResult<Self> {
        let defaults = Self::default();
        let config = Self {
            host: lookup("MEAL_API_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "MEAL_API_PORT")?.unwrap_or(defaults.port),
            enable_cors: parse_var(&lookup, "MEAL_ENABLE_CORS")?.unwrap_or(defaults.enable_cors),
            token_prefix: lookup("MEAL_TOKEN_PREFIX").unwrap_or(defaults.token_prefix),
            utc_offset_minutes: parse_var(&lookup, "MEAL_UTC_OFFSET_MINUTES")?
                .unwrap_or(defaults.utc_offset_minutes),
        };
        config.service_settings()?;
        Ok(config)
    }

    /// Service settings on the wall clock
    pub fn service_settings(&self) -> MealResult<ServiceSettings> {
        Ok(ServiceSettings {
            token_format: TokenFormat::new(self.token_prefix.clone())?,
            calendar: Calendar::from_offset_minutes(self.utc_offset_minutes)?,
            ..ServiceSettings::default()
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> MealResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| MealError::validation(format!("{}={:?}: {}", key, raw, e)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.token_prefix, "STUDENT");
        assert!(config.service_settings().is_ok());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let config = ApiConfig {
            utc_offset_minutes: 24 * 60,
            ..ApiConfig::default()
        };
        assert!(config.service_settings().is_err());

        let config = ApiConfig {
            token_prefix: "  ".into(),
            ..ApiConfig::default()
        };
        assert!(config.service_settings().is_err());
    }

    fn lookup_from<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_config_from_vars() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("MEAL_API_PORT", "8080"),
            ("MEAL_ENABLE_CORS", "false"),
            ("MEAL_UTC_OFFSET_MINUTES", "420"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(!config.enable_cors);
        assert_eq!(config.utc_offset_minutes, 420);
        assert_eq!(config.host, "0.0.0.0");

        let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_malformed_vars_are_errors() {
        for vars in [
            [("MEAL_API_PORT", "abc")],
            [("MEAL_UTC_OFFSET_MINUTES", "x")],
            [("MEAL_ENABLE_CORS", "maybe")],
            [("MEAL_UTC_OFFSET_MINUTES", "1500")],
        ] {
            let err = ApiConfig::from_lookup(lookup_from(&vars)).unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR", "{:?}", vars);
        }
    }

    #[tokio::test]
    async fn test_state_initializes_schema() {
        let database = Arc::new(MealDatabase::in_memory().unwrap());
        let state = AppState::new(database, ServiceSettings::default())
            .await
            .unwrap();
        assert!(state.database.health_check().await.unwrap());
    }
}
