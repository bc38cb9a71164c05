use crate::error::ConfigError;
use rust_decimal::Decimal;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, DecisionParams, PortfolioSettings, TrackerSettings};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed `Config`
/// struct, and validates the handful of parameters that must be sane before
/// anything downstream runs.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.portfolio.initial_cash <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "portfolio.initial_cash must be positive".to_string(),
        ));
    }
    if config.tracker.symbols.is_empty() {
        return Err(ConfigError::ValidationError(
            "tracker.symbols must name at least one symbol".to_string(),
        ));
    }
    if config.decision.stake_pct <= Decimal::ZERO || config.decision.stake_pct > Decimal::ONE {
        return Err(ConfigError::ValidationError(
            "decision.stake_pct must be in (0, 1]".to_string(),
        ));
    }
    if config.decision.default_leverage <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "decision.default_leverage must be positive".to_string(),
        ));
    }
    Ok(())
}
