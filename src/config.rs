use std::net::IpAddr;

use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid value {value:?} for {key}")]
	Invalid { key: &'static str, value: String },
}

/// Runtime configuration, read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub database_max_connections: u32,
	pub host: IpAddr,
	pub port: u16,
	pub log_level: Level,
	/// Whether to export traces and metrics over OTLP.
	pub otel: bool,
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Builds the configuration from a key lookup, falling back to defaults for missing keys.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		fn parse<T: std::str::FromStr>(
			lookup: &impl Fn(&str) -> Option<String>,
			key: &'static str,
			default: T,
		) -> Result<T, Error> {
			match lookup(key) {
				Some(value) => value.parse().map_err(|_| Error::Invalid { key, value }),
				None => Ok(default),
			}
		}

		Ok(Self {
			database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://board.db".into()),
			database_max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
			host: parse(&lookup, "HOST", IpAddr::from([127, 0, 0, 1]))?,
			port: parse(&lookup, "PORT", 3000)?,
			log_level: parse(&lookup, "LOG_LEVEL", Level::INFO)?,
			otel: parse(&lookup, "OTEL_ENABLED", false)?,
		})
	}
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;

	use super::*;

	fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
		let vars = vars
			.iter()
			.map(|(k, v)| ((*k).to_string(), (*v).to_string()))
			.collect::<HashMap<_, _>>();

		Config::from_lookup(|key| vars.get(key).cloned())
	}

	#[test]
	fn test_defaults() {
		let config = config(&[]).unwrap();

		assert_eq!(config.database_url, "sqlite://board.db");
		assert_eq!(config.port, 3000);
		assert_eq!(config.log_level, Level::INFO);
		assert!(!config.otel);
	}

	#[test]
	fn test_overrides() {
		let config = config(&[
			("PORT", "8080"),
			("LOG_LEVEL", "debug"),
			("OTEL_ENABLED", "true"),
			("HOST", "0.0.0.0"),
		])
		.unwrap();

		assert_eq!(config.port, 8080);
		assert_eq!(config.log_level, Level::DEBUG);
		assert!(config.otel);
		assert!(config.host.is_unspecified());
	}

	#[test]
	fn test_invalid_port() {
		let error = config(&[("PORT", "eighty")]).unwrap_err();

		assert!(matches!(error, Error::Invalid { key: "PORT", .. }));
	}
}
