//! Build-time configuration.

use std::str::FromStr;

use log::{Level, warn};

const DEFAULT_API_URL: &str = "https://neuron-backed.onrender.com";
const DEFAULT_LOG_LEVEL: Level = Level::Debug;

/// Settings baked in when the WASM bundle is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
	/// Base URL of the design storage backend, without a trailing slash.
	pub api_base_url: String,
	/// Maximum level forwarded to the browser console.
	pub log_level: Level,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self::from_values(None, None)
	}
}

impl AppConfig {
	/// Read `STATION_API_URL` and `STATION_LOG_LEVEL` as seen by the compiler.
	pub fn from_env() -> Self {
		Self::from_values(option_env!("STATION_API_URL"), option_env!("STATION_LOG_LEVEL"))
	}

	/// Resolve raw values, substituting defaults for anything blank or invalid.
	pub fn from_values(api_url: Option<&str>, log_level: Option<&str>) -> Self {
		let api_base_url = api_url
			.map(|url| url.trim().trim_end_matches('/'))
			.filter(|url| !url.is_empty())
			.unwrap_or(DEFAULT_API_URL)
			.to_string();

		let log_level = match log_level.map(str::trim).filter(|l| !l.is_empty()) {
			None => DEFAULT_LOG_LEVEL,
			Some(raw) => Level::from_str(raw).unwrap_or_else(|_| {
				warn!("unknown log level {raw:?}, using {DEFAULT_LOG_LEVEL}");
				DEFAULT_LOG_LEVEL
			}),
		};

		Self {
			api_base_url,
			log_level,
		}
	}
}
