//! # Register Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`tillbook --db ...`)
//! 2. Environment variables (`TILLBOOK_*`)
//! 3. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tillbook_core::Money;

/// Environment variable overriding the database file.
pub const ENV_DB_PATH: &str = "TILLBOOK_DB_PATH";
/// Environment variable overriding the store name.
pub const ENV_STORE_NAME: &str = "TILLBOOK_STORE_NAME";
/// Environment variable overriding the currency symbol.
pub const ENV_CURRENCY_SYMBOL: &str = "TILLBOOK_CURRENCY_SYMBOL";

/// Register configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Store name (shown in CLI summaries)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,
}

impl Default for RegisterConfig {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Database: platform data directory, see [`default_database_path`]
    /// - Store: "Tillbook"
    /// - Currency: R$
    fn default() -> Self {
        RegisterConfig {
            database_path: default_database_path(),
            store_name: "Tillbook".to_string(),
            currency_symbol: "R$".to_string(),
        }
    }
}

impl RegisterConfig {
    /// Creates a RegisterConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TILLBOOK_DB_PATH`: Override database file
    /// - `TILLBOOK_STORE_NAME`: Override store name
    /// - `TILLBOOK_CURRENCY_SYMBOL`: Override currency symbol
    pub fn from_env() -> Self {
        RegisterConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RegisterConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = RegisterConfig::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(store_name) = lookup(ENV_STORE_NAME) {
            config.store_name = store_name;
        }

        if let Some(symbol) = lookup(ENV_CURRENCY_SYMBOL) {
            config.currency_symbol = symbol;
        }

        config
    }

    /// Formats an amount as a currency string, two decimals.
    ///
    /// ## Example
    /// ```rust
    /// use tillbook_core::Money;
    /// use tillbook_register::config::RegisterConfig;
    ///
    /// let config = RegisterConfig {
    ///     currency_symbol: "R$".to_string(),
    ///     ..RegisterConfig::default()
    /// };
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "R$ 12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let rounded = amount.rounded();
        if rounded.is_negative() {
            format!("-{} {}", self.currency_symbol, -rounded)
        } else {
            format!("{} {}", self.currency_symbol, rounded)
        }
    }
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.tillbook.register/tillbook.db`
/// - **Windows**: `%APPDATA%\tillbook\register\data\tillbook.db`
/// - **Linux**: `~/.local/share/register/tillbook.db`
///
/// Falls back to `./tillbook.db` when no home directory is known.
pub fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "tillbook", "register")
        .map(|dirs| dirs.data_dir().join("tillbook.db"))
        .unwrap_or_else(|| PathBuf::from("tillbook.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> RegisterConfig {
        RegisterConfig::from_lookup(|_| None)
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.currency_symbol, "R$");
        assert_eq!(config.store_name, "Tillbook");
        assert!(config.database_path.ends_with("tillbook.db"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_DB_PATH, "/tmp/shop.db"),
            (ENV_STORE_NAME, "Corner Cafe"),
            (ENV_CURRENCY_SYMBOL, "€"),
        ]
        .into_iter()
        .collect();

        let config = RegisterConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.store_name, "Corner Cafe");
        assert_eq!(config.currency_symbol, "€");
    }

    #[test]
    fn test_blank_db_path_is_ignored() {
        let config = RegisterConfig::from_lookup(|key| {
            (key == ENV_DB_PATH).then(|| "  ".to_string())
        });
        assert_eq!(config.database_path, default_database_path());
    }

    #[test]
    fn test_format_currency_positive() {
        let config = config();
        assert_eq!(config.format_currency(Money::from_cents(1234)), "R$ 12.34");
        assert_eq!(config.format_currency(Money::from_cents(1)), "R$ 0.01");
        assert_eq!(config.format_currency(Money::zero()), "R$ 0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = config();
        assert_eq!(config.format_currency(Money::from_cents(-1234)), "-R$ 12.34");
    }

    #[test]
    fn test_format_currency_rounds() {
        let config = config();
        let amount = "10.005".parse::<Money>().unwrap();
        assert_eq!(config.format_currency(amount), "R$ 10.01");
    }
}
