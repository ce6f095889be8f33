//! # Tillbook Register
//!
//! The register controller: owns a session's state and is the one place
//! that decides when the store is written.
//!
//! ## Module Organization
//! ```text
//! tillbook_register/
//! ├── lib.rs          ◄─── You are here (exports, tracing setup)
//! ├── register.rs     ◄─── Register: catalog, cart, taxes, checkout, ledger
//! ├── state.rs        ◄─── AppState and loading it from the store
//! ├── config.rs       ◄─── RegisterConfig (env + defaults)
//! ├── error.rs        ◄─── ApiError returned to the UI
//! └── main.rs         ◄─── `tillbook` command-line front end
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Register Startup                                  │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info, tillbook=debug, can be overridden with RUST_LOG    │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • RegisterConfig::from_env(), then CLI flags                        │
//! │                                                                         │
//! │  3. Open Database ────────────────────────────────────────────────────► │
//! │     • SQLite with WAL mode                                              │
//! │     • Run pending migrations                                            │
//! │                                                                         │
//! │  4. Register::open ───────────────────────────────────────────────────► │
//! │     • Load inventory, cart, transactions, fixed taxes                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use tillbook_db::{Database, DbConfig};
//! use tillbook_register::Register;
//!
//! let db = Database::new(DbConfig::new("tillbook.db")).await?;
//! let mut register = Register::open(Arc::new(db.store())).await?;
//!
//! let coffee = register.add_product("Coffee", "10", "4.50").await?;
//! register.add_to_cart(&coffee.id).await?;
//! let sale = register.checkout().await?;
//! ```

pub mod config;
pub mod error;
pub mod register;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use config::RegisterConfig;
pub use error::{ApiError, ErrorCode};
pub use register::{ApiResult, Register};
pub use state::AppState;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tillbook_core=trace` - Show trace for one crate only
/// - Default: info, with debug for the tillbook crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tillbook=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
