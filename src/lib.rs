//! # payment_gateway
//!
//! `payment_gateway` is a small async client for the PaymentGateway
//! card payment service. It speaks the gateway's REST API so the
//! application backend does not have to.
//!
//! ## ✅ Features
//!
//! - 💳 `init` opens a transaction and yields its 32 character id
//! - 🔀 `start` builds the URL the customer is redirected to
//! - 🔎 `result` polls the state of the transaction
//! - 🔒 `close` captures or voids the held authorization
//! - 🧪 Configuration from maps, YAML files or `.env` / environment variables
//!
//! ## 🔧 Configuration
//!
//! Build a [`GatewayConfig`] once and share it between clients:
//!
//! ```rust
//! use payment_gateway::GatewayConfig;
//!
//! let config = GatewayConfig::builder()
//!     .configure_from_file("config/payment_gateway.yml")
//!     .configure([("store", "PhantomStore"), ("app_host", "https://shop.example/")])
//!     .build();
//! assert_eq!(config.store, "PhantomStore");
//! ```
//!
//! ### Recognized `.env` values
//!
//! - `PAYMENT_GATEWAY_PROVIDER`, `PAYMENT_GATEWAY_STORE`, `PAYMENT_GATEWAY_API_KEY`
//! - `PAYMENT_GATEWAY_CURRENCY`, `PAYMENT_GATEWAY_LANGUAGE`, `PAYMENT_GATEWAY_RESPONSE_MODE`
//! - `PAYMENT_GATEWAY_HOST`, `PAYMENT_GATEWAY_HEADER_HOST`, `PAYMENT_GATEWAY_PORT`, `PAYMENT_GATEWAY_USE_SSL`
//! - `PAYMENT_GATEWAY_AUTO_COMMIT_PROVIDERS=MPP2` (comma separated)
//! - `PAYMENT_GATEWAY_AUTO_COMMIT_NOT_IMPLEMENTED=OTPayMP` (comma separated)
//! - `PAYMENT_GATEWAY_APP_HOST`
//!
//! ## ⚠️ Errors
//!
//! A declined or otherwise failed payment is *not* an error: it is a
//! [`Reply`] with `success == false`. [`GatewayError`] means the gateway could
//! not be reached or answered something unusable.
//!
//! ## 📚 Modules
//!
//! - [`config`](crate::config): Settings and their sources
//! - [`gateway`](crate::gateway): Client, requests and responses
//! - [`logger`](crate::logger): Observers of request/response pairs
//! - [`utils`](crate::utils): Environment loader
//!
//! ## 📄 License
//!
//! MIT License © [Holger Trahe](https://github.com/holg)

pub mod config;
pub mod error;
pub mod gateway;
pub mod logger;
pub mod utils;

pub use config::{ConfigKey, ConfigValue, GatewayConfig, GatewayConfigBuilder};
pub use error::{ConfigError, GatewayError, GatewayResult};
pub use gateway::{GatewayClient, Operation, Reply, Transaction, TransactionResult, SUCCESS_CODE};
pub use logger::{ConsoleLogger, Exchange, NoopLogger, TracingLogger, TransactionLogger};
