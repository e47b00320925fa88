//! # Gateway Module
//!
//! Transaction lifecycle against the PaymentGateway REST API:
//! Init, Start redirect, Result and Close.
pub mod gateway_client;
pub mod gateway_request;
pub mod gateway_response;

pub use gateway_client::GatewayClient;
pub use gateway_request::{GatewayRequest, Operation, Transaction};
pub use gateway_response::{Reply, TransactionResult, SUCCESS_CODE};
