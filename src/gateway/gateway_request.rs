use std::fmt;

use serde::ser::{Serialize, Serializer};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};

/// Path of the REST endpoint, relative to the gateway host.
pub const REST_API: &str = "/api/rest";

/// The three remote calls of the transaction lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Init,
    Result,
    Close,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Init => "Init",
            Operation::Result => "Result",
            Operation::Close => "Close",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One payment attempt, populated by the caller and discarded after `close`.
///
/// `currency`, `language` and `provider` fall back to the configuration when
/// left unset. `transaction_id` is filled in by a successful
/// [`init`](crate::gateway::GatewayClient::init).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub provider: Option<String>,
    /// Relative to the configured `app_host`.
    pub response_path: String,
    pub amount: String,
    pub currency: Option<String>,
    pub order_id: String,
    pub user_id: String,
    pub language: Option<String>,
    pub transaction_id: Option<String>,
    /// Capture (`true`, the default) or void the held authorization on close.
    pub approved: Option<bool>,
}

impl Transaction {
    pub fn new(response_path: impl Into<String>, amount: impl fmt::Display) -> Self {
        Self {
            response_path: response_path.into(),
            amount: amount.to_string(),
            ..Self::default()
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = order_id.into();
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_approved(mut self, approved: bool) -> Self {
        self.approved = Some(approved);
        self
    }

    /// The provider this transaction runs against.
    pub fn active_provider<'a>(&'a self, config: &'a GatewayConfig) -> &'a str {
        self.provider.as_deref().unwrap_or(&config.provider)
    }
}

/// `AutoCommit` policy for a provider: `None` when the provider does not
/// implement the flag, otherwise whether it commits automatically.
pub fn auto_commit_flag(config: &GatewayConfig, provider: &str) -> Option<bool> {
    if config.auto_commit_not_implemented.iter().any(|p| p == provider) {
        return None;
    }
    Some(config.auto_commit_providers.iter().any(|p| p == provider))
}

/// Fully qualified, percent-encoded URL the gateway sends the user back to.
pub fn response_url(app_host: &str, response_path: &str) -> String {
    urlencoding::encode(&format!("{app_host}{response_path}")).into_owned()
}

/// `Basic` credential computed from the store name and api key.
pub fn authorization_header(store: &str, api_key: &str) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    format!("Basic {}", STANDARD.encode(format!("{store}:{api_key}")))
}

/// Operation name plus its ordered field map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    operation: Operation,
    fields: Vec<(&'static str, String)>,
}

impl GatewayRequest {
    pub fn init(config: &GatewayConfig, transaction: &Transaction) -> Self {
        let provider = transaction.active_provider(config);
        let mut fields = vec![
            ("ProviderName", provider.to_string()),
            ("StoreName", config.store.clone()),
            (
                "ResponseUrl",
                response_url(&config.app_host, &transaction.response_path),
            ),
            ("Amount", transaction.amount.clone()),
            ("OrderId", transaction.order_id.clone()),
            ("UserId", transaction.user_id.clone()),
            (
                "Currency",
                transaction
                    .currency
                    .clone()
                    .unwrap_or_else(|| config.currency.clone()),
            ),
            (
                "Language",
                transaction
                    .language
                    .clone()
                    .unwrap_or_else(|| config.language.clone()),
            ),
        ];
        if !config.response_mode.is_empty() {
            fields.push(("ResponseMode", config.response_mode.clone()));
        }
        if let Some(auto_commit) = auto_commit_flag(config, provider) {
            fields.push(("AutoCommit", auto_commit.to_string()));
        }
        Self {
            operation: Operation::Init,
            fields,
        }
    }

    pub fn result(transaction_id: &str) -> Self {
        Self {
            operation: Operation::Result,
            fields: vec![("TransactionId", transaction_id.to_string())],
        }
    }

    pub fn close(transaction_id: &str, approved: bool) -> Self {
        Self {
            operation: Operation::Close,
            fields: vec![
                ("TransactionId", transaction_id.to_string()),
                ("Approved", approved.to_string()),
            ],
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// The `json` form parameter.
    pub fn to_json(&self) -> GatewayResult<String> {
        serde_json::to_string(self).map_err(GatewayError::Encode)
    }

    /// Form body of the REST call: `method` and `json`.
    pub fn form(&self) -> GatewayResult<[(&'static str, String); 2]> {
        Ok([
            ("method", self.operation.as_str().to_string()),
            ("json", self.to_json()?),
        ])
    }
}

impl Serialize for GatewayRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(key, value)| (key, value)))
    }
}
