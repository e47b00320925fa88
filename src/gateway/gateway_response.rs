use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Result code the gateway uses for a successful call. Compared case-sensitively.
pub const SUCCESS_CODE: &str = "SUCCESSFUL";
/// Length of a gateway transaction id.
pub const TRANSACTION_ID_LEN: usize = 32;

/// The gateway's answer to Init, Result or Close.
///
/// Absent fields come back empty (`result_code`, `transaction_id`) or `None`.
/// Fields this crate does not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TransactionResult {
    #[serde(deserialize_with = "lenient_string")]
    pub result_code: String,
    #[serde(deserialize_with = "optional_string")]
    pub result_message: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub transaction_id: String,
    #[serde(deserialize_with = "optional_string")]
    pub anum: Option<String>,
    #[serde(deserialize_with = "optional_string")]
    pub order_id: Option<String>,
    #[serde(deserialize_with = "optional_string")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "optional_string")]
    pub provider_transaction_id: Option<String>,
    #[serde(deserialize_with = "optional_string")]
    pub auto_commit: Option<String>,
    #[serde(deserialize_with = "optional_string")]
    pub commit_state: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TransactionResult {
    pub fn is_successful(&self) -> bool {
        self.result_code == SUCCESS_CODE
    }

    /// Looks a field up by its wire name, e.g. `"CommitState"`.
    pub fn get(&self, name: &str) -> Option<&str> {
        let known = match name {
            "ResultCode" => Some(self.result_code.as_str()),
            "ResultMessage" => self.result_message.as_deref(),
            "TransactionId" => Some(self.transaction_id.as_str()),
            "Anum" => self.anum.as_deref(),
            "OrderId" => self.order_id.as_deref(),
            "UserId" => self.user_id.as_deref(),
            "ProviderTransactionId" => self.provider_transaction_id.as_deref(),
            "AutoCommit" => self.auto_commit.as_deref(),
            "CommitState" => self.commit_state.as_deref(),
            _ => return self.extra.get(name).and_then(Value::as_str),
        };
        known
    }
}

/// Outcome of a remote call that reached the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// `result.result_code == "SUCCESSFUL"`.
    pub success: bool,
    /// The gateway transaction id, only when it is a well-formed 32 character token.
    pub transaction_id: Option<String>,
    pub result: TransactionResult,
}

impl Reply {
    pub fn new(result: TransactionResult) -> Self {
        Self {
            success: result.is_successful(),
            transaction_id: normalize_transaction_id(&result.transaction_id),
            result,
        }
    }
}

/// Keeps a transaction id only when it has exactly 32 characters.
pub fn normalize_transaction_id(id: &str) -> Option<String> {
    (id.chars().count() == TRANSACTION_ID_LEN).then(|| id.to_string())
}

fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_string(deserializer)?.unwrap_or_default())
}
