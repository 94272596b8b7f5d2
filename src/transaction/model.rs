use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An unconfirmed ledger entry: an arbitrary mapping of field names to
/// primitive values. No schema is enforced beyond "JSON object"; the pool
/// stamps every record with its submission time.
///
/// The backing map is BTreeMap-based, so keys serialize in sorted order and
/// two records with the same fields hash identically inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(pub Map<String, Value>);

impl Transaction {
    /// Wrap submitted fields and stamp them with the current Unix time.
    pub fn stamped(mut fields: Map<String, Value>) -> Self {
        fields.insert("timestamp".to_string(), Value::from(unix_now()));
        Self(fields)
    }
}

/// Current Unix time as float seconds, sub-second precision.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
