use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The envelope a state container is persisted in.
///
/// `version` is the schema version of `state`. A container that changes its
/// persisted shape bumps its version so stale records can be discarded
/// instead of misread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord<T> {
    /// The serialized state.
    pub state: T,

    /// Schema version of the state.
    #[serde(default)]
    pub version: u32,

    /// When the record was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl<T> PersistedRecord<T> {
    /// Creates a new record stamped with the current time.
    pub fn new(state: T, version: u32) -> Self {
        Self {
            state,
            version,
            saved_at: Some(Utc::now()),
        }
    }

    /// Consumes the record, returning the state.
    pub fn into_state(self) -> T {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestState {
        value: i32,
        name: String,
    }

    #[test]
    fn record_new_stamps_time() {
        let record = PersistedRecord::new(
            TestState {
                value: 42,
                name: "test".to_string(),
            },
            1,
        );

        assert_eq!(record.version, 1);
        assert!(record.saved_at.is_some());
        assert_eq!(record.into_state().value, 42);
    }

    #[test]
    fn record_without_version_or_timestamp_still_loads() {
        let raw = r#"{"state":{"value":7,"name":"legacy"}}"#;
        let record: PersistedRecord<TestState> = serde_json::from_str(raw).unwrap();

        assert_eq!(record.version, 0);
        assert!(record.saved_at.is_none());
        assert_eq!(record.state.name, "legacy");
    }
}
