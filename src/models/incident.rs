use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Snapshot of an incident as handed over by the incident store.
///
/// Timestamps are naive UTC wall-clock values, matching how the store
/// persists them.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IncidentRecord {
    /// Detailed description
    #[serde(default)]
    pub description: Option<String>,

    /// Customer or system impact summary
    #[serde(default)]
    pub impact: Option<String>,

    /// Affected components/services
    #[serde(default)]
    pub components: Vec<String>,

    /// Severity label, e.g. `sev1`
    #[serde(default)]
    pub severity: Option<String>,

    /// Slack channel the incident is worked in
    pub channel_id: String,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,

    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// A person holding a role during the incident
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentParticipant {
    /// Role key such as `incident_commander`
    pub role: String,

    /// Display name of the user
    pub user_name: String,
}

impl IncidentParticipant {
    pub fn new(role: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            user_name: user_name.into(),
        }
    }
}

/// One entry of the incident timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentEvent {
    /// When the event happened
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,

    /// Free-text description
    pub text: String,
}

impl IncidentEvent {
    pub fn new(created_at: Option<NaiveDateTime>, text: impl Into<String>) -> Self {
        Self {
            created_at,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_with_missing_fields() {
        let record: IncidentRecord = serde_json::from_value(serde_json::json!({
            "channel_id": "C0123",
            "severity": "sev2",
            "created_at": "2024-01-01T00:00:00"
        }))
        .unwrap();

        assert_eq!(record.channel_id, "C0123");
        assert_eq!(record.severity.as_deref(), Some("sev2"));
        assert!(record.description.is_none());
        assert!(record.components.is_empty());
        assert!(record.created_at.is_some());
        assert!(record.updated_at.is_none());
    }
}
