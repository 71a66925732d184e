//! DTOs for the operational outbox endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::domain::foundation::Timestamp;
use crate::ports::OutboxRow;

/// Query string of GET /api/outbox/unsent.
#[derive(Debug, Deserialize)]
pub struct UnsentQuery {
    #[serde(default = "default_max")]
    pub max: u32,
}

fn default_max() -> u32 {
    100
}

/// Public view of an outbox row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxRowResponse {
    pub id: Uuid,
    pub event_type: String,
    pub aggregate_id: String,
    pub payload: JsonValue,
    pub retry_count: u32,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<Timestamp>,
}

impl From<&OutboxRow> for OutboxRowResponse {
    fn from(row: &OutboxRow) -> Self {
        Self {
            id: row.id,
            event_type: row.event_type.clone(),
            aggregate_id: row.aggregate_id.clone(),
            payload: row.payload.clone(),
            retry_count: row.retry_count,
            created_at: row.created_at,
            sent_at: row.sent_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unsent_query_defaults_max() {
        let query: UnsentQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.max, 100);
    }

    #[test]
    fn row_response_serializes_camel_case() {
        let row = OutboxRow::new("users.created", "agg-1", json!({"k": 1}));
        let json = serde_json::to_value(OutboxRowResponse::from(&row)).unwrap();

        assert_eq!(json["eventType"], "users.created");
        assert_eq!(json["aggregateId"], "agg-1");
        assert_eq!(json["retryCount"], 0);
        assert!(json.get("sentAt").is_none());
    }
}
