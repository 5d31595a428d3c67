use cqrs_es::DomainEvent as _;
use derive_new::new;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::{errors::Error, signatures::EventEnvelope};

pub const AGGREGATE_TYPE: &str = "Signature";

/// Serializable wrapper for signals forwarded to the host
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct DomainEvent {
    #[new(value = "Ulid::new().to_string()")]
    pub id: String,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub sequence: usize,
    pub event_type: String,
    pub event_version: String,
    /// JSON
    pub payload: String,
    /// JSON
    pub metadata: String,
}

impl TryFrom<&EventEnvelope> for DomainEvent {
    type Error = Error;

    fn try_from(envelope: &EventEnvelope) -> Result<Self, Self::Error> {
        let payload = serde_json::to_string(&envelope.payload).map_err(|e| Error::Encoding {
            message: format!("Invalid event payload: {}", e),
        })?;
        let metadata = serde_json::to_string(&envelope.metadata).map_err(|e| Error::Encoding {
            message: format!("Invalid event metadata: {}", e),
        })?;

        Ok(DomainEvent::new(
            envelope.capture_id.clone(),
            AGGREGATE_TYPE.to_string(),
            envelope.sequence,
            envelope.payload.event_type(),
            envelope.payload.event_version(),
            payload,
            metadata,
        ))
    }
}
