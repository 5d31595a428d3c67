use cqrs_es::DomainEvent;
use serde::{Deserialize, Serialize};
use super::aggregate::{SignaturePayload, StrokePoint};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    StrokeBegun {
        point: StrokePoint,
    },

    SegmentPainted {
        from: StrokePoint,
        to: StrokePoint,
    },

    StrokeEnded,

    Cleared,

    /// Whether the pad may be submitted changed
    ReadinessChanged {
        can_submit: bool,
    },

    /// Outbound `sign` signal
    Signed {
        payload: SignaturePayload,
    },

    /// Outbound `close` signal
    Closed,
}

impl DomainEvent for Event {
    fn event_type(&self) -> String {
        match self {
            Event::StrokeBegun { .. } => "Signature:StrokeBegun".to_string(),
            Event::SegmentPainted { .. } => "Signature:SegmentPainted".to_string(),
            Event::StrokeEnded => "Signature:StrokeEnded".to_string(),
            Event::Cleared => "Signature:Cleared".to_string(),
            Event::ReadinessChanged { .. } => "Signature:ReadinessChanged".to_string(),
            Event::Signed { .. } => "Signature:Signed".to_string(),
            Event::Closed => "Signature:Closed".to_string(),
        }
    }

    fn event_version(&self) -> String {
        "1.0".to_string()
    }
}

impl Event {
    /// Signals the host page acts on, as opposed to drawing feedback
    pub fn is_outbound(&self) -> bool {
        matches!(self, Event::Signed { .. } | Event::Closed)
    }
}
