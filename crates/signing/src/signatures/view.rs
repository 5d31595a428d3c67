use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;

use super::{Event, SignaturePayload};

/// An event as delivered to observers
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EventEnvelope {
    pub capture_id: String,
    pub sequence: usize,
    pub metadata: HashMap<String, String>,
    pub payload: Event,
}

/// Observer of executed capture commands
pub trait Query {
    fn dispatch(&self, capture_id: &str, events: &[EventEnvelope]);
}

/// Read model for hosts that poll instead of reacting to each event
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct View {
    pub id: String,
    pub command_id: String,
    pub is_drawing: bool,
    pub has_signature: bool,
    pub can_submit: bool,
    pub stroke_count: usize,
    pub segment_count: usize,
    pub signed: Option<SignaturePayload>,
    pub closed: bool,
}

impl View {
    pub fn update(&mut self, event: &EventEnvelope) {
        self.id.clone_from(&event.capture_id);
        self.command_id = event
            .metadata
            .get("command_id")
            .cloned()
            .unwrap_or_default();

        match &event.payload {
            Event::StrokeBegun { .. } => self.is_drawing = true,
            Event::SegmentPainted { .. } => {
                self.has_signature = true;
                self.segment_count += 1;
            }
            Event::StrokeEnded => {
                self.is_drawing = false;
                self.stroke_count += 1;
            }
            Event::Cleared => {
                self.is_drawing = false;
                self.has_signature = false;
            }
            Event::ReadinessChanged { can_submit } => self.can_submit = *can_submit,
            Event::Signed { payload } => self.signed = Some(payload.clone()),
            Event::Closed => self.closed = true,
        }
    }
}

/// [`View`] kept current by subscribing to a pad
#[derive(Clone, Debug, Default)]
pub struct SharedView {
    view: Arc<Mutex<View>>,
}

impl SharedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> View {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Query for SharedView {
    fn dispatch(&self, _capture_id: &str, events: &[EventEnvelope]) {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        for event in events {
            view.update(event);
        }
    }
}

/// Forwards every event to a closure
pub struct Callback<F>(pub F);

impl<F> Query for Callback<F>
where
    F: Fn(&EventEnvelope),
{
    fn dispatch(&self, _capture_id: &str, events: &[EventEnvelope]) {
        for event in events {
            (self.0)(event);
        }
    }
}

/// Collects outbound `sign`/`close` signals for forwarding
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    signals: Arc<Mutex<Vec<DomainEvent>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<DomainEvent> {
        std::mem::take(&mut *self.signals.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Query for Outbox {
    fn dispatch(&self, capture_id: &str, events: &[EventEnvelope]) {
        let mut signals = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        for event in events.iter().filter(|e| e.payload.is_outbound()) {
            match DomainEvent::try_from(event) {
                Ok(signal) => signals.push(signal),
                Err(err) => tracing::error!("Dropping signal from {}: {}", capture_id, err),
            }
        }
    }
}
