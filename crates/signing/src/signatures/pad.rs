use std::collections::HashMap;

use ulid::Ulid;

use crate::errors::Error;

use super::{
    aggregate::{Capture, CaptureState, SignaturePayload, StrokePoint},
    inputs::{InputEvent, SignerForm, SurfaceRect},
    pointer::InputRouter,
    surface::{RasterSurface, DEFAULT_MAX_SURFACE_PX},
    view::{EventEnvelope, Query},
    Command, Event,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureOptions {
    pub max_surface_px: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            max_surface_px: DEFAULT_MAX_SURFACE_PX,
        }
    }
}

/// A mounted signature capture pad.
///
/// Executes [`Command`]s against the capture aggregate and dispatches the
/// resulting events to every subscribed [`Query`]. A pad whose surface could
/// not be mounted stays usable but inert.
pub struct SignaturePad {
    capture: Capture,
    router: InputRouter,
    queries: Vec<Box<dyn Query + Send + Sync>>,
    sequence: usize,
    can_submit: bool,
    mount_error: Option<Error>,
}

impl SignaturePad {
    pub fn mount(rect: SurfaceRect) -> Self {
        Self::mount_with(rect, CaptureOptions::default())
    }

    pub fn mount_with(rect: SurfaceRect, options: CaptureOptions) -> Self {
        let id = Ulid::new().to_string();

        let (surface, mount_error) =
            match RasterSurface::mount(rect.width, rect.height, options.max_surface_px) {
                Ok(surface) => (Some(surface), None),
                Err(err) => {
                    tracing::warn!("Signature pad {} is inert: {}", id, err);
                    (None, Some(err))
                }
            };

        Self {
            capture: Capture::new(id, surface),
            router: InputRouter::new(rect),
            queries: Vec::new(),
            sequence: 0,
            can_submit: false,
            mount_error,
        }
    }

    pub fn with_query(mut self, query: impl Query + Send + Sync + 'static) -> Self {
        self.subscribe(query);
        self
    }

    pub fn subscribe(&mut self, query: impl Query + Send + Sync + 'static) {
        self.queries.push(Box::new(query));
    }

    pub fn id(&self) -> &str {
        &self.capture.id
    }

    pub fn state(&self) -> &CaptureState {
        &self.capture.state
    }

    pub fn form(&self) -> &SignerForm {
        &self.capture.form
    }

    pub fn surface(&self) -> Option<&RasterSurface> {
        self.capture.surface()
    }

    pub fn stroke_count(&self) -> usize {
        self.capture.stroke_count
    }

    /// Why the surface is unavailable, if it is
    pub fn mount_error(&self) -> Option<&Error> {
        self.mount_error.as_ref()
    }

    pub fn is_inert(&self) -> bool {
        self.capture.is_inert()
    }

    pub fn begin_stroke(&mut self, point: StrokePoint) {
        self.run(Command::BeginStroke { point });
    }

    pub fn extend_stroke(&mut self, point: StrokePoint) {
        self.run(Command::ExtendStroke { point });
    }

    pub fn end_stroke(&mut self) {
        self.run(Command::EndStroke);
    }

    pub fn clear(&mut self) {
        self.run(Command::Clear);
    }

    pub fn can_submit(&self) -> bool {
        self.capture.can_submit()
    }

    /// Build the signing payload and emit the `sign` signal.
    ///
    /// Drawing state is left untouched; closing or resetting the pad is up
    /// to the caller.
    pub fn submit(&mut self) -> Result<SignaturePayload, Error> {
        let events = self.execute(Command::Submit)?;

        events
            .into_iter()
            .find_map(|event| match event {
                Event::Signed { payload } => Some(payload),
                _ => None,
            })
            .ok_or_else(|| Error::validation("Submit produced no signature"))
    }

    /// Emit the `close` signal
    pub fn cancel(&mut self) {
        self.run(Command::Cancel);
    }

    /// Feed one raw host event through input normalization.
    ///
    /// Returns `true` when the host must suppress the event's default
    /// gesture handling.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let routed = self.router.route(event);
        if let Some(command) = routed.command {
            self.run(command);
        }
        routed.prevent_default
    }

    /// Track the surface moving within the viewport (scrolling). Size is
    /// fixed at mount.
    pub fn relocate(&mut self, left: f32, top: f32) {
        self.router.relocate(left, top);
    }

    pub fn set_form(&mut self, form: SignerForm) {
        self.capture.form = form;
        self.commit(Vec::new());
    }

    pub fn set_signer_name(&mut self, signer_name: impl Into<String>) {
        self.capture.form.signer_name = signer_name.into();
        self.commit(Vec::new());
    }

    pub fn set_credentials(&mut self, credentials: Option<String>) {
        self.capture.form.credentials = credentials;
    }

    pub fn set_license_number(&mut self, license_number: Option<String>) {
        self.capture.form.license_number = license_number;
    }

    pub fn set_terms_accepted(&mut self, terms_accepted: bool) {
        self.capture.form.terms_accepted = terms_accepted;
        self.commit(Vec::new());
    }

    /// Handle a command, apply its events and notify observers.
    pub fn execute(&mut self, command: Command) -> Result<Vec<Event>, Error> {
        let events = self.capture.handle(command)?;

        for event in &events {
            self.log(event);
        }

        Ok(self.commit(events))
    }

    fn run(&mut self, command: Command) {
        if let Err(err) = self.execute(command) {
            tracing::error!("Signature pad {} rejected command: {}", self.capture.id, err);
        }
    }

    fn commit(&mut self, mut events: Vec<Event>) -> Vec<Event> {
        for event in events.clone() {
            self.capture.apply(event);
        }

        let can_submit = self.capture.can_submit();
        if can_submit != self.can_submit {
            self.can_submit = can_submit;
            events.push(Event::ReadinessChanged { can_submit });
        }

        if events.is_empty() {
            return events;
        }

        let mut metadata = HashMap::new();
        metadata.insert("command_id".to_string(), Ulid::new().to_string());

        let envelopes: Vec<EventEnvelope> = events
            .iter()
            .map(|event| {
                self.sequence += 1;
                EventEnvelope {
                    capture_id: self.capture.id.clone(),
                    sequence: self.sequence,
                    metadata: metadata.clone(),
                    payload: event.clone(),
                }
            })
            .collect();

        for query in &self.queries {
            query.dispatch(&self.capture.id, &envelopes);
        }

        events
    }

    fn log(&self, event: &Event) {
        let id = &self.capture.id;
        match event {
            Event::StrokeBegun { point } => {
                tracing::debug!("Stroke begun on {} at ({}, {})", id, point.x, point.y)
            }
            Event::StrokeEnded => tracing::debug!("Stroke ended on {}", id),
            Event::Cleared => tracing::debug!("Signature pad {} cleared", id),
            Event::Signed { payload } => {
                tracing::info!("Signature captured on {} for {}", id, payload.signer_name)
            }
            Event::Closed => tracing::info!("Signature pad {} closed", id),
            Event::SegmentPainted { .. } | Event::ReadinessChanged { .. } => {}
        }
    }
}
