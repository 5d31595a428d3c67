use chrono::{DateTime, SubsecRound, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

use super::{inputs::SignerForm, surface::RasterSurface, Command, Event};

/// A single input sample in surface-local pixels
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, new)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

/// Transient drawing state
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CaptureState {
    pub is_drawing: bool,
    pub last_point: StrokePoint,
    pub has_signature: bool,
}

/// Signed approval handed to the workflow once the prescriber confirms
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePayload {
    pub signer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// PNG data URI
    pub signature: String,
}

/// Signature capture aggregate: drawing state plus the surface it paints on.
///
/// `surface` is `None` when the host could not provide one; the capture is
/// then inert and ignores drawing commands.
#[derive(Clone, Debug)]
pub struct Capture {
    pub id: String,
    pub state: CaptureState,
    pub form: SignerForm,
    pub stroke_count: usize,
    pub segment_count: usize,
    surface: Option<RasterSurface>,
    last_signed_at: Option<DateTime<Utc>>,
}

impl Capture {
    pub fn new(id: String, surface: Option<RasterSurface>) -> Self {
        Self {
            id,
            state: CaptureState::default(),
            form: SignerForm::default(),
            stroke_count: 0,
            segment_count: 0,
            surface,
            last_signed_at: None,
        }
    }

    pub fn surface(&self) -> Option<&RasterSurface> {
        self.surface.as_ref()
    }

    pub fn is_inert(&self) -> bool {
        self.surface.is_none()
    }

    pub fn can_submit(&self) -> bool {
        self.form.has_signer_name() && self.form.terms_accepted && self.state.has_signature
    }

    pub fn handle(&self, command: Command) -> Result<Vec<Event>, Error> {
        match command {
            Command::BeginStroke { point } => {
                if self.is_inert() {
                    return Ok(vec![]);
                }

                Ok(vec![Event::StrokeBegun { point }])
            }

            Command::ExtendStroke { point } => {
                if !self.state.is_drawing {
                    return Ok(vec![]);
                }

                Ok(vec![Event::SegmentPainted {
                    from: self.state.last_point,
                    to: point,
                }])
            }

            Command::EndStroke => {
                if !self.state.is_drawing {
                    return Ok(vec![]);
                }

                Ok(vec![Event::StrokeEnded])
            }

            Command::Clear => Ok(vec![Event::Cleared]),

            Command::Submit => {
                self.validate_can_submit()?;
                let payload = self.build_payload()?;

                Ok(vec![Event::Signed { payload }])
            }

            Command::Cancel => Ok(vec![Event::Closed]),
        }
    }

    pub fn apply(&mut self, event: Event) {
        match event {
            Event::StrokeBegun { point } => {
                self.state.is_drawing = true;
                self.state.last_point = point;
            }

            Event::SegmentPainted { from, to } => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.paint_segment(from, to);
                }
                self.state.last_point = to;
                self.state.has_signature = true;
                self.segment_count += 1;
            }

            Event::StrokeEnded => {
                self.state.is_drawing = false;
                self.stroke_count += 1;
            }

            Event::Cleared => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.clear();
                }
                self.state = CaptureState::default();
            }

            Event::Signed { payload } => {
                self.last_signed_at = Some(payload.timestamp);
            }

            Event::ReadinessChanged { .. } | Event::Closed => {}
        }
    }

    fn validate_can_submit(&self) -> Result<(), Error> {
        if !self.form.has_signer_name() {
            return Err(Error::validation("Cannot sign without a signer name"));
        }
        if !self.form.terms_accepted {
            return Err(Error::validation("Cannot sign before accepting the terms"));
        }
        if !self.state.has_signature {
            return Err(Error::validation("Cannot sign without a drawn signature"));
        }
        Ok(())
    }

    fn build_payload(&self) -> Result<SignaturePayload, Error> {
        let surface = self
            .surface
            .as_ref()
            .ok_or_else(|| Error::validation("Cannot sign without a drawing surface"))?;

        Ok(SignaturePayload {
            signer_name: self.form.signer_name.trim().to_string(),
            credentials: present(&self.form.credentials),
            license_number: present(&self.form.license_number),
            timestamp: self.next_timestamp(),
            signature: surface.to_data_uri()?,
        })
    }

    /// Millisecond wall-clock time, never earlier than the previous signing
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(3);
        match self.last_signed_at {
            Some(previous) if previous > now => previous,
            _ => now,
        }
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
