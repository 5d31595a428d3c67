use crate::{errors::Error, event::DomainEvent};

use super::{
    inputs::{Session, SessionAction},
    pad::{CaptureOptions, SignaturePad},
    view::Outbox,
    SignaturePayload,
};

/// Outbound signal a replayed session ends with
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Signed(SignaturePayload),
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replayed {
    pub capture_id: String,
    pub outcome: Outcome,
    /// Outbound signals in emission order
    pub signals: Vec<DomainEvent>,
}

/// Replay a recorded session through a freshly mounted pad.
///
/// The surface rect sizes the pad, every input goes through the same
/// normalization a live host would use, and the session's action decides the
/// outbound signal. An unusable surface is reported only if the session tries
/// to sign.
pub fn replay(session: &Session, options: CaptureOptions) -> Result<Replayed, Error> {
    let outbox = Outbox::new();
    let mut pad = SignaturePad::mount_with(session.surface, options).with_query(outbox.clone());
    pad.set_form(session.form.clone());

    for input in &session.inputs {
        pad.handle_input(input);
    }

    tracing::debug!(
        "Replayed {} inputs on {} ({} strokes)",
        session.inputs.len(),
        pad.id(),
        pad.stroke_count()
    );

    let outcome = match session.action {
        SessionAction::Close => {
            pad.cancel();
            Outcome::Closed
        }
        SessionAction::Sign => {
            if let Some(err) = pad.mount_error() {
                return Err(err.clone());
            }
            Outcome::Signed(pad.submit()?)
        }
    };

    Ok(Replayed {
        capture_id: pad.id().to_string(),
        outcome,
        signals: outbox.drain(),
    })
}
