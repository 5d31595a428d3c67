/// Capture aggregate
pub mod aggregate;

/// Commands
pub mod commands;

/// Events
pub mod events;

/// Host input DTOs
pub mod inputs;

/// Pointer and touch normalization
pub mod pointer;

/// Raster surface
pub mod surface;

/// Observers and read model
pub mod view;

/// Mounted pad
pub mod pad;

/// Recorded session replay
pub mod replay;

pub use aggregate::{Capture, CaptureState, SignaturePayload, StrokePoint};
pub use commands::Command;
pub use events::Event;
pub use inputs::{InputEvent, Session, SessionAction, SignerForm, SurfaceRect};
pub use pad::{CaptureOptions, SignaturePad};
pub use pointer::normalize_input;
pub use replay::{replay, Outcome, Replayed};
pub use surface::RasterSurface;
pub use view::{Callback, EventEnvelope, Outbox, Query, SharedView, View};
