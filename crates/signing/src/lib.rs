//! Prescriber Signature Capture

/// Signature capture pad
pub mod signatures;

/// Domain errors
pub mod errors;

/// Outbound signal wrapper
pub mod event;

pub use errors::Error;
pub use event::DomainEvent;
