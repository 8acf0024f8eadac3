//! Core types: normalized events, reference zone, event window, tracing

pub mod event;
pub mod time;
pub mod tracing;

pub use event::NormalizedEvent;
pub use time::{EventWindow, ReferenceZone, ZoneError};
pub use self::tracing::{TracingConfig, TracingError, init_tracing};
