//! Shared types: the event document and its response shape.

pub mod event;

pub use event::{Document, Event, Fields};
