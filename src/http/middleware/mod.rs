//! Request middleware.

pub mod instrument;

pub use instrument::{Instrumentation, Responder};
