//! Domain events.
//!
//! The [`Event`] trait is the contract every business module's event enum
//! implements. Transport, persistence and fan-out are host concerns.

pub mod event;

pub use event::Event;
