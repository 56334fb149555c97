//! `quotedesk-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! error model, strongly-typed identifiers, aggregate traits, the tax-rate
//! value object and the reference sequence abstraction.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod sequence;
pub mod tax;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, TenantId};
pub use sequence::{InMemorySequenceGenerator, SequenceGenerator};
pub use tax::TaxRate;
pub use value_object::ValueObject;
