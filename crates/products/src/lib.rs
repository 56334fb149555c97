//! Products domain module (event-sourced).
//!
//! Products supply the description, list price and default tax rate that
//! pre-fill a quotation line. Pure deterministic domain logic (no IO, no
//! HTTP, no storage).

pub mod product;

pub use product::{
    ArchiveProduct, CreateProduct, ActivateProduct, Product, ProductActivated, ProductArchived,
    ProductCommand, ProductCreated, ProductEvent, ProductId, ProductStatus, PricingUpdated,
    UpdatePricing,
};
