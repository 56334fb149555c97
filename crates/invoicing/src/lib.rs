//! Invoicing domain module (event-sourced).
//!
//! Invoices are spawned from quotations: the projection maps each quotation
//! line to an invoice line and the resulting record is owned here. Pure
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod invoice;
pub mod projection;

pub use invoice::{
    Invoice, InvoiceCommand, InvoiceEvent, InvoiceId, InvoiceIssued, InvoiceLine, InvoiceStatus,
    InvoiceVoided, IssueInvoice, VoidInvoice,
};
pub use projection::draft_from_quotation;
