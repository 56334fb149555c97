//! Quotation sales domain module (event-sourced).
//!
//! A quotation is a pre-sale document proposing priced goods to a customer:
//! a header (customer, reference, expiration, payment terms, status) owning
//! priced lines. Line subtotals/totals and the header amounts are derived
//! values, never settable directly. Pure deterministic domain logic (no IO,
//! no HTTP, no storage).

pub mod line;
pub mod quotation;

pub use line::{LineSpec, QuotationLine};
pub use quotation::{
    AddLine, AssignReference, CancelQuotation, ConfirmQuotation, CreateQuotation, InvoiceLinked,
    LineAdded, LineRemoved, LineUpdated, LinkInvoice, MarkSent, PaymentTermsId, Quotation,
    QuotationCancelled, QuotationCommand, QuotationConfirmed, QuotationCreated, QuotationEvent,
    QuotationId, QuotationSent, QuotationStatus, ReferenceAssigned, RemoveLine, TermsUpdated,
    UpdateLine, UpdateTerms,
};
