//! Customers domain module (event-sourced).
//!
//! Quotations are made out to a customer; this crate owns that record. Pure
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod customer;

pub use customer::{
    ContactInfo, ContactUpdated, Customer, CustomerCommand, CustomerEvent, CustomerId,
    CustomerReactivated, CustomerRegistered, CustomerStatus, CustomerSuspended,
    ReactivateCustomer, RegisterCustomer, SuspendCustomer, UpdateContact,
};
