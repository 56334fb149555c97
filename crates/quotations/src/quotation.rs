use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use quotedesk_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TaxRate, TenantId};
use quotedesk_events::Event;
use quotedesk_parties::CustomerId;
use quotedesk_products::ProductId;

use crate::line::{LineSpec, QuotationLine};

/// Quotation identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotationId(pub AggregateId);

impl QuotationId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for QuotationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Payment-terms record reference (the terms themselves live in accounting).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentTermsId(pub AggregateId);

impl PaymentTermsId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PaymentTermsId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Quotation status lifecycle: Quotation / Quotation Sent / Sales Order / Cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Confirmed,
    Cancelled,
}

/// Aggregate root: Quotation.
///
/// Header amounts are derived sums over the owned lines and are re-derived by
/// `apply` after every line event:
/// `amount_untaxed == Σ price_subtotal`, `amount_total == Σ price_total`,
/// `amount_tax == amount_total - amount_untaxed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quotation {
    id: QuotationId,
    tenant_id: Option<TenantId>,
    reference: String,
    customer_id: Option<CustomerId>,
    expiration: Option<NaiveDate>,
    payment_terms: Option<PaymentTermsId>,
    status: QuotationStatus,
    lines: Vec<QuotationLine>,
    amount_untaxed: u64,
    amount_tax: u64,
    amount_total: u64,
    /// Generated invoices (references only; the records live in invoicing).
    invoice_ids: Vec<AggregateId>,
    version: u64,
    created: bool,
}

impl Quotation {
    /// Reference carried until a sequence assigns the final value.
    pub const REFERENCE_PLACEHOLDER: &'static str = "New";

    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: QuotationId) -> Self {
        Self {
            id,
            tenant_id: None,
            reference: Self::REFERENCE_PLACEHOLDER.to_string(),
            customer_id: None,
            expiration: None,
            payment_terms: None,
            status: QuotationStatus::Draft,
            lines: Vec::new(),
            amount_untaxed: 0,
            amount_tax: 0,
            amount_total: 0,
            invoice_ids: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> QuotationId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Whether the final reference has been assigned (no longer the placeholder).
    pub fn has_reference(&self) -> bool {
        self.reference != Self::REFERENCE_PLACEHOLDER
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn expiration(&self) -> Option<NaiveDate> {
        self.expiration
    }

    pub fn payment_terms(&self) -> Option<PaymentTermsId> {
        self.payment_terms
    }

    pub fn status(&self) -> QuotationStatus {
        self.status
    }

    pub fn lines(&self) -> &[QuotationLine] {
        &self.lines
    }

    pub fn line(&self, line_no: u32) -> Option<&QuotationLine> {
        self.lines.iter().find(|l| l.line_no() == line_no)
    }

    /// Total without tax.
    pub fn amount_untaxed(&self) -> u64 {
        self.amount_untaxed
    }

    /// Tax amount (total minus untaxed).
    pub fn amount_tax(&self) -> u64 {
        self.amount_tax
    }

    /// Total with tax.
    pub fn amount_total(&self) -> u64 {
        self.amount_total
    }

    pub fn invoice_ids(&self) -> &[AggregateId] {
        &self.invoice_ids
    }

    pub fn invoice_count(&self) -> usize {
        self.invoice_ids.len()
    }

    fn next_line_no(&self) -> u32 {
        self.lines.iter().map(QuotationLine::line_no).max().unwrap_or(0) + 1
    }

    fn recompute_totals(&mut self) {
        self.amount_untaxed = self
            .lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.price_subtotal()));
        self.amount_total = self
            .lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.price_total()));
        self.amount_tax = self.amount_total.saturating_sub(self.amount_untaxed);
    }
}

impl AggregateRoot for Quotation {
    type Id = QuotationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateQuotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateQuotation {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    /// Required at save time; carried as an Option so the missing-customer
    /// case surfaces as a validation error, not a type error in the caller.
    pub customer_id: Option<CustomerId>,
    /// Explicit reference; when None the placeholder is used until a
    /// sequence assigns the final value.
    pub reference: Option<String>,
    pub expiration: Option<NaiveDate>,
    pub payment_terms: Option<PaymentTermsId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AssignReference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignReference {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub reference: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateTerms. Replaces both header terms with the given values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTerms {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub expiration: Option<NaiveDate>,
    pub payment_terms: Option<PaymentTermsId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLine {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub spec: LineSpec,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateLine (partial; None keeps the existing value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLine {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub line_no: u32,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<u64>,
    /// Two-level Option: `Some(None)` clears the tax rate.
    pub tax: Option<Option<TaxRate>>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLine {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkSent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkSent {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmQuotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmQuotation {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelQuotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelQuotation {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: LinkInvoice — record a generated invoice on the quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInvoice {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub invoice_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotationCommand {
    CreateQuotation(CreateQuotation),
    AssignReference(AssignReference),
    UpdateTerms(UpdateTerms),
    AddLine(AddLine),
    UpdateLine(UpdateLine),
    RemoveLine(RemoveLine),
    MarkSent(MarkSent),
    ConfirmQuotation(ConfirmQuotation),
    CancelQuotation(CancelQuotation),
    LinkInvoice(LinkInvoice),
}

/// Event: QuotationCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationCreated {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub customer_id: CustomerId,
    pub reference: String,
    pub expiration: Option<NaiveDate>,
    pub payment_terms: Option<PaymentTermsId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReferenceAssigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceAssigned {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub reference: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TermsUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsUpdated {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub expiration: Option<NaiveDate>,
    pub payment_terms: Option<PaymentTermsId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAdded {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub line_no: u32,
    pub product_id: ProductId,
    pub description: String,
    pub quantity: i64,
    pub unit_price: u64,
    pub tax: Option<TaxRate>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineUpdated {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub line_no: u32,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<u64>,
    pub tax: Option<Option<TaxRate>>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRemoved {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuotationSent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationSent {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuotationConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationConfirmed {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuotationCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationCancelled {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceLinked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLinked {
    pub tenant_id: TenantId,
    pub quotation_id: QuotationId,
    pub invoice_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotationEvent {
    QuotationCreated(QuotationCreated),
    ReferenceAssigned(ReferenceAssigned),
    TermsUpdated(TermsUpdated),
    LineAdded(LineAdded),
    LineUpdated(LineUpdated),
    LineRemoved(LineRemoved),
    QuotationSent(QuotationSent),
    QuotationConfirmed(QuotationConfirmed),
    QuotationCancelled(QuotationCancelled),
    InvoiceLinked(InvoiceLinked),
}

impl Event for QuotationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            QuotationEvent::QuotationCreated(_) => "quotation.sale.created",
            QuotationEvent::ReferenceAssigned(_) => "quotation.sale.reference_assigned",
            QuotationEvent::TermsUpdated(_) => "quotation.sale.terms_updated",
            QuotationEvent::LineAdded(_) => "quotation.sale.line_added",
            QuotationEvent::LineUpdated(_) => "quotation.sale.line_updated",
            QuotationEvent::LineRemoved(_) => "quotation.sale.line_removed",
            QuotationEvent::QuotationSent(_) => "quotation.sale.sent",
            QuotationEvent::QuotationConfirmed(_) => "quotation.sale.confirmed",
            QuotationEvent::QuotationCancelled(_) => "quotation.sale.cancelled",
            QuotationEvent::InvoiceLinked(_) => "quotation.sale.invoice_linked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            QuotationEvent::QuotationCreated(e) => e.occurred_at,
            QuotationEvent::ReferenceAssigned(e) => e.occurred_at,
            QuotationEvent::TermsUpdated(e) => e.occurred_at,
            QuotationEvent::LineAdded(e) => e.occurred_at,
            QuotationEvent::LineUpdated(e) => e.occurred_at,
            QuotationEvent::LineRemoved(e) => e.occurred_at,
            QuotationEvent::QuotationSent(e) => e.occurred_at,
            QuotationEvent::QuotationConfirmed(e) => e.occurred_at,
            QuotationEvent::QuotationCancelled(e) => e.occurred_at,
            QuotationEvent::InvoiceLinked(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Quotation {
    type Command = QuotationCommand;
    type Event = QuotationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            QuotationEvent::QuotationCreated(e) => {
                self.id = e.quotation_id;
                self.tenant_id = Some(e.tenant_id);
                self.customer_id = Some(e.customer_id);
                self.reference = e.reference.clone();
                self.expiration = e.expiration;
                self.payment_terms = e.payment_terms;
                self.status = QuotationStatus::Draft;
                self.lines.clear();
                self.invoice_ids.clear();
                self.created = true;
                self.recompute_totals();
            }
            QuotationEvent::ReferenceAssigned(e) => {
                self.reference = e.reference.clone();
            }
            QuotationEvent::TermsUpdated(e) => {
                self.expiration = e.expiration;
                self.payment_terms = e.payment_terms;
            }
            QuotationEvent::LineAdded(e) => {
                self.lines.push(QuotationLine::from_parts(
                    e.line_no,
                    e.product_id,
                    e.description.clone(),
                    e.quantity,
                    e.unit_price,
                    e.tax,
                ));
                self.recompute_totals();
            }
            QuotationEvent::LineUpdated(e) => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.line_no() == e.line_no) {
                    *line = line.updated(
                        e.description.as_deref(),
                        e.quantity,
                        e.unit_price,
                        e.tax,
                    );
                }
                self.recompute_totals();
            }
            QuotationEvent::LineRemoved(e) => {
                self.lines.retain(|l| l.line_no() != e.line_no);
                self.recompute_totals();
            }
            QuotationEvent::QuotationSent(_) => {
                self.status = QuotationStatus::Sent;
            }
            QuotationEvent::QuotationConfirmed(_) => {
                self.status = QuotationStatus::Confirmed;
            }
            QuotationEvent::QuotationCancelled(_) => {
                self.status = QuotationStatus::Cancelled;
            }
            QuotationEvent::InvoiceLinked(e) => {
                self.invoice_ids.push(e.invoice_id);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            QuotationCommand::CreateQuotation(cmd) => self.handle_create(cmd),
            QuotationCommand::AssignReference(cmd) => self.handle_assign_reference(cmd),
            QuotationCommand::UpdateTerms(cmd) => self.handle_update_terms(cmd),
            QuotationCommand::AddLine(cmd) => self.handle_add_line(cmd),
            QuotationCommand::UpdateLine(cmd) => self.handle_update_line(cmd),
            QuotationCommand::RemoveLine(cmd) => self.handle_remove_line(cmd),
            QuotationCommand::MarkSent(cmd) => self.handle_mark_sent(cmd),
            QuotationCommand::ConfirmQuotation(cmd) => self.handle_confirm(cmd),
            QuotationCommand::CancelQuotation(cmd) => self.handle_cancel(cmd),
            QuotationCommand::LinkInvoice(cmd) => self.handle_link_invoice(cmd),
        }
    }
}

impl Quotation {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_quotation_id(&self, quotation_id: QuotationId) -> Result<(), DomainError> {
        if self.id != quotation_id {
            return Err(DomainError::invariant("quotation_id mismatch"));
        }
        Ok(())
    }

    fn ensure_exists(&self, tenant_id: TenantId, quotation_id: QuotationId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(tenant_id)?;
        self.ensure_quotation_id(quotation_id)
    }

    fn handle_create(&self, cmd: &CreateQuotation) -> Result<Vec<QuotationEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("quotation already exists"));
        }

        let customer_id = cmd.customer_id.ok_or_else(|| {
            DomainError::validation("customer is required before saving")
        })?;

        let reference = match &cmd.reference {
            Some(r) if r.trim().is_empty() => {
                return Err(DomainError::validation("reference must not be empty"));
            }
            Some(r) => r.clone(),
            None => Self::REFERENCE_PLACEHOLDER.to_string(),
        };

        Ok(vec![QuotationEvent::QuotationCreated(QuotationCreated {
            tenant_id: cmd.tenant_id,
            quotation_id: cmd.quotation_id,
            customer_id,
            reference,
            expiration: cmd.expiration,
            payment_terms: cmd.payment_terms,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_assign_reference(
        &self,
        cmd: &AssignReference,
    ) -> Result<Vec<QuotationEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.quotation_id)?;

        if self.has_reference() {
            return Err(DomainError::conflict(
                "reference already assigned and is immutable",
            ));
        }

        let reference = cmd.reference.trim();
        if reference.is_empty() || reference == Self::REFERENCE_PLACEHOLDER {
            return Err(DomainError::validation("a final reference is required"));
        }

        Ok(vec![QuotationEvent::ReferenceAssigned(ReferenceAssigned {
            tenant_id: cmd.tenant_id,
            quotation_id: cmd.quotation_id,
            reference: reference.to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_terms(&self, cmd: &UpdateTerms) -> Result<Vec<QuotationEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.quotation_id)?;

        Ok(vec![QuotationEvent::TermsUpdated(TermsUpdated {
            tenant_id: cmd.tenant_id,
            quotation_id: cmd.quotation_id,
            expiration: cmd.expiration,
            payment_terms: cmd.payment_terms,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_line(&self, cmd: &AddLine) -> Result<Vec<QuotationEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.quotation_id)?;

        let spec = &cmd.spec;
        let unit_price = spec.unit_price.ok_or_else(|| {
            DomainError::validation(
                "unit price is required (set explicitly or via product defaults)",
            )
        })?;

        QuotationLine::validate(spec.quantity, unit_price, spec.tax)?;

        Ok(vec![QuotationEvent::LineAdded(LineAdded {
            tenant_id: cmd.tenant_id,
            quotation_id: cmd.quotation_id,
            line_no: self.next_line_no(),
            product_id: spec.product_id,
            description: spec.description.clone().unwrap_or_default(),
            quantity: spec.quantity,
            unit_price,
            tax: spec.tax,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_line(&self, cmd: &UpdateLine) -> Result<Vec<QuotationEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.quotation_id)?;

        let line = self.line(cmd.line_no).ok_or(DomainError::NotFound)?;

        if cmd.description.is_none()
            && cmd.quantity.is_none()
            && cmd.unit_price.is_none()
            && cmd.tax.is_none()
        {
            return Err(DomainError::validation("nothing to update"));
        }

        // Validate the merged result, not just the changed fields.
        QuotationLine::validate(
            cmd.quantity.unwrap_or(line.quantity()),
            cmd.unit_price.unwrap_or(line.unit_price()),
            cmd.tax.unwrap_or(line.tax()),
        )?;

        Ok(vec![QuotationEvent::LineUpdated(LineUpdated {
            tenant_id: cmd.tenant_id,
            quotation_id: cmd.quotation_id,
            line_no: cmd.line_no,
            description: cmd.description.clone(),
            quantity: cmd.quantity,
            unit_price: cmd.unit_price,
            tax: cmd.tax,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_line(&self, cmd: &RemoveLine) -> Result<Vec<QuotationEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.quotation_id)?;

        if self.line(cmd.line_no).is_none() {
            return Err(DomainError::not_found());
        }

        Ok(vec![QuotationEvent::LineRemoved(LineRemoved {
            tenant_id: cmd.tenant_id,
            quotation_id: cmd.quotation_id,
            line_no: cmd.line_no,
            occurred_at: cmd.occurred_at,
        })])
    }

    // Status actions are direct assignments: each one moves the quotation to
    // its fixed target regardless of the current status. The host UI decides
    // which actions to offer in which state.

    fn handle_mark_sent(&self, cmd: &MarkSent) -> Result<Vec<QuotationEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.quotation_id)?;

        Ok(vec![QuotationEvent::QuotationSent(QuotationSent {
            tenant_id: cmd.tenant_id,
            quotation_id: cmd.quotation_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmQuotation) -> Result<Vec<QuotationEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.quotation_id)?;

        Ok(vec![QuotationEvent::QuotationConfirmed(QuotationConfirmed {
            tenant_id: cmd.tenant_id,
            quotation_id: cmd.quotation_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelQuotation) -> Result<Vec<QuotationEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.quotation_id)?;

        Ok(vec![QuotationEvent::QuotationCancelled(QuotationCancelled {
            tenant_id: cmd.tenant_id,
            quotation_id: cmd.quotation_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_link_invoice(&self, cmd: &LinkInvoice) -> Result<Vec<QuotationEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.quotation_id)?;

        if self.invoice_ids.contains(&cmd.invoice_id) {
            return Err(DomainError::conflict("invoice already linked"));
        }

        Ok(vec![QuotationEvent::InvoiceLinked(InvoiceLinked {
            tenant_id: cmd.tenant_id,
            quotation_id: cmd.quotation_id,
            invoice_id: cmd.invoice_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
