use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use quotedesk_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TaxRate, TenantId};
use quotedesk_events::Event;
use quotedesk_products::ProductId;
use quotedesk_quotations::QuotationId;

/// Invoice identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub AggregateId);

impl InvoiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Open,
    Void,
}

/// Invoice line derived from a quotation line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub line_no: u32,
    pub product_id: ProductId,
    pub description: String,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    pub tax: Option<TaxRate>,
}

impl InvoiceLine {
    fn subtotal(&self) -> Result<u64, DomainError> {
        if self.quantity <= 0 {
            return Err(DomainError::validation(
                "invoice line quantity must be positive",
            ));
        }
        (self.quantity as u64)
            .checked_mul(self.unit_price)
            .ok_or_else(|| DomainError::invariant("invoice line amount overflow"))
    }
}

/// Aggregate root: Invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    tenant_id: Option<TenantId>,
    quotation_id: Option<QuotationId>,
    /// Human-readable reference of the originating document.
    origin: String,
    status: InvoiceStatus,
    lines: Vec<InvoiceLine>,
    due_date: Option<NaiveDate>,
    amount_untaxed: u64,
    amount_tax: u64,
    amount_total: u64,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            tenant_id: None,
            quotation_id: None,
            origin: String::new(),
            status: InvoiceStatus::Open,
            lines: Vec::new(),
            due_date: None,
            amount_untaxed: 0,
            amount_tax: 0,
            amount_total: 0,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn quotation_id(&self) -> Option<QuotationId> {
        self.quotation_id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn amount_untaxed(&self) -> u64 {
        self.amount_untaxed
    }

    pub fn amount_tax(&self) -> u64 {
        self.amount_tax
    }

    pub fn amount_total(&self) -> u64 {
        self.amount_total
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: IssueInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub quotation_id: QuotationId,
    pub origin: String,
    pub lines: Vec<InvoiceLine>,
    pub due_date: Option<NaiveDate>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: VoidInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidInvoice {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    IssueInvoice(IssueInvoice),
    VoidInvoice(VoidInvoice),
}

/// Event: InvoiceIssued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceIssued {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub quotation_id: QuotationId,
    pub origin: String,
    pub lines: Vec<InvoiceLine>,
    pub due_date: Option<NaiveDate>,
    pub amount_untaxed: u64,
    pub amount_tax: u64,
    pub amount_total: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceVoided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceVoided {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceIssued(InvoiceIssued),
    InvoiceVoided(InvoiceVoided),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceIssued(_) => "invoicing.invoice.issued",
            InvoiceEvent::InvoiceVoided(_) => "invoicing.invoice.voided",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceIssued(e) => e.occurred_at,
            InvoiceEvent::InvoiceVoided(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceIssued(e) => {
                self.id = e.invoice_id;
                self.tenant_id = Some(e.tenant_id);
                self.quotation_id = Some(e.quotation_id);
                self.origin = e.origin.clone();
                self.lines = e.lines.clone();
                self.due_date = e.due_date;
                self.amount_untaxed = e.amount_untaxed;
                self.amount_tax = e.amount_tax;
                self.amount_total = e.amount_total;
                self.status = InvoiceStatus::Open;
                self.created = true;
            }
            InvoiceEvent::InvoiceVoided(_) => {
                self.status = InvoiceStatus::Void;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::IssueInvoice(cmd) => self.handle_issue(cmd),
            InvoiceCommand::VoidInvoice(cmd) => self.handle_void(cmd),
        }
    }
}

impl Invoice {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_invoice_id(&self, invoice_id: InvoiceId) -> Result<(), DomainError> {
        if self.id != invoice_id {
            return Err(DomainError::invariant("invoice_id mismatch"));
        }
        Ok(())
    }

    fn handle_issue(&self, cmd: &IssueInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already exists"));
        }

        if cmd.lines.is_empty() {
            return Err(DomainError::validation(
                "cannot issue invoice without lines",
            ));
        }

        let mut amount_untaxed: u64 = 0;
        let mut amount_total: u64 = 0;
        for line in &cmd.lines {
            let subtotal = line.subtotal()?;
            let tax_amount = line.tax.map(|t| t.apply(subtotal)).unwrap_or(0);
            let line_total = subtotal
                .checked_add(tax_amount)
                .ok_or_else(|| DomainError::invariant("invoice line amount overflow"))?;

            amount_untaxed = amount_untaxed
                .checked_add(subtotal)
                .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
            amount_total = amount_total
                .checked_add(line_total)
                .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
        }

        Ok(vec![InvoiceEvent::InvoiceIssued(InvoiceIssued {
            tenant_id: cmd.tenant_id,
            invoice_id: cmd.invoice_id,
            quotation_id: cmd.quotation_id,
            origin: cmd.origin.clone(),
            lines: cmd.lines.clone(),
            due_date: cmd.due_date,
            amount_untaxed,
            amount_tax: amount_total - amount_untaxed,
            amount_total,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_void(&self, cmd: &VoidInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        if self.status == InvoiceStatus::Void {
            return Err(DomainError::conflict("invoice is already void"));
        }

        Ok(vec![InvoiceEvent::InvoiceVoided(InvoiceVoided {
            tenant_id: cmd.tenant_id,
            invoice_id: cmd.invoice_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedesk_core::AggregateId;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_invoice_id() -> InvoiceId {
        InvoiceId::new(AggregateId::new())
    }

    fn test_quotation_id() -> QuotationId {
        QuotationId::new(AggregateId::new())
    }

    fn test_product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn taxed_line(line_no: u32) -> InvoiceLine {
        InvoiceLine {
            line_no,
            product_id: test_product_id(),
            description: "Widget".to_string(),
            quantity: 2,
            unit_price: 1_000,
            tax: Some(TaxRate::from_percent(15).unwrap()),
        }
    }

    #[test]
    fn issue_invoice_computes_tax_aware_totals() {
        let invoice = Invoice::empty(test_invoice_id());
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let quotation_id = test_quotation_id();

        let cmd = IssueInvoice {
            tenant_id,
            invoice_id,
            quotation_id,
            origin: "QS00001".to_string(),
            lines: vec![taxed_line(1)],
            due_date: None,
            occurred_at: test_time(),
        };

        let events = invoice
            .handle(&InvoiceCommand::IssueInvoice(cmd))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            InvoiceEvent::InvoiceIssued(e) => {
                assert_eq!(e.quotation_id, quotation_id);
                assert_eq!(e.origin, "QS00001");
                assert_eq!(e.amount_untaxed, 2_000);
                assert_eq!(e.amount_tax, 300);
                assert_eq!(e.amount_total, 2_300);
            }
            _ => panic!("Expected InvoiceIssued event"),
        }
    }

    #[test]
    fn cannot_issue_invoice_without_lines() {
        let invoice = Invoice::empty(test_invoice_id());
        let cmd = IssueInvoice {
            tenant_id: test_tenant_id(),
            invoice_id: test_invoice_id(),
            quotation_id: test_quotation_id(),
            origin: "QS00001".to_string(),
            lines: vec![],
            due_date: None,
            occurred_at: test_time(),
        };

        let err = invoice
            .handle(&InvoiceCommand::IssueInvoice(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn voiding_twice_is_a_conflict() {
        let mut invoice = Invoice::empty(test_invoice_id());
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();

        let issue = IssueInvoice {
            tenant_id,
            invoice_id,
            quotation_id: test_quotation_id(),
            origin: "QS00001".to_string(),
            lines: vec![taxed_line(1)],
            due_date: None,
            occurred_at: test_time(),
        };
        let events = invoice.handle(&InvoiceCommand::IssueInvoice(issue)).unwrap();
        invoice.apply(&events[0]);
        assert_eq!(invoice.status(), InvoiceStatus::Open);

        let void = VoidInvoice {
            tenant_id,
            invoice_id,
            reason: Some("Customer dispute".to_string()),
            occurred_at: test_time(),
        };
        let events = invoice
            .handle(&InvoiceCommand::VoidInvoice(void.clone()))
            .unwrap();
        invoice.apply(&events[0]);
        assert_eq!(invoice.status(), InvoiceStatus::Void);

        let err = invoice
            .handle(&InvoiceCommand::VoidInvoice(void))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn non_positive_line_quantity_is_rejected() {
        let invoice = Invoice::empty(test_invoice_id());
        let mut line = taxed_line(1);
        line.quantity = 0;

        let cmd = IssueInvoice {
            tenant_id: test_tenant_id(),
            invoice_id: test_invoice_id(),
            quotation_id: test_quotation_id(),
            origin: "QS00001".to_string(),
            lines: vec![line],
            due_date: None,
            occurred_at: test_time(),
        };
        let err = invoice
            .handle(&InvoiceCommand::IssueInvoice(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
