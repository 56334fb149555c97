//! Quotation → invoice projection.
//!
//! The "create invoice" action on a quotation maps each quotation line to an
//! invoice line payload and hands the resulting `IssueInvoice` command to the
//! invoice aggregate. Linking the new invoice back onto the quotation (and
//! the duplicate-link guard that comes with it) is the quotation's own
//! `LinkInvoice` command.

use chrono::{DateTime, NaiveDate, Utc};

use quotedesk_core::{DomainError, DomainResult};
use quotedesk_quotations::Quotation;

use crate::invoice::{InvoiceId, InvoiceLine, IssueInvoice};

/// Build an `IssueInvoice` command from a quotation: one invoice line per
/// quotation line with matching product, description, quantity, unit price
/// and tax set; the invoice origin carries the quotation's reference.
pub fn draft_from_quotation(
    quotation: &Quotation,
    invoice_id: InvoiceId,
    due_date: Option<NaiveDate>,
    occurred_at: DateTime<Utc>,
) -> DomainResult<IssueInvoice> {
    if !quotation.is_created() {
        return Err(DomainError::not_found());
    }

    let tenant_id = quotation
        .tenant_id()
        .ok_or_else(|| DomainError::invariant("quotation has no tenant"))?;

    if quotation.lines().is_empty() {
        return Err(DomainError::validation(
            "cannot invoice a quotation without lines",
        ));
    }

    let lines = quotation
        .lines()
        .iter()
        .map(|line| InvoiceLine {
            line_no: line.line_no(),
            product_id: line.product_id(),
            description: line.description().to_string(),
            quantity: line.quantity(),
            unit_price: line.unit_price(),
            tax: line.tax(),
        })
        .collect();

    Ok(IssueInvoice {
        tenant_id,
        invoice_id,
        quotation_id: quotation.id_typed(),
        origin: quotation.reference().to_string(),
        lines,
        due_date,
        occurred_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedesk_core::{Aggregate, AggregateId, TaxRate, TenantId};
    use quotedesk_parties::CustomerId;
    use quotedesk_products::ProductId;
    use quotedesk_quotations::{
        AddLine, AssignReference, CreateQuotation, LineSpec, LinkInvoice, QuotationCommand,
        QuotationId,
    };

    use crate::invoice::{Invoice, InvoiceCommand};

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn quotation_with_lines(tenant_id: TenantId) -> Quotation {
        let quotation_id = QuotationId::new(AggregateId::new());
        let mut quotation = Quotation::empty(quotation_id);

        let create = CreateQuotation {
            tenant_id,
            quotation_id,
            customer_id: Some(CustomerId::new(AggregateId::new())),
            reference: None,
            expiration: None,
            payment_terms: None,
            occurred_at: test_time(),
        };
        let events = quotation
            .handle(&QuotationCommand::CreateQuotation(create))
            .unwrap();
        quotation.apply(&events[0]);

        let assign = AssignReference {
            tenant_id,
            quotation_id,
            reference: "QS00001".to_string(),
            occurred_at: test_time(),
        };
        let events = quotation
            .handle(&QuotationCommand::AssignReference(assign))
            .unwrap();
        quotation.apply(&events[0]);

        for (quantity, unit_price, tax) in [
            (2, 1_000, Some(TaxRate::from_percent(15).unwrap())),
            (1, 4_000, None),
        ] {
            let mut spec = LineSpec::new(ProductId::new(AggregateId::new()))
                .with_description("Line item")
                .with_quantity(quantity)
                .with_unit_price(unit_price);
            if let Some(tax) = tax {
                spec = spec.with_tax(tax);
            }
            let add = AddLine {
                tenant_id,
                quotation_id,
                spec,
                occurred_at: test_time(),
            };
            let events = quotation.handle(&QuotationCommand::AddLine(add)).unwrap();
            quotation.apply(&events[0]);
        }

        quotation
    }

    #[test]
    fn projection_maps_one_invoice_line_per_quotation_line() {
        let tenant_id = TenantId::new();
        let quotation = quotation_with_lines(tenant_id);
        let invoice_id = InvoiceId::new(AggregateId::new());

        let cmd = draft_from_quotation(&quotation, invoice_id, None, test_time()).unwrap();

        assert_eq!(cmd.lines.len(), quotation.lines().len());
        assert_eq!(cmd.origin, "QS00001");
        assert_eq!(cmd.quotation_id, quotation.id_typed());
        for (invoice_line, quotation_line) in cmd.lines.iter().zip(quotation.lines()) {
            assert_eq!(invoice_line.product_id, quotation_line.product_id());
            assert_eq!(invoice_line.quantity, quotation_line.quantity());
            assert_eq!(invoice_line.unit_price, quotation_line.unit_price());
            assert_eq!(invoice_line.description, quotation_line.description());
            assert_eq!(invoice_line.tax, quotation_line.tax());
        }
    }

    #[test]
    fn issued_invoice_totals_match_quotation_totals() {
        let tenant_id = TenantId::new();
        let quotation = quotation_with_lines(tenant_id);
        let invoice_id = InvoiceId::new(AggregateId::new());

        let cmd = draft_from_quotation(&quotation, invoice_id, None, test_time()).unwrap();

        let mut invoice = Invoice::empty(invoice_id);
        let events = invoice.handle(&InvoiceCommand::IssueInvoice(cmd)).unwrap();
        invoice.apply(&events[0]);

        assert_eq!(invoice.amount_untaxed(), quotation.amount_untaxed());
        assert_eq!(invoice.amount_tax(), quotation.amount_tax());
        assert_eq!(invoice.amount_total(), quotation.amount_total());
    }

    #[test]
    fn quotation_without_lines_cannot_be_invoiced() {
        let tenant_id = TenantId::new();
        let quotation_id = QuotationId::new(AggregateId::new());
        let mut quotation = Quotation::empty(quotation_id);

        let create = CreateQuotation {
            tenant_id,
            quotation_id,
            customer_id: Some(CustomerId::new(AggregateId::new())),
            reference: None,
            expiration: None,
            payment_terms: None,
            occurred_at: test_time(),
        };
        let events = quotation
            .handle(&QuotationCommand::CreateQuotation(create))
            .unwrap();
        quotation.apply(&events[0]);

        let err = draft_from_quotation(
            &quotation,
            InvoiceId::new(AggregateId::new()),
            None,
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn uncreated_quotation_is_not_found() {
        let quotation = Quotation::empty(QuotationId::new(AggregateId::new()));
        let err = draft_from_quotation(
            &quotation,
            InvoiceId::new(AggregateId::new()),
            None,
            test_time(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[test]
    fn invoice_links_back_onto_the_quotation() {
        let tenant_id = TenantId::new();
        let mut quotation = quotation_with_lines(tenant_id);
        let invoice_id = InvoiceId::new(AggregateId::new());

        let cmd = draft_from_quotation(&quotation, invoice_id, None, test_time()).unwrap();
        let mut invoice = Invoice::empty(invoice_id);
        let events = invoice.handle(&InvoiceCommand::IssueInvoice(cmd)).unwrap();
        invoice.apply(&events[0]);

        let link = LinkInvoice {
            tenant_id,
            quotation_id: quotation.id_typed(),
            invoice_id: invoice_id.0,
            occurred_at: test_time(),
        };
        let events = quotation.handle(&QuotationCommand::LinkInvoice(link)).unwrap();
        quotation.apply(&events[0]);

        assert_eq!(quotation.invoice_count(), 1);
        assert_eq!(quotation.invoice_ids()[0], invoice_id.0);
    }
}
