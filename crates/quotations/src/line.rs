//! Quotation lines: priced items owned by a quotation.

use serde::{Deserialize, Serialize};

use quotedesk_core::{DomainError, DomainResult, Entity, TaxRate};
use quotedesk_products::{Product, ProductId};

/// One priced item within a quotation.
///
/// `price_subtotal` and `price_total` are derived from quantity, unit price
/// and tax rate on construction — they are never independently settable. A
/// line with no tax always has `price_total == price_subtotal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotationLine {
    line_no: u32,
    product_id: ProductId,
    description: String,
    quantity: i64,
    /// Price per unit in smallest currency unit (e.g., cents).
    unit_price: u64,
    tax: Option<TaxRate>,
    price_subtotal: u64,
    price_total: u64,
}

impl QuotationLine {
    /// Build a line, re-deriving the computed amounts.
    ///
    /// Total arithmetic (saturating); range/overflow validation is the
    /// command handler's job via [`QuotationLine::validate`], so saturation
    /// never triggers for lines that came through a command.
    pub(crate) fn from_parts(
        line_no: u32,
        product_id: ProductId,
        description: String,
        quantity: i64,
        unit_price: u64,
        tax: Option<TaxRate>,
    ) -> Self {
        let quantity_units = quantity.max(0) as u64;
        let price_subtotal = quantity_units.saturating_mul(unit_price);
        let tax_amount = tax.map(|t| t.apply(price_subtotal)).unwrap_or(0);
        let price_total = price_subtotal.saturating_add(tax_amount);

        Self {
            line_no,
            product_id,
            description,
            quantity,
            unit_price,
            tax,
            price_subtotal,
            price_total,
        }
    }

    /// Validate the raw inputs of a line before emitting an event for it.
    pub(crate) fn validate(quantity: i64, unit_price: u64, tax: Option<TaxRate>) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        let subtotal = (quantity as u64)
            .checked_mul(unit_price)
            .ok_or_else(|| DomainError::invariant("line amount overflow"))?;
        let tax_amount = tax.map(|t| t.apply(subtotal)).unwrap_or(0);
        subtotal
            .checked_add(tax_amount)
            .ok_or_else(|| DomainError::invariant("line amount overflow"))?;
        Ok(())
    }

    /// Rebuild this line with updated fields (None keeps the existing value;
    /// `tax` uses a two-level Option so the rate can also be cleared).
    pub(crate) fn updated(
        &self,
        description: Option<&str>,
        quantity: Option<i64>,
        unit_price: Option<u64>,
        tax: Option<Option<TaxRate>>,
    ) -> Self {
        Self::from_parts(
            self.line_no,
            self.product_id,
            description.map(str::to_owned).unwrap_or_else(|| self.description.clone()),
            quantity.unwrap_or(self.quantity),
            unit_price.unwrap_or(self.unit_price),
            tax.unwrap_or(self.tax),
        )
    }

    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn tax(&self) -> Option<TaxRate> {
        self.tax
    }

    /// Tax-exclusive amount: `quantity * unit_price`.
    pub fn price_subtotal(&self) -> u64 {
        self.price_subtotal
    }

    /// Tax-inclusive amount: subtotal plus the tax proportion.
    pub fn price_total(&self) -> u64 {
        self.price_total
    }
}

impl Entity for QuotationLine {
    type Id = u32;

    fn id(&self) -> &Self::Id {
        &self.line_no
    }
}

/// Input shape for adding a quotation line.
///
/// Selecting a product pre-fills description, unit price and tax from the
/// product record as a convenience default; every field can be overridden
/// afterwards with the builder methods. Quantity defaults to 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpec {
    pub product_id: ProductId,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_price: Option<u64>,
    pub tax: Option<TaxRate>,
}

impl LineSpec {
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            description: None,
            quantity: 1,
            unit_price: None,
            tax: None,
        }
    }

    /// Pre-fill from a product record: description from the product name,
    /// unit price from the list price, tax from the product's default rate.
    pub fn for_product(product: &Product) -> Self {
        Self {
            product_id: product.id_typed(),
            description: Some(product.name().to_string()),
            quantity: 1,
            unit_price: product.list_price(),
            tax: product.default_tax(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_unit_price(mut self, unit_price: u64) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub fn with_tax(mut self, tax: TaxRate) -> Self {
        self.tax = Some(tax);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedesk_core::AggregateId;

    fn test_product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    #[test]
    fn subtotal_is_quantity_times_unit_price() {
        let line = QuotationLine::from_parts(
            1,
            test_product_id(),
            "Widget".to_string(),
            3,
            1_000,
            None,
        );
        assert_eq!(line.price_subtotal(), 3_000);
    }

    #[test]
    fn total_includes_tax_proportion() {
        let tax = TaxRate::from_percent(15).unwrap();
        let line = QuotationLine::from_parts(
            1,
            test_product_id(),
            "Widget".to_string(),
            2,
            1_000,
            Some(tax),
        );
        assert_eq!(line.price_subtotal(), 2_000);
        assert_eq!(line.price_total(), 2_300);
    }

    #[test]
    fn untaxed_line_total_equals_subtotal() {
        // The total is re-derived on construction, never carried over.
        let line = QuotationLine::from_parts(
            1,
            test_product_id(),
            "Widget".to_string(),
            4,
            250,
            None,
        );
        assert_eq!(line.price_total(), line.price_subtotal());
    }

    #[test]
    fn updated_rederives_amounts() {
        let tax = TaxRate::from_percent(10).unwrap();
        let line = QuotationLine::from_parts(
            1,
            test_product_id(),
            "Widget".to_string(),
            1,
            1_000,
            Some(tax),
        );
        assert_eq!(line.price_total(), 1_100);

        let updated = line.updated(None, Some(2), None, Some(None));
        assert_eq!(updated.quantity(), 2);
        assert_eq!(updated.price_subtotal(), 2_000);
        assert_eq!(updated.price_total(), 2_000);
        assert_eq!(updated.description(), "Widget");
    }

    #[test]
    fn validate_rejects_non_positive_quantity() {
        let err = QuotationLine::validate(0, 100, None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let err = QuotationLine::validate(-1, 100, None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn validate_rejects_amount_overflow() {
        let err = QuotationLine::validate(i64::MAX, u64::MAX, None).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}
