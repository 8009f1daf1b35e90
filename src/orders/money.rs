//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization.

use rust_decimal::prelude::*;

use crate::db::models::OrderItemInput;
use crate::orders::error::OrderError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item (€1,000,000)
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line item
const MAX_QUANTITY: i64 = 9999;
/// Tax rate is a percentage in [0, 100]
const MAX_TAX_RATE: f64 = 100.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::Validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a line item input before processing
pub fn validate_item(item: &OrderItemInput) -> Result<(), OrderError> {
    if item.quantity <= 0 {
        return Err(OrderError::Validation(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(OrderError::Validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }
    if let Some(price) = item.unit_price {
        require_finite(price, "unit_price")?;
        if price < 0.0 {
            return Err(OrderError::Validation(format!(
                "unit_price must be non-negative, got {}",
                price
            )));
        }
        if price > MAX_PRICE {
            return Err(OrderError::Validation(format!(
                "unit_price exceeds maximum allowed ({}), got {}",
                MAX_PRICE, price
            )));
        }
    }
    if item.stock_unit_id.is_none() && item.name.as_deref().map_or(true, str::is_empty) {
        return Err(OrderError::Validation(
            "ad-hoc line items require a name".to_string(),
        ));
    }
    if item.stock_unit_id.is_none() && item.unit_price.is_none() {
        return Err(OrderError::Validation(
            "ad-hoc line items require a unit_price".to_string(),
        ));
    }
    Ok(())
}

/// Validate the order-level monetary inputs
pub fn validate_charges(tax_rate: f64, discount: f64, shipping_cost: f64) -> Result<(), OrderError> {
    require_finite(tax_rate, "tax_rate")?;
    if !(0.0..=MAX_TAX_RATE).contains(&tax_rate) {
        return Err(OrderError::Validation(format!(
            "tax_rate must be between 0 and 100, got {}",
            tax_rate
        )));
    }
    require_finite(discount, "discount")?;
    if discount < 0.0 {
        return Err(OrderError::Validation(format!(
            "discount must be non-negative, got {}",
            discount
        )));
    }
    require_finite(shipping_cost, "shipping_cost")?;
    if shipping_cost < 0.0 {
        return Err(OrderError::Validation(format!(
            "shipping_cost must be non-negative, got {}",
            shipping_cost
        )));
    }
    Ok(())
}

/// Computed totals for an order, pre gift card redemption
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub tax_amount: f64,
    /// `subtotal + tax_amount + shipping_cost - discount`
    pub total: f64,
}

/// Line total for one item
pub fn line_total(quantity: i64, unit_price: f64) -> f64 {
    let total = Decimal::from(quantity) * to_decimal(unit_price);
    to_f64(total)
}

/// Recompute order totals from priced line items
pub fn order_totals(
    lines: &[(i64, f64)],
    tax_rate: f64,
    discount: f64,
    shipping_cost: f64,
) -> OrderTotals {
    let subtotal: Decimal = lines
        .iter()
        .map(|(quantity, unit_price)| Decimal::from(*quantity) * to_decimal(*unit_price))
        .sum();
    let tax_amount = (subtotal * to_decimal(tax_rate) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let total = subtotal + tax_amount + to_decimal(shipping_cost) - to_decimal(discount);
    OrderTotals {
        subtotal: to_f64(subtotal),
        tax_amount: to_f64(tax_amount),
        total: to_f64(total),
    }
}

/// Amount a gift card covers: the smaller of its balance and the amount due
pub fn redeemable_amount(balance: f64, total: f64) -> f64 {
    let due = to_decimal(total).max(Decimal::ZERO);
    to_f64(to_decimal(balance).min(due))
}
