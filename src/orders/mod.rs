//! Order aggregate
//!
//! Create/update/delete coordinate stock, gift-card balance and the order rows
//! inside one transaction; every resource check runs before the first write.
//! Customer statistics are recomputed after commit, best-effort.

pub mod error;
pub mod money;

use std::collections::HashMap;

use sqlx::SqlitePool;
use tracing::warn;

use crate::customers;
use crate::db::models::{
    Order, OrderCreate, OrderDetail, OrderItem, OrderItemInput, OrderStatus, OrderUpdate,
    PaymentStatus, StockUnit,
};
use crate::db::repository::{customer, gift_card, order, stock_unit};
use crate::plan::{Feature, PlanTier};
use crate::utils::time;

pub use error::OrderError;

/// A line item with identity, snapshot fields and price resolved
#[derive(Debug, Clone)]
struct ResolvedLine {
    stock_unit_id: Option<i64>,
    name: String,
    sku: String,
    quantity: i64,
    unit_price: f64,
}

fn require_feature(plan: PlanTier, feature: Feature) -> Result<(), OrderError> {
    if plan.allows(feature) {
        Ok(())
    } else {
        Err(OrderError::PlanRestricted(format!(
            "{} require the {} plan or higher",
            feature.name(),
            feature.required_tier().as_str()
        )))
    }
}

/// Validate inputs and resolve each line against the catalog. Returns the
/// resolved lines plus the stock units they reference.
async fn resolve_lines(
    pool: &SqlitePool,
    tenant_id: i64,
    items: &[OrderItemInput],
) -> Result<(Vec<ResolvedLine>, HashMap<i64, StockUnit>), OrderError> {
    if items.is_empty() {
        return Err(OrderError::Validation(
            "An order requires at least one line item".to_string(),
        ));
    }
    let mut lines = Vec::with_capacity(items.len());
    let mut units: HashMap<i64, StockUnit> = HashMap::new();
    for item in items {
        money::validate_item(item)?;
        match item.stock_unit_id {
            Some(unit_id) => {
                if !units.contains_key(&unit_id) {
                    let unit = stock_unit::find_by_id(pool, tenant_id, unit_id)
                        .await?
                        .ok_or_else(|| {
                            OrderError::NotFound(format!("Stock unit {unit_id} not found"))
                        })?;
                    units.insert(unit_id, unit);
                }
                let unit = &units[&unit_id];
                lines.push(ResolvedLine {
                    stock_unit_id: Some(unit_id),
                    name: item.name.clone().unwrap_or_else(|| unit.name.clone()),
                    sku: unit.sku.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price.unwrap_or(unit.unit_price),
                });
            }
            None => {
                // validate_item guarantees name and unit_price are present
                lines.push(ResolvedLine {
                    stock_unit_id: None,
                    name: item.name.clone().unwrap_or_default(),
                    sku: String::new(),
                    quantity: item.quantity,
                    unit_price: item.unit_price.unwrap_or_default(),
                });
            }
        }
    }
    Ok((lines, units))
}

/// Requested quantity per stock unit, summed across lines
fn requested_per_unit(lines: &[ResolvedLine]) -> HashMap<i64, i64> {
    let mut requested: HashMap<i64, i64> = HashMap::new();
    for line in lines {
        if let Some(unit_id) = line.stock_unit_id {
            *requested.entry(unit_id).or_insert(0) += line.quantity;
        }
    }
    requested
}

/// Pre-flight stock check against `available` quantities; no mutation happens
/// here, the transaction re-checks with conditional decrements.
fn check_availability(
    requested: &HashMap<i64, i64>,
    units: &HashMap<i64, StockUnit>,
    reserved: &HashMap<i64, i64>,
) -> Result<(), OrderError> {
    for (unit_id, qty) in requested {
        let unit = &units[unit_id];
        if !unit.tracks_stock {
            continue;
        }
        let available = unit.quantity + reserved.get(unit_id).copied().unwrap_or(0);
        if available < *qty {
            return Err(OrderError::InsufficientStock {
                name: unit.name.clone(),
                sku: unit.sku.clone(),
                available,
            });
        }
    }
    Ok(())
}

fn build_items(order_id: i64, lines: &[ResolvedLine]) -> Vec<OrderItem> {
    lines
        .iter()
        .map(|line| OrderItem {
            id: time::snowflake_id(),
            order_id,
            stock_unit_id: line.stock_unit_id,
            name: line.name.clone(),
            sku: line.sku.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price: money::line_total(line.quantity, line.unit_price),
        })
        .collect()
}

async fn require_customer(
    pool: &SqlitePool,
    tenant_id: i64,
    customer_id: i64,
) -> Result<(), OrderError> {
    customer::find_by_id(pool, tenant_id, customer_id)
        .await?
        .ok_or_else(|| OrderError::NotFound(format!("Customer {customer_id} not found")))?;
    Ok(())
}

/// Best-effort statistics recompute after a committed order mutation. A
/// failure here never changes the outcome already returned to the caller.
async fn recalculate_stats(pool: &SqlitePool, tenant_id: i64, customer_id: Option<i64>) {
    if let Some(customer_id) = customer_id {
        if let Err(e) = customers::recalculate(pool, tenant_id, customer_id).await {
            warn!(customer_id, error = %e, "post-commit statistics recalculation failed");
        }
    }
}

pub async fn list(pool: &SqlitePool, tenant_id: i64) -> Result<Vec<Order>, OrderError> {
    Ok(order::find_all(pool, tenant_id).await?)
}

pub async fn get_detail(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
) -> Result<OrderDetail, OrderError> {
    let row = order::find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| OrderError::NotFound(format!("Order {id} not found")))?;
    let items = order::find_items(pool, row.id).await?;
    Ok(OrderDetail { order: row, items })
}

/// Create an order: price the lines, redeem an optional gift card, reserve
/// stock, all inside one transaction.
pub async fn create(
    pool: &SqlitePool,
    tenant_id: i64,
    plan: PlanTier,
    data: OrderCreate,
) -> Result<OrderDetail, OrderError> {
    money::validate_charges(data.tax_rate, data.discount, data.shipping_cost)?;
    let (lines, units) = resolve_lines(pool, tenant_id, &data.items).await?;
    if let Some(customer_id) = data.customer_id {
        require_customer(pool, tenant_id, customer_id).await?;
    }

    let priced: Vec<(i64, f64)> = lines.iter().map(|l| (l.quantity, l.unit_price)).collect();
    let totals = money::order_totals(&priced, data.tax_rate, data.discount, data.shipping_cost);

    // Gift card pre-flight (plan-gated)
    let now = time::now_millis();
    let mut redemption: Option<(i64, f64)> = None;
    if let Some(code) = data.gift_card_code.as_deref().filter(|c| !c.trim().is_empty()) {
        require_feature(plan, Feature::GiftCards)?;
        let card = gift_card::find_by_code(pool, tenant_id, code)
            .await?
            .filter(|c| c.is_active)
            .ok_or(OrderError::InvalidGiftCard)?;
        if card.expires_at.is_some_and(|exp| exp < now) {
            return Err(OrderError::GiftCardExpired);
        }
        if card.balance <= 0.0 {
            return Err(OrderError::GiftCardEmpty);
        }
        let amount = money::redeemable_amount(card.balance, totals.total);
        if amount > 0.0 {
            redemption = Some((card.id, amount));
        }
    }

    let requested = requested_per_unit(&lines);
    check_availability(&requested, &units, &HashMap::new())?;

    let gift_card_amount = redemption.map(|(_, amount)| amount).unwrap_or(0.0);
    let order_id = time::snowflake_id();
    let row = Order {
        id: order_id,
        tenant_id,
        order_number: String::new(),
        customer_id: data.customer_id,
        guest_name: data.guest_name,
        guest_email: data.guest_email,
        guest_phone: data.guest_phone,
        status: data.status.unwrap_or(OrderStatus::Draft),
        payment_status: PaymentStatus::Pending,
        subtotal: totals.subtotal,
        tax_rate: data.tax_rate,
        tax_amount: totals.tax_amount,
        discount: data.discount,
        shipping_cost: data.shipping_cost,
        gift_card_id: redemption.map(|(id, _)| id),
        gift_card_amount,
        total: money::to_f64(money::to_decimal(totals.total) - money::to_decimal(gift_card_amount)),
        due_date: data.due_date,
        notes: data.notes,
        created_at: now,
        updated_at: now,
    };
    let items = build_items(order_id, &lines);

    let mut tx = pool.begin().await?;
    let order_number = order::next_order_number(&mut tx, tenant_id).await?;
    for (unit_id, qty) in &requested {
        if !stock_unit::decrement_if_available(&mut tx, tenant_id, *unit_id, *qty).await? {
            let unit = &units[unit_id];
            let available: i64 =
                sqlx::query_scalar("SELECT quantity FROM stock_unit WHERE tenant_id = ? AND id = ?")
                    .bind(tenant_id)
                    .bind(unit_id)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(OrderError::InsufficientStock {
                name: unit.name.clone(),
                sku: unit.sku.clone(),
                available,
            });
        }
    }
    if let Some((card_id, amount)) = redemption {
        if !gift_card::debit_if_available(&mut tx, tenant_id, card_id, amount).await? {
            // drained by a concurrent redemption since the pre-flight read
            return Err(OrderError::GiftCardEmpty);
        }
    }
    let row = Order {
        order_number,
        ..row
    };
    order::insert(&mut tx, &row).await?;
    order::insert_items(&mut tx, &items).await?;
    tx.commit().await?;

    recalculate_stats(pool, tenant_id, row.customer_id).await;
    Ok(OrderDetail { order: row, items })
}

/// Update an order. Line items are replaced wholesale: the old reservation is
/// treated as already returned when validating the new quantities, so shrinking
/// a line never trips a false insufficient-stock error.
pub async fn update(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
    data: OrderUpdate,
) -> Result<OrderDetail, OrderError> {
    let existing = order::find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| OrderError::NotFound(format!("Order {id} not found")))?;
    if !existing.status.is_editable() {
        return Err(OrderError::NotEditable(id));
    }
    let old_items = order::find_items(pool, id).await?;

    let tax_rate = data.tax_rate.unwrap_or(existing.tax_rate);
    let discount = data.discount.unwrap_or(existing.discount);
    let shipping_cost = data.shipping_cost.unwrap_or(existing.shipping_cost);
    money::validate_charges(tax_rate, discount, shipping_cost)?;

    let customer_id = match data.customer_id {
        Some(new_ref) => {
            if let Some(customer_id) = new_ref {
                require_customer(pool, tenant_id, customer_id).await?;
            }
            new_ref
        }
        None => existing.customer_id,
    };

    // Old reservation per stock unit, credited back during validation
    let mut reserved: HashMap<i64, i64> = HashMap::new();
    for item in &old_items {
        if let Some(unit_id) = item.stock_unit_id {
            *reserved.entry(unit_id).or_insert(0) += item.quantity;
        }
    }

    let (lines, requested, units) = match &data.items {
        Some(items) => {
            let (lines, units) = resolve_lines(pool, tenant_id, items).await?;
            let requested = requested_per_unit(&lines);
            check_availability(&requested, &units, &reserved)?;
            (Some(lines), requested, units)
        }
        None => (None, HashMap::new(), HashMap::new()),
    };

    let priced: Vec<(i64, f64)> = match &lines {
        Some(lines) => lines.iter().map(|l| (l.quantity, l.unit_price)).collect(),
        None => old_items.iter().map(|i| (i.quantity, i.unit_price)).collect(),
    };
    let totals = money::order_totals(&priced, tax_rate, discount, shipping_cost);

    let now = time::now_millis();
    let row = Order {
        customer_id,
        status: data.status.unwrap_or(existing.status),
        subtotal: totals.subtotal,
        tax_rate,
        tax_amount: totals.tax_amount,
        discount,
        shipping_cost,
        total: money::to_f64(
            money::to_decimal(totals.total) - money::to_decimal(existing.gift_card_amount),
        ),
        due_date: match data.due_date {
            Some(new_due) => new_due,
            None => existing.due_date,
        },
        notes: data.notes.clone().or(existing.notes.clone()),
        updated_at: now,
        ..existing.clone()
    };

    let mut tx = pool.begin().await?;
    let new_items = match lines {
        Some(lines) => {
            for (unit_id, qty) in &reserved {
                stock_unit::restore(&mut tx, tenant_id, *unit_id, *qty).await?;
            }
            for (unit_id, qty) in &requested {
                if !stock_unit::decrement_if_available(&mut tx, tenant_id, *unit_id, *qty).await? {
                    let unit = &units[unit_id];
                    let available: i64 = sqlx::query_scalar(
                        "SELECT quantity FROM stock_unit WHERE tenant_id = ? AND id = ?",
                    )
                    .bind(tenant_id)
                    .bind(unit_id)
                    .fetch_one(&mut *tx)
                    .await?;
                    return Err(OrderError::InsufficientStock {
                        name: unit.name.clone(),
                        sku: unit.sku.clone(),
                        available,
                    });
                }
            }
            order::delete_items(&mut tx, id).await?;
            let items = build_items(id, &lines);
            order::insert_items(&mut tx, &items).await?;
            items
        }
        None => old_items,
    };
    order::update_row(&mut tx, &row).await?;
    tx.commit().await?;

    recalculate_stats(pool, tenant_id, row.customer_id).await;
    if existing.customer_id != row.customer_id {
        recalculate_stats(pool, tenant_id, existing.customer_id).await;
    }
    Ok(OrderDetail {
        order: row,
        items: new_items,
    })
}

/// Delete an order, returning its stock reservation. Gift-card balance is not
/// restored; redeemed value stays spent.
pub async fn delete(pool: &SqlitePool, tenant_id: i64, id: i64) -> Result<(), OrderError> {
    let existing = order::find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| OrderError::NotFound(format!("Order {id} not found")))?;
    let items = order::find_items(pool, id).await?;

    let mut tx = pool.begin().await?;
    for item in &items {
        if let Some(unit_id) = item.stock_unit_id {
            stock_unit::restore(&mut tx, tenant_id, unit_id, item.quantity).await?;
        }
    }
    order::delete(&mut tx, tenant_id, id).await?;
    tx.commit().await?;

    recalculate_stats(pool, tenant_id, existing.customer_id).await;
    Ok(())
}

pub async fn set_payment_status(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
    payment_status: PaymentStatus,
) -> Result<Order, OrderError> {
    order::set_payment_status(pool, tenant_id, id, payment_status).await?;
    let row = order::find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| OrderError::NotFound(format!("Order {id} not found")))?;
    Ok(row)
}
