//! Segmentation integration tests: first-match-wins assignment, membership
//! counts and bulk recalculation after segment definition changes.

mod common;

use std::time::Duration;

use backoffice_server::db::models::{OrderCreate, SegmentCreate, SegmentUpdate};
use backoffice_server::db::repository::{customer, segment};
use backoffice_server::orders;
use backoffice_server::plan::PlanTier;
use backoffice_server::segmentation::{
    assign_segment, recalculate_all, AmountRange, CountRange, SegmentCriteria,
};

use common::{item, seed_customer, seed_stock, seed_tenant, setup_pool};

fn spend_at_least(min: f64) -> SegmentCriteria {
    SegmentCriteria {
        total_spent: Some(AmountRange {
            min: Some(min),
            max: None,
        }),
        ..Default::default()
    }
}

fn orders_at_least(min: i64) -> SegmentCriteria {
    SegmentCriteria {
        total_orders: Some(CountRange {
            min: Some(min),
            max: None,
        }),
        ..Default::default()
    }
}

async fn create_segment(
    pool: &sqlx::SqlitePool,
    tenant_id: i64,
    name: &str,
    criteria: SegmentCriteria,
) -> backoffice_server::db::models::Segment {
    // segments created in the same millisecond would tie on created_at
    tokio::time::sleep(Duration::from_millis(5)).await;
    segment::create(
        pool,
        tenant_id,
        SegmentCreate {
            name: name.to_string(),
            criteria,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_newest_matching_segment_wins() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let buyer = seed_customer(&pool, tenant.id, "Ana", None).await;
    customer::write_stats(&pool, tenant.id, buyer.id, 5, 600.0, Some(1))
        .await
        .unwrap();

    let older = create_segment(&pool, tenant.id, "Big spenders", spend_at_least(500.0)).await;
    let newer = create_segment(&pool, tenant.id, "Loyal", orders_at_least(3)).await;

    // both match; the newer definition takes the customer
    let assigned = assign_segment(&pool, tenant.id, buyer.id).await.unwrap();
    assert_eq!(assigned, Some(newer.id));

    let older = segment::find_by_id(&pool, tenant.id, older.id)
        .await
        .unwrap()
        .unwrap();
    let newer = segment::find_by_id(&pool, tenant.id, newer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(older.customer_count, 0);
    assert_eq!(newer.customer_count, 1);
}

#[tokio::test]
async fn test_no_match_clears_membership_and_recounts() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let buyer = seed_customer(&pool, tenant.id, "Ana", None).await;
    customer::write_stats(&pool, tenant.id, buyer.id, 10, 900.0, Some(1))
        .await
        .unwrap();

    let seg = create_segment(&pool, tenant.id, "Big spenders", spend_at_least(500.0)).await;
    assert_eq!(
        assign_segment(&pool, tenant.id, buyer.id).await.unwrap(),
        Some(seg.id)
    );

    // the customer no longer qualifies after a stats rewrite
    customer::write_stats(&pool, tenant.id, buyer.id, 0, 0.0, None)
        .await
        .unwrap();
    assert_eq!(assign_segment(&pool, tenant.id, buyer.id).await.unwrap(), None);

    let record = customer::find_by_id(&pool, tenant.id, buyer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.segment_id, None);
    let seg = segment::find_by_id(&pool, tenant.id, seg.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seg.customer_count, 0);
}

#[tokio::test]
async fn test_recalculate_all_after_criteria_change() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let low = seed_customer(&pool, tenant.id, "Low", None).await;
    let high = seed_customer(&pool, tenant.id, "High", None).await;
    customer::write_stats(&pool, tenant.id, low.id, 1, 50.0, Some(1))
        .await
        .unwrap();
    customer::write_stats(&pool, tenant.id, high.id, 1, 800.0, Some(1))
        .await
        .unwrap();

    let seg = create_segment(&pool, tenant.id, "Spenders", spend_at_least(500.0)).await;
    let evaluated = recalculate_all(&pool, tenant.id).await.unwrap();
    assert_eq!(evaluated, 2);
    let seg_row = segment::find_by_id(&pool, tenant.id, seg.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seg_row.customer_count, 1);

    // loosen the threshold; both customers now qualify
    segment::update(
        &pool,
        tenant.id,
        seg.id,
        SegmentUpdate {
            name: None,
            criteria: Some(spend_at_least(10.0)),
        },
    )
    .await
    .unwrap();
    recalculate_all(&pool, tenant.id).await.unwrap();
    let seg_row = segment::find_by_id(&pool, tenant.id, seg.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seg_row.customer_count, 2);
}

#[tokio::test]
async fn test_tag_criteria_match_any_tag() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Business).await;
    let vip = customer::create(
        &pool,
        tenant.id,
        backoffice_server::db::models::CustomerCreate {
            name: "Vip".to_string(),
            email: None,
            phone: None,
            city: None,
            tags: Some(vec!["vip".to_string()]),
        },
    )
    .await
    .unwrap();
    let retail = seed_customer(&pool, tenant.id, "Retail", None).await;

    let seg = create_segment(
        &pool,
        tenant.id,
        "VIPs",
        SegmentCriteria {
            tags: Some(vec!["vip".to_string(), "wholesale".to_string()]),
            ..Default::default()
        },
    )
    .await;

    assert_eq!(
        assign_segment(&pool, tenant.id, vip.id).await.unwrap(),
        Some(seg.id)
    );
    assert_eq!(assign_segment(&pool, tenant.id, retail.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_order_creation_drives_segment_assignment() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let unit = seed_stock(&pool, tenant.id, "SKU-1", 10.0, 100, true).await;
    let buyer = seed_customer(&pool, tenant.id, "Ana", None).await;
    let seg = create_segment(&pool, tenant.id, "Has ordered", orders_at_least(1)).await;

    let record = customer::find_by_id(&pool, tenant.id, buyer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.segment_id, None);

    // the post-commit statistics pass re-runs assignment
    orders::create(
        &pool,
        tenant.id,
        PlanTier::Starter,
        OrderCreate {
            items: vec![item(unit.id, 1)],
            customer_id: Some(buyer.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let record = customer::find_by_id(&pool, tenant.id, buyer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.segment_id, Some(seg.id));
    let seg_row = segment::find_by_id(&pool, tenant.id, seg.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seg_row.customer_count, 1);
}
