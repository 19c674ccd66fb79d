//! Stock adjustments and role-gated catalog maintenance.

mod common;

use common::Shop;
use stockroom_core::validation::{LineItemDraft, TransactionDraft};
use stockroom_core::{ErrorCode, InvalidationTag, Money, PostingError, StockPosition, TransactionKind};
use stockroom_db::{CatalogError, DbError};

// =============================================================================
// Adjustments
// =============================================================================

#[tokio::test]
async fn test_adjustment_moves_stock_not_cost() {
    let shop = Shop::new().await;
    let p = shop.product("ADJ-1", 10, Money::from_cents(500)).await;

    let adjustment = shop
        .adjustments
        .record(Some(&shop.manager), &p.id, -3, "Broken in transit")
        .await
        .unwrap();

    assert_eq!(adjustment.user_id, shop.manager.user_id);
    assert_eq!(
        shop.reload(&p).await.position(),
        StockPosition::new(7, Money::from_cents(500))
    );

    let history = shop.db.adjustments().list_for_product(&p.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reason, "Broken in transit");
    assert_eq!(
        shop.invalidator.tags(),
        vec![InvalidationTag::Products, InvalidationTag::Reports]
    );
}

#[tokio::test]
async fn test_clerk_cannot_adjust() {
    let shop = Shop::new().await;
    let p = shop.product("ADJ-1", 10, Money::from_cents(500)).await;

    let err = shop
        .adjustments
        .record(Some(&shop.clerk), &p.id, 5, "Recount")
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.to_string(), "Unauthorized. Clerks cannot adjust stock.");
    assert_eq!(shop.reload(&p).await.stock_qty, 10);
}

#[tokio::test]
async fn test_invalid_adjustment() {
    let shop = Shop::new().await;
    let p = shop.product("ADJ-1", 10, Money::from_cents(500)).await;

    let err = shop
        .adjustments
        .record(Some(&shop.admin), &p.id, 0, "  ")
        .await
        .unwrap_err();
    match err {
        PostingError::Validation { issues } => assert_eq!(issues.len(), 2),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(shop.db.adjustments().count_for_product(&p.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_adjusting_unknown_product_writes_nothing() {
    let shop = Shop::new().await;

    let err = shop
        .adjustments
        .record(Some(&shop.admin), "missing", 2, "Found a box")
        .await
        .unwrap_err();

    assert!(matches!(err, PostingError::Persistence(_)));
    assert!(shop.invalidator.tags().is_empty());
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_delete_guard() {
    let shop = Shop::new().await;
    let sold = shop.product("DEL-SOLD", 10, Money::from_cents(500)).await;
    let adjusted = shop.product("DEL-ADJ", 10, Money::from_cents(500)).await;
    let untouched = shop.product("DEL-FREE", 0, Money::zero()).await;

    shop.poster
        .post(
            Some(&shop.clerk),
            TransactionDraft::new(
                TransactionKind::Sale,
                vec![LineItemDraft::new(&sold.id, 1, Money::from_cents(1999))],
            ),
        )
        .await
        .unwrap();
    shop.adjustments
        .record(Some(&shop.manager), &adjusted.id, -1, "Expired")
        .await
        .unwrap();

    let err = shop.catalog.delete(Some(&shop.admin), &sold.id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot delete product with existing sales or purchases. Please archive it instead."
    );

    let err = shop.catalog.delete(Some(&shop.admin), &adjusted.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::Store(DbError::HasDependents { .. })));
    assert_eq!(
        err.to_string(),
        "Cannot delete product with inventory adjustments. Please archive it instead."
    );

    shop.catalog.delete(Some(&shop.admin), &untouched.id).await.unwrap();
    assert!(shop.db.products().get_by_id(&untouched.id).await.unwrap().is_none());
    assert!(shop.db.products().get_by_id(&sold.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_archive_requires_manager() {
    let shop = Shop::new().await;
    let p = shop.product("ARCH-1", 10, Money::from_cents(500)).await;

    let err = shop.catalog.archive(Some(&shop.clerk), &p.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::Denied(PostingError::Forbidden { .. })));
    assert!(matches!(
        shop.catalog.archive(None, &p.id).await,
        Err(CatalogError::Denied(PostingError::Unauthenticated))
    ));

    shop.catalog.archive(Some(&shop.manager), &p.id).await.unwrap();
    assert!(shop.reload(&p).await.is_archived);

    shop.catalog.unarchive(Some(&shop.admin), &p.id).await.unwrap();
    assert!(!shop.reload(&p).await.is_archived);
}

#[tokio::test]
async fn test_archived_product_still_posts() {
    let shop = Shop::new().await;
    let p = shop.product("ARCH-2", 10, Money::from_cents(500)).await;
    shop.catalog.archive(Some(&shop.manager), &p.id).await.unwrap();

    shop.poster
        .post(
            Some(&shop.clerk),
            TransactionDraft::new(
                TransactionKind::Sale,
                vec![LineItemDraft::new(&p.id, 2, Money::from_cents(1999))],
            ),
        )
        .await
        .unwrap();
    assert_eq!(shop.reload(&p).await.stock_qty, 8);
}
