//! Concurrent postings against one product on a file-backed, multi-connection
//! store. Lost updates would show up as missing stock or a skewed cost.

mod common;

use std::path::PathBuf;
use std::time::Duration;

use uuid::Uuid;

use common::Shop;
use stockroom_core::validation::{LineItemDraft, TransactionDraft};
use stockroom_core::{Money, StockPosition, TransactionKind};
use stockroom_db::{Database, DbConfig};

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        TempDb {
            path: std::env::temp_dir().join(format!("stockroom-test-{}.db", Uuid::new_v4())),
        }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

async fn file_shop(temp: &TempDb) -> Shop {
    let db = Database::new(
        DbConfig::new(&temp.path)
            .max_connections(8)
            .busy_timeout(Duration::from_secs(30)),
    )
    .await
    .unwrap();
    Shop::with_database(db).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_purchases_match_a_sequential_order() {
    let temp = TempDb::new();
    let shop = file_shop(&temp).await;

    // Purchases only, from empty stock: every sequential order ends at
    // Σ qty units costing Σ value / Σ qty, so any lost update is visible.
    let batches: Vec<(i64, i64)> = vec![(3, 400), (5, 650), (2, 1000), (7, 300), (1, 1000), (4, 525)];
    let total_qty: i64 = batches.iter().map(|(q, _)| q).sum();
    let total_value: i64 = batches.iter().map(|(q, c)| q * c).sum();
    let expected_cost = Money::from_cents(total_value)
        .checked_div_quantity(total_qty)
        .unwrap();

    for round in 0..5 {
        let p = shop.product(&format!("RACE-{}", round), 0, Money::zero()).await;

        let mut handles = Vec::new();
        for (qty, cost_cents) in batches.clone() {
            let poster = shop.poster.clone();
            let manager = shop.manager.clone();
            let product_id = p.id.clone();
            handles.push(tokio::spawn(async move {
                poster
                    .post(
                        Some(&manager),
                        TransactionDraft::new(
                            TransactionKind::Purchase,
                            vec![LineItemDraft::new(product_id, qty, Money::from_cents(cost_cents))],
                        ),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let after = shop.reload(&p).await;
        assert_eq!(after.stock_qty, total_qty, "round {}", round);
        assert_eq!(
            after.cost_price.round_to_cents(),
            expected_cost.round_to_cents(),
            "round {}",
            round
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sales_lose_no_units() {
    let temp = TempDb::new();
    let shop = file_shop(&temp).await;
    let p = shop.product("RACE-SALE", 100, Money::from_cents(250)).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let poster = shop.poster.clone();
        let clerk = shop.clerk.clone();
        let product_id = p.id.clone();
        handles.push(tokio::spawn(async move {
            poster
                .post(
                    Some(&clerk),
                    TransactionDraft::new(
                        TransactionKind::Sale,
                        vec![LineItemDraft::new(product_id, 3, Money::from_cents(499))],
                    ),
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(
        shop.reload(&p).await.position(),
        StockPosition::new(100 - 60, Money::from_cents(250))
    );
    assert_eq!(shop.transaction_count().await, 20);
}
