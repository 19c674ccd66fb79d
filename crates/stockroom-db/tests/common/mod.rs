//! Shared fixtures for the stockroom-db integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use stockroom_core::{
    Actor, InvalidationTag, Invalidator, Money, Product, Role, User, DEFAULT_MIN_STOCK,
};
use stockroom_db::{
    AdjustmentService, CatalogService, Database, DbConfig, TransactionFilter, TransactionPoster,
};

/// Remembers every tag it was handed.
#[derive(Debug, Default)]
pub struct RecordingInvalidator {
    tags: Mutex<Vec<InvalidationTag>>,
}

impl RecordingInvalidator {
    pub fn tags(&self) -> Vec<InvalidationTag> {
        self.tags.lock().unwrap().clone()
    }
}

impl Invalidator for RecordingInvalidator {
    fn invalidate(&self, tag: InvalidationTag) {
        self.tags.lock().unwrap().push(tag);
    }
}

/// A migrated in-memory store with one user per role.
pub struct Shop {
    pub db: Database,
    pub invalidator: Arc<RecordingInvalidator>,
    pub poster: TransactionPoster,
    pub adjustments: AdjustmentService,
    pub catalog: CatalogService,
    pub admin: Actor,
    pub manager: Actor,
    pub clerk: Actor,
}

impl Shop {
    pub async fn new() -> Shop {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Shop::with_database(db).await
    }

    pub async fn with_database(db: Database) -> Shop {
        let invalidator = Arc::new(RecordingInvalidator::default());
        let admin = add_user(&db, Role::Admin).await;
        let manager = add_user(&db, Role::Manager).await;
        let clerk = add_user(&db, Role::Clerk).await;

        Shop {
            poster: TransactionPoster::new(db.clone(), invalidator.clone()),
            adjustments: AdjustmentService::new(db.clone(), invalidator.clone()),
            catalog: CatalogService::new(db.clone(), invalidator.clone()),
            db,
            invalidator,
            admin,
            manager,
            clerk,
        }
    }

    /// Inserts a product with the given stock and unit cost.
    pub async fn product(&self, sku: &str, stock_qty: i64, cost_price: Money) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: format!("Product {}", sku),
            brand: None,
            category: None,
            barcode: None,
            cost_price,
            sale_price: Money::from_cents(1999),
            stock_qty,
            min_stock: DEFAULT_MIN_STOCK,
            is_archived: false,
            supplier_id: None,
            created_at: now,
            updated_at: now,
        };
        self.db.products().insert(&product).await.unwrap()
    }

    pub async fn reload(&self, product: &Product) -> Product {
        self.db.products().get_by_id(&product.id).await.unwrap().unwrap()
    }

    pub async fn transaction_count(&self) -> i64 {
        self.db.transactions().list(&TransactionFilter::default(), 1, 1).await.unwrap().page_info.total
    }
}

async fn add_user(db: &Database, role: Role) -> Actor {
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: format!("{} user", role),
        email: format!("{}@shop.test", role.as_str().to_lowercase()),
        role,
        created_at: Utc::now(),
    };
    db.users().insert(&user).await.unwrap().actor()
}
