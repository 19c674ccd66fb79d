//! # Seed Data Generator
//!
//! Populates a database with a small demo shop and runs one purchase and
//! one sale through the poster.
//!
//! ## Usage
//! ```bash
//! # Uses STOCKROOM_DATABASE_PATH or ./stockroom.db
//! cargo run -p stockroom-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/shop.db
//! ```
//!
//! ## Generated Data
//! - One user per role (ADMIN, MANAGER, CLERK)
//! - One supplier and one customer
//! - A handful of products across a few categories
//! - PURCHASE (manager) restocking every product, then a SALE (clerk)

use std::env;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use stockroom_core::invalidation::NoopInvalidator;
use stockroom_core::validation::{LineItemDraft, TransactionDraft};
use stockroom_core::{
    Customer, Money, Product, Role, Supplier, TransactionKind, User, DEFAULT_MIN_STOCK,
};
use stockroom_db::{Database, DbConfig, TransactionPoster};

/// (sku, name, category, sale price cents, purchase cost cents, purchase qty)
const PRODUCTS: &[(&str, &str, &str, i64, i64, i64)] = &[
    ("BEV-COKE-330", "Coca-Cola 330ml", "Beverages", 199, 85, 48),
    ("BEV-WATER-500", "Still Water 500ml", "Beverages", 129, 40, 60),
    ("SNK-CHIPS-150", "Sea Salt Chips 150g", "Snacks", 349, 160, 24),
    ("DRY-MILK-1L", "Whole Milk 1L", "Dairy", 249, 130, 30),
    ("GRO-PASTA-500", "Penne 500g", "Grocery", 189, 70, 40),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = DbConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $STOCKROOM_DATABASE_PATH or ./stockroom.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockroom Seed Data Generator");
    println!("================================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config).await?;
    if !db.health_check().await {
        return Err("database did not answer a health check".into());
    }
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.users().count().await? > 0 {
        println!("⚠ Database already has users");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    let now = Utc::now();

    let mut users = Vec::new();
    for role in Role::ALL {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: format!("Demo {}", role.as_str().to_lowercase()),
            email: format!("{}@stockroom.test", role.as_str().to_lowercase()),
            role,
            created_at: now,
        };
        db.users().insert(&user).await?;
        users.push(user);
    }
    println!("✓ Created {} users", users.len());

    let supplier = db
        .suppliers()
        .insert(&Supplier {
            id: Uuid::new_v4().to_string(),
            name: "Northside Wholesale".to_string(),
            contact_person: Some("Sam Rivera".to_string()),
            email: Some("orders@northside.test".to_string()),
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        })
        .await?;

    let customer = db
        .customers()
        .insert(&Customer {
            id: Uuid::new_v4().to_string(),
            name: "Walk-in Regular".to_string(),
            email: None,
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    println!("✓ Created supplier and customer");

    let mut products = Vec::new();
    for (sku, name, category, sale_cents, _, _) in PRODUCTS {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            brand: None,
            category: Some(category.to_string()),
            barcode: None,
            cost_price: Money::zero(),
            sale_price: Money::from_cents(*sale_cents),
            stock_qty: 0,
            min_stock: DEFAULT_MIN_STOCK,
            is_archived: false,
            supplier_id: Some(supplier.id.clone()),
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
        products.push(product);
    }
    println!("✓ Created {} products", products.len());

    let poster = TransactionPoster::new(db.clone(), Arc::new(NoopInvalidator));
    let manager = users
        .iter()
        .find(|u| u.role == Role::Manager)
        .map(User::actor)
        .ok_or("manager missing")?;
    let clerk = users
        .iter()
        .find(|u| u.role == Role::Clerk)
        .map(User::actor)
        .ok_or("clerk missing")?;

    let purchase_lines = products
        .iter()
        .zip(PRODUCTS)
        .map(|(p, (_, _, _, _, cost_cents, qty))| {
            LineItemDraft::new(p.id.clone(), *qty, Money::from_cents(*cost_cents))
        })
        .collect();
    let purchase = poster
        .post(
            Some(&manager),
            TransactionDraft::new(TransactionKind::Purchase, purchase_lines)
                .with_supplier(supplier.id.clone()),
        )
        .await?;
    println!();
    println!("✓ Posted purchase {} ({})", purchase.transaction.id, purchase.transaction.total);

    // Two lines for the same product exercise the in-transaction fold.
    let sale = poster
        .post(
            Some(&clerk),
            TransactionDraft::new(
                TransactionKind::Sale,
                vec![
                    LineItemDraft::new(products[0].id.clone(), 6, products[0].sale_price),
                    LineItemDraft::new(products[2].id.clone(), 2, products[2].sale_price)
                        .with_discount(Money::new(Decimal::new(50, 2))),
                    LineItemDraft::new(products[0].id.clone(), 2, products[0].sale_price),
                ],
            )
            .with_customer(customer.id.clone()),
        )
        .await?;
    println!("✓ Posted sale {} ({})", sale.transaction.id, sale.transaction.total);

    println!();
    println!("Stock after seeding:");
    for product in &products {
        if let Some(p) = db.products().get_by_id(&product.id).await? {
            println!(
                "  {:<14} {:>4} units @ {} (sells {})",
                p.sku, p.stock_qty, p.cost_price, p.sale_price
            );
        }
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
