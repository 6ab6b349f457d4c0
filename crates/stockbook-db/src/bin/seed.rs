//! # Seed Data Generator
//!
//! Populates a store with suppliers, products and a first restock for
//! development.
//!
//! ## Usage
//! ```bash
//! # 50 products for the default owner
//! cargo run -p stockbook-db --bin seed
//!
//! # Custom amount, owner and database
//! cargo run -p stockbook-db --bin seed -- --count 200 --owner uid-123 --db ./data/stockbook.db
//! ```
//!
//! Without `--db` the path comes from `STOCKBOOK_DB_PATH`.
//!
//! ## Generated Data
//! - One supplier per category
//! - Products `{CATEGORY}-{INDEX}` priced at a 30% markup over a varied
//!   buying price
//! - One restock of every product, committed through the ledger

use std::env;
use std::time::Instant;

use stockbook_core::pricing::recommended_price;
use stockbook_core::report::{InventoryReport, InventorySort, RestockReport, StockFilter};
use stockbook_core::{
    CoreResult, Money, OwnerId, PendingTransaction, ProductInput, Rate, SupplierInput, TransactionKind,
    MAX_DRAFT_ITEMS,
};
use stockbook_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_OWNER: &str = "dev-owner";
const DEFAULT_COUNT: usize = 50;

/// Categories: (code, supplier, product names)
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "MNM",
        "CV Segar Abadi",
        &[
            "Teh Botol",
            "Kopi Susu Gula Aren",
            "Air Mineral 600ml",
            "Susu UHT Coklat",
            "Jus Jeruk",
            "Minuman Isotonik",
        ],
    ),
    (
        "SNK",
        "PT Camilan Nusantara",
        &[
            "Keripik Singkong",
            "Kacang Atom",
            "Wafer Coklat",
            "Biskuit Kelapa",
            "Rempeyek",
            "Kerupuk Udang",
        ],
    ),
    (
        "SMB",
        "Toko Grosir Sentosa",
        &[
            "Beras Premium 5kg",
            "Gula Pasir 1kg",
            "Minyak Goreng 2L",
            "Tepung Terigu 1kg",
            "Telur Ayam 1kg",
            "Kecap Manis",
        ],
    ),
    (
        "RT",
        "UD Bersih Jaya",
        &[
            "Sabun Cuci Piring",
            "Deterjen Bubuk",
            "Sabun Mandi",
            "Pasta Gigi",
            "Tisu Gulung",
            "Pewangi Pakaian",
        ],
    ),
];

/// Markup used for generated selling prices.
const SEED_MARKUP: Rate = Rate::from_whole_percent(30);

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stockbook=debug,sqlx=warn")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut owner = DEFAULT_OWNER.to_string();
    let mut config = DbConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config = DbConfig::new(&args[i + 1]);
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>     Number of products to generate (default: 50)");
                println!("  -o, --owner <ID>    Owner the data belongs to (default: dev-owner)");
                println!("  -d, --db <PATH>     Database file path (default: $STOCKBOOK_DB_PATH)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let owner = OwnerId::new(owner)?;
    let db = Database::new(config).await?;
    let store = db.scoped(owner.clone());

    info!(owner = %owner, count, "Seeding store");

    let existing = store.products().count().await?;
    if existing > 0 {
        warn!(existing, "Owner already has products, skipping seed");
        return Ok(());
    }

    let start = Instant::now();

    // Suppliers
    for (code, supplier, _) in CATEGORIES {
        store
            .suppliers()
            .insert(&SupplierInput {
                code: format!("SUP-{}", code),
                name: supplier.to_string(),
                contact: String::new(),
            })
            .await?;
    }

    // Products
    let mut products = Vec::with_capacity(count);
    let names = CATEGORIES
        .iter()
        .flat_map(|(code, supplier, names)| names.iter().map(move |name| (*code, *supplier, *name)))
        .cycle()
        .take(count);

    for (seed, (category, supplier, name)) in names.enumerate() {
        let input = generate_product(category, supplier, name, seed)?;
        match store.products().insert(&input).await {
            Ok(product) => products.push(product),
            Err(e) => warn!(code = %input.code, error = %e, "Failed to insert product"),
        }
    }

    info!(generated = products.len(), "Products inserted");

    // First restock, split so no draft exceeds the line limit
    for chunk in products.chunks(MAX_DRAFT_ITEMS) {
        let mut draft = PendingTransaction::new(TransactionKind::Restock);
        for (idx, product) in chunk.iter().enumerate() {
            draft.add_item(product, 10 + (idx % 15) as i64)?;
        }
        store.transactions().commit(draft).await?;
    }

    let restocks = store
        .transactions()
        .list_by_kind(TransactionKind::Restock)
        .await?;
    let restock_report = RestockReport::from_transactions(&restocks);

    let inventory = InventoryReport::build(
        &store.products().list().await?,
        InventorySort::Value,
        StockFilter::All,
    );

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        restocks = restock_report.transaction_count,
        items = restock_report.total_items,
        cost = %restock_report.total_cost,
        stock_value = %inventory.total_value,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

/// Generates the form values for one product.
fn generate_product(
    category: &str,
    supplier: &str,
    name: &str,
    seed: usize,
) -> CoreResult<ProductInput> {
    // Rp 2.000 - Rp 51.000, in whole Rupiah
    let buying = Money::from_major_minor(2_000 + ((seed * 7_919) % 49_000) as i64, 0);
    let selling = recommended_price(buying, SEED_MARKUP)?;

    Ok(ProductInput {
        code: format!("{}-{:04}", category, seed),
        name: name.to_string(),
        buying_price_cents: buying.cents(),
        selling_price_cents: selling.cents(),
        stock_quantity: (seed % 6) as i64,
        supplier: supplier.to_string(),
    })
}
