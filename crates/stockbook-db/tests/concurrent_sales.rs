//! Concurrent sales against one file database must never oversell.

use std::time::Duration;

use stockbook_core::{OwnerId, PendingTransaction, ProductInput, TransactionKind};
use stockbook_db::{Database, DbConfig, DbError};

const INITIAL_STOCK: i64 = 5;
const ATTEMPTS: usize = 16;

async fn file_database(dir: &tempfile::TempDir) -> Database {
    let config = DbConfig::new(dir.path().join("stockbook.db"))
        .max_connections(8)
        .busy_timeout(Duration::from_secs(30));
    Database::new(config).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_never_oversell() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir).await;
    let store = db.scoped(OwnerId::new("owner-1").unwrap());

    let product = store
        .products()
        .insert(&ProductInput {
            code: "KS-01".to_string(),
            name: "Kopi Susu".to_string(),
            buying_price_cents: 1_000_000,
            selling_price_cents: 1_500_000,
            stock_quantity: INITIAL_STOCK,
            supplier: String::new(),
        })
        .await
        .unwrap();

    let mut handles = Vec::with_capacity(ATTEMPTS);
    for _ in 0..ATTEMPTS {
        let store = store.clone();
        let product = product.clone();
        handles.push(tokio::spawn(async move {
            // Every draft was valid against the stock it saw.
            let mut draft = PendingTransaction::new(TransactionKind::Sale);
            draft.add_sale_item(&product, 1).unwrap();
            store.transactions().commit(draft).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(DbError::InsufficientStock { requested, .. }) => assert_eq!(requested, 1),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let remaining = store
        .products()
        .get(&product.id)
        .await
        .unwrap()
        .unwrap()
        .stock_quantity;

    assert_eq!(accepted, INITIAL_STOCK);
    assert_eq!(remaining, 0);

    let sales = store
        .transactions()
        .list_by_kind(TransactionKind::Sale)
        .await
        .unwrap();
    assert_eq!(sales.len() as i64, accepted);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_multi_line_sales_stay_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir).await;
    let store = db.scoped(OwnerId::new("owner-1").unwrap());

    let mut products = Vec::new();
    for (code, stock) in [("KS-01", 6), ("GA-01", 3)] {
        products.push(
            store
                .products()
                .insert(&ProductInput {
                    code: code.to_string(),
                    name: format!("Product {}", code),
                    buying_price_cents: 500_000,
                    selling_price_cents: 800_000,
                    stock_quantity: stock,
                    supplier: String::new(),
                })
                .await
                .unwrap(),
        );
    }

    let mut handles = Vec::new();
    for _ in 0..ATTEMPTS {
        let store = store.clone();
        let products = products.clone();
        handles.push(tokio::spawn(async move {
            let mut draft = PendingTransaction::new(TransactionKind::Sale);
            draft.add_item(&products[0], 2).unwrap();
            draft.add_item(&products[1], 1).unwrap();
            store.transactions().commit(draft).await
        }));
    }

    let mut accepted: i64 = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    let kopi = store.products().get(&products[0].id).await.unwrap().unwrap();
    let gula = store.products().get(&products[1].id).await.unwrap().unwrap();

    // Each accepted sale took 2 + 1; a rejected one took nothing.
    assert!(accepted <= 3);
    assert_eq!(kopi.stock_quantity, 6 - 2 * accepted);
    assert_eq!(gula.stock_quantity, 3 - accepted);
    assert!(kopi.stock_quantity >= 0 && gula.stock_quantity >= 0);

    db.close().await;
}
