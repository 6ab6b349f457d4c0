//! # Catalog Views
//!
//! Search and sort over product and supplier lists already fetched for the
//! owner. The store only filters by owner; everything the list pages do on
//! top of that happens here.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use ts_rs::TS;

use crate::types::{Product, Supplier};

/// Column a product list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortField {
    Name,
    Stock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Products whose code, name or supplier contains `term`, ignoring case.
///
/// An empty (or whitespace) term matches everything.
///
/// ```text
/// "kopi" ──► KS-01 Kopi Susu ✓   TM-02 Teh Manis ✗   (supplier "Kopi Jaya") ✓
/// ```
pub fn search_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let term = term.trim().to_lowercase();
    products
        .iter()
        .filter(|p| {
            term.is_empty()
                || contains_ci(&p.code, &term)
                || contains_ci(&p.name, &term)
                || contains_ci(&p.supplier, &term)
        })
        .collect()
}

/// Sorts products in place. Name comparison ignores case; ties keep their
/// current order.
pub fn sort_products(products: &mut [Product], field: ProductSortField, direction: SortDirection) {
    products.sort_by(|a, b| {
        let ordering = match field {
            ProductSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            ProductSortField::Stock => a.stock_quantity.cmp(&b.stock_quantity),
        };
        direction.apply(ordering)
    });
}

/// Suppliers whose code, name or contact contains `term`, ignoring case.
pub fn search_suppliers<'a>(suppliers: &'a [Supplier], term: &str) -> Vec<&'a Supplier> {
    let term = term.trim().to_lowercase();
    suppliers
        .iter()
        .filter(|s| {
            term.is_empty()
                || contains_ci(&s.code, &term)
                || contains_ci(&s.name, &term)
                || contains_ci(&s.contact, &term)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(code: &str, name: &str, supplier: &str, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: code.to_lowercase(),
            owner_id: "owner-1".to_string(),
            code: code.to_string(),
            name: name.to_string(),
            buying_price_cents: 100,
            selling_price_cents: 200,
            stock_quantity: stock,
            supplier: supplier.to_string(),
            last_restock_at: None,
            last_sale_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("KS-01", "Kopi Susu", "Toko Sumber", 12),
            product("TM-02", "Teh Manis", "Kopi Jaya", 3),
            product("AR-03", "air mineral", "Toko Sumber", 40),
        ]
    }

    #[test]
    fn test_search_products_matches_any_field() {
        let products = catalog();

        let codes = |found: Vec<&Product>| found.iter().map(|p| p.code.clone()).collect::<Vec<_>>();

        assert_eq!(codes(search_products(&products, "KOPI")), vec!["KS-01", "TM-02"]);
        assert_eq!(codes(search_products(&products, "ar-0")), vec!["AR-03"]);
        assert_eq!(search_products(&products, "  ").len(), 3);
        assert!(search_products(&products, "roti").is_empty());
    }

    #[test]
    fn test_sort_products_by_name_ignores_case() {
        let mut products = catalog();
        sort_products(&mut products, ProductSortField::Name, SortDirection::Asc);
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["air mineral", "Kopi Susu", "Teh Manis"]);
    }

    #[test]
    fn test_sort_products_by_stock_desc() {
        let mut products = catalog();
        sort_products(&mut products, ProductSortField::Stock, SortDirection::Desc);
        let stock: Vec<i64> = products.iter().map(|p| p.stock_quantity).collect();
        assert_eq!(stock, vec![40, 12, 3]);
    }

    #[test]
    fn test_search_suppliers() {
        let suppliers = vec![
            Supplier {
                id: "s1".to_string(),
                owner_id: "owner-1".to_string(),
                code: "SUP-1".to_string(),
                name: "Toko Sumber".to_string(),
                contact: "0812-555".to_string(),
            },
            Supplier {
                id: "s2".to_string(),
                owner_id: "owner-1".to_string(),
                code: "SUP-2".to_string(),
                name: "Kopi Jaya".to_string(),
                contact: "jaya@example.com".to_string(),
            },
        ];

        assert_eq!(search_suppliers(&suppliers, "0812").len(), 1);
        assert_eq!(search_suppliers(&suppliers, "sup-").len(), 2);
        assert_eq!(search_suppliers(&suppliers, "JAYA")[0].id, "s2");
    }
}
