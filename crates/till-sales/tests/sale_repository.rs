//! Sale repository behavior against in-memory SQLite.

#![cfg(not(target_arch = "wasm32"))]

use till_db::{params, Db};
use till_sales::{
    OrderDir, Paging, Sale, SaleDetail, SaleRepository, SortColumn, SqlSaleRepository,
};
use uuid::Uuid;

fn repo() -> SqlSaleRepository {
    let repo = SqlSaleRepository::new(Db::open_default().unwrap());
    repo.migrate().unwrap();
    repo
}

fn sale(total: f64, note: &str) -> Sale {
    Sale {
        total,
        total_payment: total,
        payment_type: "cash".to_string(),
        note: note.to_string(),
        ..Sale::default()
    }
}

#[test]
fn test_migrate_is_repeatable() {
    let repo = repo();
    repo.migrate().unwrap();
    assert_eq!(repo.count_all().unwrap(), 0);
}

#[test]
fn test_insert_assigns_fresh_id() {
    let repo = repo();
    let supplied = Uuid::new_v4();

    let stored = repo.insert(Sale::with_uid(supplied)).unwrap();

    assert_ne!(stored.uid, supplied);
    assert!(stored.created.is_some());
    assert!(repo.exists(stored.uid).unwrap());
    assert!(!repo.exists(supplied).unwrap());
}

#[test]
fn test_get_round_trips_fields() {
    let repo = repo();
    let mut input = sale(42.5, "table 4");
    input.customer = Uuid::new_v4();
    input.discount = 10.0;
    input.discount_type = till_sales::DiscountType::Percentage;

    let stored = repo.insert(input).unwrap();
    let fetched = repo.get(stored.uid).unwrap();

    assert_eq!(fetched.uid, stored.uid);
    assert_eq!(fetched.customer, stored.customer);
    assert_eq!(fetched.total, 42.5);
    assert_eq!(fetched.discount_type, till_sales::DiscountType::Percentage);
    assert_eq!(fetched.note, "table 4");
    assert!(fetched.created.is_some());
    assert!(fetched.updated.is_none());
}

#[test]
fn test_get_unknown_is_not_found() {
    let err = repo().get(Uuid::new_v4()).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code(), till_api::StatusCode::NOT_FOUND);
}

#[test]
fn test_get_composes_only_own_detail() {
    let repo = repo();
    let (p1, p2, p3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let mut first = sale(5.0, "");
    first.detail = vec![SaleDetail::new(p1, 1, 2.0), SaleDetail::new(p2, 3, 1.0)];
    let mut second = sale(9.0, "");
    second.detail = vec![SaleDetail::new(p3, 1, 9.0)];

    let first = repo.insert(first).unwrap();
    let second = repo.insert(second).unwrap();

    let fetched = repo.get(first.uid).unwrap();
    let products: Vec<Uuid> = fetched.detail.iter().map(|l| l.product).collect();
    assert_eq!(products, vec![p1, p2]);
    assert!(fetched.detail.iter().all(|l| l.uid == first.uid));
    assert_eq!(fetched.detail[1].subtotal, 3.0);

    assert_eq!(repo.get_detail(second.uid).unwrap().len(), 1);
}

#[test]
fn test_list_default_page_length() {
    let repo = repo();
    for i in 0..30 {
        repo.insert(sale(i as f64, "")).unwrap();
    }

    assert_eq!(repo.count_all().unwrap(), 30);
    assert_eq!(repo.list(&Paging::new(0)).unwrap().len(), 25);
    assert_eq!(repo.list(&Paging::new(5)).unwrap().len(), 5);
    assert_eq!(repo.list(&Paging::new(-3)).unwrap().len(), 25);
}

#[test]
fn test_list_custom_default_length() {
    let repo = repo().with_default_length(10);
    for i in 0..12 {
        repo.insert(sale(i as f64, "")).unwrap();
    }
    assert_eq!(repo.list(&Paging::new(0)).unwrap().len(), 10);
}

#[test]
fn test_list_offset_and_order() {
    let repo = repo();
    for total in [3.0, 1.0, 2.0] {
        repo.insert(sale(total, "")).unwrap();
    }

    let paging = Paging {
        start: 1,
        length: 5,
        order: Some(SortColumn::Total),
        order_dir: OrderDir::Desc,
        ..Paging::default()
    };
    let totals: Vec<f64> = repo.list(&paging).unwrap().iter().map(|s| s.total).collect();
    assert_eq!(totals, vec![2.0, 1.0]);
}

#[test]
fn test_list_keyword_filter() {
    let repo = repo();
    repo.insert(sale(1.0, "birthday 50% off")).unwrap();
    repo.insert(sale(2.0, "regular")).unwrap();
    repo.insert(sale(3.0, "500 units")).unwrap();

    let mut paging = Paging::new(10);
    paging.keyword = "50%".to_string();
    let found = repo.list(&paging).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].note, "birthday 50% off");

    paging.keyword = "CASH".to_string();
    assert_eq!(repo.list(&paging).unwrap().len(), 3);
}

#[test]
fn test_list_includes_detail() {
    let repo = repo();
    let mut input = sale(4.0, "");
    input.detail = vec![SaleDetail::new(Uuid::new_v4(), 2, 2.0)];
    repo.insert(input).unwrap();

    let listed = repo.list(&Paging::new(0)).unwrap();
    assert_eq!(listed[0].detail.len(), 1);
}

#[test]
fn test_update_overwrites_fields() {
    let repo = repo();
    let mut stored = repo.insert(sale(1.0, "before")).unwrap();

    stored.note = "after".to_string();
    stored.total = 8.0;
    let updated = repo.update(&stored).unwrap();
    assert!(updated.updated.is_some());

    let fetched = repo.get(stored.uid).unwrap();
    assert_eq!(fetched.note, "after");
    assert_eq!(fetched.total, 8.0);
    assert!(fetched.updated.is_some());
}

#[test]
fn test_update_returns_stored_aggregate() {
    let repo = repo();
    let mut input = sale(6.0, "before");
    input.detail = vec![SaleDetail::new(Uuid::new_v4(), 2, 3.0)];
    let stored = repo.insert(input).unwrap();

    // A body carrying only the changed field, as a client would send it.
    let change = Sale {
        uid: stored.uid,
        note: "after".to_string(),
        ..Sale::default()
    };
    let updated = repo.update(&change).unwrap();

    assert_eq!(updated.note, "after");
    assert_eq!(updated.detail.len(), 1);
    assert_eq!(updated.detail[0].uid, stored.uid);
    assert!(updated.created.is_some());
    assert_eq!(updated.created, stored.created);
    assert!(updated.updated.is_some());
}

#[test]
fn test_update_unknown_is_not_found() {
    let err = repo().update(&Sale::stub()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_delete_hides_sale() {
    let repo = repo();
    let stored = repo.insert(sale(1.0, "")).unwrap();

    repo.delete(&stored).unwrap();

    assert!(!repo.exists(stored.uid).unwrap());
    assert!(repo.get(stored.uid).unwrap_err().is_not_found());
    assert_eq!(repo.count_all().unwrap(), 0);
}

#[test]
fn test_delete_bulk_keeps_rows() {
    let repo = repo();
    let a = repo.insert(sale(1.0, "")).unwrap();
    let b = repo.insert(sale(2.0, "")).unwrap();
    let c = repo.insert(sale(3.0, "")).unwrap();

    repo.delete_bulk(&[a.uid, b.uid]).unwrap();

    assert!(!repo.exists(a.uid).unwrap());
    assert!(!repo.exists(b.uid).unwrap());
    assert!(repo.exists(c.uid).unwrap());

    let listed = repo.list(&Paging::new(0)).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].uid, c.uid);

    let rows = repo
        .db()
        .query_scalar("SELECT COUNT(*) FROM sales WHERE deleted = 1", params![])
        .unwrap();
    assert_eq!(rows, 2);
}

#[test]
fn test_delete_bulk_empty_is_noop() {
    let repo = repo();
    repo.insert(sale(1.0, "")).unwrap();
    repo.delete_bulk(&[]).unwrap();
    assert_eq!(repo.count_all().unwrap(), 1);
}
