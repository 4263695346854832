//! End-to-end `CatalogSync` runs: download and finalize both catalogs from
//! `wiremock` servers, then analyze, price, and import into an in-memory
//! local catalog.

use std::path::Path;
use std::sync::Arc;

use catsync_core::{
    AppConfig, DownloadSettings, Environment, NewLocalProduct, PricingSettings, ProductKind,
    Source,
};
use catsync_engine::{
    CatalogStore, CatalogSync, InMemoryCatalogStore, InMemoryProgressStore, OperationOutcome,
    SyncError,
};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn config(data_dir: &Path, dealer: Option<&MockServer>, retail: Option<&MockServer>) -> AppConfig {
    let descriptor = |server: &MockServer| {
        format!(
            "curl '{}/products.json?page=1' -H 'Accept: application/json' -b 'session=abc'",
            server.uri()
        )
    };
    AppConfig {
        env: Environment::Test,
        log_level: "info".to_owned(),
        data_dir: data_dir.to_path_buf(),
        dealer_request: dealer.map(descriptor),
        retail_request: retail.map(descriptor),
        dealer_storefront_url: None,
        user_agent: "catsync-test/0.1".to_owned(),
        pricing: PricingSettings {
            margin_percent: dec("20"),
            discount_percent: dec("10"),
            price_change_threshold: dec("0.2"),
            retail_to_dealer_rate: Decimal::ONE,
        },
        download: DownloadSettings {
            chunk_size: 5,
            page_limit: 250,
            inter_request_delay_ms: 0,
            request_timeout_secs: 5,
            max_redirects: 5,
            progress_ttl_secs: 3600,
        },
    }
}

fn dealer_catalog() -> serde_json::Value {
    json!({ "products": [
        {
            "id": 1,
            "title": "Recurve Bow",
            "handle": "recurve-bow",
            "vendor": "Bearpaw",
            "tags": "Bows, Q|77",
            "variants": [{ "id": 11, "sku": "RB-1", "price": "100.00" }],
            "options": [{ "name": "Title", "values": ["Default Title"] }]
        },
        {
            "id": 2,
            "title": "Arrow Set",
            "handle": "arrow-set",
            "vendor": "Bearpaw",
            "tags": ["Arrows"],
            "variants": [
                { "id": 21, "sku": "AS-1", "price": "20.00", "option1": "500" },
                { "id": 22, "sku": "AS-2", "price": "25.00", "option1": "600" }
            ],
            "options": [{ "name": "Spine", "values": ["500", "600"] }]
        },
        {
            "id": 3,
            "title": "Shooting Glove",
            "variants": [{ "id": 31, "sku": "GL-1", "price": 15 }]
        }
    ]})
}

fn retail_catalog() -> serde_json::Value {
    json!({ "products": [
        { "id": 901, "title": "Recurve Bow", "variants": [{ "id": 1, "sku": "RB-1", "price": "140.00" }] },
        { "id": 902, "title": "Glove", "variants": [{ "id": 2, "sku": "GL-1", "price": "16.00" }] }
    ]})
}

async fn catalog_server(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

fn local(title: &str, sku: &str, price: &str, dealer_id: Option<&str>) -> NewLocalProduct {
    NewLocalProduct {
        title: title.to_owned(),
        sku: Some(sku.to_owned()),
        regular_price: Some(dec(price)),
        kind: ProductKind::Simple,
        dealer_external_id: dealer_id.map(str::to_owned),
        attributes: Vec::new(),
    }
}

struct Synced {
    sync: CatalogSync,
    store: Arc<InMemoryCatalogStore>,
    dealer: MockServer,
    _retail: MockServer,
    _dir: tempfile::TempDir,
}

/// Seeds the local catalog, then downloads and finalizes both catalogs.
async fn synced() -> Synced {
    let dealer = catalog_server(dealer_catalog()).await;
    let retail = catalog_server(retail_catalog()).await;
    let dir = tempfile::tempdir().expect("tempdir");

    let store = Arc::new(InMemoryCatalogStore::new());
    store.create(&local("Recurve Bow", "RB-1", "100.00", Some("1"))).unwrap();
    store.create(&local("Shooting Glove", "GL-1", "14.50", Some("3"))).unwrap();
    store.create(&local("House Brand Wax", "WAX-1", "5.00", None)).unwrap();

    let sync = CatalogSync::new(
        config(dir.path(), Some(&dealer), Some(&retail)),
        Arc::new(InMemoryProgressStore::new()),
        store.clone(),
        store.clone(),
    )
    .expect("service");

    for source in Source::ALL {
        let chunk = sync.download_chunk(source, 1).await.expect("chunk");
        assert!(!chunk.has_more);
        sync.finalize(source).expect("finalize");
    }

    Synced {
        sync,
        store,
        dealer,
        _retail: retail,
        _dir: dir,
    }
}

#[tokio::test]
async fn analyze_counts_matches() {
    let s = synced().await;

    let stats = s.sync.analyze().expect("analyze");

    assert_eq!(stats.local_total, 3);
    assert_eq!(stats.dealer_total, 3);
    assert_eq!(stats.retail_total, 2);
    assert_eq!(stats.matched_both, 2);
    assert_eq!(stats.matched_none, 1);
}

#[tokio::test]
async fn missing_lists_dealer_only_products_with_links() {
    let s = synced().await;

    let report = s.sync.find_missing().expect("find missing");

    assert_eq!(report.total_missing, 1);
    let missing = &report.products[0];
    assert_eq!(missing.sku, "AS-1");
    assert_eq!(missing.recommended_price, Some(dec("24.00")));
    assert_eq!(
        missing.link.as_deref(),
        Some(format!("{}/products/arrow-set", s.dealer.uri()).as_str())
    );
}

#[tokio::test]
async fn update_prices_respects_threshold_and_links() {
    let s = synced().await;

    let report = s.sync.update_all_prices().expect("update prices");

    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);
    let detail = &report.details[0];
    assert_eq!(detail.sku, "RB-1");
    assert_eq!(detail.old_price, Some(dec("100.00")));
    assert_eq!(detail.new_price, dec("120.00"));
    assert_eq!(detail.retail_price, Some(dec("140.00")));

    let bow = s.store.find_by_sku("RB-1").unwrap().unwrap();
    assert_eq!(bow.regular_price, Some(dec("120.00")));
    let wax = s.store.find_by_sku("WAX-1").unwrap().unwrap();
    assert_eq!(wax.regular_price, Some(dec("5.00")));
}

#[tokio::test]
async fn import_creates_and_updates_local_products() {
    let s = synced().await;

    let report = s.sync.import_products().expect("import");

    assert_eq!(report.created, 1);
    assert_eq!(report.updated, 2);
    assert_eq!(report.variable, 1);
    assert_eq!(report.variations, 2);

    let arrows = s.store.find_by_external_id("2").unwrap().unwrap();
    assert_eq!(arrows.kind, ProductKind::Variable);
    assert_eq!(arrows.sku.as_deref(), Some("AS-1"));
    assert_eq!(arrows.variations[1].sku, "AS-1-var-2");

    // Glove: desired 18.00, capped at 16.00 * 0.9.
    let glove = s.store.find_by_sku("GL-1").unwrap().unwrap();
    assert_eq!(glove.regular_price, Some(dec("14.40")));
    assert_eq!(s.store.list_products().unwrap().len(), 4);
}

#[tokio::test]
async fn classify_reports_each_dealer_product() {
    let s = synced().await;

    let report = s.sync.classify_all().expect("classify");

    assert_eq!(report.simple, 2);
    assert_eq!(report.variable, 1);
    assert_eq!(report.by_reason.get("different prices"), Some(&1));
}

#[tokio::test]
async fn check_access_reports_first_page() {
    let dealer = catalog_server(dealer_catalog()).await;
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryCatalogStore::new());
    let sync = CatalogSync::new(
        config(dir.path(), Some(&dealer), None),
        Arc::new(InMemoryProgressStore::new()),
        store.clone(),
        store,
    )
    .unwrap();

    let report = sync.check_access(Source::Dealer).await.expect("check");

    assert!(report.accessible);
    assert_eq!(report.products_on_first_page, 3);
    assert!(report.url.ends_with("/products.json?page=1&limit=250"));
}

#[tokio::test]
async fn unconfigured_source_and_missing_snapshots_fail_with_codes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryCatalogStore::new());
    let sync = CatalogSync::new(
        config(dir.path(), None, None),
        Arc::new(InMemoryProgressStore::new()),
        store.clone(),
        store,
    )
    .unwrap();

    let err = sync.download_chunk(Source::Retail, 1).await.unwrap_err();
    assert!(matches!(err, SyncError::NotConfigured { catalog: Source::Retail }));

    let outcome = OperationOutcome::from_result("analyze", sync.analyze());
    assert!(!outcome.success);
    assert_eq!(outcome.error.unwrap().code, "snapshot_missing");
}
