mod common;

use attr_stock::adapters::MemoryStore;
use attr_stock::core::disabler::ScriptTiming;
use attr_stock::server::build_app;
use common::{engine, set_stock, stock};
use reqwest::{redirect::Policy, StatusCode};
use serde_json::json;

struct TestServer {
    base_url: String,
    store: MemoryStore,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let (engine, store) = engine();
        let app = build_app(engine, ScriptTiming::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_term_list_shows_stock_column_and_bulk_notice() {
    let server = TestServer::spawn().await;
    set_stock(&server.store, 12, 5).await;

    let resp = client()
        .get(server.url("/admin/attributes/pa_color/terms?bulk_stock_updated=2"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Stock Count"));
    assert!(body.contains(r#"<td class="stock_count column-stock_count">5</td>"#));
    assert!(body.contains("2 attribute stock(s) updated."));

    let missing = client()
        .get(server.url("/admin/attributes/pa_weight/terms"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_form_and_save() {
    let server = TestServer::spawn().await;
    set_stock(&server.store, 13, 4).await;

    let edit = client()
        .get(server.url("/admin/attributes/pa_color/terms/13/edit"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(edit.contains(r#"value="4""#));

    let saved = client()
        .post(server.url("/admin/attributes/pa_color/terms/13"))
        .form(&[("stock_count", "9"), ("name", "Blue")])
        .send()
        .await
        .unwrap();
    assert_eq!(saved.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        saved.headers()["location"],
        "/admin/attributes/pa_color/terms"
    );
    assert_eq!(stock(&server.store, 13).await, Some(9));

    let rejected = client()
        .post(server.url("/admin/attributes/pa_color/terms/13"))
        .form(&[("stock_count", "nine")])
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stock(&server.store, 13).await, Some(9));

    // term 20 belongs to pa_size
    let wrong_taxonomy = client()
        .post(server.url("/admin/attributes/pa_color/terms/20"))
        .form(&[("stock_count", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_taxonomy.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_update_redirects_with_count() {
    let server = TestServer::spawn().await;

    let body = "action=update_stock_count&delete_tags%5B%5D=12&delete_tags%5B%5D=14&bulk_stock_count=3";
    let resp = client()
        .post(server.url("/admin/attributes/pa_color/terms/bulk"))
        .header("content-type", "application/x-www-form-urlencoded")
        .header("referer", "/admin/attributes/pa_color/terms?paged=1")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()["location"],
        "/admin/attributes/pa_color/terms?paged=1&bulk_stock_updated=2"
    );
    assert_eq!(stock(&server.store, 12).await, Some(3));
    assert_eq!(stock(&server.store, 14).await, Some(3));
    assert_eq!(stock(&server.store, 13).await, None);
}

#[tokio::test]
async fn test_csv_export_is_an_attachment() {
    let server = TestServer::spawn().await;
    set_stock(&server.store, 12, 5).await;

    let resp = client()
        .post(server.url("/admin/stock-io/export"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "text/csv");
    let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=attribute-stock-"));
    assert!(disposition.ends_with(".csv"));

    let body = resp.text().await.unwrap();
    assert!(body.starts_with("taxonomy,term_id,term_name,slug,stock\n"));
    assert!(body.contains("pa_color,12,Red,red,5\n"));
}

#[tokio::test]
async fn test_csv_import_upload() {
    let server = TestServer::spawn().await;

    let csv = "taxonomy,term_id,term_name,slug,stock\npa_color,12,Red,red,0\npa_nope,13,Blue,blue,4\n";
    let form = reqwest::multipart::Form::new().part(
        "stock_csv",
        reqwest::multipart::Part::bytes(csv.as_bytes().to_vec()).file_name("stock.csv"),
    );

    let resp = client()
        .post(server.url("/admin/stock-io/import"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Attribute stock updated successfully."));
    assert!(body.contains("Line 3"));
    assert_eq!(stock(&server.store, 12).await, Some(0));
    assert_eq!(stock(&server.store, 13).await, None);

    let script = client()
        .get(server.url("/products/4/stock-script"))
        .send()
        .await
        .unwrap();
    assert_eq!(script.status(), StatusCode::OK);
    assert!(script.text().await.unwrap().contains(r#"{"pa_color":["red"]}"#));
}

#[tokio::test]
async fn test_import_without_file_is_rejected() {
    let server = TestServer::spawn().await;
    let form = reqwest::multipart::Form::new().text("other", "x");
    let resp = client()
        .post(server.url("/admin/stock-io/import"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_completion_endpoint_is_idempotent() {
    let server = TestServer::spawn().await;
    set_stock(&server.store, 12, 5).await;

    let first: serde_json::Value = client()
        .post(server.url("/orders/1001/complete"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["outcome"], "applied");
    assert_eq!(first["changes"][0]["after"], 3);

    let second: serde_json::Value = client()
        .post(server.url("/orders/1001/complete"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["outcome"], "already_applied");
    assert_eq!(stock(&server.store, 12).await, Some(3));
}

#[tokio::test]
async fn test_cart_validation_endpoint() {
    let server = TestServer::spawn().await;
    set_stock(&server.store, 13, 3).await;

    let payload = json!({
        "product_id": 4,
        "variation_id": 41,
        "quantity": 2,
        "request": {"attribute_pa_color": "blue", "attribute_pa_size": "l"},
        "cart": [
            {"product_id": 4, "variation_id": 41, "quantity": 2,
             "variation": {"attribute_pa_color": "blue"}}
        ]
    });
    let resp = client()
        .post(server.url("/cart/validate"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["verdict"], "rejected");
    assert_eq!(
        body["message"],
        "Only 3 item(s) left for \"Blue\". You already have 2 in your cart."
    );

    let ok = client()
        .post(server.url("/cart/validate"))
        .json(&json!({
            "product_id": 4,
            "quantity": 1,
            "request": {"attribute_pa_color": "blue"}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stock_script_empty_when_nothing_disabled() {
    let server = TestServer::spawn().await;
    let resp = client()
        .get(server.url("/products/4/stock-script"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let bad = client()
        .get(server.url("/products/abc/stock-script"))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_field_fragments() {
    let server = TestServer::spawn().await;

    let add = client()
        .get(server.url("/admin/attributes/pa_size/fields/add"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(add.contains(r#"name="stock_count""#));

    let quick = client()
        .get(server.url("/admin/attributes/pa_size/fields/quick-edit?column=stock_count"))
        .send()
        .await
        .unwrap();
    assert_eq!(quick.status(), StatusCode::OK);

    let other = client()
        .get(server.url("/admin/attributes/pa_size/fields/quick-edit?column=slug"))
        .send()
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::NO_CONTENT);

    let health = client().get(server.url("/health")).send().await.unwrap();
    assert_eq!(health.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_bulk_redirect_stays_on_site() {
    let server = TestServer::spawn().await;
    let body = "action=update_stock_count&delete_tags%5B%5D=12&delete_tags%5B%5D=20&bulk_stock_count=4";

    let offsite = client()
        .post(server.url("/admin/attributes/pa_color/terms/bulk"))
        .header("content-type", "application/x-www-form-urlencoded")
        .header("referer", "https://evil.example/phish")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(offsite.status(), StatusCode::SEE_OTHER);
    // term 20 is a pa_size term and is not counted
    assert_eq!(
        offsite.headers()["location"],
        "/admin/attributes/pa_color/terms?bulk_stock_updated=1"
    );
    assert_eq!(stock(&server.store, 12).await, Some(4));
    assert_eq!(stock(&server.store, 20).await, None);

    let same_host = server.url("/admin/attributes/pa_color/terms?paged=3");
    let local = client()
        .post(server.url("/admin/attributes/pa_color/terms/bulk"))
        .header("content-type", "application/x-www-form-urlencoded")
        .header("referer", same_host.as_str())
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(
        local.headers()["location"].to_str().unwrap(),
        format!("{}&bulk_stock_updated=1", same_host)
    );
}
