use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Multipart, Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::core::admin::{add_form_field, render_edit_page, render_term_list, STOCK_FIELD};
use crate::core::bulk::{
    bulk_notice, local_referer, quick_edit_field, redirect_url, BulkRequest, UPDATED_PARAM,
};
use crate::core::cart::{AddToCart, CartVerdict};
use crate::core::csv_io::{export_filename, render_import_export_page, IMPORT_FILE_FIELD};
use crate::core::TaxonomyBinding;
use crate::domain::model::{CartLine, OrderId, ProductId, Term, TermId};
use crate::server::errors::json_error;
use crate::server::AppState;
use crate::utils::error::StockError;
use crate::utils::html;

pub fn admin_router() -> Router {
    Router::new()
        .route("/attributes/:taxonomy/terms", get(term_list))
        .route("/attributes/:taxonomy/terms/bulk", post(bulk_update))
        .route("/attributes/:taxonomy/terms/:term_id", post(save_term_stock))
        .route("/attributes/:taxonomy/terms/:term_id/edit", get(edit_term))
        .route("/attributes/:taxonomy/fields/add", get(add_field))
        .route("/attributes/:taxonomy/fields/quick-edit", get(quick_edit))
        .route("/stock-io", get(import_export_page))
        .route("/stock-io/export", post(export_csv))
        .route("/stock-io/import", post(import_csv))
}

pub fn storefront_router() -> Router {
    Router::new()
        .route("/orders/:order_id/complete", post(complete_order))
        .route("/cart/validate", post(validate_cart))
        .route("/products/:product_id/stock-script", get(stock_script))
        .route("/health", get(|| async { "ok" }))
}

fn binding<'a>(state: &'a AppState, taxonomy: &str) -> Result<&'a TaxonomyBinding, Response> {
    state.engine.registry().binding(taxonomy).ok_or_else(|| {
        json_error(
            StatusCode::NOT_FOUND,
            "unknown_taxonomy",
            format!("'{}' is not an attribute taxonomy", taxonomy),
        )
    })
}

fn term_in(state: &AppState, binding: &TaxonomyBinding, raw_id: &str) -> Result<Term, Response> {
    let term_id = TermId::parse(raw_id).map_err(IntoResponse::into_response)?;
    state
        .engine
        .catalog()
        .term(term_id)
        .filter(|term| &term.taxonomy == binding.name())
        .ok_or_else(|| StockError::not_found("Term", term_id).into_response())
}

fn list_url(binding: &TaxonomyBinding) -> String {
    format!("/admin/attributes/{}/terms", binding.name())
}

fn form_pairs(body: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

async fn term_list(
    Extension(state): Extension<Arc<AppState>>,
    Path(taxonomy): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let binding = match binding(&state, &taxonomy) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let rows = match state.engine.term_rows(binding.name()).await {
        Ok(rows) => rows,
        Err(e) => return e.into_response(),
    };
    let notice = bulk_notice(query.get(UPDATED_PARAM).map(String::as_str))
        .map(|message| html::notice("success is-dismissible", &message));

    Html(render_term_list(binding, &rows, notice.as_deref())).into_response()
}

async fn edit_term(
    Extension(state): Extension<Arc<AppState>>,
    Path((taxonomy, term_id)): Path<(String, String)>,
) -> Response {
    let binding = match binding(&state, &taxonomy) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let term = match term_in(&state, binding, &term_id) {
        Ok(term) => term,
        Err(resp) => return resp,
    };

    match state.engine.edit_form_field(term.id).await {
        Ok(field) => Html(render_edit_page(binding, &term, &field)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Term create and term edit both land here.
async fn save_term_stock(
    Extension(state): Extension<Arc<AppState>>,
    Path((taxonomy, term_id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let binding = match binding(&state, &taxonomy) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let term = match term_in(&state, binding, &term_id) {
        Ok(term) => term,
        Err(resp) => return resp,
    };

    let submitted = form_pairs(&body)
        .into_iter()
        .find(|(k, _)| k == STOCK_FIELD)
        .map(|(_, v)| v);

    match state.engine.save_field(term.id, submitted.as_deref()).await {
        Ok(_) => Redirect::to(&list_url(binding)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn bulk_update(
    Extension(state): Extension<Arc<AppState>>,
    Path(taxonomy): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let binding = match binding(&state, &taxonomy) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let request = BulkRequest::from_form(form_pairs(&body));
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|referer| local_referer(referer, host))
        .unwrap_or_else(|| list_url(binding));

    match state.engine.apply_bulk(binding.name(), &request).await {
        Ok(Some(outcome)) => Redirect::to(&redirect_url(&referer, outcome.updated)).into_response(),
        Ok(None) => Redirect::to(&referer).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn add_field(
    Extension(state): Extension<Arc<AppState>>,
    Path(taxonomy): Path<String>,
) -> Response {
    match binding(&state, &taxonomy) {
        Ok(_) => Html(add_form_field()).into_response(),
        Err(resp) => resp,
    }
}

#[derive(Debug, Deserialize)]
struct QuickEditQuery {
    column: String,
}

async fn quick_edit(
    Extension(state): Extension<Arc<AppState>>,
    Path(taxonomy): Path<String>,
    Query(query): Query<QuickEditQuery>,
) -> Response {
    if let Err(resp) = binding(&state, &taxonomy) {
        return resp;
    }
    match quick_edit_field(&query.column) {
        Some(field) => Html(field).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn import_export_page() -> Html<String> {
    Html(render_import_export_page(None))
}

async fn export_csv(Extension(state): Extension<Arc<AppState>>) -> Response {
    let mut buffer = Vec::new();
    if let Err(e) = state.engine.export_csv(&mut buffer).await {
        return e.into_response();
    }

    let disposition = format!(
        "attachment; filename={}",
        export_filename(Utc::now().date_naive())
    );
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    )
        .into_response()
}

async fn import_csv(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let mut upload: Option<Bytes> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_upload",
                    format!("Multipart error: {}", e),
                )
            }
        };
        if field.name() != Some(IMPORT_FILE_FIELD) {
            continue;
        }
        match field.bytes().await {
            Ok(bytes) => {
                upload = Some(bytes);
                break;
            }
            Err(e) => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_upload",
                    format!("Read error: {}", e),
                )
            }
        }
    }

    let Some(data) = upload else {
        return json_error(StatusCode::BAD_REQUEST, "invalid_upload", "No CSV file provided");
    };

    match state.engine.import_csv(&data[..]).await {
        Ok(summary) => {
            let mut notice = html::notice("success", &summary.notice());
            for skipped in &summary.skipped {
                notice.push_str(&html::notice(
                    "warning",
                    &format!("Line {}: {}", skipped.line, skipped.reason),
                ));
            }
            Html(render_import_export_page(Some(&notice))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn complete_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Response {
    let order_id = match OrderId::parse(&order_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    match state.engine.complete_order(order_id).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct CartValidationRequest {
    #[serde(flatten)]
    attempt: AddToCart,
    #[serde(default)]
    cart: Vec<CartLine>,
}

async fn validate_cart(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<CartValidationRequest>,
) -> Response {
    match state
        .engine
        .validate_add_to_cart(&body.attempt, &body.cart)
        .await
    {
        Ok(verdict @ CartVerdict::Accepted) => Json(verdict).into_response(),
        Ok(verdict) => (StatusCode::CONFLICT, Json(verdict)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn stock_script(
    Extension(state): Extension<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Response {
    let product_id = match ProductId::parse(&product_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    match state
        .engine
        .storefront_markup(product_id, state.timing)
        .await
    {
        Ok(Some(markup)) => Html(markup).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
