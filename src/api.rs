use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::aggregates::StatsResult;
use crate::catalog::SeriesCatalog;
use crate::error::{ErrorCategory, ServiceError};

#[derive(Debug, Deserialize)]
pub struct AddBatchRequest {
    pub symbol: String,
    /// Kept as raw JSON so non-numeric entries surface as a validation
    /// error instead of a generic parse failure.
    pub values: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct GetStatsQuery {
    pub symbol: String,
    pub k: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValuesResponse {
    pub symbol: String,
    pub values: Vec<f64>,
    pub total_values: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<String>,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Range => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

fn parse_values(values: &[Value]) -> Result<Vec<f64>, ServiceError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| value.as_f64().ok_or(ServiceError::NonNumericValue { index }))
        .collect()
}

fn log_rejection(operation: &str, err: &ServiceError) {
    warn!(operation, error = %err, "request rejected");
}

async fn add_batch(
    catalog: web::Data<SeriesCatalog>,
    req: web::Json<AddBatchRequest>,
) -> Result<HttpResponse, ServiceError> {
    let values = parse_values(&req.values).inspect_err(|err| log_rejection("add_batch", err))?;
    catalog
        .insert_batch(&req.symbol, &values)
        .await
        .inspect_err(|err| log_rejection("add_batch", err))?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!(
            "Successfully added {} values for symbol '{}'",
            req.values.len(),
            req.symbol
        ),
    }))
}

async fn get_stats(
    catalog: web::Data<SeriesCatalog>,
    query: web::Query<GetStatsQuery>,
) -> Result<HttpResponse, ServiceError> {
    let stats = catalog
        .get_stats(&query.symbol, query.k)
        .await
        .inspect_err(|err| log_rejection("get_stats", err))?;
    Ok(match stats {
        StatsResult::Populated(stats) => HttpResponse::Ok().json(stats),
        StatsResult::Empty => HttpResponse::Ok().json(json!({
            "min": null,
            "max": null,
            "last": null,
            "avg": null,
            "var": null,
            "size": null,
        })),
    })
}

async fn get_values(
    catalog: web::Data<SeriesCatalog>,
    symbol: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let symbol = symbol.into_inner();
    let values = catalog
        .get_series(&symbol)
        .await
        .inspect_err(|err| log_rejection("get_values", err))?;
    Ok(HttpResponse::Ok().json(ValuesResponse {
        total_values: values.len(),
        symbol,
        values,
    }))
}

async fn list_symbols(catalog: web::Data<SeriesCatalog>) -> impl Responder {
    HttpResponse::Ok().json(SymbolsResponse {
        symbols: catalog.list_symbols().await,
    })
}

async fn delete_symbol(
    catalog: web::Data<SeriesCatalog>,
    symbol: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    catalog
        .delete_symbol(&symbol)
        .await
        .inspect_err(|err| log_rejection("delete_symbol", err))?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Symbol {} deleted", symbol),
    }))
}

async fn clear_db(catalog: web::Data<SeriesCatalog>) -> impl Responder {
    catalog.clear_all().await;
    HttpResponse::Ok().json(MessageResponse {
        message: "Database cleared".to_string(),
    })
}

/// Route table shared by the server binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/add_batch", web::post().to(add_batch))
        .route("/stats", web::get().to(get_stats))
        .route("/get_values/{symbol}", web::get().to(get_values))
        .route("/symbols", web::get().to(list_symbols))
        .route("/delete_symbol/{symbol}", web::delete().to(delete_symbol))
        .route("/clear_db", web::delete().to(clear_db));
}
