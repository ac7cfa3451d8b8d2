use actix_web::{HttpResponse, Responder, post, web};
use log::warn;

use super::models::{AppState, ConvertRequest, ConvertResponse};

/// Convert a coin amount to fiat at the configured rate (two decimals).
#[post("/convert/")]
pub async fn convert(
    state: web::Data<AppState>,
    body: web::Json<ConvertRequest>,
) -> impl Responder {
    let amount = body.amount;
    let result = {
        let ledger = state.ledger.lock().expect("mutex poisoned");
        ledger.convert(amount)
    };
    match result {
        Ok(fiat_value) => HttpResponse::Ok().json(ConvertResponse { amount, fiat_value }),
        Err(e) => {
            warn!("POST /convert/ - rejected: {e}");
            HttpResponse::BadRequest().body(e.to_string())
        }
    }
}
