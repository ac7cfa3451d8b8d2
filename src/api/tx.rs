use actix_web::{HttpResponse, Responder, post, web};
use log::debug;

use super::models::{AppState, ConfirmationRequest, ConfirmationResponse};

/// Confirmation lookup: has this transaction been buried deep enough?
/// POST so arbitrary transaction payloads need no URL encoding.
#[post("/transactions/confirmed/")]
pub async fn transaction_confirmed(
    state: web::Data<AppState>,
    body: web::Json<ConfirmationRequest>,
) -> impl Responder {
    let req = body.into_inner();
    if req.transaction.is_empty() {
        return HttpResponse::BadRequest().body("transaction must not be empty");
    }

    let confirmed = {
        let ledger = state.ledger.lock().expect("mutex poisoned");
        ledger.is_transaction_confirmed(&req.transaction)
    };
    debug!("confirmation lookup: confirmed={confirmed}");

    HttpResponse::Ok().json(ConfirmationResponse {
        transaction: req.transaction,
        confirmed,
    })
}
