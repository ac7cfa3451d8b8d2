use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, SupplyResponse};

/// Supply and policy snapshot, taken under a single short lock.
#[get("/supply/")]
pub async fn get_supply(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    let supply = ledger.supply();
    HttpResponse::Ok().json(SupplyResponse {
        height: ledger.height(),
        frozen: ledger.is_frozen(),
        difficulty: ledger.difficulty(),
        total_supply: supply.total_supply(),
        current_supply: supply.current_supply(),
        daily_release_cap: supply.daily_release_cap(),
        last_halving_time: supply.last_halving_time(),
        stakers: ledger.stakers().len(),
    })
}
