use actix_web::{HttpResponse, Responder, get, post, web};
use log::info;

use super::models::{AppState, StakeRequest, StakeResponse, StakerEntry, StakersResponse};

/// Register stake for an identity (additive on repeat calls).
#[post("/stakers/")]
pub async fn add_staker(
    state: web::Data<AppState>,
    body: web::Json<StakeRequest>,
) -> impl Responder {
    let identity = body.identity.trim().to_string();
    if identity.is_empty() {
        return HttpResponse::BadRequest().body("identity required");
    }

    let total_stake = {
        let mut ledger = state.ledger.lock().expect("mutex poisoned");
        ledger.add_staker(&identity, body.stake);
        ledger.stakers().stake_of(&identity)
    };
    info!("staker {identity} now holds {total_stake}");

    HttpResponse::Ok().json(StakeResponse {
        identity,
        total_stake,
    })
}

/// List the staker registry.
#[get("/stakers/")]
pub async fn get_stakers(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    let stakers: Vec<StakerEntry> = ledger
        .stakers()
        .iter()
        .map(|(identity, stake)| StakerEntry {
            identity: identity.to_string(),
            stake,
        })
        .collect();
    HttpResponse::Ok().json(StakersResponse {
        count: stakers.len(),
        stakers,
    })
}
