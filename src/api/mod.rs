mod chain;
mod convert;
mod health;
pub mod models;
mod staking;
mod supply;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(chain::add_block)
            .service(chain::get_difficulty)
            .service(chain::set_difficulty)
            .service(tx::transaction_confirmed)
            .service(convert::convert)
            .service(staking::add_staker)
            .service(staking::get_stakers)
            .service(supply::get_supply),
    );
}
