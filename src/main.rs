mod api;
mod ledger;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use std::env;

use api::AppState;
use ledger::LedgerConfig;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Ledger knobs from the environment, falling back to the shipped policy.
fn ledger_config_from_env() -> LedgerConfig {
    let mut config = LedgerConfig::default();
    if let Some(v) = env_parse("LEDGER_DIFFICULTY") {
        config.difficulty = v;
    }
    if let Some(v) = env_parse("LEDGER_FROZEN") {
        config.frozen = v;
    }
    if let Some(v) = env_parse("LEDGER_TOTAL_SUPPLY") {
        config.total_supply = v;
    }
    if let Some(v) = env_parse("LEDGER_RESERVED_SUPPLY") {
        config.reserved_supply = v;
    }
    if let Some(v) = env_parse("LEDGER_RELEASE_CAP") {
        config.daily_release_cap = v;
    }
    if let Some(v) = env_parse("LEDGER_COIN_VALUE") {
        config.coin_value_in_fiat = v;
    }
    config
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);

    println!("⛓️ Starting ledger API at http://{host}:{port}");

    let state = web::Data::new(AppState::new(ledger_config_from_env()));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
