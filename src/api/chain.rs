use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info, warn};

use super::models::{
    AddBlockRequest, AppState, BlockSummary, ChainResponse, DifficultyResponse,
    SetDifficultyRequest, ValidateResponse,
};
use crate::ledger::{Block, Candidate, LedgerError, MAX_DIFFICULTY, consensus};

/// Attempts before giving up on a chain whose tip keeps moving.
const MAX_COMMIT_RETRIES: u32 = 3;

/// Get the full chain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    let resp = ChainResponse {
        length: ledger.height(),
        difficulty: ledger.difficulty(),
        chain: ledger.blocks(),
    };
    HttpResponse::Ok().json(resp)
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    let resp = ValidateResponse {
        valid: ledger.validate_chain(),
        length: ledger.height(),
    };
    HttpResponse::Ok().json(resp)
}

/// Produce and append a new block:
/// - Stage a candidate under a short ledger lock (frozen gate + supply policy
///   + consensus branch draw)
/// - Run the Proof-of-Work seal, if one is needed, WITHOUT holding the lock
/// - Re-take the lock to commit; retry from a fresh tip if it moved
#[post("/blocks/")]
pub async fn add_block(
    state: web::Data<AppState>,
    body: web::Json<AddBlockRequest>,
) -> impl Responder {
    let req = body.into_inner();
    if req.transactions.is_empty() {
        return HttpResponse::BadRequest().body("transactions must not be empty");
    }

    for attempt in 0..MAX_COMMIT_RETRIES {
        let candidate = {
            let mut ledger = state.ledger.lock().expect("mutex poisoned");
            let mut rng = rand::thread_rng();
            ledger.prepare_block(
                req.transactions.clone(),
                req.amount,
                req.contract_ref.clone(),
                &mut rng,
            )
        };

        let block = match candidate {
            Ok(Candidate::Sealed(block)) => block,
            Ok(Candidate::Unsealed {
                mut block,
                difficulty,
                budget,
            }) => {
                debug!("sealing block #{} at difficulty {difficulty}", block.index);
                if let Err(e) = consensus::mine(&mut block, difficulty, budget) {
                    warn!("POST /blocks/ - seal failed: {e}");
                    return reject(e);
                }
                block
            }
            Err(e) => {
                warn!("POST /blocks/ - rejected: {e}");
                return reject(e);
            }
        };

        let committed = {
            let mut ledger = state.ledger.lock().expect("mutex poisoned");
            ledger.commit_block(block, req.amount).map(summarize)
        };
        match committed {
            Ok(resp) => {
                info!(
                    "sealed block #{} (hash={}, nonce={}, producer={:?})",
                    resp.index, resp.hash, resp.nonce, resp.producer
                );
                return HttpResponse::Ok().json(resp);
            }
            Err(LedgerError::StaleTip) => {
                debug!("attempt {attempt}: tip moved while sealing, retrying");
                continue;
            }
            Err(e) => {
                warn!("POST /blocks/ - commit rejected: {e}");
                return reject(e);
            }
        }
    }

    HttpResponse::ServiceUnavailable().body("chain tip kept moving; retry later")
}

/// Get current PoW difficulty.
#[get("/difficulty/")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: ledger.difficulty(),
    })
}

/// Update PoW difficulty (affects future blocks only).
#[post("/difficulty/")]
pub async fn set_difficulty(
    state: web::Data<AppState>,
    body: web::Json<SetDifficultyRequest>,
) -> impl Responder {
    if body.difficulty > MAX_DIFFICULTY {
        return HttpResponse::BadRequest()
            .body(format!("difficulty too high for dev mode (max {MAX_DIFFICULTY})"));
    }
    let mut ledger = state.ledger.lock().expect("mutex poisoned");
    ledger.set_difficulty(body.difficulty);
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: ledger.difficulty(),
    })
}

fn summarize(block: &Block) -> BlockSummary {
    BlockSummary {
        index: block.index,
        hash: block.hash.clone(),
        nonce: block.nonce,
        producer: block.producer.clone(),
        timestamp: block.timestamp,
    }
}

fn reject(err: LedgerError) -> HttpResponse {
    match err {
        LedgerError::ChainImmutable => HttpResponse::Conflict().body(err.to_string()),
        _ => HttpResponse::BadRequest().body(err.to_string()),
    }
}
