//! Axum routes of the leaderboard: /add, /top and /stop, all answering plain text.

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use sweeper_core::SharedLeaderboard;
use sweeper_protocol::{
    ADD_PATH, AddQuery, STOP_PATH, StopQuery, TOP_LIMIT, TOP_PATH, format_rank, format_top,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Asks the serve loop to persist and exit, cloneable across tasks.
#[derive(Clone, Debug)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub(crate) fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopping(&self) -> bool {
        *self.tx.borrow()
    }
}

#[derive(Clone)]
pub struct AppState {
    leaderboard: SharedLeaderboard,
    stop_secret: Arc<str>,
    stop: StopHandle,
}

impl AppState {
    pub fn new(leaderboard: SharedLeaderboard, stop_secret: &str, stop: StopHandle) -> Self {
        Self {
            leaderboard,
            stop_secret: Arc::from(stop_secret),
            stop,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(ADD_PATH, get(add_handler))
        .route(TOP_PATH, get(top_handler))
        .route(STOP_PATH, get(stop_handler))
        .with_state(state)
}

async fn add_handler(
    State(state): State<AppState>,
    query: Result<Query<AddQuery>, QueryRejection>,
) -> String {
    let query = query.map(|Query(query)| query).unwrap_or_default();
    match query.validate() {
        Ok((player, duration_nanos)) => {
            let rank = state.leaderboard.submit(player.as_str(), duration_nanos);
            info!(%player, duration_nanos, rank, "Score added");
            format_rank(rank)
        }
        Err(err) => {
            debug!(%err, "Rejected score submission");
            String::new()
        }
    }
}

async fn top_handler(State(state): State<AppState>) -> String {
    format_top(&state.leaderboard.top(TOP_LIMIT))
}

async fn stop_handler(
    State(state): State<AppState>,
    query: Result<Query<StopQuery>, QueryRejection>,
) -> String {
    let query = query.map(|Query(query)| query).unwrap_or_default();
    if query.authorizes(&state.stop_secret) {
        info!("Stop requested");
        state.stop.stop();
    } else {
        warn!("Refused stop request with a wrong password");
    }
    String::new()
}
