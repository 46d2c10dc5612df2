// buildrelay-receiver/src/server.rs
// ============================================================================
// Module: Receiver HTTP Server
// Description: Axum surface exposing the push pipeline and liveness.
// Purpose: Bind the composed receiver to its two HTTP routes.
// Dependencies: axum, time, tokio
// ============================================================================

//! ## Overview
//! The receiver exposes exactly two routes: `POST /` accepts push
//! envelopes, and `GET /helloz` reports liveness as plain text. Requests
//! are handled concurrently against the shared read-only pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::receiver::PushReceiver;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while serving the receiver.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {reason}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying bind failure.
        reason: String,
    },
    /// The server loop terminated with an error.
    #[error("http server failed: {0}")]
    Serve(String),
}

// ============================================================================
// SECTION: Server State
// ============================================================================

/// Shared state behind the HTTP handlers.
struct ServerState {
    /// Composed push pipeline.
    receiver: PushReceiver,
    /// Process start time reported by the liveness route.
    started_at: OffsetDateTime,
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the receiver's route table over a composed pipeline.
#[must_use]
pub fn router(receiver: PushReceiver) -> Router {
    let state = Arc::new(ServerState {
        receiver,
        started_at: OffsetDateTime::now_utc(),
    });
    Router::new()
        .route("/", post(handle_push))
        .route("/helloz", get(handle_liveness))
        .with_state(state)
}

/// Binds the router on the given port and serves until shutdown.
///
/// # Errors
///
/// Returns [`ServeError`] when the port cannot be bound or the server
/// loop fails.
pub async fn serve(receiver: PushReceiver, port: u16) -> Result<(), ServeError> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let app = router(receiver);
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|err| ServeError::Bind {
        addr,
        reason: err.to_string(),
    })?;
    axum::serve(listener, app).await.map_err(|err| ServeError::Serve(err.to_string()))
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles one inbound push request.
async fn handle_push(State(state): State<Arc<ServerState>>, body: Bytes) -> StatusCode {
    state.receiver.process_push(&body).await
}

/// Handles a liveness probe with start and current time, as plain text.
async fn handle_liveness(State(state): State<Arc<ServerState>>) -> (StatusCode, String) {
    (StatusCode::OK, liveness_body(state.started_at, OffsetDateTime::now_utc()))
}

/// Formats the liveness response body.
#[must_use]
pub fn liveness_body(started_at: OffsetDateTime, now: OffsetDateTime) -> String {
    let started = started_at.format(&Rfc3339).unwrap_or_else(|_| started_at.to_string());
    let current = now.format(&Rfc3339).unwrap_or_else(|_| now.to_string());
    format!("Serving since {started}, current time {current}.\n")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use time::Date;
    use time::Month;
    use time::Time;

    use super::*;

    #[test]
    fn liveness_body_carries_both_timestamps() {
        let date = Date::from_calendar_date(2026, Month::January, 2).expect("date");
        let started = date.with_time(Time::MIDNIGHT).assume_utc();
        let now = started + time::Duration::minutes(5);
        let body = liveness_body(started, now);
        assert!(body.contains("2026-01-02T00:00:00Z"));
        assert!(body.contains("2026-01-02T00:05:00Z"));
    }
}
