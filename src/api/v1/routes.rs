/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は gate の外、/whoami は gate の内側
 * - gate が必要な範囲はここで apply する
 */
use std::sync::Arc;

use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, whoami::whoami};
use crate::middleware;
use crate::services::auth::AuthGate;

pub fn routes(gate: Arc<AuthGate>) -> Router {
    let protected = Router::new().route("/whoami", get(whoami));
    let protected = middleware::auth::gate::apply(protected, gate);

    Router::new().route("/health", get(health)).merge(protected)
}
