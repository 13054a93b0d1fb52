/*
 * Responsibility
 * - GET /api/v1/whoami (gate の内側)
 * - gate が extensions に載せた AuthCtx をそのまま返す
 */
use axum::Json;

use crate::api::v1::{dto::whoami::WhoAmIResponse, extractors::AuthCtxExtractor};

pub async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        authenticated: ctx.is_authenticated(),
        method: ctx.method,
        username: ctx.username,
    })
}
