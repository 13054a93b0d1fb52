use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use super::AuthCtx;

/// Handler で、 AuthCtx を受け取るための extractor
/// gate middleware が AuthCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（ミドルウェア未設定）
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S> FromRequestParts<S> for AuthCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
