//! Auth gate middleware: evaluate the request → AuthCtx を extensions に入れる
//!
//! The middleware is the only place that talks to the response side. For
//! each request it either runs the next handler or returns the rejection,
//! never both.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::GateRejection;
use crate::services::auth::AuthGate;

/// Put the gate in front of every route of `router`.
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/whoami", get(whoami));
/// let protected = middleware::auth::gate::apply(protected, gate.clone());
/// app = app.merge(protected);
/// ```
pub fn apply<S>(router: Router<S>, gate: Arc<AuthGate>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // The gate is its own state, independent of the router state.
    router.layer(middleware::from_fn_with_state(gate, gate_middleware))
}

async fn gate_middleware(
    State(gate): State<Arc<AuthGate>>,
    mut req: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let admission = gate.evaluate(req.headers()).await?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::from(admission));

    Ok(next.run(req).await)
}
