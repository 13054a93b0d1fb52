/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - gate middleware が判定後に request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - 署名検証や endpoint への問い合わせは services 側の責務
 */

use crate::services::auth::{Admission, AuthMethod};

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `method` はどの strategy で通過したか (disabled を含む)
/// - `username` は offline 検証時の `preferred_username` のみ (online では分からない)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub method: AuthMethod,
    pub username: Option<String>,
}

impl AuthCtx {
    pub fn new(method: AuthMethod, username: Option<String>) -> Self {
        Self { method, username }
    }

    pub fn is_authenticated(&self) -> bool {
        self.method != AuthMethod::Disabled
    }
}

impl From<Admission> for AuthCtx {
    fn from(admission: Admission) -> Self {
        Self::new(admission.method, admission.username)
    }
}
