/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::gate (認証 gate), http (request-id / trace / limit / timeout)
 */
pub mod auth;
pub mod http;
