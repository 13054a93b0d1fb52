use serde::Serialize;

use crate::services::auth::AuthMethod;

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub authenticated: bool,
    pub method: AuthMethod,
    pub username: Option<String>,
}
