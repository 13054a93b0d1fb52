pub mod factory;
pub mod gate;
pub mod mode;
pub mod offline;
pub mod online;

#[cfg(test)]
pub(crate) mod test_support;

pub use factory::build_auth_gate;
pub use gate::{Admission, AuthGate};
pub use mode::{AuthMethod, AuthMode};
