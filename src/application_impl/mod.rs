mod auth_service_fake;
mod auth_service_impl;
mod credential_verifier_static;
mod jwt_codec;
mod refresh_rotator;
mod revocation_gate;
mod session_registrar;
mod token_issuer;
mod token_validator;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_service_fake::*;
pub use auth_service_impl::*;
pub use credential_verifier_static::*;
pub use jwt_codec::*;
pub use refresh_rotator::*;
pub use revocation_gate::*;
pub use session_registrar::*;
pub use token_issuer::*;
pub use token_validator::*;
