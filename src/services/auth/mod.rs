pub mod authorizer;
pub mod error;
pub mod factory;
pub mod jwks;
pub mod permission;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use authorizer::Authorizer;
pub use error::AuthError;
pub use factory::build_authorizer;
pub use permission::Permission;
pub use token::TokenClaims;
