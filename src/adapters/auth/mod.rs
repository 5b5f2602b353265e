//! Authentication adapters.

mod jwt;

pub use jwt::{JwtConfig, JwtTokenVerifier};
