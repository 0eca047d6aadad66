// ============================
// goaltrack-backend-lib/src/auth/mod.rs
// ============================
//! Authentication: password hashing, token issuance, auth flow.

pub mod password;
pub mod service;
pub mod token;

pub use password::{hash_password, hash_password_secure, verify_password};
pub use service::AuthService;
pub use token::{Claims, TokenError, TokenService, DEFAULT_TTL_SECS};
