//! Authentication
//!
//! JWT validation and role-based access control. Identity issuance lives in
//! the external identity provider; this module only validates bearer tokens.

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
