//! Authentication and authorization for TemSafy Pro
//!
//! Credential login issues an HS256 JWT whose claims carry exactly what
//! every handler needs: user id, role, and department. The per-request
//! [`AuthContext`] is built once at the HTTP boundary and passed
//! explicitly; nothing reads ambient session state.

pub mod context;
pub mod jwt;
pub mod password;
pub mod session;

pub use context::AuthContext;
pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use password::{hash_password, verify_password, PasswordError};
pub use session::{SessionEntry, SessionRegistry};
