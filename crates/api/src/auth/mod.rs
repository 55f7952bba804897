//! Authentication: passwords, access tokens, refresh tokens and the
//! request middleware built on them

pub mod cookie;
pub mod jwt;
#[cfg(test)]
pub(crate) mod memory;
pub mod middleware;
pub mod password;
pub mod service;
pub mod tokens;
pub mod users;

pub use cookie::{clear_refresh_cookie, read_refresh_token, refresh_cookie};
pub use jwt::{Claims, JwtError, JwtManager};
pub use middleware::{require_auth, AuthState, AuthUser};
pub use password::{PasswordError, PasswordHasher, PasswordScheme};
pub use service::{AuthError, AuthService, Registration, TokenPair};
pub use tokens::{generate_token, PgRefreshTokenStore, RefreshTokenStore};
pub use users::{PgUserStore, UserStore};
