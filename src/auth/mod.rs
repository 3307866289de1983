mod middleware;
mod password;
mod session;

pub use middleware::{AuthError, RequireUser};
pub use password::PasswordHasher;
pub use session::{Session, SessionStore, parse_token};
