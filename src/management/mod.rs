mod auth;
mod session;

pub use auth::TokenManager;
pub use session::SessionManager;
pub use session::UserIdentity;
