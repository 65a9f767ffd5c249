pub mod jwt;
pub mod session;

pub use jwt::{Claims, Role};
pub use session::{Exchange, SessionState, TokenPair};
