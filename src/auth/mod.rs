pub mod jwt;
pub mod session;
pub mod storage;

pub use session::{LogoutOutcome, Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
