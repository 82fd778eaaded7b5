//! 会话状态层

pub mod manager;
pub mod state;

pub use manager::SessionManager;
pub use state::{Session, SessionStatus};
