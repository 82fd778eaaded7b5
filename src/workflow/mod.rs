//! 流程层
//!
//! 组合多个业务调用：变更之后显式刷新受影响的资源，登录表单接入会话

pub mod login_flow;
pub mod roster_flow;
pub mod submission_flow;

pub use login_flow::LoginFlow;
pub use roster_flow::{RosterFlow, RosterUpdate};
pub use submission_flow::{SubmissionFlow, UploadOutcome};
