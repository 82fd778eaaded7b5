//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `redirect` - 未授权跳转
//! - `Navigator` 路由抽象
//! - `RedirectObserver` 订阅 401 信号，唯一决定是否跳转登录页
//!
//! ### `app` - 命令行应用
//! - 管理应用生命周期（初始化、运行）
//! - 恢复会话、加载总览、输出统计
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator (App / RedirectObserver)
//!     ↓
//! workflow (LoginFlow / SubmissionFlow / RosterFlow)
//!     ↓
//! session / forms
//!     ↓
//! services (每个后端资源一个服务)
//!     ↓
//! infrastructure (ApiClient / RequestScope)
//! ```

pub mod app;
pub mod redirect;

pub use app::{App, DashboardStats};
pub use redirect::{Navigator, RecordingNavigator, RedirectObserver};
