//! # Exam Portal Client
//!
//! 答题卡测验平台的客户端核心：请求 / 响应 / 会话生命周期、各业务资源的类型化调用、通用表单状态
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 所有网络 I/O 的唯一出口
//! - `ApiClient` - 凭据、JSON / multipart、上传进度、取消、错误分类
//! - `RequestScope` - 单个使用方的请求状态（loading / error / 上传进度）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 每个后端资源一个服务，每个操作恰好一次调用
//! - 认证、班级、试卷、答题卡提交、题库、统计
//!
//! ### ③ 状态层（Session / Forms）
//! - `SessionManager` - 唯一的权威会话，watch 通道通知变化
//! - `FormController` - 值、错误、触碰标记、提交状态
//!
//! ### ④ 流程层（Workflow）
//! - 变更后显式刷新受影响的资源；登录表单接入会话
//!
//! ### ⑤ 编排层（Orchestration）
//! - `RedirectObserver` - 唯一的 401 跳转策略
//! - `App` - 命令行入口
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod forms;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ApiError, AppError, AppResult, FailureKind, ServiceError, ServiceResult};
pub use forms::{FormConfig, FormController, SubmitOutcome};
pub use infrastructure::{ApiCall, ApiClient, AuthSignal, RequestHandle, RequestScope, RequestState};
pub use orchestrator::{App, Navigator, RedirectObserver};
pub use services::{
    AuthService, ClassroomService, QuestionBankService, StatisticsService, SubmissionService, TestService,
};
pub use session::{Session, SessionManager, SessionStatus};
pub use workflow::{LoginFlow, RosterFlow, SubmissionFlow};
