//! 业务能力层
//!
//! 每个后端资源一个服务，每个操作恰好发起一次调用

pub mod auth_service;
pub mod classroom_service;
pub mod question_bank_service;
pub mod statistics_service;
pub mod submission_service;
pub(crate) mod support;
pub mod test_service;

pub use auth_service::AuthService;
pub use classroom_service::ClassroomService;
pub use question_bank_service::QuestionBankService;
pub use statistics_service::StatisticsService;
pub use submission_service::SubmissionService;
pub use test_service::TestService;
