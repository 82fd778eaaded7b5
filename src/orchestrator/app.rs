//! 命令行应用 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建资源客户端、会话管理器，挂上唯一的 401 观察者
//! 2. **会话恢复**：确认登录状态，未登录且配置了账号时自动登录
//! 3. **总览输出**：班级、试卷、成绩前列学生
//! 4. **全局统计**：汇总各板块的加载结果
//!
//! 不处理任何单个接口的细节，全部委托给 services / workflow

use crate::config::Config;
use crate::forms::SubmitOutcome;
use crate::infrastructure::ApiClient;
use crate::orchestrator::redirect::{Navigator, RecordingNavigator, RedirectObserver};
use crate::services::{ClassroomService, StatisticsService, TestService};
use crate::session::SessionManager;
use crate::utils::logging;
use crate::workflow::LoginFlow;
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    client: ApiClient,
    session: SessionManager,
    navigator: Arc<RecordingNavigator>,
    observer: JoinHandle<()>,
}

/// 总览加载统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub loaded: usize,
    pub failed: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let client = ApiClient::new(&config)?;
        let session = SessionManager::new(client.clone());
        let navigator = Arc::new(RecordingNavigator::new("/"));

        let observer = RedirectObserver::new(config.login_route.clone(), navigator.clone())
            .with_session(session.clone())
            .spawn(client.subscribe_signals());

        Ok(Self {
            config,
            client,
            session,
            navigator,
            observer,
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// 运行应用主逻辑
    pub async fn run(self) -> Result<DashboardStats> {
        if !self.restore_session().await {
            warn!("⚠️ 未登录，无法加载总览。请设置 EXAM_USERNAME / EXAM_PASSWORD");
            logging::print_summary(None, 0, 0);
            self.observer.abort();
            return Ok(DashboardStats::default());
        }

        let stats = self.load_dashboard().await;

        let user = self.session.snapshot().user;
        logging::print_summary(user.as_ref().map(|u| u.display_name()), stats.loaded, stats.failed);

        self.observer.abort();
        Ok(stats)
    }

    /// 确认登录状态，必要时用配置的账号登录
    async fn restore_session(&self) -> bool {
        let session = self.session.mount().await;
        if session.is_authenticated() {
            return true;
        }
        if let Some(message) = &session.auth_error {
            warn!("⚠️ 确认登录状态失败: {}", message);
        }

        let Some((username, password)) = self.config.credentials() else {
            return false;
        };

        info!("🔐 使用配置的账号登录: {}", username);
        self.navigator.navigate(&self.config.login_route);

        let login = LoginFlow::new(self.session.clone());
        match login.submit(username, password).await {
            SubmitOutcome::Submitted if self.session.is_authenticated() => {
                self.navigator.navigate("/");
                true
            }
            SubmitOutcome::Invalid(errors) => {
                for (field, message) in errors {
                    error!("❌ {}: {}", field, message);
                }
                false
            }
            _ => {
                let message = self.session.snapshot().auth_error.unwrap_or_default();
                error!("❌ 登录失败: {}", message);
                false
            }
        }
    }

    async fn load_dashboard(&self) -> DashboardStats {
        let mut stats = DashboardStats::default();
        let limit = self.config.dashboard_limit;

        // 三个板块互不依赖，并发加载
        let classrooms = ClassroomService::new(self.client.clone());
        let tests = TestService::new(self.client.clone());
        let statistics = StatisticsService::new(self.client.clone());
        let (classroom_result, test_result, top_result) = tokio::join!(
            classrooms.get_all_classrooms(),
            tests.get_all_tests(),
            statistics.get_top_students(),
        );

        logging::log_section("🏫 班级");
        match classroom_result {
            Ok(list) => {
                stats.loaded += 1;
                info!("共 {} 个班级", list.len());
                for classroom in list.iter().take(limit) {
                    info!("  #{} {}", classroom.id, logging::truncate_text(&classroom.name, 40));
                }
            }
            Err(e) => {
                stats.failed += 1;
                error!("❌ {}", e);
            }
        }

        logging::log_section("📄 试卷");
        match test_result {
            Ok(list) => {
                stats.loaded += 1;
                info!("共 {} 份试卷", list.len());
                for test in list.iter().take(limit) {
                    info!(
                        "  #{} {} ({} 题)",
                        test.id,
                        logging::truncate_text(&test.title, 40),
                        test.num_questions.unwrap_or_default()
                    );
                }
            }
            Err(e) => {
                stats.failed += 1;
                error!("❌ {}", e);
            }
        }

        logging::log_section("🏆 成绩前列");
        match top_result {
            Ok(Value::Array(rows)) => {
                stats.loaded += 1;
                for row in rows.iter().take(limit) {
                    info!("  {}", logging::truncate_text(&row.to_string(), 80));
                }
            }
            Ok(other) => {
                stats.loaded += 1;
                info!("  {}", logging::truncate_text(&other.to_string(), 80));
            }
            Err(e) => {
                stats.failed += 1;
                error!("❌ {}", e);
            }
        }

        stats
    }
}
