//! 会话管理器
//!
//! 整个应用只有一个权威会话，由 `SessionManager` 独占写入；
//! 其他使用方持有管理器的克隆，通过 `snapshot` / `subscribe` 读取。
//!
//! 状态只会经由四种转换改变：挂载刷新、登录、登出、手动清除。

use crate::error::{FailureKind, ServiceResult};
use crate::infrastructure::ApiClient;
use crate::models::{Credentials, RegisterRequest};
use crate::services::AuthService;
use crate::session::state::{Session, SessionStatus};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// 会话管理器
#[derive(Clone)]
pub struct SessionManager {
    auth: AuthService,
    state: Arc<watch::Sender<Session>>,
}

impl SessionManager {
    pub fn new(client: ApiClient) -> Self {
        Self::with_service(AuthService::new(client))
    }

    pub fn with_service(auth: AuthService) -> Self {
        let (state, _) = watch::channel(Session::initial());
        Self {
            auth,
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// 订阅会话变化，每次转换都会通知
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// 应用启动时确认登录状态
    pub async fn mount(&self) -> Session {
        self.refresh_user().await
    }

    /// 调用"我是谁"接口并据此转换状态
    ///
    /// - 成功 → `Authenticated`
    /// - 401 → `Anonymous`，不显示错误
    /// - 其他失败 → `Errored`，保留错误信息
    /// - 取消 → 只结束 loading
    pub async fn refresh_user(&self) -> Session {
        self.state.send_modify(|s| s.loading = true);

        let result = self.auth.user_info().await;

        self.state.send_modify(|s| {
            s.loading = false;
            match result {
                Ok(user) => {
                    info!("👤 已登录: {}", user.display_name());
                    s.become_authenticated(user);
                }
                Err(e) => match e.kind() {
                    FailureKind::Unauthorized => {
                        info!("未登录");
                        s.become_anonymous();
                    }
                    FailureKind::Cancelled => {}
                    _ => {
                        warn!("⚠️ 无法确认登录状态: {}", e);
                        s.become_errored(e.message().to_string());
                    }
                },
            }
        });

        self.snapshot()
    }

    /// 登录
    ///
    /// 成功后立即重新确认登录状态；失败时保持原状态，只设置 `auth_error`
    pub async fn login(&self, credentials: &Credentials) -> ServiceResult<()> {
        self.state.send_modify(|s| {
            s.action_loading = true;
            s.auth_error = None;
        });

        match self.auth.login(credentials).await {
            Ok(_) => {
                self.refresh_user().await;
                self.state.send_modify(|s| s.action_loading = false);
                Ok(())
            }
            Err(e) => {
                self.state.send_modify(|s| {
                    s.action_loading = false;
                    if !e.is_cancelled() {
                        s.auth_error = Some(e.message().to_string());
                    }
                });
                Err(e)
            }
        }
    }

    /// 注册；不会自动登录
    pub async fn register(&self, request: &RegisterRequest) -> ServiceResult<Value> {
        self.state.send_modify(|s| {
            s.action_loading = true;
            s.auth_error = None;
        });

        let result = self.auth.register(request).await;

        self.state.send_modify(|s| {
            s.action_loading = false;
            if let Err(e) = &result {
                if !e.is_cancelled() {
                    s.auth_error = Some(e.message().to_string());
                }
            }
        });
        result
    }

    /// 登出
    ///
    /// 无论远端调用是否成功，本地会话都清为 `Anonymous`。
    /// 返回远端调用是否成功
    pub async fn logout(&self) -> bool {
        self.state.send_modify(|s| s.action_loading = true);

        let remote_ok = match self.auth.logout().await {
            Ok(()) => true,
            Err(e) => {
                warn!("⚠️ 远端登出失败，仍清除本地会话: {}", e);
                false
            }
        };

        self.state.send_modify(|s| {
            s.action_loading = false;
            s.loading = false;
            s.become_anonymous();
        });
        info!("👋 已登出");
        remote_ok
    }

    /// 手动清除会话
    pub fn clear(&self) {
        self.state.send_modify(|s| {
            s.loading = false;
            s.action_loading = false;
            s.become_anonymous();
        });
    }

    /// 刷新令牌；不会定时自动执行
    pub async fn refresh_token(&self) -> ServiceResult<Value> {
        self.auth.refresh_token().await
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &*self.state.borrow())
            .finish()
    }
}
