//! 未授权跳转
//!
//! 资源客户端只广播 `AuthSignal`，是否跳转、跳到哪里只在这里决定。
//! 整个应用只应挂一个 `RedirectObserver`。

use crate::infrastructure::AuthSignal;
use crate::session::SessionManager;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 路由器抽象，由宿主（CLI / TUI / Web 外壳）提供
pub trait Navigator: Send + Sync {
    fn current_route(&self) -> String;
    fn navigate(&self, route: &str);
}

/// 只记录路由变化的导航器（命令行与测试使用）
#[derive(Debug)]
pub struct RecordingNavigator {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(start.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// 发生过的跳转（按时间顺序）
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_route(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn navigate(&self, route: &str) {
        info!("➡️ 跳转到 {}", route);
        *self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = route.to_string();
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(route.to_string());
    }
}

/// 401 观察者
pub struct RedirectObserver {
    login_route: String,
    navigator: Arc<dyn Navigator>,
    session: Option<SessionManager>,
}

impl RedirectObserver {
    pub fn new(login_route: impl Into<String>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            login_route: login_route.into(),
            navigator,
            session: None,
        }
    }

    /// 收到 401 时同时清除本地会话
    pub fn with_session(mut self, session: SessionManager) -> Self {
        self.session = Some(session);
        self
    }

    /// 处理一个信号，返回是否发生了跳转
    pub fn handle(&self, signal: &AuthSignal) -> bool {
        let AuthSignal::Unauthorized { endpoint } = signal;
        info!("🔒 {} 返回未授权", endpoint);

        if let Some(session) = &self.session {
            if session.is_authenticated() {
                session.clear();
            }
        }

        if self.navigator.current_route() == self.login_route {
            debug!("已在登录页，不再跳转");
            return false;
        }
        self.navigator.navigate(&self.login_route);
        true
    }

    /// 在后台持续处理信号，直到通道关闭
    pub fn spawn(self, mut signals: broadcast::Receiver<AuthSignal>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    Ok(signal) => {
                        self.handle(&signal);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("⚠️ 跳过了 {} 个未授权信号", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
