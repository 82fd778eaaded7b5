use crate::models::UserProfile;

/// 会话所处的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// 尚未确认登录状态
    Unknown,
    Authenticated,
    Anonymous,
    /// 确认登录状态时出现了 401 以外的失败
    Errored,
}

/// 会话快照
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub status: SessionStatus,
    pub user: Option<UserProfile>,
    /// 首次 / 刷新确认登录状态中
    pub loading: bool,
    /// 登录、注册、登出进行中
    pub action_loading: bool,
    pub auth_error: Option<String>,
}

impl Session {
    pub(crate) fn initial() -> Self {
        Self {
            status: SessionStatus::Unknown,
            user: None,
            loading: true,
            action_loading: false,
            auth_error: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated && self.user.is_some()
    }

    pub(crate) fn become_authenticated(&mut self, user: UserProfile) {
        self.status = SessionStatus::Authenticated;
        self.user = Some(user);
        self.auth_error = None;
    }

    pub(crate) fn become_anonymous(&mut self) {
        self.status = SessionStatus::Anonymous;
        self.user = None;
        self.auth_error = None;
    }

    pub(crate) fn become_errored(&mut self, message: String) {
        self.status = SessionStatus::Errored;
        self.user = None;
        self.auth_error = Some(message);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initial()
    }
}
