/// 认证服务
///
/// 登录、注册、登出、"我是谁"、刷新令牌。
/// 这些接口的 401 属于正常业务结果（凭据错误 / 未登录），不广播跳转信号
use crate::error::ServiceResult;
use crate::infrastructure::{ApiCall, ApiClient, RequestScope};
use crate::models::{Credentials, RegisterRequest, UserProfile};
use crate::services::support;
use serde_json::Value;
use tracing::info;

const LOGIN: &str = "users/login/";
const REGISTER: &str = "users/register/";
const LOGOUT: &str = "users/logout/";
const USER_INFO: &str = "users/user-info/";
const REFRESH: &str = "users/refresh/";

/// 认证服务
#[derive(Clone, Debug)]
pub struct AuthService {
    scope: RequestScope,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self::with_scope(RequestScope::new(client))
    }

    pub fn with_scope(scope: RequestScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    /// 登录；成功后 cookie 由客户端保存
    pub async fn login(&self, credentials: &Credentials) -> ServiceResult<Value> {
        info!("🔐 登录: {}", credentials.username);
        support::call_value(
            &self.scope,
            ApiCall::post(LOGIN)
                .json(credentials)
                .without_unauthorized_signal()
                .fallback("Invalid credentials"),
        )
        .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ServiceResult<Value> {
        info!("📝 注册: {}", request.username);
        support::call_value(
            &self.scope,
            ApiCall::post(REGISTER)
                .json(request)
                .without_unauthorized_signal()
                .fallback("Registration failed"),
        )
        .await
    }

    pub async fn logout(&self) -> ServiceResult<()> {
        support::call_unit(
            &self.scope,
            ApiCall::post(LOGOUT)
                .without_unauthorized_signal()
                .fallback("Logout failed"),
        )
        .await
    }

    /// 当前登录用户
    pub async fn user_info(&self) -> ServiceResult<UserProfile> {
        support::call_json(
            &self.scope,
            ApiCall::get(USER_INFO)
                .without_unauthorized_signal()
                .fallback("Failed to load user information"),
        )
        .await
    }

    pub async fn refresh_token(&self) -> ServiceResult<Value> {
        support::call_value(
            &self.scope,
            ApiCall::post(REFRESH)
                .without_unauthorized_signal()
                .fallback("Token refresh failed"),
        )
        .await
    }
}
