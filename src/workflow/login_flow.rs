//! 登录表单流程
//!
//! 把登录表单的提交接到会话管理器上；校验不通过时不会发出任何请求

use crate::forms::{login_validator, FormConfig, FormController, FormValues, SubmitOutcome};
use crate::models::Credentials;
use crate::session::SessionManager;
use serde_json::Value;

fn text(values: &FormValues, field: &str) -> String {
    values
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[derive(Clone, Debug)]
pub struct LoginFlow {
    form: FormController,
    session: SessionManager,
}

impl LoginFlow {
    pub fn new(session: SessionManager) -> Self {
        let mut initial = FormValues::new();
        initial.insert("username".to_string(), Value::String(String::new()));
        initial.insert("password".to_string(), Value::String(String::new()));

        let handler_session = session.clone();
        let config = FormConfig::new(initial)
            .validator(login_validator())
            .on_submit(move |values| {
                let session = handler_session.clone();
                async move {
                    let credentials = Credentials::new(text(&values, "username"), text(&values, "password"));
                    session.login(&credentials).await?;
                    Ok(())
                }
            });

        Self {
            form: FormController::new(config),
            session,
        }
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// 填写并提交登录表单
    pub async fn submit(&self, username: &str, password: &str) -> SubmitOutcome {
        self.form.handle_change("username", Value::String(username.to_string()));
        self.form.handle_change("password", Value::String(password.to_string()));
        self.form.handle_submit().await
    }
}
