//! 表单状态层

pub mod controller;
pub mod validation;

pub use controller::{
    sanitize_value, FormConfig, FormController, FormErrors, FormState, FormValues, SubmitHandler, SubmitOutcome,
    Validator,
};
pub use validation::{check_required, login_validator, required};
