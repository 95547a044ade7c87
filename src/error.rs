use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::collections::BTreeMap;
use std::env;
use std::fmt::Debug;

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
    pub fields: BTreeMap<String, Vec<String>>,
}

impl Error {
    fn new(code: i32, message: &str) -> Self {
        Self {
            code,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_field(mut self, field: &str, message: impl Into<String>) -> Self {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    pub fn is_internal(&self) -> bool {
        (1..=99).contains(&self.code)
    }

    fn status(&self) -> StatusCode {
        match self.code {
            1..=99 => StatusCode::INTERNAL_SERVER_ERROR,
            102 => StatusCode::FORBIDDEN,
            103 => StatusCode::NOT_FOUND,
            104 => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        let is_unique_violation = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code == "23505")
            .unwrap_or(false);

        if is_unique_violation {
            return invalid_input_error().with_message("record already exists");
        }

        database_error(err)
    }
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        authorization_error(err)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut err = invalid_input_error();

        for (field, field_errs) in errs.field_errors() {
            for field_err in field_errs.iter() {
                let message = match &field_err.message {
                    Some(message) => message.to_string(),
                    None => field_err.code.to_string(),
                };
                err = err.with_field(&field.to_string(), message);
            }
        }

        err
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self.is_internal() {
            true => {
                tracing::error!(code = self.code, message = %self.message, "internal error");
                "Internal Server Error"
            }
            false => self.message.as_str(),
        };

        let body = match self.fields.is_empty() {
            true => json!({
                "code": self.code,
                "error": error_message,
            }),
            false => json!({
                "code": self.code,
                "error": error_message,
                "fields": self.fields,
            }),
        };

        (status, Json(body)).into_response()
    }
}

pub fn invalid_invocation_error() -> Error {
    Error::new(100, "invalid invocation")
}

pub fn invalid_input_error() -> Error {
    Error::new(101, "invalid input")
}

pub fn unauthorized_error() -> Error {
    Error::new(102, "unauthorized")
}

pub fn not_found_error() -> Error {
    Error::new(103, "not found")
}

pub fn unauthenticated_error() -> Error {
    Error::new(104, "authentication required")
}

pub fn env_var_error(err: env::VarError) -> Error {
    tracing::error!(error = ?err, "environment variable error");
    Error::new(1, "environment variable error")
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!(error = ?err, "database error");
    Error::new(2, "database error")
}

pub fn authorization_error<T: Debug>(err: T) -> Error {
    tracing::error!(error = ?err, "authorization error");
    Error::new(3, "authorization error")
}

pub fn unexpected_error() -> Error {
    Error::new(5, "unexpected error")
}

pub fn config_error(key: &str) -> Error {
    Error::new(6, "configuration error").with_message(format!("invalid value for {}", key))
}

#[test]
fn error_status_test() {
    assert_eq!(invalid_input_error().status(), StatusCode::BAD_REQUEST);
    assert_eq!(invalid_invocation_error().status(), StatusCode::BAD_REQUEST);
    assert_eq!(unauthorized_error().status(), StatusCode::FORBIDDEN);
    assert_eq!(not_found_error().status(), StatusCode::NOT_FOUND);
    assert_eq!(unauthenticated_error().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unexpected_error().status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(config_error("PORT").status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn error_field_test() {
    let err = invalid_input_error()
        .with_field("amount", "too low")
        .with_field("amount", "not a number")
        .with_field("title", "required");

    assert_eq!(err.fields.len(), 2);
    assert_eq!(err.fields["amount"], vec!["too low", "not a number"]);
}

#[test]
fn validation_errors_conversion_test() {
    use validator::Validate;

    #[derive(Validate)]
    struct Params {
        #[validate(range(min = 1.0, message = "too low"))]
        amount: f64,
    }

    let err: Error = Params { amount: 0.5 }.validate().unwrap_err().into();

    assert_eq!(err.code, 101);
    assert_eq!(err.fields["amount"], vec!["too low"]);
}
