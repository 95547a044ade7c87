use axum::http::HeaderMap;
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{unauthenticated_error, Error};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub roles: Vec<String>,
}

impl User {
    pub fn new(id: Uuid, roles: Vec<String>) -> Self {
        Self { id, roles }
    }

    pub fn new_system_user() -> Self {
        Self {
            id: Uuid::new_v4(),
            roles: vec!["system".into()],
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: Uuid::nil(),
            roles: vec![],
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.id.is_nil()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|x| x == role)
    }

    /// Resolves the caller from the identity headers set by the upstream
    /// gateway. Requests without an id header act as an anonymous user.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, Error> {
        let id = match headers.get(USER_ID_HEADER) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|value| Uuid::parse_str(value.trim()).ok())
                .filter(|id| !id.is_nil())
                .ok_or_else(|| unauthenticated_error().with_message("invalid user id header"))?,
            None => return Ok(Self::anonymous()),
        };

        let roles = headers
            .get(USER_ROLES_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(',')
                    .map(|role| role.trim().to_lowercase())
                    .filter(|role| !role.is_empty() && role != "system")
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { id, roles })
    }
}

impl PolarClass for User {
    fn get_polar_class_builder() -> oso::ClassBuilder<User> {
        oso::Class::builder()
            .name("User")
            .add_attribute_getter("id", |recv: &User| recv.id.to_string())
            .add_attribute_getter("roles", |recv: &User| recv.roles.clone())
            .add_attribute_getter("authenticated", |recv: &User| recv.is_authenticated())
    }

    fn get_polar_class() -> oso::Class {
        let builder = User::get_polar_class_builder();
        builder.build()
    }
}

#[test]
fn from_headers_test() {
    use axum::http::HeaderValue;

    let id = Uuid::new_v4();

    let mut headers = HeaderMap::new();
    headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
    headers.insert(USER_ROLES_HEADER, HeaderValue::from_static("Staff, ,system"));

    let user = User::from_headers(&headers).unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.roles, vec!["staff".to_string()]);
    assert!(user.is_authenticated());
    assert!(user.has_role("staff"));
    assert!(!user.has_role("system"));
}

#[test]
fn from_headers_anonymous_test() {
    let user = User::from_headers(&HeaderMap::new()).unwrap();
    assert!(!user.is_authenticated());
    assert!(user.roles.is_empty());
}

#[test]
fn from_headers_invalid_id_test() {
    use axum::http::HeaderValue;

    let mut headers = HeaderMap::new();
    headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));

    let err = User::from_headers(&headers).unwrap_err();
    assert_eq!(err.code, 104);
}
