use axum::extract::{Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::Notification;
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    unread: bool,
}

#[derive(Serialize, Deserialize)]
pub struct ReadAllResult {
    updated: u64,
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>, Error> {
    let notifications = api.list_notifications(user, params.unread).await?;

    Ok(notifications.into())
}

pub async fn read(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, Error> {
    let notification = api.mark_notification_read(user, id).await?;

    Ok(notification.into())
}

pub async fn read_all(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
) -> Result<Json<ReadAllResult>, Error> {
    let updated = api.mark_all_notifications_read(user).await?;

    Ok(ReadAllResult { updated }.into())
}
