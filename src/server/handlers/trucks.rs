use axum::extract::{Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{AvailabilityQuery, DynAPI};
use crate::auth::User;
use crate::entities::{Truck, TruckInput, TruckType};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct ListParams {
    truck_type: Option<TruckType>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Json(params): Json<TruckInput>,
) -> Result<Json<Truck>, Error> {
    let truck = api.create_truck(user, params).await?;

    Ok(truck.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Truck>>, Error> {
    let trucks = api.list_trucks(user, params.truck_type).await?;

    Ok(trucks.into())
}

pub async fn mine(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Truck>>, Error> {
    let trucks = api.list_my_trucks(user).await?;

    Ok(trucks.into())
}

pub async fn available(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<Json<Vec<Truck>>, Error> {
    let trucks = api.available_trucks(user, params).await?;

    Ok(trucks.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Truck>, Error> {
    let truck = api.find_truck(user, id).await?;

    Ok(truck.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(params): Json<TruckInput>,
) -> Result<Json<Truck>, Error> {
    let truck = api.update_truck(user, id, params).await?;

    Ok(truck.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, Error> {
    api.delete_truck(user, id).await?;

    Ok(().into())
}
