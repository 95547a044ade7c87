use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::{CargoListing, ListingInput, ListingStatus, ListingSummary};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct UpdateStatusParams {
    status: ListingStatus,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Json(params): Json<ListingInput>,
) -> Result<Json<CargoListing>, Error> {
    let listing = api.create_listing(user, params).await?;

    Ok(listing.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<ListingSummary>>, Error> {
    let listings = api.list_open_listings(user).await?;

    Ok(listings.into())
}

pub async fn mine(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<ListingSummary>>, Error> {
    let listings = api.list_my_listings(user).await?;

    Ok(listings.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<CargoListing>, Error> {
    let listing = api.find_listing(user, id).await?;

    Ok(listing.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(params): Json<ListingInput>,
) -> Result<Json<CargoListing>, Error> {
    let listing = api.update_listing(user, id, params).await?;

    Ok(listing.into())
}

pub async fn update_status(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateStatusParams>,
) -> Result<Json<CargoListing>, Error> {
    let listing = api.update_listing_status(user, id, params.status).await?;

    Ok(listing.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, Error> {
    api.delete_listing(user, id).await?;

    Ok(().into())
}
