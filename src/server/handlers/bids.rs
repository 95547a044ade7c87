use axum::extract::{Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{BidResponse, DynAPI};
use crate::auth::User;
use crate::entities::{Bid, BidStatistics, BidStatus, BidTerms};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    listing_id: Uuid,
    #[serde(flatten)]
    terms: BidTerms,
}

#[derive(Serialize, Deserialize)]
pub struct MineParams {
    status: Option<BidStatus>,
}

#[derive(Serialize, Deserialize)]
pub struct RespondParams {
    action: BidResponse,
    notes: Option<String>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Bid>, Error> {
    let bid = api.submit_bid(user, params.listing_id, params.terms).await?;

    Ok(bid.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Bid>>, Error> {
    let bids = api.list_bids(user).await?;

    Ok(bids.into())
}

pub async fn mine(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Query(params): Query<MineParams>,
) -> Result<Json<Vec<Bid>>, Error> {
    let bids = api.list_my_bids(user, params.status).await?;

    Ok(bids.into())
}

pub async fn list_for_listing(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<Vec<Bid>>, Error> {
    let bids = api.list_listing_bids(user, listing_id).await?;

    Ok(bids.into())
}

pub async fn statistics(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
) -> Result<Json<BidStatistics>, Error> {
    let statistics = api.bid_statistics(user).await?;

    Ok(statistics.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Bid>, Error> {
    let bid = api.find_bid(user, id).await?;

    Ok(bid.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(params): Json<BidTerms>,
) -> Result<Json<Bid>, Error> {
    let bid = api.update_bid(user, id, params).await?;

    Ok(bid.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, Error> {
    api.delete_bid(user, id).await?;

    Ok(().into())
}

pub async fn respond(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(params): Json<RespondParams>,
) -> Result<Json<Bid>, Error> {
    let bid = api
        .respond_to_bid(user, id, params.action, params.notes)
        .await?;

    Ok(bid.into())
}

pub async fn withdraw(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Bid>, Error> {
    let bid = api.withdraw_bid(user, id).await?;

    Ok(bid.into())
}
