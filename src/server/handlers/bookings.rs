use axum::extract::{Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::{Booking, BookingInput, BookingPatch, BookingStatistics, BookingStatus};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct TruckBookingsParams {
    truck_id: Option<Uuid>,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateStatusParams {
    status: BookingStatus,
    notes: Option<String>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Json(params): Json<BookingInput>,
) -> Result<Json<Booking>, Error> {
    let booking = api.create_booking(user, params).await?;

    Ok(booking.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Booking>>, Error> {
    let bookings = api.list_bookings(user).await?;

    Ok(bookings.into())
}

pub async fn mine(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Booking>>, Error> {
    let bookings = api.list_my_bookings(user).await?;

    Ok(bookings.into())
}

pub async fn truck_bookings(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Query(params): Query<TruckBookingsParams>,
) -> Result<Json<Vec<Booking>>, Error> {
    let bookings = api.list_truck_bookings(user, params.truck_id).await?;

    Ok(bookings.into())
}

pub async fn statistics(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
) -> Result<Json<BookingStatistics>, Error> {
    let statistics = api.booking_statistics(user).await?;

    Ok(statistics.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.find_booking(user, id).await?;

    Ok(booking.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(params): Json<BookingPatch>,
) -> Result<Json<Booking>, Error> {
    let booking = api.update_booking(user, id, params).await?;

    Ok(booking.into())
}

pub async fn update_status(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateStatusParams>,
) -> Result<Json<Booking>, Error> {
    let booking = api
        .update_booking_status(user, id, params.status, params.notes)
        .await?;

    Ok(booking.into())
}

pub async fn cancel(
    Extension(api): Extension<DynAPI>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.cancel_booking(user, id).await?;

    Ok(booking.into())
}
