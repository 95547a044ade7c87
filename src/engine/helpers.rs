use super::Database;

use serde::de::DeserializeOwned;
use sqlx::{postgres::PgRow, types::Json, Executor, Row, Transaction};
use uuid::Uuid;

use crate::{
    entities::{booking, Bid, Booking, CargoListing, Notification, Truck},
    error::{not_found_error, Error},
};

pub fn decode_all<T: DeserializeOwned>(rows: &[PgRow]) -> Result<Vec<T>, Error> {
    let mut items = Vec::with_capacity(rows.len());

    for row in rows.iter() {
        let Json(item): Json<T> = row.try_get("data")?;
        items.push(item);
    }

    Ok(items)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_listing_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<CargoListing, Error> {
    let Json(listing): Json<CargoListing> = tx
        .fetch_optional(sqlx::query("SELECT data FROM listings WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(|| not_found_error().with_message("cargo listing not found"))?
        .try_get("data")?;

    Ok(listing)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_bid_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Bid, Error> {
    let Json(bid): Json<Bid> = tx
        .fetch_optional(
            sqlx::query("SELECT data FROM bids WHERE id = $1 AND is_active FOR UPDATE").bind(id),
        )
        .await?
        .ok_or_else(|| not_found_error().with_message("bid not found"))?
        .try_get("data")?;

    Ok(bid)
}

/// Locks every live pending bid on the listing. Rows are taken in id order so
/// concurrent acceptances on the same listing queue up instead of deadlocking.
#[tracing::instrument(skip(tx))]
pub async fn fetch_pending_bids_for_update(
    tx: &mut Transaction<'_, Database>,
    listing_id: &Uuid,
) -> Result<Vec<Bid>, Error> {
    let rows = tx
        .fetch_all(
            sqlx::query("SELECT data FROM bids WHERE listing_id = $1 AND status = 'pending' AND is_active ORDER BY id FOR UPDATE")
                .bind(listing_id),
        )
        .await?;

    decode_all(&rows)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_truck_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Truck, Error> {
    let Json(truck): Json<Truck> = tx
        .fetch_optional(sqlx::query("SELECT data FROM trucks WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(|| not_found_error().with_message("truck not found"))?
        .try_get("data")?;

    Ok(truck)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_booking_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Booking, Error> {
    let Json(booking): Json<Booking> = tx
        .fetch_optional(sqlx::query("SELECT data FROM bookings WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(|| not_found_error().with_message("booking not found"))?
        .try_get("data")?;

    Ok(booking)
}

/// Active bookings on the truck. Callers must already hold the truck row
/// lock so the result stays accurate until they commit.
#[tracing::instrument(skip(tx))]
pub async fn fetch_active_truck_bookings(
    tx: &mut Transaction<'_, Database>,
    truck_id: &Uuid,
) -> Result<Vec<Booking>, Error> {
    let rows = tx
        .fetch_all(
            sqlx::query("SELECT data FROM bookings WHERE truck_id = $1 AND status = ANY($2)")
                .bind(truck_id)
                .bind(booking::active_status_names()),
        )
        .await?;

    decode_all(&rows)
}

#[tracing::instrument(skip(tx))]
pub async fn update_listing(
    tx: &mut Transaction<'_, Database>,
    listing: &CargoListing,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE listings SET status = $2, data = $3 WHERE id = $1")
            .bind(&listing.id)
            .bind(listing.status.name())
            .bind(Json(listing)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_bid(tx: &mut Transaction<'_, Database>, bid: &Bid) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE bids SET status = $2, amount = $3, is_active = $4, expires_at = $5, data = $6 WHERE id = $1")
            .bind(&bid.id)
            .bind(bid.status.name())
            .bind(bid.amount)
            .bind(bid.is_active)
            .bind(bid.expires_at)
            .bind(Json(bid)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_truck(tx: &mut Transaction<'_, Database>, truck: &Truck) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE trucks SET is_active = $2, data = $3 WHERE id = $1")
            .bind(&truck.id)
            .bind(truck.is_active)
            .bind(Json(truck)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_booking(
    tx: &mut Transaction<'_, Database>,
    booking: &Booking,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE bookings SET status = $2, pickup_date = $3, expected_delivery_date = $4, data = $5 WHERE id = $1")
            .bind(&booking.id)
            .bind(booking.status.name())
            .bind(booking.pickup_date)
            .bind(booking.expected_delivery_date)
            .bind(Json(booking)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn insert_notification(
    tx: &mut Transaction<'_, Database>,
    notification: &Notification,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("INSERT INTO notifications (id, recipient_id, bid_id, kind, is_read, sent_at, data) VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(&notification.id)
            .bind(&notification.recipient_id)
            .bind(&notification.bid_id)
            .bind(notification.kind.name())
            .bind(notification.is_read)
            .bind(notification.sent_at)
            .bind(Json(notification)),
    )
    .await?;

    Ok(())
}
