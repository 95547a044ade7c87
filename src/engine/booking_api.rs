use super::helpers::{
    decode_all, fetch_active_truck_bookings, fetch_booking_for_update, fetch_truck_for_update,
    update_booking,
};
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::BookingAPI,
    auth::{Platform, User},
    entities::{
        Booking, BookingInput, BookingPatch, BookingStatistics, BookingStatus, Truck,
    },
    error::{invalid_input_error, not_found_error, Error},
};

fn conflict_error(conflict: &Booking) -> Error {
    invalid_input_error().with_field(
        "pickup_date",
        format!(
            "This truck is already booked from {} to {}",
            conflict.pickup_date.format("%Y-%m-%d %H:%M"),
            conflict.expected_delivery_date.format("%Y-%m-%d %H:%M")
        ),
    )
}

#[async_trait]
impl BookingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_booking(&self, user: User, input: BookingInput) -> Result<Booking, Error> {
        self.authorize(user.clone(), "create_booking", Platform::default())?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        // the truck lock serializes competing bookings for the same truck
        let truck = fetch_truck_for_update(&mut tx, &input.truck_id).await?;

        let booking = Booking::new(user.id, &truck, input, Utc::now())?;

        let existing = fetch_active_truck_bookings(&mut tx, &truck.id).await?;

        if let Some(conflict) = booking.find_conflict(&existing) {
            tracing::info!(truck_id = %truck.id, conflict = %conflict.id, "booking window overlaps");
            return Err(conflict_error(conflict));
        }

        tx.execute(
            sqlx::query("INSERT INTO bookings (id, reference, truck_id, customer_id, truck_owner_id, status, pickup_date, expected_delivery_date, created_at, data) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)")
                .bind(&booking.id)
                .bind(&booking.reference)
                .bind(&booking.truck_id)
                .bind(&booking.customer_id)
                .bind(&booking.truck_owner_id)
                .bind(booking.status.name())
                .bind(booking.pickup_date)
                .bind(booking.expected_delivery_date)
                .bind(booking.created_at)
                .bind(Json(&booking)),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(id = %booking.id, reference = %booking.reference, "booking created");

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn find_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;

        let Json(booking): Json<Booking> = conn
            .fetch_optional(sqlx::query("SELECT data FROM bookings WHERE id = $1").bind(&id))
            .await?
            .ok_or_else(|| not_found_error().with_message("booking not found"))?
            .try_get("data")?;

        self.authorize(user.clone(), "read", booking.clone())?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn list_bookings(&self, user: User) -> Result<Vec<Booking>, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM bookings WHERE customer_id = $1 OR truck_owner_id = $1 ORDER BY created_at DESC")
                    .bind(&user.id),
            )
            .await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn list_my_bookings(&self, user: User) -> Result<Vec<Booking>, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM bookings WHERE customer_id = $1 ORDER BY created_at DESC")
                    .bind(&user.id),
            )
            .await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn list_truck_bookings(
        &self,
        user: User,
        truck_id: Option<Uuid>,
    ) -> Result<Vec<Booking>, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let rows = match truck_id {
            Some(truck_id) => {
                let Json(truck): Json<Truck> = conn
                    .fetch_optional(sqlx::query("SELECT data FROM trucks WHERE id = $1").bind(&truck_id))
                    .await?
                    .ok_or_else(|| not_found_error().with_message("truck not found"))?
                    .try_get("data")?;

                self.authorize(user.clone(), "list_bookings", truck.clone())?;

                conn.fetch_all(
                    sqlx::query("SELECT data FROM bookings WHERE truck_id = $1 ORDER BY pickup_date ASC")
                        .bind(&truck.id),
                )
                .await?
            }
            None => {
                conn.fetch_all(
                    sqlx::query("SELECT data FROM bookings WHERE truck_owner_id = $1 ORDER BY pickup_date ASC")
                        .bind(&user.id),
                )
                .await?
            }
        };

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn update_booking(&self, user: User, id: Uuid, patch: BookingPatch) -> Result<Booking, Error> {
        let booking = self.find_booking(user.clone(), id).await?;

        self.authorize(user.clone(), "update", booking.clone())?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;
        let now = Utc::now();

        // truck before booking, matching the lock order of create_booking
        let truck = fetch_truck_for_update(&mut tx, &booking.truck_id).await?;
        let mut booking = fetch_booking_for_update(&mut tx, &id).await?;

        let previous_pickup = booking.pickup_date;
        let window_changed = booking.revise(&truck, patch, now)?;

        if window_changed {
            if booking.pickup_date != previous_pickup
                && !truck.is_available_on(booking.pickup_date.date_naive())
            {
                return Err(invalid_input_error()
                    .with_field("pickup_date", "This truck is not available on the pickup date"));
            }

            let existing = fetch_active_truck_bookings(&mut tx, &truck.id).await?;

            if let Some(conflict) = booking.find_conflict(&existing) {
                return Err(conflict_error(conflict));
            }
        }

        update_booking(&mut tx, &booking).await?;

        tx.commit().await?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn update_booking_status(
        &self,
        user: User,
        id: Uuid,
        status: BookingStatus,
        notes: Option<String>,
    ) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut booking = fetch_booking_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "update_status", booking.clone())?;

        booking.update_status(status, user.id, notes, Utc::now())?;

        update_booking(&mut tx, &booking).await?;

        tx.commit().await?;

        tracing::info!(id = %booking.id, status = %booking.status.name(), "booking status changed");

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut booking = fetch_booking_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "cancel", booking.clone())?;

        booking.cancel(user.id, Utc::now())?;

        update_booking(&mut tx, &booking).await?;

        tx.commit().await?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn booking_statistics(&self, user: User) -> Result<BookingStatistics, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let mut stats = BookingStatistics::default();

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT status, COUNT(*) AS count FROM bookings WHERE customer_id = $1 GROUP BY status")
                    .bind(&user.id),
            )
            .await?;

        for row in rows.iter() {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;

            stats.record_customer_count(&status, count);
        }

        let owner = conn
            .fetch_one(
                sqlx::query(
                    "
                    SELECT
                        COUNT(*) AS total,
                        COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                        SUM((data->>'final_price')::FLOAT8) FILTER (WHERE status = 'completed') AS revenue
                    FROM
                        bookings
                    WHERE
                        truck_owner_id = $1
                    ",
                )
                .bind(&user.id),
            )
            .await?;

        stats.truck_bookings = owner.try_get("total")?;
        stats.truck_completed_bookings = owner.try_get("completed")?;
        stats.total_revenue = owner
            .try_get::<Option<f64>, _>("revenue")?
            .unwrap_or_default();

        Ok(stats)
    }
}
