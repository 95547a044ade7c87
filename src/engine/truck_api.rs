use super::helpers::{decode_all, fetch_truck_for_update, update_truck};
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::{AvailabilityQuery, TruckAPI},
    auth::{Platform, User},
    entities::{booking, Truck, TruckInput, TruckType},
    error::{invalid_input_error, invalid_invocation_error, not_found_error, Error},
};

#[async_trait]
impl TruckAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_truck(&self, user: User, input: TruckInput) -> Result<Truck, Error> {
        self.authorize(user.clone(), "create_truck", Platform::default())?;

        let truck = Truck::new(user.id, input, Utc::now())?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO trucks (id, owner_id, is_active, created_at, data) VALUES ($1, $2, $3, $4, $5)")
                .bind(&truck.id)
                .bind(&truck.owner_id)
                .bind(truck.is_active)
                .bind(truck.created_at)
                .bind(Json(&truck)),
        )
        .await?;

        Ok(truck)
    }

    #[tracing::instrument(skip(self))]
    async fn find_truck(&self, user: User, id: Uuid) -> Result<Truck, Error> {
        let mut conn = self.pool.acquire().await?;

        let Json(truck): Json<Truck> = conn
            .fetch_optional(sqlx::query("SELECT data FROM trucks WHERE id = $1").bind(&id))
            .await?
            .ok_or_else(|| not_found_error().with_message("truck not found"))?
            .try_get("data")?;

        self.authorize(user.clone(), "read", truck.clone())?;

        Ok(truck)
    }

    #[tracing::instrument(skip(self))]
    async fn list_trucks(&self, _user: User, truck_type: Option<TruckType>) -> Result<Vec<Truck>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM trucks WHERE is_active AND ($1::VARCHAR IS NULL OR data->>'truck_type' = $1) ORDER BY created_at DESC")
                    .bind(truck_type.map(|truck_type| truck_type.name())),
            )
            .await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn list_my_trucks(&self, user: User) -> Result<Vec<Truck>, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM trucks WHERE owner_id = $1 ORDER BY created_at DESC")
                    .bind(&user.id),
            )
            .await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn update_truck(&self, user: User, id: Uuid, input: TruckInput) -> Result<Truck, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut truck = fetch_truck_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "update", truck.clone())?;

        truck.revise(input, Utc::now())?;

        update_truck(&mut tx, &truck).await?;

        tx.commit().await?;

        Ok(truck)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_truck(&self, user: User, id: Uuid) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut truck = fetch_truck_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "delete", truck.clone())?;

        let counts = tx
            .fetch_one(
                sqlx::query("SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE status = ANY($2)) AS active FROM bookings WHERE truck_id = $1")
                    .bind(&truck.id)
                    .bind(booking::active_status_names()),
            )
            .await?;

        let total: i64 = counts.try_get("total")?;
        let active: i64 = counts.try_get("active")?;

        if active > 0 {
            return Err(invalid_invocation_error()
                .with_message("Trucks with active bookings cannot be deleted"));
        }

        // booking history keeps referencing the truck, so it is retired instead
        if total > 0 {
            truck.is_active = false;
            truck.updated_at = Utc::now();
            update_truck(&mut tx, &truck).await?;
        } else {
            tx.execute(sqlx::query("DELETE FROM trucks WHERE id = $1").bind(&truck.id))
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn available_trucks(&self, _user: User, query: AvailabilityQuery) -> Result<Vec<Truck>, Error> {
        if query.delivery_date <= query.pickup_date {
            return Err(invalid_input_error()
                .with_field("delivery_date", "Delivery date must be after pickup date"));
        }

        let mut conn = self.pool.acquire().await?;

        let sql = "
            SELECT
                t.data
            FROM
                trucks t
            WHERE
                t.is_active
                AND (t.data->>'available_from')::DATE <= $1
                AND (t.data->>'available_to')::DATE >= $1
                AND ($2::VARCHAR IS NULL OR t.data->>'truck_type' = $2)
                AND ($3::FLOAT8 IS NULL OR (t.data->>'capacity_tons')::FLOAT8 >= $3)
                AND ($4::VARCHAR IS NULL OR t.data->>'current_location' ILIKE '%' || $4 || '%')
                AND NOT EXISTS (
                    SELECT 1 FROM bookings b
                    WHERE
                        b.truck_id = t.id
                        AND b.status = ANY($5)
                        AND b.pickup_date < $7
                        AND $6 < b.expected_delivery_date
                )
            ORDER BY
                t.created_at DESC
        ";

        let rows = conn
            .fetch_all(
                sqlx::query(sql)
                    .bind(query.pickup_date.date_naive())
                    .bind(query.truck_type.map(|truck_type| truck_type.name()))
                    .bind(query.min_capacity)
                    .bind(query.location.as_deref().map(str::trim).filter(|location| !location.is_empty()))
                    .bind(booking::active_status_names())
                    .bind(query.pickup_date)
                    .bind(query.delivery_date),
            )
            .await?;

        decode_all(&rows)
    }
}
