use super::helpers::{fetch_listing_for_update, update_listing};
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::ListingAPI,
    auth::{Platform, User},
    entities::{CargoListing, ListingInput, ListingStatus, ListingSummary},
    error::{not_found_error, Error},
};

const SUMMARY_COLUMNS: &str = "
    l.data,
    (
        SELECT COUNT(*) FROM bids b
        WHERE b.listing_id = l.id AND b.status = 'pending' AND b.is_active
    ) AS bid_count
";

fn decode_summaries(rows: &[PgRow]) -> Result<Vec<ListingSummary>, Error> {
    let mut summaries = Vec::with_capacity(rows.len());

    for row in rows.iter() {
        let Json(listing): Json<CargoListing> = row.try_get("data")?;
        let bid_count: i64 = row.try_get("bid_count")?;

        summaries.push(ListingSummary { listing, bid_count });
    }

    Ok(summaries)
}

#[async_trait]
impl ListingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_listing(&self, user: User, input: ListingInput) -> Result<CargoListing, Error> {
        self.authorize(user.clone(), "create_listing", Platform::default())?;

        let listing = CargoListing::new(user.id, input, Utc::now())?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO listings (id, owner_id, status, created_at, data) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&listing.id)
            .bind(&listing.owner_id)
            .bind(listing.status.name())
            .bind(listing.created_at)
            .bind(Json(&listing)),
        )
        .await?;

        tracing::info!(id = %listing.id, "cargo listing created");

        Ok(listing)
    }

    #[tracing::instrument(skip(self))]
    async fn find_listing(&self, user: User, id: Uuid) -> Result<CargoListing, Error> {
        let mut conn = self.pool.acquire().await?;

        let Json(listing): Json<CargoListing> = conn
            .fetch_optional(sqlx::query("SELECT data FROM listings WHERE id = $1").bind(&id))
            .await?
            .ok_or_else(|| not_found_error().with_message("cargo listing not found"))?
            .try_get("data")?;

        self.authorize(user.clone(), "read", listing.clone())?;

        Ok(listing)
    }

    #[tracing::instrument(skip(self))]
    async fn list_open_listings(&self, _user: User) -> Result<Vec<ListingSummary>, Error> {
        let mut conn = self.pool.acquire().await?;

        let query = format!(
            "SELECT {} FROM listings l WHERE l.status = $1 ORDER BY l.created_at DESC",
            SUMMARY_COLUMNS
        );

        let rows = conn
            .fetch_all(sqlx::query(&query).bind(ListingStatus::Open.name()))
            .await?;

        decode_summaries(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn list_my_listings(&self, user: User) -> Result<Vec<ListingSummary>, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let query = format!(
            "SELECT {} FROM listings l WHERE l.owner_id = $1 ORDER BY l.created_at DESC",
            SUMMARY_COLUMNS
        );

        let rows = conn.fetch_all(sqlx::query(&query).bind(&user.id)).await?;

        decode_summaries(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn update_listing(
        &self,
        user: User,
        id: Uuid,
        input: ListingInput,
    ) -> Result<CargoListing, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut listing = fetch_listing_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "update", listing.clone())?;

        listing.revise(input, Utc::now())?;

        update_listing(&mut tx, &listing).await?;

        tx.commit().await?;

        Ok(listing)
    }

    #[tracing::instrument(skip(self))]
    async fn update_listing_status(
        &self,
        user: User,
        id: Uuid,
        status: ListingStatus,
    ) -> Result<CargoListing, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut listing = fetch_listing_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "update_status", listing.clone())?;

        listing.transition(status, Utc::now())?;

        update_listing(&mut tx, &listing).await?;

        tx.commit().await?;

        tracing::info!(id = %listing.id, status = %listing.status.name(), "cargo listing status changed");

        Ok(listing)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_listing(&self, user: User, id: Uuid) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let listing = fetch_listing_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "delete", listing.clone())?;

        listing.ensure_deletable()?;

        tx.execute(sqlx::query("DELETE FROM listings WHERE id = $1").bind(&listing.id))
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
