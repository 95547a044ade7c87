use super::helpers::{
    decode_all, fetch_bid_for_update, fetch_listing_for_update, fetch_pending_bids_for_update,
    insert_notification, update_bid, update_listing,
};
use super::Engine;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::{BidAPI, BidResponse},
    auth::{Platform, User},
    entities::{
        expire_overdue_bids, reject_competing_bids, Bid, BidStatistics, BidStatus, BidTerms,
        CargoListing, ListingStatus, Notification, NotificationKind,
    },
    error::{invalid_input_error, invalid_invocation_error, not_found_error, unauthorized_error, Error},
};

#[async_trait]
impl BidAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn submit_bid(&self, user: User, listing_id: Uuid, terms: BidTerms) -> Result<Bid, Error> {
        self.authorize(user.clone(), "submit_bid", Platform::default())?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        // the listing lock serializes bids against acceptance of another bid
        let listing = fetch_listing_for_update(&mut tx, &listing_id).await?;

        if listing.owner_id == user.id {
            return Err(unauthorized_error().with_message("You cannot bid on your own freight listing."));
        }

        let existing = tx
            .fetch_optional(
                sqlx::query("SELECT data FROM bids WHERE listing_id = $1 AND bidder_id = $2 FOR UPDATE")
                    .bind(&listing.id)
                    .bind(&user.id),
            )
            .await?;

        if let Some(row) = existing {
            let Json(previous): Json<Bid> = row.try_get("data")?;

            let message = match previous.is_pending() && previous.is_active {
                true => "You already have a pending bid for this cargo listing",
                false => "You have already placed a bid on this cargo listing",
            };

            return Err(invalid_input_error().with_field("listing_id", message));
        }

        let bid = Bid::new(&listing, user.id, terms, Utc::now())?;

        tx.execute(
            sqlx::query("INSERT INTO bids (id, listing_id, bidder_id, status, amount, is_active, expires_at, submitted_at, data) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)")
                .bind(&bid.id)
                .bind(&bid.listing_id)
                .bind(&bid.bidder_id)
                .bind(bid.status.name())
                .bind(bid.amount)
                .bind(bid.is_active)
                .bind(bid.expires_at)
                .bind(bid.submitted_at)
                .bind(Json(&bid)),
        )
        .await?;

        insert_notification(&mut tx, &Notification::new_bid(&bid)).await?;

        tx.commit().await?;

        tracing::info!(id = %bid.id, listing_id = %bid.listing_id, "bid submitted");

        Ok(bid)
    }

    #[tracing::instrument(skip(self))]
    async fn find_bid(&self, user: User, id: Uuid) -> Result<Bid, Error> {
        let mut conn = self.pool.acquire().await?;

        let Json(bid): Json<Bid> = conn
            .fetch_optional(sqlx::query("SELECT data FROM bids WHERE id = $1 AND is_active").bind(&id))
            .await?
            .ok_or_else(|| not_found_error().with_message("bid not found"))?
            .try_get("data")?;

        self.authorize(user.clone(), "read", bid.clone())?;

        Ok(bid)
    }

    #[tracing::instrument(skip(self))]
    async fn list_bids(&self, user: User) -> Result<Vec<Bid>, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let query = "
            SELECT
                b.data
            FROM
                bids b
                JOIN listings l ON l.id = b.listing_id
            WHERE
                b.is_active
                AND (b.bidder_id = $1 OR l.owner_id = $1)
            ORDER BY
                b.submitted_at DESC
        ";

        let rows = conn.fetch_all(sqlx::query(query).bind(&user.id)).await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn list_my_bids(&self, user: User, status: Option<BidStatus>) -> Result<Vec<Bid>, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM bids WHERE bidder_id = $1 AND is_active AND ($2::VARCHAR IS NULL OR status = $2) ORDER BY submitted_at DESC")
                    .bind(&user.id)
                    .bind(status.map(|status| status.name())),
            )
            .await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn list_listing_bids(&self, user: User, listing_id: Uuid) -> Result<Vec<Bid>, Error> {
        let mut conn = self.pool.acquire().await?;

        let Json(listing): Json<CargoListing> = conn
            .fetch_optional(sqlx::query("SELECT data FROM listings WHERE id = $1").bind(&listing_id))
            .await?
            .ok_or_else(|| not_found_error().with_message("cargo listing not found"))?
            .try_get("data")?;

        self.authorize(user.clone(), "list_bids", listing.clone())?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM bids WHERE listing_id = $1 AND is_active ORDER BY amount ASC, submitted_at ASC")
                    .bind(&listing.id),
            )
            .await?;

        decode_all(&rows)
    }

    #[tracing::instrument(skip(self))]
    async fn update_bid(&self, user: User, id: Uuid, terms: BidTerms) -> Result<Bid, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut bid = fetch_bid_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "update", bid.clone())?;

        bid.revise(terms, Utc::now())?;

        update_bid(&mut tx, &bid).await?;

        tx.commit().await?;

        Ok(bid)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_bid(&self, user: User, id: Uuid) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut bid = fetch_bid_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "delete", bid.clone())?;

        bid.deactivate();

        update_bid(&mut tx, &bid).await?;

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn respond_to_bid(
        &self,
        user: User,
        id: Uuid,
        response: BidResponse,
        notes: Option<String>,
    ) -> Result<Bid, Error> {
        let mut conn = self.pool.acquire().await?;

        tracing::info!("fetching bid without lock");
        let Json(bid): Json<Bid> = conn
            .fetch_optional(sqlx::query("SELECT data FROM bids WHERE id = $1 AND is_active").bind(&id))
            .await?
            .ok_or_else(|| not_found_error().with_message("bid not found"))?
            .try_get("data")?;

        // the shipper never changes, so checking before taking locks is safe
        self.authorize(user.clone(), "respond", bid.clone())?;

        let mut tx = conn.begin().await?;
        let now = Utc::now();

        // listing first, then bids, matching the lock order of submit_bid
        let mut listing = fetch_listing_for_update(&mut tx, &bid.listing_id).await?;
        let mut bid = fetch_bid_for_update(&mut tx, &id).await?;

        match response {
            BidResponse::Accept => {
                if !listing.is_open() {
                    return Err(invalid_invocation_error()
                        .with_message("This cargo listing is no longer accepting bids"));
                }

                bid.accept(notes, now)?;
                listing.transition(ListingStatus::InProgress, now)?;

                let mut siblings = fetch_pending_bids_for_update(&mut tx, &listing.id).await?;
                let rejected = reject_competing_bids(&bid, &mut siblings, now);

                update_bid(&mut tx, &bid).await?;
                update_listing(&mut tx, &listing).await?;
                insert_notification(&mut tx, &Notification::bid_accepted(&bid)).await?;

                for sibling in rejected.iter() {
                    update_bid(&mut tx, sibling).await?;
                    insert_notification(&mut tx, &Notification::bid_rejected(sibling)).await?;
                }

                tracing::info!(
                    id = %bid.id,
                    listing_id = %listing.id,
                    rejected = rejected.len(),
                    "bid accepted"
                );
            }
            BidResponse::Reject => {
                bid.reject(notes, now)?;

                update_bid(&mut tx, &bid).await?;
                insert_notification(&mut tx, &Notification::bid_rejected(&bid)).await?;
            }
        }

        tx.commit().await?;

        Ok(bid)
    }

    #[tracing::instrument(skip(self))]
    async fn withdraw_bid(&self, user: User, id: Uuid) -> Result<Bid, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut bid = fetch_bid_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "withdraw", bid.clone())?;

        bid.withdraw(Utc::now())?;

        update_bid(&mut tx, &bid).await?;
        insert_notification(&mut tx, &Notification::bid_withdrawn(&bid)).await?;

        tx.commit().await?;

        Ok(bid)
    }

    #[tracing::instrument(skip(self))]
    async fn bid_statistics(&self, user: User) -> Result<BidStatistics, Error> {
        self.authorize(user.clone(), "list_own", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let bidder = conn
            .fetch_one(
                sqlx::query(
                    "
                    SELECT
                        COUNT(*) AS submitted,
                        COUNT(*) FILTER (WHERE status = 'accepted') AS accepted,
                        COUNT(*) FILTER (WHERE status = 'rejected') AS rejected,
                        COUNT(*) FILTER (WHERE status = 'pending' AND is_active) AS pending,
                        AVG(amount) AS average_amount
                    FROM
                        bids
                    WHERE
                        bidder_id = $1
                    ",
                )
                .bind(&user.id),
            )
            .await?;

        let shipper = conn
            .fetch_one(
                sqlx::query(
                    "
                    SELECT
                        COUNT(DISTINCT l.id) AS listings,
                        COUNT(b.id) AS received
                    FROM
                        listings l
                        LEFT JOIN bids b ON b.listing_id = l.id AND b.is_active
                    WHERE
                        l.owner_id = $1
                    ",
                )
                .bind(&user.id),
            )
            .await?;

        Ok(BidStatistics::compute(
            bidder.try_get("submitted")?,
            bidder.try_get("accepted")?,
            bidder.try_get("rejected")?,
            bidder.try_get("pending")?,
            bidder.try_get("average_amount")?,
            shipper.try_get("listings")?,
            shipper.try_get("received")?,
        ))
    }

    #[tracing::instrument(skip(self))]
    async fn expire_bids(&self, user: User) -> Result<u64, Error> {
        self.authorize(user.clone(), "sweep", Platform::default())?;

        let now = Utc::now();

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let rows = tx
            .fetch_all(
                sqlx::query("SELECT data FROM bids WHERE status = 'pending' AND is_active AND expires_at <= $1 FOR UPDATE SKIP LOCKED")
                    .bind(now),
            )
            .await?;

        let mut bids: Vec<Bid> = decode_all(&rows)?;
        let expired = expire_overdue_bids(&mut bids, now);

        for bid in expired.iter() {
            update_bid(&mut tx, bid).await?;
        }

        tx.commit().await?;

        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "expired bids");
        }

        Ok(expired.len() as u64)
    }

    #[tracing::instrument(skip(self))]
    async fn warn_expiring_bids(&self, user: User, within: Duration) -> Result<u64, Error> {
        self.authorize(user.clone(), "sweep", Platform::default())?;

        let now = Utc::now();

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let query = "
            SELECT
                b.data
            FROM
                bids b
            WHERE
                b.status = 'pending'
                AND b.is_active
                AND b.expires_at > $1
                AND b.expires_at <= $2
                AND NOT EXISTS (
                    SELECT 1 FROM notifications n WHERE n.bid_id = b.id AND n.kind = $3
                )
            FOR UPDATE OF b SKIP LOCKED
        ";

        let rows = tx
            .fetch_all(
                sqlx::query(query)
                    .bind(now)
                    .bind(now + within)
                    .bind(NotificationKind::BidExpiring.name()),
            )
            .await?;

        let bids: Vec<Bid> = decode_all(&rows)?;

        for bid in bids.iter() {
            insert_notification(&mut tx, &Notification::bid_expiring(bid)).await?;
        }

        tx.commit().await?;

        Ok(bids.len() as u64)
    }
}
