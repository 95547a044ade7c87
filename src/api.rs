use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{
    Article, ArticleInput, Bid, BidStatistics, BidStatus, BidTerms, Booking, BookingInput,
    BookingPatch, BookingStatistics, BookingStatus, CargoListing, Conversation,
    ConversationSummary, Faq, FaqInput, ListingInput, ListingStatus, ListingSummary, Message,
    Notification, Service, ServiceInput, Truck, TruckInput, TruckType,
};
use crate::error::Error;

#[async_trait]
pub trait ListingAPI {
    async fn create_listing(&self, user: User, input: ListingInput) -> Result<CargoListing, Error>;
    async fn find_listing(&self, user: User, id: Uuid) -> Result<CargoListing, Error>;
    async fn list_open_listings(&self, user: User) -> Result<Vec<ListingSummary>, Error>;
    async fn list_my_listings(&self, user: User) -> Result<Vec<ListingSummary>, Error>;
    async fn update_listing(
        &self,
        user: User,
        id: Uuid,
        input: ListingInput,
    ) -> Result<CargoListing, Error>;
    async fn update_listing_status(
        &self,
        user: User,
        id: Uuid,
        status: ListingStatus,
    ) -> Result<CargoListing, Error>;
    async fn delete_listing(&self, user: User, id: Uuid) -> Result<(), Error>;
}

/// How a shipper answers a pending bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidResponse {
    Accept,
    Reject,
}

#[async_trait]
pub trait BidAPI {
    async fn submit_bid(&self, user: User, listing_id: Uuid, terms: BidTerms) -> Result<Bid, Error>;
    async fn find_bid(&self, user: User, id: Uuid) -> Result<Bid, Error>;
    async fn list_bids(&self, user: User) -> Result<Vec<Bid>, Error>;
    async fn list_my_bids(&self, user: User, status: Option<BidStatus>) -> Result<Vec<Bid>, Error>;
    async fn list_listing_bids(&self, user: User, listing_id: Uuid) -> Result<Vec<Bid>, Error>;
    async fn update_bid(&self, user: User, id: Uuid, terms: BidTerms) -> Result<Bid, Error>;
    async fn delete_bid(&self, user: User, id: Uuid) -> Result<(), Error>;
    async fn respond_to_bid(
        &self,
        user: User,
        id: Uuid,
        response: BidResponse,
        notes: Option<String>,
    ) -> Result<Bid, Error>;
    async fn withdraw_bid(&self, user: User, id: Uuid) -> Result<Bid, Error>;
    async fn bid_statistics(&self, user: User) -> Result<BidStatistics, Error>;
    async fn expire_bids(&self, user: User) -> Result<u64, Error>;
    async fn warn_expiring_bids(&self, user: User, within: chrono::Duration) -> Result<u64, Error>;
}

#[async_trait]
pub trait NotificationAPI {
    async fn list_notifications(
        &self,
        user: User,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error>;
    async fn mark_notification_read(&self, user: User, id: Uuid) -> Result<Notification, Error>;
    async fn mark_all_notifications_read(&self, user: User) -> Result<u64, Error>;
    async fn purge_read_notifications(
        &self,
        user: User,
        older_than: DateTime<Utc>,
    ) -> Result<u64, Error>;
}

/// Filters for the truck availability search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub pickup_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub truck_type: Option<TruckType>,
    pub min_capacity: Option<f64>,
    pub location: Option<String>,
}

#[async_trait]
pub trait TruckAPI {
    async fn create_truck(&self, user: User, input: TruckInput) -> Result<Truck, Error>;
    async fn find_truck(&self, user: User, id: Uuid) -> Result<Truck, Error>;
    async fn list_trucks(&self, user: User, truck_type: Option<TruckType>) -> Result<Vec<Truck>, Error>;
    async fn list_my_trucks(&self, user: User) -> Result<Vec<Truck>, Error>;
    async fn update_truck(&self, user: User, id: Uuid, input: TruckInput) -> Result<Truck, Error>;
    async fn delete_truck(&self, user: User, id: Uuid) -> Result<(), Error>;
    async fn available_trucks(&self, user: User, query: AvailabilityQuery) -> Result<Vec<Truck>, Error>;
}

#[async_trait]
pub trait BookingAPI {
    async fn create_booking(&self, user: User, input: BookingInput) -> Result<Booking, Error>;
    async fn find_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;
    async fn list_bookings(&self, user: User) -> Result<Vec<Booking>, Error>;
    async fn list_my_bookings(&self, user: User) -> Result<Vec<Booking>, Error>;
    async fn list_truck_bookings(
        &self,
        user: User,
        truck_id: Option<Uuid>,
    ) -> Result<Vec<Booking>, Error>;
    async fn update_booking(&self, user: User, id: Uuid, patch: BookingPatch) -> Result<Booking, Error>;
    async fn update_booking_status(
        &self,
        user: User,
        id: Uuid,
        status: BookingStatus,
        notes: Option<String>,
    ) -> Result<Booking, Error>;
    async fn cancel_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;
    async fn booking_statistics(&self, user: User) -> Result<BookingStatistics, Error>;
}

#[async_trait]
pub trait MessagingAPI {
    async fn start_conversation(&self, user: User, other: Uuid) -> Result<Conversation, Error>;
    async fn list_conversations(&self, user: User) -> Result<Vec<ConversationSummary>, Error>;
    async fn list_messages(&self, user: User, conversation_id: Uuid) -> Result<Vec<Message>, Error>;
    async fn send_message(
        &self,
        user: User,
        conversation_id: Uuid,
        content: String,
    ) -> Result<Message, Error>;
    async fn mark_conversation_read(&self, user: User, conversation_id: Uuid) -> Result<u64, Error>;
}

#[async_trait]
pub trait SupportAPI {
    async fn list_faqs(&self, category: Option<String>) -> Result<Vec<Faq>, Error>;
    async fn create_faq(&self, user: User, input: FaqInput) -> Result<Faq, Error>;
    async fn list_articles(&self) -> Result<Vec<Article>, Error>;
    async fn create_article(&self, user: User, input: ArticleInput) -> Result<Article, Error>;
    async fn list_services(&self) -> Result<Vec<Service>, Error>;
    async fn create_service(&self, user: User, input: ServiceInput) -> Result<Service, Error>;
}

pub trait API:
    ListingAPI + BidAPI + NotificationAPI + TruckAPI + BookingAPI + MessagingAPI + SupportAPI
{
}

pub type DynAPI = Arc<dyn API + Send + Sync>;
