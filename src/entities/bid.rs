use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::CargoListing;
use crate::error::{invalid_input_error, invalid_invocation_error, Error};

pub const MIN_AMOUNT: f64 = 1.0;
pub const MAX_AMOUNT: f64 = 10_000_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryTime {
    #[serde(rename = "same-day")]
    SameDay,
    #[serde(rename = "next-day")]
    NextDay,
    #[serde(rename = "2-3-days")]
    TwoToThreeDays,
    #[serde(rename = "4-7-days")]
    FourToSevenDays,
    #[serde(rename = "custom")]
    Custom,
    #[serde(rename = "unknown")]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
    Expired,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Accepted => "accepted".into(),
            Self::Rejected => "rejected".into(),
            Self::Withdrawn => "withdrawn".into(),
            Self::Expired => "expired".into(),
        }
    }
}

/// The carrier-controlled part of a bid.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct BidTerms {
    #[validate(range(
        min = 1.0,
        max = 10000000.0,
        message = "Bid amount must be between 1.00 and 10,000,000.00"
    ))]
    pub amount: f64,
    pub estimated_delivery_time: DeliveryTime,
    #[validate(length(max = 100, message = "Custom delivery time cannot exceed 100 characters"))]
    pub custom_delivery_time: Option<String>,
    #[validate(length(max = 1000, message = "Message cannot exceed 1000 characters"))]
    pub message_to_shipper: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl BidTerms {
    /// Validates the terms and drops a custom delivery time that does not
    /// apply to the chosen option.
    pub fn normalize(mut self, now: DateTime<Utc>) -> Result<Self, Error> {
        self.validate()?;

        let mut err = invalid_input_error();

        match self.estimated_delivery_time {
            DeliveryTime::Custom => {
                let custom = self
                    .custom_delivery_time
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default();

                if custom.is_empty() {
                    err = err.with_field(
                        "custom_delivery_time",
                        "Please specify custom delivery time",
                    );
                }
            }
            _ => self.custom_delivery_time = None,
        }

        if let Some(expires_at) = self.expires_at {
            if expires_at <= now {
                err = err.with_field("expires_at", "Expiry time must be in the future");
            }
        }

        match err.fields.is_empty() {
            true => Ok(self),
            false => Err(err),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bid {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub listing_title: String,
    pub bidder_id: Uuid,
    pub shipper_id: Uuid,
    pub amount: f64,
    pub estimated_delivery_time: DeliveryTime,
    pub custom_delivery_time: Option<String>,
    pub message_to_shipper: Option<String>,
    pub status: Status,
    pub submitted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub shipper_notes: Option<String>,
}

impl Bid {
    pub fn new(
        listing: &CargoListing,
        bidder_id: Uuid,
        terms: BidTerms,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        if !listing.is_open() {
            return Err(invalid_invocation_error()
                .with_message("This cargo listing is no longer accepting bids"));
        }

        let terms = terms.normalize(now)?;

        Ok(Self {
            id: Uuid::new_v4(),
            listing_id: listing.id,
            listing_title: listing.title.clone(),
            bidder_id,
            shipper_id: listing.owner_id,
            amount: terms.amount,
            estimated_delivery_time: terms.estimated_delivery_time,
            custom_delivery_time: terms.custom_delivery_time,
            message_to_shipper: terms.message_to_shipper,
            status: Status::Pending,
            submitted_at: now,
            expires_at: terms.expires_at,
            responded_at: None,
            is_active: true,
            shipper_notes: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }

    fn ensure_pending(&self) -> Result<(), Error> {
        if !self.is_pending() {
            return Err(invalid_invocation_error().with_message(format!(
                "Cannot respond to a bid that is {}",
                self.status.name()
            )));
        }

        Ok(())
    }

    pub fn revise(&mut self, terms: BidTerms, now: DateTime<Utc>) -> Result<(), Error> {
        self.ensure_pending()?;

        let terms = terms.normalize(now)?;

        self.amount = terms.amount;
        self.estimated_delivery_time = terms.estimated_delivery_time;
        self.custom_delivery_time = terms.custom_delivery_time;
        self.message_to_shipper = terms.message_to_shipper;
        self.expires_at = terms.expires_at;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub fn accept(&mut self, notes: Option<String>, now: DateTime<Utc>) -> Result<(), Error> {
        self.ensure_pending()?;

        if self.is_expired(now) {
            return Err(invalid_invocation_error().with_message("This bid has expired"));
        }

        self.status = Status::Accepted;
        self.responded_at = Some(now);
        self.shipper_notes = notes;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub fn reject(&mut self, notes: Option<String>, now: DateTime<Utc>) -> Result<(), Error> {
        self.ensure_pending()?;

        self.status = Status::Rejected;
        self.responded_at = Some(now);
        self.shipper_notes = notes;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub fn withdraw(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        if !self.is_pending() {
            return Err(invalid_invocation_error().with_message("Only pending bids can be withdrawn"));
        }

        self.status = Status::Withdrawn;
        self.responded_at = Some(now);

        Ok(())
    }

    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        if !self.is_pending() || !self.is_expired(now) {
            return Err(invalid_invocation_error());
        }

        self.status = Status::Expired;
        self.responded_at = Some(now);
        self.is_active = false;

        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

/// Rejects every other pending bid on the accepted bid's listing and returns
/// the bids that changed.
pub fn reject_competing_bids(accepted: &Bid, siblings: &mut [Bid], now: DateTime<Utc>) -> Vec<Bid> {
    let mut rejected = vec![];

    for bid in siblings.iter_mut() {
        if bid.id == accepted.id || bid.listing_id != accepted.listing_id || !bid.is_pending() {
            continue;
        }

        bid.status = Status::Rejected;
        bid.responded_at = Some(now);
        rejected.push(bid.clone());
    }

    rejected
}

/// Expires the overdue pending bids and returns the ones that changed. Bids
/// that are no longer expirable are left alone.
pub fn expire_overdue_bids(bids: &mut [Bid], now: DateTime<Utc>) -> Vec<Bid> {
    let mut expired = vec![];

    for bid in bids.iter_mut() {
        if let Err(err) = bid.expire(now) {
            tracing::warn!(id = %bid.id, status = %bid.status.name(), error = ?err, "skipping bid that cannot expire");
            continue;
        }

        expired.push(bid.clone());
    }

    expired
}

/// Figures reported back to a user about bids they placed and bids they
/// received on their listings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BidStatistics {
    pub bids_submitted: i64,
    pub bids_accepted: i64,
    pub bids_rejected: i64,
    pub bids_pending: i64,
    pub average_bid_amount: f64,
    pub acceptance_rate: f64,
    pub listings_posted: i64,
    pub bids_received: i64,
    pub average_bids_per_listing: f64,
}

impl BidStatistics {
    pub fn compute(
        bids_submitted: i64,
        bids_accepted: i64,
        bids_rejected: i64,
        bids_pending: i64,
        average_bid_amount: Option<f64>,
        listings_posted: i64,
        bids_received: i64,
    ) -> Self {
        let acceptance_rate = match bids_submitted {
            0 => 0.0,
            n => round2(bids_accepted as f64 * 100.0 / n as f64),
        };

        let average_bids_per_listing = match listings_posted {
            0 => 0.0,
            n => round2(bids_received as f64 / n as f64),
        };

        Self {
            bids_submitted,
            bids_accepted,
            bids_rejected,
            bids_pending,
            average_bid_amount: round2(average_bid_amount.unwrap_or_default()),
            acceptance_rate,
            listings_posted,
            bids_received,
            average_bids_per_listing,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl PolarClass for Bid {
    fn get_polar_class_builder() -> oso::ClassBuilder<Bid> {
        oso::Class::builder()
            .name("Bid")
            .add_attribute_getter("id", |recv: &Bid| recv.id.to_string())
            .add_attribute_getter("bidder_id", |recv: &Bid| recv.bidder_id.to_string())
            .add_attribute_getter("shipper_id", |recv: &Bid| recv.shipper_id.to_string())
            .add_attribute_getter("status", |recv: &Bid| recv.status.name())
    }

    fn get_polar_class() -> oso::Class {
        let builder = Bid::get_polar_class_builder();
        builder.build()
    }
}

#[cfg(test)]
pub fn test_terms(amount: f64) -> BidTerms {
    BidTerms {
        amount,
        estimated_delivery_time: DeliveryTime::NextDay,
        custom_delivery_time: None,
        message_to_shipper: Some("Covered truck, insured".into()),
        expires_at: None,
    }
}

#[cfg(test)]
fn test_listing() -> CargoListing {
    let now = Utc::now();
    CargoListing::new(
        Uuid::new_v4(),
        crate::entities::listing::test_input(now.date_naive()),
        now,
    )
    .unwrap()
}

#[test]
fn bid_amount_bounds_test() {
    let listing = test_listing();
    let now = Utc::now();

    for amount in [MIN_AMOUNT, 1500.0, MAX_AMOUNT] {
        assert!(Bid::new(&listing, Uuid::new_v4(), test_terms(amount), now).is_ok());
    }

    for amount in [0.0, 0.99, MAX_AMOUNT + 0.01, -5.0] {
        let err = Bid::new(&listing, Uuid::new_v4(), test_terms(amount), now).unwrap_err();
        assert_eq!(err.code, 101);
        assert!(err.fields.contains_key("amount"));
    }
}

#[test]
fn bid_requires_open_listing_test() {
    let mut listing = test_listing();
    listing.status = crate::entities::ListingStatus::Cancelled;

    let err = Bid::new(&listing, Uuid::new_v4(), test_terms(100.0), Utc::now()).unwrap_err();
    assert_eq!(err.code, 100);
}

#[test]
fn bid_custom_delivery_time_test() {
    let listing = test_listing();
    let now = Utc::now();

    let mut terms = test_terms(100.0);
    terms.estimated_delivery_time = DeliveryTime::Custom;
    let err = Bid::new(&listing, Uuid::new_v4(), terms.clone(), now).unwrap_err();
    assert!(err.fields.contains_key("custom_delivery_time"));

    terms.custom_delivery_time = Some("Within 10 days".into());
    let bid = Bid::new(&listing, Uuid::new_v4(), terms.clone(), now).unwrap();
    assert_eq!(bid.custom_delivery_time.as_deref(), Some("Within 10 days"));

    terms.estimated_delivery_time = DeliveryTime::SameDay;
    let bid = Bid::new(&listing, Uuid::new_v4(), terms, now).unwrap();
    assert!(bid.custom_delivery_time.is_none());
}

#[test]
fn bid_expiry_in_past_test() {
    use chrono::Duration;

    let listing = test_listing();
    let now = Utc::now();

    let mut terms = test_terms(100.0);
    terms.expires_at = Some(now - Duration::minutes(1));
    let err = Bid::new(&listing, Uuid::new_v4(), terms, now).unwrap_err();
    assert!(err.fields.contains_key("expires_at"));
}

#[test]
fn bid_accept_rejects_siblings_test() {
    let listing = test_listing();
    let now = Utc::now();

    let mut winner = Bid::new(&listing, Uuid::new_v4(), test_terms(900.0), now).unwrap();
    let mut siblings = vec![
        winner.clone(),
        Bid::new(&listing, Uuid::new_v4(), test_terms(1000.0), now).unwrap(),
        Bid::new(&listing, Uuid::new_v4(), test_terms(1100.0), now).unwrap(),
        Bid::new(&listing, Uuid::new_v4(), test_terms(1200.0), now).unwrap(),
    ];
    siblings[3].withdraw(now).unwrap();

    winner.accept(Some("See you Monday".into()), now).unwrap();
    let rejected = reject_competing_bids(&winner, &mut siblings, now);

    assert_eq!(winner.status, Status::Accepted);
    assert_eq!(winner.responded_at, Some(now));
    assert_eq!(winner.shipper_notes.as_deref(), Some("See you Monday"));

    assert_eq!(rejected.len(), 2);
    assert!(rejected.iter().all(|bid| bid.status == Status::Rejected));
    assert!(rejected.iter().all(|bid| bid.responded_at == Some(now)));
    assert_eq!(siblings[0].status, Status::Pending);
    assert_eq!(siblings[3].status, Status::Withdrawn);
}

#[test]
fn bid_state_machine_test() {
    use chrono::Duration;

    let listing = test_listing();
    let now = Utc::now();

    let mut bid = Bid::new(&listing, Uuid::new_v4(), test_terms(100.0), now).unwrap();
    bid.reject(None, now).unwrap();
    assert_eq!(bid.accept(None, now).unwrap_err().code, 100);
    assert!(bid.withdraw(now).is_err());
    assert!(bid.revise(test_terms(120.0), now).is_err());

    let mut bid = Bid::new(&listing, Uuid::new_v4(), test_terms(100.0), now).unwrap();
    bid.revise(test_terms(120.0), now).unwrap();
    assert_eq!(bid.amount, 120.0);
    bid.withdraw(now).unwrap();
    assert_eq!(bid.status, Status::Withdrawn);
    assert!(bid.reject(None, now).is_err());

    let mut terms = test_terms(100.0);
    terms.expires_at = Some(now + Duration::hours(1));
    let mut bid = Bid::new(&listing, Uuid::new_v4(), terms, now).unwrap();
    let later = now + Duration::hours(2);
    assert!(bid.is_expired(later));

    let err = bid.accept(None, later).unwrap_err();
    assert_eq!(err.message, "This bid has expired");
    assert_eq!(bid.status, Status::Pending);

    bid.expire(later).unwrap();
    assert_eq!(bid.status, Status::Expired);
    assert!(!bid.is_active);
}

#[test]
fn bid_statistics_test() {
    let stats = BidStatistics::compute(4, 1, 2, 1, Some(1234.5678), 3, 10);

    assert_eq!(stats.acceptance_rate, 25.0);
    assert_eq!(stats.average_bid_amount, 1234.57);
    assert_eq!(stats.average_bids_per_listing, 3.33);

    let empty = BidStatistics::compute(0, 0, 0, 0, None, 0, 0);
    assert_eq!(empty, BidStatistics::default());
}

#[test]
fn expire_overdue_bids_test() {
    use chrono::Duration;

    let listing = test_listing();
    let now = Utc::now();
    let submitted = now - Duration::hours(2);

    let mut overdue = test_terms(500.0);
    overdue.expires_at = Some(now - Duration::minutes(5));
    let mut not_yet = test_terms(600.0);
    not_yet.expires_at = Some(now + Duration::minutes(5));

    let mut bids = vec![
        Bid::new(&listing, Uuid::new_v4(), overdue.clone(), submitted).unwrap(),
        Bid::new(&listing, Uuid::new_v4(), not_yet, submitted).unwrap(),
        Bid::new(&listing, Uuid::new_v4(), overdue, submitted).unwrap(),
    ];
    bids[2].withdraw(submitted).unwrap();

    let expired = expire_overdue_bids(&mut bids, now);

    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, bids[0].id);
    assert_eq!(bids[0].status, Status::Expired);
    assert!(!bids[0].is_active);
    assert_eq!(bids[1].status, Status::Pending);
    assert_eq!(bids[2].status, Status::Withdrawn);
}
