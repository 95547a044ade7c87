use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Bid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    NewBid,
    BidAccepted,
    BidRejected,
    BidWithdrawn,
    BidExpiring,
}

impl Kind {
    pub fn name(&self) -> String {
        match self {
            Self::NewBid => "new_bid".into(),
            Self::BidAccepted => "bid_accepted".into(),
            Self::BidRejected => "bid_rejected".into(),
            Self::BidWithdrawn => "bid_withdrawn".into(),
            Self::BidExpiring => "bid_expiring".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub bid_id: Uuid,
    pub kind: Kind,
    pub message: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

impl Notification {
    fn new(recipient_id: Uuid, bid: &Bid, kind: Kind, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            bid_id: bid.id,
            kind,
            message,
            is_read: false,
            sent_at: Utc::now(),
        }
    }

    /// Tells the shipper a carrier bid on their listing.
    pub fn new_bid(bid: &Bid) -> Self {
        let message = format!(
            "New bid of {:.2} KSh received for '{}'",
            bid.amount, bid.listing_title
        );
        Self::new(bid.shipper_id, bid, Kind::NewBid, message)
    }

    pub fn bid_accepted(bid: &Bid) -> Self {
        let message = format!(
            "Your bid of {:.2} KSh has been accepted for '{}'",
            bid.amount, bid.listing_title
        );
        Self::new(bid.bidder_id, bid, Kind::BidAccepted, message)
    }

    pub fn bid_rejected(bid: &Bid) -> Self {
        let message = format!(
            "Your bid of {:.2} KSh has been rejected for '{}'",
            bid.amount, bid.listing_title
        );
        Self::new(bid.bidder_id, bid, Kind::BidRejected, message)
    }

    /// Tells the shipper a carrier pulled their bid.
    pub fn bid_withdrawn(bid: &Bid) -> Self {
        let message = format!(
            "A bid of {:.2} KSh has been withdrawn from '{}'",
            bid.amount, bid.listing_title
        );
        Self::new(bid.shipper_id, bid, Kind::BidWithdrawn, message)
    }

    pub fn bid_expiring(bid: &Bid) -> Self {
        let message = format!(
            "Your bid of {:.2} KSh for '{}' is about to expire",
            bid.amount, bid.listing_title
        );
        Self::new(bid.bidder_id, bid, Kind::BidExpiring, message)
    }

    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}

impl PolarClass for Notification {
    fn get_polar_class_builder() -> oso::ClassBuilder<Notification> {
        oso::Class::builder()
            .name("Notification")
            .add_attribute_getter("id", |recv: &Notification| recv.id.to_string())
            .add_attribute_getter("recipient_id", |recv: &Notification| {
                recv.recipient_id.to_string()
            })
    }

    fn get_polar_class() -> oso::Class {
        let builder = Notification::get_polar_class_builder();
        builder.build()
    }
}

#[test]
fn notification_recipient_test() {
    use crate::entities::bid::test_terms;
    use crate::entities::CargoListing;

    let now = Utc::now();
    let shipper = Uuid::new_v4();
    let bidder = Uuid::new_v4();

    let listing = CargoListing::new(
        shipper,
        crate::entities::listing::test_input(now.date_naive()),
        now,
    )
    .unwrap();
    let bid = Bid::new(&listing, bidder, test_terms(1500.0), now).unwrap();

    let new_bid = Notification::new_bid(&bid);
    assert_eq!(new_bid.recipient_id, shipper);
    assert_eq!(new_bid.kind, Kind::NewBid);
    assert_eq!(
        new_bid.message,
        "New bid of 1500.00 KSh received for 'Fragile Items - Nairobi to Mombasa'"
    );
    assert!(!new_bid.is_read);

    let accepted = Notification::bid_accepted(&bid);
    assert_eq!(accepted.recipient_id, bidder);
    assert_eq!(
        accepted.message,
        "Your bid of 1500.00 KSh has been accepted for 'Fragile Items - Nairobi to Mombasa'"
    );

    assert_eq!(Notification::bid_rejected(&bid).recipient_id, bidder);
    assert_eq!(Notification::bid_withdrawn(&bid).recipient_id, shipper);
    assert_eq!(Notification::bid_expiring(&bid).kind.name(), "bid_expiring");
}
