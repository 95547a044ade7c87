use oso::{Oso, PolarClass};

use crate::auth::{Platform, User};
use crate::entities::{Bid, Booking, CargoListing, Conversation, Notification, Truck};
use crate::error::Error;

pub fn new() -> Result<Oso, Error> {
    let mut o = Oso::new();

    o.register_class(Platform::get_polar_class())?;
    o.register_class(User::get_polar_class())?;
    o.register_class(CargoListing::get_polar_class())?;
    o.register_class(Bid::get_polar_class())?;
    o.register_class(Truck::get_polar_class())?;
    o.register_class(Booking::get_polar_class())?;
    o.register_class(Notification::get_polar_class())?;
    o.register_class(Conversation::get_polar_class())?;

    o.load_str(include_str!("rules.polar"))?;

    Ok(o)
}

#[cfg(test)]
fn member() -> User {
    User::new(uuid::Uuid::new_v4(), vec![])
}

#[cfg(test)]
fn staff() -> User {
    User::new(uuid::Uuid::new_v4(), vec!["staff".into()])
}

#[cfg(test)]
fn listing_owned_by(owner: &User) -> CargoListing {
    use chrono::Utc;

    let now = Utc::now();
    CargoListing::new(
        owner.id,
        crate::entities::listing::test_input(now.date_naive()),
        now,
    )
    .unwrap()
}

#[test]
fn platform_role_test() {
    let authorizor = new().unwrap();

    let system = User::new_system_user();

    let result = authorizor.query_rule("has_role", (system.clone(), "system", Platform::default()));
    assert!(result.unwrap().next().unwrap().is_ok());

    let result = authorizor.query_rule("has_role", (member(), "system", Platform::default()));
    assert!(result.unwrap().next().is_none());

    let result = authorizor.is_allowed(system.clone(), "sweep", Platform::default());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(member(), "sweep", Platform::default());
    assert_eq!(result.unwrap(), false);
}

#[test]
fn platform_member_test() {
    let authorizor = new().unwrap();

    for action in [
        "create_listing",
        "submit_bid",
        "create_truck",
        "create_booking",
        "start_conversation",
        "list_own",
    ] {
        let result = authorizor.is_allowed(member(), action, Platform::default());
        assert_eq!(result.unwrap(), true, "member should be allowed to {}", action);

        let result = authorizor.is_allowed(User::anonymous(), action, Platform::default());
        assert_eq!(result.unwrap(), false, "anonymous should not be allowed to {}", action);
    }

    let result = authorizor.is_allowed(member(), "manage_support", Platform::default());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(staff(), "manage_support", Platform::default());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(staff(), "create_listing", Platform::default());
    assert_eq!(result.unwrap(), true);
}

#[test]
fn listing_owner_role_test() {
    let authorizor = new().unwrap();

    let owner = member();
    let stranger = member();
    let listing = listing_owned_by(&owner);

    let result = authorizor.query_rule("has_role", (owner.clone(), "owner", listing.clone()));
    assert!(result.unwrap().next().unwrap().is_ok());

    for action in ["update", "update_status", "delete", "list_bids"] {
        let result = authorizor.is_allowed(owner.clone(), action, listing.clone());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(stranger.clone(), action, listing.clone());
        assert_eq!(result.unwrap(), false);

        let result = authorizor.is_allowed(staff(), action, listing.clone());
        assert_eq!(result.unwrap(), true);
    }

    let result = authorizor.is_allowed(stranger.clone(), "read", listing.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(User::anonymous(), "read", listing.clone());
    assert_eq!(result.unwrap(), true);
}

#[test]
fn bid_roles_test() {
    use crate::entities::bid::test_terms;
    use chrono::Utc;

    let authorizor = new().unwrap();

    let shipper = member();
    let bidder = member();
    let stranger = member();
    let listing = listing_owned_by(&shipper);
    let bid = Bid::new(&listing, bidder.id, test_terms(500.0), Utc::now()).unwrap();

    for action in ["read", "update", "delete", "withdraw"] {
        let result = authorizor.is_allowed(bidder.clone(), action, bid.clone());
        assert_eq!(result.unwrap(), true);
    }

    let result = authorizor.is_allowed(bidder.clone(), "respond", bid.clone());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(shipper.clone(), "respond", bid.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(shipper.clone(), "read", bid.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(shipper.clone(), "withdraw", bid.clone());
    assert_eq!(result.unwrap(), false);

    for action in ["read", "update", "delete", "withdraw", "respond"] {
        let result = authorizor.is_allowed(stranger.clone(), action, bid.clone());
        assert_eq!(result.unwrap(), false);
    }
}

#[test]
fn booking_roles_test() {
    use crate::entities::{BookingInput, Truck};
    use chrono::{Duration, Utc};

    let authorizor = new().unwrap();

    let now = Utc::now();
    let owner = member();
    let customer = member();
    let stranger = member();

    let truck = Truck::new(
        owner.id,
        crate::entities::truck::test_input(now.date_naive()),
        now,
    )
    .unwrap();

    let input = BookingInput {
        truck_id: truck.id,
        pickup_address: "Thika Road".into(),
        delivery_address: "Eldoret".into(),
        pickup_date: now + Duration::days(1),
        expected_delivery_date: now + Duration::days(2),
        cargo_description: "Maize".into(),
        cargo_type: crate::entities::booking::CargoType::General,
        cargo_weight: 5.0,
        cargo_volume: None,
        quoted_price: None,
        special_instructions: None,
        contact_phone: "0700000000".into(),
        contact_email: None,
    };
    let booking = Booking::new(customer.id, &truck, input, now).unwrap();

    for action in ["read", "update", "update_status", "cancel"] {
        let result = authorizor.is_allowed(customer.clone(), action, booking.clone());
        assert_eq!(result.unwrap(), true);

        let result = authorizor.is_allowed(stranger.clone(), action, booking.clone());
        assert_eq!(result.unwrap(), false);
    }

    let result = authorizor.is_allowed(owner.clone(), "update_status", booking.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(owner.clone(), "cancel", booking.clone());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(owner.clone(), "update", truck.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(customer.clone(), "update", truck.clone());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(User::anonymous(), "read", truck.clone());
    assert_eq!(result.unwrap(), true);
}

#[test]
fn conversation_participant_role_test() {
    use chrono::Utc;

    let authorizor = new().unwrap();

    let alice = member();
    let bob = member();
    let conversation = Conversation::new(alice.id, bob.id, Utc::now()).unwrap();

    for user in [alice, bob] {
        let result = authorizor.query_rule("has_role", (user.clone(), "participant", conversation.clone()));
        assert!(result.unwrap().next().unwrap().is_ok());

        let result = authorizor.is_allowed(user.clone(), "send_message", conversation.clone());
        assert_eq!(result.unwrap(), true);
    }

    let result = authorizor.is_allowed(member(), "read", conversation.clone());
    assert_eq!(result.unwrap(), false);
}

#[test]
fn notification_recipient_role_test() {
    use crate::entities::bid::test_terms;
    use chrono::Utc;

    let authorizor = new().unwrap();

    let shipper = member();
    let listing = listing_owned_by(&shipper);
    let bid = Bid::new(&listing, uuid::Uuid::new_v4(), test_terms(500.0), Utc::now()).unwrap();
    let notification = Notification::new_bid(&bid);

    let result = authorizor.is_allowed(shipper.clone(), "mark_read", notification.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(member(), "mark_read", notification.clone());
    assert_eq!(result.unwrap(), false);
}
