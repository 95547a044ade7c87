use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::Truck;
use crate::error::{invalid_input_error, invalid_invocation_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

pub const ACTIVE_STATUSES: [Status; 3] = [Status::Pending, Status::Confirmed, Status::InProgress];

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Confirmed => "confirmed".into(),
            Self::InProgress => "in_progress".into(),
            Self::Completed => "completed".into(),
            Self::Cancelled => "cancelled".into(),
        }
    }

    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn can_transition_to(&self, next: Status) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Confirmed | Self::Cancelled),
            Self::Confirmed => matches!(next, Self::InProgress | Self::Cancelled),
            Self::InProgress => matches!(next, Self::Completed | Self::Cancelled),
            Self::Completed | Self::Cancelled => false,
        }
    }
}

pub fn active_status_names() -> Vec<String> {
    ACTIVE_STATUSES.iter().map(|status| status.name()).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoType {
    General,
    Fragile,
    Perishable,
    Hazardous,
    Electronics,
    Furniture,
    Construction,
    Automotive,
    Textiles,
    Other,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct BookingInput {
    pub truck_id: Uuid,
    #[validate(length(min = 1, max = 500, message = "Pickup address must be 1-500 characters"))]
    pub pickup_address: String,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Delivery address must be 1-500 characters"
    ))]
    pub delivery_address: String,
    pub pickup_date: DateTime<Utc>,
    pub expected_delivery_date: DateTime<Utc>,
    #[validate(length(min = 1, max = 1000, message = "Cargo description is required"))]
    pub cargo_description: String,
    pub cargo_type: CargoType,
    #[validate(range(min = 0.01, message = "Cargo weight must be at least 0.01 tons"))]
    pub cargo_weight: f64,
    #[validate(range(min = 0.01, message = "Cargo volume must be at least 0.01"))]
    pub cargo_volume: Option<f64>,
    #[validate(range(min = 0.0, message = "Quoted price cannot be negative"))]
    pub quoted_price: Option<f64>,
    #[validate(length(max = 1000, message = "Special instructions cannot exceed 1000 characters"))]
    pub special_instructions: Option<String>,
    #[validate(length(min = 6, max = 20, message = "Contact phone must be 6-20 characters"))]
    pub contact_phone: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub contact_email: Option<String>,
}

/// Editable fields of an existing booking; absent fields are kept.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct BookingPatch {
    #[validate(length(min = 1, max = 500, message = "Pickup address must be 1-500 characters"))]
    pub pickup_address: Option<String>,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Delivery address must be 1-500 characters"
    ))]
    pub delivery_address: Option<String>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 1000, message = "Cargo description is required"))]
    pub cargo_description: Option<String>,
    pub cargo_type: Option<CargoType>,
    #[validate(range(min = 0.01, message = "Cargo weight must be at least 0.01 tons"))]
    pub cargo_weight: Option<f64>,
    #[validate(range(min = 0.01, message = "Cargo volume must be at least 0.01"))]
    pub cargo_volume: Option<f64>,
    #[validate(range(min = 0.0, message = "Quoted price cannot be negative"))]
    pub quoted_price: Option<f64>,
    #[validate(length(max = 1000, message = "Special instructions cannot exceed 1000 characters"))]
    pub special_instructions: Option<String>,
    #[validate(length(min = 6, max = 20, message = "Contact phone must be 6-20 characters"))]
    pub contact_phone: Option<String>,
    #[validate(email(message = "Enter a valid email address"))]
    pub contact_email: Option<String>,
    #[validate(range(min = 0.0, message = "Final price cannot be negative"))]
    pub final_price: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub old_status: Status,
    pub new_status: Status,
    pub updated_by: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub reference: String,
    pub customer_id: Uuid,
    pub truck_id: Uuid,
    pub truck_owner_id: Uuid,
    pub pickup_address: String,
    pub delivery_address: String,
    pub pickup_date: DateTime<Utc>,
    pub expected_delivery_date: DateTime<Utc>,
    pub cargo_description: String,
    pub cargo_type: CargoType,
    pub cargo_weight: f64,
    pub cargo_volume: Option<f64>,
    pub quoted_price: Option<f64>,
    pub final_price: Option<f64>,
    pub status: Status,
    pub special_instructions: Option<String>,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub status_history: Vec<StatusUpdate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

fn new_reference() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("BK{}", id[..8].to_uppercase())
}

/// Checks the booking window. The past-pickup rule only applies when `now` is
/// given, so an existing pickup that has already passed stays valid.
fn check_window(
    pickup: DateTime<Utc>,
    delivery: DateTime<Utc>,
    now: Option<DateTime<Utc>>,
    err: Error,
) -> Error {
    let mut err = err;

    if now.map_or(false, |now| pickup < now) {
        err = err.with_field("pickup_date", "Pickup date cannot be in the past");
    }

    if delivery <= pickup {
        err = err.with_field(
            "expected_delivery_date",
            "Expected delivery date must be after pickup date",
        );
    }

    err
}

impl Booking {
    pub fn new(
        customer_id: Uuid,
        truck: &Truck,
        input: BookingInput,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        input.validate()?;

        let mut err = check_window(
            input.pickup_date,
            input.expected_delivery_date,
            Some(now),
            invalid_input_error(),
        );

        if !truck.is_active {
            err = err.with_field("truck_id", "This truck is not currently active");
        } else if !truck.is_available_on(input.pickup_date.date_naive()) {
            err = err.with_field("truck_id", "This truck is not available on the pickup date");
        }

        if !truck.can_carry(input.cargo_weight) {
            err = err.with_field(
                "cargo_weight",
                format!(
                    "Cargo weight exceeds the truck capacity of {} tons",
                    truck.capacity_tons
                ),
            );
        }

        if !err.fields.is_empty() {
            return Err(err);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            reference: new_reference(),
            customer_id,
            truck_id: truck.id,
            truck_owner_id: truck.owner_id,
            pickup_address: input.pickup_address,
            delivery_address: input.delivery_address,
            pickup_date: input.pickup_date,
            expected_delivery_date: input.expected_delivery_date,
            cargo_description: input.cargo_description,
            cargo_type: input.cargo_type,
            cargo_weight: input.cargo_weight,
            cargo_volume: input.cargo_volume,
            quoted_price: input.quoted_price,
            final_price: None,
            status: Status::Pending,
            special_instructions: input.special_instructions,
            contact_phone: input.contact_phone,
            contact_email: input.contact_email,
            status_history: vec![],
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            completed_at: None,
        })
    }

    /// Half-open interval intersection: bookings that merely touch at an
    /// endpoint do not overlap.
    pub fn overlaps(&self, other: &Booking) -> bool {
        self.pickup_date < other.expected_delivery_date
            && other.pickup_date < self.expected_delivery_date
    }

    /// Returns the first active booking on the same truck whose window
    /// intersects this one.
    pub fn find_conflict<'a>(&self, existing: &'a [Booking]) -> Option<&'a Booking> {
        existing.iter().find(|other| {
            other.id != self.id
                && other.truck_id == self.truck_id
                && other.status.is_active()
                && self.overlaps(other)
        })
    }

    fn ensure_editable(&self) -> Result<(), Error> {
        if self.status.is_terminal() {
            return Err(invalid_invocation_error()
                .with_message("Cannot update a completed or cancelled booking"));
        }

        Ok(())
    }

    /// Applies the patch and reports whether the booking window moved.
    pub fn revise(
        &mut self,
        truck: &Truck,
        patch: BookingPatch,
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        self.ensure_editable()?;
        patch.validate()?;

        let pickup = patch.pickup_date.unwrap_or(self.pickup_date);
        let delivery = patch
            .expected_delivery_date
            .unwrap_or(self.expected_delivery_date);
        let pickup_moved = pickup != self.pickup_date;
        let window_changed = pickup_moved || delivery != self.expected_delivery_date;

        let mut err = invalid_input_error();

        if window_changed {
            err = check_window(pickup, delivery, pickup_moved.then(|| now), err);
        }

        if let Some(cargo_weight) = patch.cargo_weight {
            if !truck.can_carry(cargo_weight) {
                err = err.with_field(
                    "cargo_weight",
                    format!(
                        "Cargo weight exceeds the truck capacity of {} tons",
                        truck.capacity_tons
                    ),
                );
            }
        }

        if !err.fields.is_empty() {
            return Err(err);
        }

        self.pickup_date = pickup;
        self.expected_delivery_date = delivery;

        if let Some(pickup_address) = patch.pickup_address {
            self.pickup_address = pickup_address;
        }
        if let Some(delivery_address) = patch.delivery_address {
            self.delivery_address = delivery_address;
        }
        if let Some(special_instructions) = patch.special_instructions {
            self.special_instructions = Some(special_instructions);
        }
        if let Some(contact_phone) = patch.contact_phone {
            self.contact_phone = contact_phone;
        }
        if let Some(contact_email) = patch.contact_email {
            self.contact_email = Some(contact_email);
        }
        if let Some(cargo_description) = patch.cargo_description {
            self.cargo_description = cargo_description;
        }
        if let Some(cargo_type) = patch.cargo_type {
            self.cargo_type = cargo_type;
        }
        if let Some(cargo_weight) = patch.cargo_weight {
            self.cargo_weight = cargo_weight;
        }
        if let Some(cargo_volume) = patch.cargo_volume {
            self.cargo_volume = Some(cargo_volume);
        }
        if let Some(quoted_price) = patch.quoted_price {
            self.quoted_price = Some(quoted_price);
        }
        if let Some(final_price) = patch.final_price {
            self.final_price = Some(final_price);
        }

        self.updated_at = now;

        Ok(window_changed)
    }

    #[tracing::instrument(skip(self), fields(id = %self.id, from = ?self.status))]
    pub fn update_status(
        &mut self,
        next: Status,
        updated_by: Uuid,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        if next == self.status {
            return Err(invalid_input_error()
                .with_field("status", "New status must be different from current status"));
        }

        if !self.status.can_transition_to(next) {
            return Err(invalid_invocation_error().with_message(format!(
                "Cannot change booking status from {} to {}",
                self.status.name(),
                next.name()
            )));
        }

        self.status_history.push(StatusUpdate {
            old_status: self.status,
            new_status: next,
            updated_by,
            notes,
            created_at: now,
        });

        match next {
            Status::Confirmed => self.confirmed_at = Some(now),
            Status::Completed => self.completed_at = Some(now),
            _ => (),
        }

        self.status = next;
        self.updated_at = now;

        Ok(())
    }

    pub fn cancel(&mut self, cancelled_by: Uuid, now: DateTime<Utc>) -> Result<(), Error> {
        self.ensure_editable()?;
        self.update_status(
            Status::Cancelled,
            cancelled_by,
            Some("Cancelled by customer".into()),
            now,
        )
    }
}

impl PolarClass for Booking {
    fn get_polar_class_builder() -> oso::ClassBuilder<Booking> {
        oso::Class::builder()
            .name("Booking")
            .add_attribute_getter("id", |recv: &Booking| recv.id.to_string())
            .add_attribute_getter("customer_id", |recv: &Booking| recv.customer_id.to_string())
            .add_attribute_getter("truck_owner_id", |recv: &Booking| {
                recv.truck_owner_id.to_string()
            })
    }

    fn get_polar_class() -> oso::Class {
        let builder = Booking::get_polar_class_builder();
        builder.build()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingStatistics {
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub in_progress_bookings: i64,
    pub completed_bookings: i64,
    pub cancelled_bookings: i64,
    pub truck_bookings: i64,
    pub truck_completed_bookings: i64,
    pub total_revenue: f64,
}

impl BookingStatistics {
    pub fn record_customer_count(&mut self, status: &str, count: i64) {
        self.total_bookings += count;

        match status {
            "pending" => self.pending_bookings += count,
            "confirmed" => self.confirmed_bookings += count,
            "in_progress" => self.in_progress_bookings += count,
            "completed" => self.completed_bookings += count,
            "cancelled" => self.cancelled_bookings += count,
            _ => (),
        }
    }
}

#[cfg(test)]
fn test_truck(now: DateTime<Utc>) -> Truck {
    Truck::new(
        Uuid::new_v4(),
        crate::entities::truck::test_input(now.date_naive()),
        now,
    )
    .unwrap()
}

#[cfg(test)]
pub fn test_input(truck: &Truck, pickup: DateTime<Utc>, delivery: DateTime<Utc>) -> BookingInput {
    BookingInput {
        truck_id: truck.id,
        pickup_address: "Industrial Area, Nairobi".into(),
        delivery_address: "Kilindini Port, Mombasa".into(),
        pickup_date: pickup,
        expected_delivery_date: delivery,
        cargo_description: "Pallets of tiles".into(),
        cargo_type: CargoType::Construction,
        cargo_weight: 6.0,
        cargo_volume: None,
        quoted_price: Some(45000.0),
        special_instructions: None,
        contact_phone: "+254700000000".into(),
        contact_email: Some("ops@example.com".into()),
    }
}

#[test]
fn booking_reference_test() {
    let now = Utc::now();
    let truck = test_truck(now);
    let pickup = now + chrono::Duration::days(1);
    let delivery = pickup + chrono::Duration::days(1);

    let booking = Booking::new(Uuid::new_v4(), &truck, test_input(&truck, pickup, delivery), now)
        .unwrap();

    assert_eq!(booking.reference.len(), 10);
    assert!(booking.reference.starts_with("BK"));
    assert_eq!(booking.reference, booking.reference.to_uppercase());
    assert_eq!(booking.status, Status::Pending);
    assert_eq!(booking.truck_owner_id, truck.owner_id);
}

#[test]
fn booking_validation_test() {
    use chrono::Duration;

    let now = Utc::now();
    let truck = test_truck(now);

    let pickup = now - Duration::hours(1);
    let err = Booking::new(Uuid::new_v4(), &truck, test_input(&truck, pickup, pickup), now)
        .unwrap_err();
    assert!(err.fields.contains_key("pickup_date"));
    assert!(err.fields.contains_key("expected_delivery_date"));

    let pickup = now + Duration::days(1);
    let mut input = test_input(&truck, pickup, pickup + Duration::days(1));
    input.cargo_weight = truck.capacity_tons + 1.0;
    let err = Booking::new(Uuid::new_v4(), &truck, input, now).unwrap_err();
    assert!(err.fields.contains_key("cargo_weight"));

    let pickup = now + Duration::days(90);
    let input = test_input(&truck, pickup, pickup + Duration::days(1));
    let err = Booking::new(Uuid::new_v4(), &truck, input, now).unwrap_err();
    assert!(err.fields.contains_key("truck_id"));
}

#[test]
fn booking_overlap_test() {
    use chrono::Duration;

    let now = Utc::now();
    let truck = test_truck(now);
    let day = |n: i64| now + Duration::days(n);

    let existing =
        Booking::new(Uuid::new_v4(), &truck, test_input(&truck, day(2), day(5)), now).unwrap();

    let cases = [
        (day(1), day(3), true),
        (day(3), day(4), true),
        (day(4), day(6), true),
        (day(1), day(6), true),
        (day(5), day(7), false),
        (day(1), day(2), false),
        (day(6), day(8), false),
    ];

    for (pickup, delivery, expected) in cases.iter() {
        let candidate = Booking::new(
            Uuid::new_v4(),
            &truck,
            test_input(&truck, *pickup, *delivery),
            now,
        )
        .unwrap();

        assert_eq!(candidate.overlaps(&existing), *expected);
        assert_eq!(existing.overlaps(&candidate), *expected);
        assert_eq!(
            candidate.find_conflict(&[existing.clone()]).is_some(),
            *expected
        );
    }
}

#[test]
fn booking_conflict_ignores_inactive_test() {
    use chrono::Duration;

    let now = Utc::now();
    let truck = test_truck(now);
    let other_truck = test_truck(now);
    let pickup = now + Duration::days(2);
    let delivery = now + Duration::days(4);

    let mut cancelled =
        Booking::new(Uuid::new_v4(), &truck, test_input(&truck, pickup, delivery), now).unwrap();
    cancelled.cancel(cancelled.customer_id, now).unwrap();

    let mut completed =
        Booking::new(Uuid::new_v4(), &truck, test_input(&truck, pickup, delivery), now).unwrap();
    completed.status = Status::Completed;

    let elsewhere = Booking::new(
        Uuid::new_v4(),
        &other_truck,
        test_input(&other_truck, pickup, delivery),
        now,
    )
    .unwrap();

    let candidate =
        Booking::new(Uuid::new_v4(), &truck, test_input(&truck, pickup, delivery), now).unwrap();

    assert!(candidate
        .find_conflict(&[cancelled, completed, elsewhere, candidate.clone()])
        .is_none());
}

#[test]
fn booking_status_test() {
    use chrono::Duration;

    let now = Utc::now();
    let truck = test_truck(now);
    let pickup = now + Duration::days(1);
    let mut booking = Booking::new(
        Uuid::new_v4(),
        &truck,
        test_input(&truck, pickup, pickup + Duration::days(1)),
        now,
    )
    .unwrap();

    let err = booking
        .update_status(Status::Pending, truck.owner_id, None, now)
        .unwrap_err();
    assert!(err.fields.contains_key("status"));

    assert_eq!(
        booking
            .update_status(Status::Completed, truck.owner_id, None, now)
            .unwrap_err()
            .code,
        100
    );

    booking
        .update_status(Status::Confirmed, truck.owner_id, Some("On it".into()), now)
        .unwrap();
    assert_eq!(booking.confirmed_at, Some(now));

    booking
        .update_status(Status::InProgress, truck.owner_id, None, now)
        .unwrap();
    booking
        .update_status(Status::Completed, truck.owner_id, None, now)
        .unwrap();
    assert_eq!(booking.completed_at, Some(now));
    assert_eq!(booking.status_history.len(), 3);
    assert_eq!(booking.status_history[0].notes.as_deref(), Some("On it"));

    assert!(booking.cancel(booking.customer_id, now).is_err());
    assert!(booking.revise(&truck, BookingPatch::default(), now).is_err());
}

#[test]
fn booking_cancel_test() {
    use chrono::Duration;

    let now = Utc::now();
    let truck = test_truck(now);
    let pickup = now + Duration::days(1);
    let mut booking = Booking::new(
        Uuid::new_v4(),
        &truck,
        test_input(&truck, pickup, pickup + Duration::days(1)),
        now,
    )
    .unwrap();

    booking.cancel(booking.customer_id, now).unwrap();

    assert_eq!(booking.status, Status::Cancelled);
    let update = booking.status_history.last().unwrap();
    assert_eq!(update.old_status, Status::Pending);
    assert_eq!(update.notes.as_deref(), Some("Cancelled by customer"));
}

#[test]
fn booking_revise_test() {
    use chrono::Duration;

    let now = Utc::now();
    let truck = test_truck(now);
    let pickup = now + Duration::days(1);
    let mut booking = Booking::new(
        Uuid::new_v4(),
        &truck,
        test_input(&truck, pickup, pickup + Duration::days(1)),
        now,
    )
    .unwrap();

    let changed = booking
        .revise(
            &truck,
            BookingPatch {
                special_instructions: Some("Call on arrival".into()),
                ..Default::default()
            },
            now,
        )
        .unwrap();
    assert!(!changed);
    assert_eq!(booking.special_instructions.as_deref(), Some("Call on arrival"));

    let changed = booking
        .revise(
            &truck,
            BookingPatch {
                expected_delivery_date: Some(pickup + Duration::days(2)),
                ..Default::default()
            },
            now,
        )
        .unwrap();
    assert!(changed);

    let err = booking
        .revise(
            &truck,
            BookingPatch {
                expected_delivery_date: Some(pickup - Duration::hours(1)),
                ..Default::default()
            },
            now,
        )
        .unwrap_err();
    assert!(err.fields.contains_key("expected_delivery_date"));
}

#[test]
fn booking_revise_after_pickup_test() {
    use chrono::Duration;

    let now = Utc::now();
    let created = now - Duration::days(3);
    let truck = test_truck(created);
    let pickup = created + Duration::days(1);
    let delivery = now + Duration::days(1);
    let mut booking = Booking::new(
        Uuid::new_v4(),
        &truck,
        test_input(&truck, pickup, delivery),
        created,
    )
    .unwrap();

    booking
        .update_status(Status::Confirmed, truck.owner_id, None, created)
        .unwrap();
    booking
        .update_status(Status::InProgress, truck.owner_id, None, pickup)
        .unwrap();

    let changed = booking
        .revise(
            &truck,
            BookingPatch {
                expected_delivery_date: Some(delivery + Duration::days(1)),
                ..Default::default()
            },
            now,
        )
        .unwrap();
    assert!(changed);
    assert_eq!(booking.pickup_date, pickup);
    assert_eq!(booking.expected_delivery_date, delivery + Duration::days(1));

    let err = booking
        .revise(
            &truck,
            BookingPatch {
                pickup_date: Some(pickup + Duration::hours(2)),
                ..Default::default()
            },
            now,
        )
        .unwrap_err();
    assert!(err.fields.contains_key("pickup_date"));
    assert_eq!(booking.pickup_date, pickup);
}

#[test]
fn booking_revise_cargo_test() {
    use chrono::Duration;

    let now = Utc::now();
    let truck = test_truck(now);
    let pickup = now + Duration::days(1);
    let mut booking = Booking::new(
        Uuid::new_v4(),
        &truck,
        test_input(&truck, pickup, pickup + Duration::days(1)),
        now,
    )
    .unwrap();

    let err = booking
        .revise(
            &truck,
            BookingPatch {
                cargo_weight: Some(truck.capacity_tons + 1.0),
                ..Default::default()
            },
            now,
        )
        .unwrap_err();
    assert!(err.fields.contains_key("cargo_weight"));
    assert_eq!(booking.cargo_weight, 6.0);

    let changed = booking
        .revise(
            &truck,
            BookingPatch {
                cargo_description: Some("Bagged cement".into()),
                cargo_weight: Some(8.5),
                quoted_price: Some(52000.0),
                ..Default::default()
            },
            now,
        )
        .unwrap();
    assert!(!changed);
    assert_eq!(booking.cargo_weight, 8.5);
    assert_eq!(booking.cargo_description, "Bagged cement");
    assert_eq!(booking.quoted_price, Some(52000.0));
}

#[test]
fn booking_statistics_test() {
    let mut stats = BookingStatistics::default();
    stats.record_customer_count("pending", 2);
    stats.record_customer_count("completed", 3);
    stats.record_customer_count("cancelled", 1);

    assert_eq!(stats.total_bookings, 6);
    assert_eq!(stats.pending_bookings, 2);
    assert_eq!(stats.completed_bookings, 3);
    assert_eq!(stats.cancelled_bookings, 1);
}
