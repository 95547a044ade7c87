use chrono::{DateTime, NaiveDate, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{invalid_input_error, invalid_invocation_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CargoType {
    General,
    Perishable,
    Fragile,
    Machinery,
    Construction,
    Furniture,
    Electronics,
    Other,
}

impl CargoType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "General Goods",
            Self::Perishable => "Perishable Goods",
            Self::Fragile => "Fragile Items",
            Self::Machinery => "Machinery",
            Self::Construction => "Construction Materials",
            Self::Furniture => "Furniture",
            Self::Electronics => "Electronics",
            Self::Other => "Other",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    BankTransfer,
    Card,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Open => "OPEN".into(),
            Self::InProgress => "IN_PROGRESS".into(),
            Self::Completed => "COMPLETED".into(),
            Self::Cancelled => "CANCELLED".into(),
        }
    }

    pub fn allowed_transitions(&self) -> &'static [Status] {
        match self {
            Self::Open => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Completed, Self::Cancelled],
            Self::Completed => &[],
            Self::Cancelled => &[Self::Open],
        }
    }

    pub fn can_transition_to(&self, next: Status) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

/// Fields a shipper supplies when posting or editing a listing.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct ListingInput {
    #[validate(length(max = 255, message = "Title cannot exceed 255 characters"))]
    pub title: Option<String>,
    pub cargo_type: CargoType,
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: String,
    #[validate(range(min = 0.01, message = "Weight must be at least 0.01"))]
    pub weight: f64,
    #[validate(range(min = 0.01, message = "Volume must be at least 0.01"))]
    pub volume: f64,
    #[validate(range(min = 0.01, message = "Estimated value must be at least 0.01"))]
    pub estimated_value: f64,
    #[validate(length(min = 1, max = 255, message = "Pickup location must be 1-255 characters"))]
    pub pickup_location: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Delivery location must be 1-255 characters"
    ))]
    pub delivery_location: String,
    pub pickup_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    #[validate(range(min = 0.01, message = "Budget must be at least 0.01"))]
    pub budget: Option<f64>,
    pub preferred_payment: PaymentMethod,
    #[validate(length(max = 1000, message = "Additional requirements cannot exceed 1000 characters"))]
    pub additional_requirements: Option<String>,
}

impl ListingInput {
    /// Runs field validation plus the rules that span several fields. The
    /// pickup date is only checked against `today` when it differs from
    /// `current_pickup`, so existing listings stay editable once picked up.
    pub fn check(&self, today: NaiveDate, current_pickup: Option<NaiveDate>) -> Result<(), Error> {
        self.validate()?;

        let mut err = invalid_input_error();

        if let Some(pickup) = self.pickup_date {
            if pickup < today && current_pickup != Some(pickup) {
                err = err.with_field("pickup_date", "Pickup date cannot be in the past");
            }

            if let Some(delivery) = self.delivery_date {
                if delivery <= pickup {
                    err = err.with_field("delivery_date", "Delivery date must be after pickup date");
                }
            }
        }

        if let Some(budget) = self.budget {
            if budget > self.estimated_value {
                err = err.with_field("budget", "Budget cannot exceed the estimated cargo value");
            }
        }

        match err.fields.is_empty() {
            true => Ok(()),
            false => Err(err),
        }
    }

    fn title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.into(),
            _ => format!(
                "{} - {} to {}",
                self.cargo_type.label(),
                self.pickup_location.trim(),
                self.delivery_location.trim()
            ),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CargoListing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub cargo_type: CargoType,
    pub description: String,
    pub weight: f64,
    pub volume: f64,
    pub estimated_value: f64,
    pub pickup_location: String,
    pub delivery_location: String,
    pub pickup_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub preferred_payment: PaymentMethod,
    pub additional_requirements: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A listing together with the number of live pending bids it has.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListingSummary {
    #[serde(flatten)]
    pub listing: CargoListing,
    pub bid_count: i64,
}

impl CargoListing {
    pub fn new(owner_id: Uuid, input: ListingInput, now: DateTime<Utc>) -> Result<Self, Error> {
        input.check(now.date_naive(), None)?;

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title(),
            cargo_type: input.cargo_type,
            description: input.description,
            weight: input.weight,
            volume: input.volume,
            estimated_value: input.estimated_value,
            pickup_location: input.pickup_location,
            delivery_location: input.delivery_location,
            pickup_date: input.pickup_date,
            delivery_date: input.delivery_date,
            budget: input.budget,
            preferred_payment: input.preferred_payment,
            additional_requirements: input.additional_requirements,
            status: Status::Open,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the editable fields. The status is left untouched.
    pub fn revise(&mut self, input: ListingInput, now: DateTime<Utc>) -> Result<(), Error> {
        input.check(now.date_naive(), self.pickup_date)?;

        self.title = input.title();
        self.cargo_type = input.cargo_type;
        self.description = input.description;
        self.weight = input.weight;
        self.volume = input.volume;
        self.estimated_value = input.estimated_value;
        self.pickup_location = input.pickup_location;
        self.delivery_location = input.delivery_location;
        self.pickup_date = input.pickup_date;
        self.delivery_date = input.delivery_date;
        self.budget = input.budget;
        self.preferred_payment = input.preferred_payment;
        self.additional_requirements = input.additional_requirements;
        self.updated_at = now;

        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.status == Status::Open
    }

    #[tracing::instrument(skip(self), fields(id = %self.id, from = ?self.status))]
    pub fn transition(&mut self, next: Status, now: DateTime<Utc>) -> Result<(), Error> {
        if !self.status.can_transition_to(next) {
            return Err(invalid_invocation_error().with_message(format!(
                "Cannot change status from {} to {}",
                self.status.name(),
                next.name()
            )));
        }

        self.status = next;
        self.updated_at = now;

        Ok(())
    }

    pub fn ensure_deletable(&self) -> Result<(), Error> {
        match self.status {
            Status::InProgress | Status::Completed => Err(invalid_invocation_error()
                .with_message("Listings that are in progress or completed cannot be deleted")),
            _ => Ok(()),
        }
    }
}

impl PolarClass for CargoListing {
    fn get_polar_class_builder() -> oso::ClassBuilder<CargoListing> {
        oso::Class::builder()
            .name("CargoListing")
            .add_attribute_getter("id", |recv: &CargoListing| recv.id.to_string())
            .add_attribute_getter("owner_id", |recv: &CargoListing| recv.owner_id.to_string())
            .add_attribute_getter("status", |recv: &CargoListing| recv.status.name())
    }

    fn get_polar_class() -> oso::Class {
        let builder = CargoListing::get_polar_class_builder();
        builder.build()
    }
}

#[cfg(test)]
pub fn test_input(today: NaiveDate) -> ListingInput {
    use chrono::Duration;

    ListingInput {
        title: None,
        cargo_type: CargoType::Fragile,
        description: "Glassware in crates".into(),
        weight: 1200.0,
        volume: 8.5,
        estimated_value: 250000.0,
        pickup_location: "Nairobi".into(),
        delivery_location: "Mombasa".into(),
        pickup_date: Some(today + Duration::days(2)),
        delivery_date: Some(today + Duration::days(4)),
        budget: Some(40000.0),
        preferred_payment: PaymentMethod::MobileMoney,
        additional_requirements: None,
    }
}

#[test]
fn listing_title_test() {
    let now = Utc::now();

    let listing = CargoListing::new(Uuid::new_v4(), test_input(now.date_naive()), now).unwrap();
    assert_eq!(listing.title, "Fragile Items - Nairobi to Mombasa");
    assert_eq!(listing.status, Status::Open);

    let mut input = test_input(now.date_naive());
    input.title = Some("  Glass to the coast ".into());
    let listing = CargoListing::new(Uuid::new_v4(), input, now).unwrap();
    assert_eq!(listing.title, "Glass to the coast");
}

#[test]
fn listing_validation_test() {
    use chrono::Duration;

    let now = Utc::now();
    let today = now.date_naive();

    let mut input = test_input(today);
    input.weight = 0.0;
    input.description = "x".repeat(501);
    let err = CargoListing::new(Uuid::new_v4(), input, now).unwrap_err();
    assert_eq!(err.code, 101);
    assert!(err.fields.contains_key("weight"));
    assert!(err.fields.contains_key("description"));

    let mut input = test_input(today);
    input.pickup_date = Some(today - Duration::days(1));
    let err = CargoListing::new(Uuid::new_v4(), input, now).unwrap_err();
    assert!(err.fields.contains_key("pickup_date"));

    let mut input = test_input(today);
    input.delivery_date = input.pickup_date;
    let err = CargoListing::new(Uuid::new_v4(), input, now).unwrap_err();
    assert!(err.fields.contains_key("delivery_date"));

    let mut input = test_input(today);
    input.budget = Some(input.estimated_value + 1.0);
    let err = CargoListing::new(Uuid::new_v4(), input, now).unwrap_err();
    assert!(err.fields.contains_key("budget"));
}

#[test]
fn listing_revise_keeps_past_pickup_test() {
    use chrono::Duration;

    let now = Utc::now();
    let today = now.date_naive();

    let mut listing = CargoListing::new(Uuid::new_v4(), test_input(today), now).unwrap();
    listing.pickup_date = Some(today - Duration::days(3));
    listing.delivery_date = Some(today + Duration::days(1));

    let mut input = test_input(today);
    input.pickup_date = listing.pickup_date;
    input.delivery_date = listing.delivery_date;
    input.description = "Glassware, repacked".into();

    listing.revise(input, now).unwrap();
    assert_eq!(listing.description, "Glassware, repacked");
    assert_eq!(listing.status, Status::Open);
}

#[test]
fn listing_transition_table_test() {
    let all = [
        Status::Open,
        Status::InProgress,
        Status::Completed,
        Status::Cancelled,
    ];

    let allowed = [
        (Status::Open, Status::InProgress),
        (Status::Open, Status::Cancelled),
        (Status::InProgress, Status::Completed),
        (Status::InProgress, Status::Cancelled),
        (Status::Cancelled, Status::Open),
    ];

    let now = Utc::now();

    for from in all.iter() {
        for to in all.iter() {
            let mut listing =
                CargoListing::new(Uuid::new_v4(), test_input(now.date_naive()), now).unwrap();
            listing.status = *from;

            let result = listing.transition(*to, now);

            match allowed.contains(&(*from, *to)) {
                true => {
                    assert!(result.is_ok(), "{:?} -> {:?} should be allowed", from, to);
                    assert_eq!(listing.status, *to);
                }
                false => {
                    assert_eq!(result.unwrap_err().code, 100);
                    assert_eq!(listing.status, *from);
                }
            }
        }
    }
}

#[test]
fn listing_delete_guard_test() {
    let now = Utc::now();
    let mut listing = CargoListing::new(Uuid::new_v4(), test_input(now.date_naive()), now).unwrap();

    assert!(listing.ensure_deletable().is_ok());

    listing.status = Status::InProgress;
    assert!(listing.ensure_deletable().is_err());

    listing.status = Status::Completed;
    assert!(listing.ensure_deletable().is_err());

    listing.status = Status::Cancelled;
    assert!(listing.ensure_deletable().is_ok());
}
