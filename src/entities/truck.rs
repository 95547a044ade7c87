use chrono::{DateTime, Datelike, NaiveDate, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{invalid_input_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckType {
    Pickup,
    CargoVan,
    ClosedBody,
    Flatbed,
    Refrigerated,
    Tipper,
    Tanker,
    LowLoader,
    SemiTrailer,
    Other,
}

impl TruckType {
    pub fn name(&self) -> String {
        match self {
            Self::Pickup => "pickup".into(),
            Self::CargoVan => "cargo_van".into(),
            Self::ClosedBody => "closed_body".into(),
            Self::Flatbed => "flatbed".into(),
            Self::Refrigerated => "refrigerated".into(),
            Self::Tipper => "tipper".into(),
            Self::Tanker => "tanker".into(),
            Self::LowLoader => "low_loader".into(),
            Self::SemiTrailer => "semi_trailer".into(),
            Self::Other => "other".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    PerKm,
    PerTrip,
    PerHour,
    PerDay,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct TruckInput {
    pub truck_type: TruckType,
    #[validate(range(min = 0.1, message = "Capacity must be at least 0.1 tons"))]
    pub capacity_tons: f64,
    #[validate(length(min = 1, max = 100, message = "Make and model must be 1-100 characters"))]
    pub make_model: String,
    pub year: i32,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Current location must be 1-200 characters"
    ))]
    pub current_location: String,
    pub available_from: NaiveDate,
    pub available_to: NaiveDate,
    #[serde(default)]
    pub preferred_routes: Vec<String>,
    #[validate(range(min = 0.0, message = "Rate cannot be negative"))]
    pub rate_amount: f64,
    pub rate_type: RateType,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub additional_notes: Option<String>,
}

impl TruckInput {
    pub fn check(&self, today: NaiveDate) -> Result<(), Error> {
        self.validate()?;

        let mut err = invalid_input_error();

        if self.year < 1950 || self.year > today.year() + 1 {
            err = err.with_field(
                "year",
                format!("Year must be between 1950 and {}", today.year() + 1),
            );
        }

        if self.available_to < self.available_from {
            err = err.with_field(
                "available_to",
                "Available to date must be on or after available from date",
            );
        }

        match err.fields.is_empty() {
            true => Ok(()),
            false => Err(err),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Truck {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub truck_type: TruckType,
    pub capacity_tons: f64,
    pub make_model: String,
    pub year: i32,
    pub current_location: String,
    pub available_from: NaiveDate,
    pub available_to: NaiveDate,
    pub preferred_routes: Vec<String>,
    pub rate_amount: f64,
    pub rate_type: RateType,
    pub additional_notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Truck {
    pub fn new(owner_id: Uuid, input: TruckInput, now: DateTime<Utc>) -> Result<Self, Error> {
        input.check(now.date_naive())?;

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            truck_type: input.truck_type,
            capacity_tons: input.capacity_tons,
            make_model: input.make_model,
            year: input.year,
            current_location: input.current_location,
            available_from: input.available_from,
            available_to: input.available_to,
            preferred_routes: input.preferred_routes,
            rate_amount: input.rate_amount,
            rate_type: input.rate_type,
            additional_notes: input.additional_notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn revise(&mut self, input: TruckInput, now: DateTime<Utc>) -> Result<(), Error> {
        input.check(now.date_naive())?;

        self.truck_type = input.truck_type;
        self.capacity_tons = input.capacity_tons;
        self.make_model = input.make_model;
        self.year = input.year;
        self.current_location = input.current_location;
        self.available_from = input.available_from;
        self.available_to = input.available_to;
        self.preferred_routes = input.preferred_routes;
        self.rate_amount = input.rate_amount;
        self.rate_type = input.rate_type;
        self.additional_notes = input.additional_notes;
        self.updated_at = now;

        Ok(())
    }

    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.is_active && self.available_from <= date && date <= self.available_to
    }

    pub fn can_carry(&self, weight_tons: f64) -> bool {
        weight_tons <= self.capacity_tons
    }
}

impl PolarClass for Truck {
    fn get_polar_class_builder() -> oso::ClassBuilder<Truck> {
        oso::Class::builder()
            .name("Truck")
            .add_attribute_getter("id", |recv: &Truck| recv.id.to_string())
            .add_attribute_getter("owner_id", |recv: &Truck| recv.owner_id.to_string())
    }

    fn get_polar_class() -> oso::Class {
        let builder = Truck::get_polar_class_builder();
        builder.build()
    }
}

#[cfg(test)]
pub fn test_input(today: NaiveDate) -> TruckInput {
    use chrono::Duration;

    TruckInput {
        truck_type: TruckType::ClosedBody,
        capacity_tons: 10.0,
        make_model: "Isuzu FRR".into(),
        year: 2019,
        current_location: "Nairobi".into(),
        available_from: today,
        available_to: today + Duration::days(60),
        preferred_routes: vec!["Nairobi - Mombasa".into()],
        rate_amount: 120.0,
        rate_type: RateType::PerKm,
        additional_notes: None,
    }
}

#[test]
fn truck_validation_test() {
    use chrono::Duration;

    let now = Utc::now();
    let today = now.date_naive();

    let mut input = test_input(today);
    input.capacity_tons = 0.05;
    input.year = 1949;
    input.available_to = today - Duration::days(1);

    let err = Truck::new(Uuid::new_v4(), input, now).unwrap_err();
    assert_eq!(err.code, 101);
    assert!(err.fields.contains_key("capacity_tons"));

    let mut input = test_input(today);
    input.year = today.year() + 2;
    input.available_to = today - Duration::days(1);

    let err = Truck::new(Uuid::new_v4(), input, now).unwrap_err();
    assert!(err.fields.contains_key("year"));
    assert!(err.fields.contains_key("available_to"));

    let mut input = test_input(today);
    input.year = today.year() + 1;
    assert!(Truck::new(Uuid::new_v4(), input, now).is_ok());
}

#[test]
fn truck_availability_test() {
    use chrono::Duration;

    let now = Utc::now();
    let today = now.date_naive();

    let mut truck = Truck::new(Uuid::new_v4(), test_input(today), now).unwrap();

    assert!(truck.is_available_on(today));
    assert!(truck.is_available_on(today + Duration::days(60)));
    assert!(!truck.is_available_on(today + Duration::days(61)));
    assert!(!truck.is_available_on(today - Duration::days(1)));

    assert!(truck.can_carry(10.0));
    assert!(!truck.can_carry(10.5));

    truck.is_active = false;
    assert!(!truck.is_available_on(today));
}
