use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::errors::ValidationError;
use crate::models::catalog;
use crate::models::{Field, ReservationRecord};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^09\d{9}$").expect("valid phone regex"));

const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED: [Field; 6] = [
    Field::GuestName,
    Field::Email,
    Field::ResortName,
    Field::CheckinDate,
    Field::CheckoutDate,
    Field::Guests,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: Field,
    pub message: String,
}

impl ValidationWarning {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub fn validate(record: &ReservationRecord) -> Result<Vec<ValidationWarning>, ValidationError> {
    validate_at(record, chrono::Local::now().date_naive())
}

// First hard failure wins; soft problems come back as warnings.
pub fn validate_at(
    record: &ReservationRecord,
    today: NaiveDate,
) -> Result<Vec<ValidationWarning>, ValidationError> {
    for field in REQUIRED {
        let missing = match field {
            Field::Guests => record.guests == 0,
            _ => record.get(field).trim().is_empty(),
        };
        if missing {
            return Err(ValidationError::new(field, format!("{} is required", field.label())));
        }
    }

    if !EMAIL_RE.is_match(&record.email) {
        return Err(ValidationError::new(
            Field::Email,
            "Please enter a valid email address",
        ));
    }

    let mut warnings = Vec::new();

    let checkin = parse_date(Field::CheckinDate, &record.checkin_date)?;
    let checkout = parse_date(Field::CheckoutDate, &record.checkout_date)?;
    if checkout <= checkin {
        return Err(ValidationError::new(
            Field::CheckoutDate,
            "Check-out date must be after check-in date",
        ));
    }
    if let Some(tomorrow) = today.succ_opt() {
        if checkin < tomorrow {
            warnings.push(ValidationWarning::new(
                Field::CheckinDate,
                "Check-in date should be tomorrow or later",
            ));
        }
    }

    if !record.phone.is_empty() && !PHONE_RE.is_match(&record.phone) {
        warnings.push(ValidationWarning::new(
            Field::Phone,
            "Phone should be 11 digits starting with 09 (e.g. 09171234567)",
        ));
    }

    if !catalog::is_approved_resort(&record.resort_name) {
        warnings.push(ValidationWarning::new(
            Field::ResortName,
            format!("\"{}\" is not a listed resort", record.resort_name),
        ));
    }

    if !record.payment_gateway.is_empty()
        && !catalog::is_approved_payment_gateway(&record.payment_gateway)
    {
        warnings.push(ValidationWarning::new(
            Field::PaymentGateway,
            format!("\"{}\" is not a listed payment gateway", record.payment_gateway),
        ));
    }

    Ok(warnings)
}

fn parse_date(field: Field, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::new(field, format!("{} must be a date (YYYY-MM-DD)", field.label()))
    })
}
