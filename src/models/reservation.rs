use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn numeric(&self) -> i64 {
        self.0.parse().unwrap_or(0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Scalar::deserialize(deserializer).map(|s| RecordId::new(s.into_text()))
    }
}

pub const DEFAULT_GUESTS: u32 = 1;

fn default_guests() -> u32 {
    DEFAULT_GUESTS
}

pub fn parse_guests(raw: &str) -> u32 {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_GUESTS)
}

fn lenient_guests<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| parse_guests(&s.into_text()))
        .unwrap_or(DEFAULT_GUESTS))
}

fn string_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw.map(Scalar::into_text).unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "string_or_null")]
    pub guest_name: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub email: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub phone: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub street_address: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub municipality: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub region: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub country: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub resort_name: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub checkin_date: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub checkout_date: String,
    #[serde(default = "default_guests", deserialize_with = "lenient_guests")]
    pub guests: u32,
    #[serde(default, deserialize_with = "string_or_null")]
    pub payment_gateway: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for ReservationRecord {
    fn default() -> Self {
        Self {
            id: None,
            guest_name: String::new(),
            email: String::new(),
            phone: String::new(),
            street_address: String::new(),
            municipality: String::new(),
            region: String::new(),
            country: String::new(),
            resort_name: String::new(),
            checkin_date: String::new(),
            checkout_date: String::new(),
            guests: DEFAULT_GUESTS,
            payment_gateway: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl ReservationRecord {
    pub fn sort_key(&self) -> i64 {
        self.id.as_ref().map(RecordId::numeric).unwrap_or(0)
    }

    pub fn get(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::GuestName => Cow::Borrowed(&self.guest_name),
            Field::Email => Cow::Borrowed(&self.email),
            Field::Phone => Cow::Borrowed(&self.phone),
            Field::StreetAddress => Cow::Borrowed(&self.street_address),
            Field::Municipality => Cow::Borrowed(&self.municipality),
            Field::Region => Cow::Borrowed(&self.region),
            Field::Country => Cow::Borrowed(&self.country),
            Field::ResortName => Cow::Borrowed(&self.resort_name),
            Field::CheckinDate => Cow::Borrowed(&self.checkin_date),
            Field::CheckoutDate => Cow::Borrowed(&self.checkout_date),
            Field::Guests => Cow::Owned(self.guests.to_string()),
            Field::PaymentGateway => Cow::Borrowed(&self.payment_gateway),
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::GuestName => self.guest_name = value,
            Field::Email => self.email = value,
            Field::Phone => self.phone = value,
            Field::StreetAddress => self.street_address = value,
            Field::Municipality => self.municipality = value,
            Field::Region => self.region = value,
            Field::Country => self.country = value,
            Field::ResortName => self.resort_name = value,
            Field::CheckinDate => self.checkin_date = value,
            Field::CheckoutDate => self.checkout_date = value,
            Field::Guests => self.guests = parse_guests(&value),
            Field::PaymentGateway => self.payment_gateway = value,
        }
    }
}

// Stable, so records sharing a key keep server order.
pub fn sort_newest_first(records: &mut [ReservationRecord]) {
    records.sort_by_key(|r| std::cmp::Reverse(r.sort_key()));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    GuestName,
    Email,
    Phone,
    StreetAddress,
    Municipality,
    Region,
    Country,
    ResortName,
    CheckinDate,
    CheckoutDate,
    Guests,
    PaymentGateway,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::GuestName,
        Field::Email,
        Field::Phone,
        Field::StreetAddress,
        Field::Municipality,
        Field::Region,
        Field::Country,
        Field::ResortName,
        Field::CheckinDate,
        Field::CheckoutDate,
        Field::Guests,
        Field::PaymentGateway,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::GuestName => "guest_name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::StreetAddress => "street_address",
            Field::Municipality => "municipality",
            Field::Region => "region",
            Field::Country => "country",
            Field::ResortName => "resort_name",
            Field::CheckinDate => "checkin_date",
            Field::CheckoutDate => "checkout_date",
            Field::Guests => "guests",
            Field::PaymentGateway => "payment_gateway",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::GuestName => "Guest name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::StreetAddress => "Street address",
            Field::Municipality => "Municipality",
            Field::Region => "Region",
            Field::Country => "Country",
            Field::ResortName => "Resort name",
            Field::CheckinDate => "Check-in date",
            Field::CheckoutDate => "Check-out date",
            Field::Guests => "Number of guests",
            Field::PaymentGateway => "Payment gateway",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        match name {
            "resort" => return Some(Field::ResortName),
            "checkin" => return Some(Field::CheckinDate),
            "checkout" => return Some(Field::CheckoutDate),
            _ => {}
        }
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn is_canonical(&self, name: &str) -> bool {
        self.name() == name
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
