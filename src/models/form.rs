use std::collections::HashMap;

use super::reservation::{parse_guests, Field, ReservationRecord};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: HashMap<Field, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }

    pub fn populate(&mut self, record: &ReservationRecord) {
        self.values = Field::ALL
            .into_iter()
            .map(|f| (f, record.get(f).into_owned()))
            .collect();
    }

    pub fn collect(&self) -> ReservationRecord {
        let mut record = ReservationRecord::default();
        for field in Field::ALL {
            let raw = self.value(field).trim();
            match field {
                Field::Guests => record.guests = parse_guests(raw),
                _ => record.set(field, raw),
            }
        }
        record
    }
}
