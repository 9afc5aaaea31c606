pub mod health;
pub mod prompt;
pub mod reservations;
