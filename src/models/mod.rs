pub mod catalog;
pub mod form;
pub mod format;
pub mod health;
pub mod reservation;

pub use form::FormState;
pub use format::Format;
pub use health::HealthReport;
pub use reservation::{Field, RecordId, ReservationRecord};
