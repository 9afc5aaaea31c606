pub mod client;
pub mod confirm;
pub mod encoding;
pub mod render;
pub mod transport;
pub mod validation;
pub mod xml;
