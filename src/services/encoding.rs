use quick_xml::escape::escape;
use serde::Deserialize;

use crate::errors::ClientError;
use crate::models::{Field, Format, ReservationRecord};
use crate::services::xml;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: &'static str,
    pub body: String,
}

pub fn encode(record: &ReservationRecord, format: Format) -> Result<EncodedBody, ClientError> {
    let body = match format {
        Format::Json => serde_json::to_string(record).map_err(ClientError::Encode)?,
        Format::Xml => encode_xml(record),
    };
    Ok(EncodedBody {
        content_type: format.content_type(),
        body,
    })
}

pub fn encode_xml(record: &ReservationRecord) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<reservation>\n");
    for field in Field::ALL {
        let name = field.name();
        let value = record.get(field);
        out.push_str(&format!("  <{name}>{}</{name}>\n", escape(&*value)));
    }
    out.push_str("</reservation>\n");
    out
}

pub fn decode_record(body: &str, format: Format) -> Result<ReservationRecord, ClientError> {
    match format {
        Format::Json => serde_json::from_str(body).map_err(|e| ClientError::parse(format, e)),
        Format::Xml => xml::parse_reservation(body),
    }
}

pub fn decode_list(body: &str, format: Format) -> Result<Vec<ReservationRecord>, ClientError> {
    match format {
        Format::Json => serde_json::from_str(body).map_err(|e| ClientError::parse(format, e)),
        Format::Xml => xml::parse_reservations(body),
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub fn extract_error_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return Some(parsed.error);
    }
    xml::parse_error_message(body)
}
