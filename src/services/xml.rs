// `id` comes from an attribute when present, otherwise from an `<id>` child.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::ClientError;
use crate::models::reservation::parse_guests;
use crate::models::{Field, Format, RecordId, ReservationRecord};

const RESERVATION_TAG: &str = "reservation";

#[derive(Debug, Default)]
struct RawReservation {
    attr_id: Option<String>,
    children: Vec<(String, String)>,
}

impl RawReservation {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ClientError> {
        let mut attr_id = None;
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ClientError::parse(Format::Xml, e))?;
            if attr.key.local_name().as_ref() == b"id" {
                let value = attr
                    .unescape_value()
                    .map_err(|e| ClientError::parse(Format::Xml, e))?;
                attr_id = Some(value.into_owned());
            }
        }
        Ok(Self {
            attr_id,
            children: Vec::new(),
        })
    }

    fn child_text(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, text)| text.as_str())
    }

    fn into_record(self) -> ReservationRecord {
        let mut record = ReservationRecord::default();

        let id = self
            .attr_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.child_text("id"))
            .filter(|id| !id.trim().is_empty());
        record.id = id.map(RecordId::new);
        record.created_at = self.child_text("created_at").map(str::to_string);
        record.updated_at = self.child_text("updated_at").map(str::to_string);

        for field in Field::ALL {
            let text = self
                .child_text(field.name())
                .or_else(|| {
                    self.children
                        .iter()
                        .find(|(n, _)| Field::from_name(n) == Some(field) && !field.is_canonical(n))
                        .map(|(_, text)| text.as_str())
                })
                .unwrap_or("");
            match field {
                Field::Guests => record.guests = parse_guests(text),
                _ => record.set(field, text),
            }
        }
        record
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

pub fn parse_reservations(xml: &str) -> Result<Vec<ReservationRecord>, ClientError> {
    let mut reader = Reader::from_str(xml);
    let mut records = Vec::new();
    let mut saw_element = false;

    let mut current: Option<RawReservation> = None;
    // Depth below the open <reservation>; 1 means a field element.
    let mut depth = 0usize;
    let mut child: Option<(String, String)> = None;

    loop {
        match reader
            .read_event()
            .map_err(|e| ClientError::parse(Format::Xml, e))?
        {
            Event::Start(start) => {
                saw_element = true;
                if current.is_none() {
                    if element_name(&start) == RESERVATION_TAG {
                        current = Some(RawReservation::from_start(&start)?);
                        depth = 0;
                    }
                } else {
                    depth += 1;
                    if depth == 1 {
                        child = Some((element_name(&start), String::new()));
                    }
                }
            }
            Event::Empty(start) => {
                saw_element = true;
                match current.as_mut() {
                    None => {
                        if element_name(&start) == RESERVATION_TAG {
                            records.push(RawReservation::from_start(&start)?.into_record());
                        }
                    }
                    Some(res) => {
                        if depth == 0 {
                            res.children.push((element_name(&start), String::new()));
                        }
                    }
                }
            }
            Event::Text(text) => {
                if let Some((_, value)) = child.as_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| ClientError::parse(Format::Xml, e))?;
                    value.push_str(&unescaped);
                }
            }
            Event::CData(cdata) => {
                if let Some((_, value)) = child.as_mut() {
                    value.push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    if let Some(done) = current.take() {
                        records.push(done.into_record());
                    }
                } else {
                    if depth == 1 {
                        if let (Some(res), Some(finished)) = (current.as_mut(), child.take()) {
                            res.children.push(finished);
                        }
                    }
                    depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if current.is_some() {
        return Err(ClientError::parse(
            Format::Xml,
            "document ended inside <reservation>",
        ));
    }
    if !saw_element {
        return Err(ClientError::parse(Format::Xml, "document has no root element"));
    }
    Ok(records)
}

pub fn parse_reservation(xml: &str) -> Result<ReservationRecord, ClientError> {
    parse_reservations(xml)?
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::parse(Format::Xml, "no <reservation> element"))
}

pub fn parse_error_message(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<String> = Vec::new();

    loop {
        match reader.read_event().ok()? {
            Event::Start(start) => stack.push(element_name(&start)),
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(text) if stack.last().map(String::as_str) == Some("error") => {
                let text: Cow<'_, str> = text.unescape().ok()?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}
