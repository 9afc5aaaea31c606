use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ClientError;
use crate::models::{Format, ReservationRecord};

static JSON_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#""(\\u[a-fA-F0-9]{4}|\\[^u]|[^\\"])*"(\s*:)?|\b(true|false|null)\b|-?\d+(?:\.\d*)?(?:[eE][+\-]?\d+)?"#,
    )
    .expect("valid json token regex")
});

static TAG_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s*<").expect("valid tag boundary regex"));

const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Key,
    String,
    Number,
    Boolean,
    Null,
    Plain,
}

impl TokenClass {
    fn ansi(&self) -> Option<&'static str> {
        match self {
            TokenClass::Key => Some("\x1b[36m"),
            TokenClass::String => Some("\x1b[32m"),
            TokenClass::Number => Some("\x1b[33m"),
            TokenClass::Boolean => Some("\x1b[35m"),
            TokenClass::Null => Some("\x1b[90m"),
            TokenClass::Plain => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonToken {
    pub class: TokenClass,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailBody {
    Json(Vec<JsonToken>),
    Xml(String),
}

impl DetailBody {
    pub fn from_response(body: &str, format: Format) -> Result<Self, ClientError> {
        match format {
            Format::Json => {
                let value: serde_json::Value =
                    serde_json::from_str(body).map_err(|e| ClientError::parse(format, e))?;
                let pretty =
                    serde_json::to_string_pretty(&value).map_err(|e| ClientError::parse(format, e))?;
                Ok(DetailBody::Json(highlight_json(&pretty)))
            }
            Format::Xml => Ok(DetailBody::Xml(indent_xml(body))),
        }
    }

    pub fn plain(&self) -> String {
        match self {
            DetailBody::Json(tokens) => tokens.iter().map(|t| t.text.as_str()).collect(),
            DetailBody::Xml(text) => text.clone(),
        }
    }

    pub fn ansi(&self) -> String {
        match self {
            DetailBody::Json(tokens) => {
                let mut out = String::new();
                for token in tokens {
                    match token.class.ansi() {
                        Some(color) => {
                            out.push_str(color);
                            out.push_str(&token.text);
                            out.push_str("\x1b[0m");
                        }
                        None => out.push_str(&token.text),
                    }
                }
                out
            }
            DetailBody::Xml(text) => text.clone(),
        }
    }
}

pub fn highlight_json(text: &str) -> Vec<JsonToken> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in JSON_TOKEN_RE.find_iter(text) {
        if m.start() > last {
            tokens.push(JsonToken {
                class: TokenClass::Plain,
                text: text[last..m.start()].to_string(),
            });
        }
        let matched = m.as_str();
        let class = if matched.starts_with('"') {
            if matched.ends_with(':') {
                TokenClass::Key
            } else {
                TokenClass::String
            }
        } else if matched == "true" || matched == "false" {
            TokenClass::Boolean
        } else if matched == "null" {
            TokenClass::Null
        } else {
            TokenClass::Number
        };
        tokens.push(JsonToken {
            class,
            text: matched.to_string(),
        });
        last = m.end();
    }
    if last < text.len() {
        tokens.push(JsonToken {
            class: TokenClass::Plain,
            text: text[last..].to_string(),
        });
    }
    tokens
}

// One node per tag boundary; text containing newlines stays inside its node.
pub fn indent_xml(xml: &str) -> String {
    let parts: Vec<&str> = TAG_BOUNDARY_RE.split(xml.trim()).collect();
    let last = parts.len().saturating_sub(1);
    let mut depth = 0usize;
    let mut out = String::new();

    for (i, part) in parts.iter().enumerate() {
        if part.trim().is_empty() {
            continue;
        }
        let mut node = String::with_capacity(part.len() + 2);
        if i > 0 {
            node.push('<');
        }
        node.push_str(part);
        if i < last {
            node.push('>');
        }
        let node = node.as_str();
        let opens = node.starts_with('<')
            && !node.starts_with("</")
            && !node.starts_with("<?")
            && !node.starts_with("<!")
            && !node.ends_with("/>")
            && !node.contains("</");

        if node.starts_with("</") {
            depth = depth.saturating_sub(1);
        }
        out.push_str(&INDENT.repeat(depth));
        out.push_str(node);
        out.push('\n');
        if opens {
            depth += 1;
        }
    }
    out
}

const COLUMNS: [&str; 8] = [
    "ID", "Guest", "Email", "Resort", "Check-in", "Check-out", "Guests", "Payment",
];

fn row(record: &ReservationRecord) -> [String; 8] {
    [
        record
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
        record.guest_name.clone(),
        record.email.clone(),
        record.resort_name.clone(),
        record.checkin_date.clone(),
        record.checkout_date.clone(),
        record.guests.to_string(),
        if record.payment_gateway.is_empty() {
            "-".to_string()
        } else {
            record.payment_gateway.clone()
        },
    ]
}

pub fn render_table(records: &[ReservationRecord]) -> String {
    if records.is_empty() {
        return "No reservations found.\n".to_string();
    }

    let rows: Vec<[String; 8]> = records.iter().map(row).collect();
    let mut widths = COLUMNS.map(|c| c.chars().count());
    for r in &rows {
        for (width, cell) in widths.iter_mut().zip(r.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut out = format_line(&header);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for r in &rows {
        out.push_str(&format_line(r));
        out.push('\n');
    }
    out
}
