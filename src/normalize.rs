use serde_json::Value;

use crate::record::{Performance, RawRecord};

/// Convert one raw scraper record into the canonical shape.
///
/// Never fails. Absent or `null` text fields become empty strings, so later
/// stages only ever see `&str` and treat the empty value as non-matching.
pub fn normalize(raw: RawRecord) -> Performance {
    Performance {
        id: coerce_text(raw.id.as_ref()),
        title: coerce_text(raw.title.as_ref()),
        image: coerce_text(raw.image.as_ref()),
        date: coerce_text(raw.date.as_ref()),
        venue: coerce_text(raw.venue.as_ref()),
        link: coerce_text(raw.link.as_ref()),
        region: coerce_text(raw.region.as_ref()),
        genre: coerce_text(raw.genre.as_ref()),
        price: coerce_optional(raw.price.as_ref()),
        discount: coerce_optional(raw.discount.as_ref()),
        extra: raw.extra,
    }
}

pub fn normalize_all(raw: Vec<RawRecord>) -> Vec<Performance> {
    raw.into_iter().map(normalize).collect()
}

/// Render a JSON scalar as text. Whole numbers keep their decimal form
/// (`1234`, not `1234.0`), so numeric ids line up with string ids.
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                    _ => n.to_string(),
                }
            }
        }
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn coerce_optional(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(coerce_text(Some(v))),
    }
}
