//! Extraction of the customer array from free-text model output.
//!
//! Steps:
//! 1. trim and strip markdown fences (```` ```json ````, any other language tag, and
//!    bare ```` ``` ````) anywhere;
//! 2. parse the cleaned text directly as JSON;
//! 3. otherwise, for every `[` in order, parse exactly one JSON value starting there.
//!    The streaming parser stops at the matching outer `]`, so nested arrays and
//!    brackets inside strings never cut the candidate short;
//! 4. validate every element against the `{name, sales}` record schema.
//!
//! The first candidate array that yields at least one valid record wins.

use contracts::dashboards::d402_top_customers::CustomerSalesRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[\w+-]*[ \t]*\r?\n?").expect("fence regex is valid"));

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("No JSON array found in response")]
    NoArrayFound,

    #[error("Malformed JSON array in response: {0}")]
    MalformedJson(String),

    #[error("No valid customer records in response ({rejected} rejected)")]
    InvalidRecords { rejected: usize },
}

/// Records that passed validation plus the count of dropped elements
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCustomers {
    pub customers: Vec<CustomerSalesRecord>,
    pub skipped: usize,
}

/// Parse model output into customer records
pub fn parse_customers(raw: &str) -> Result<ParsedCustomers, ParseError> {
    let cleaned = clean_response(raw);
    let candidates = array_candidates(&cleaned)?;

    let mut empty_seen = false;
    let mut max_rejected = 0;

    for items in &candidates {
        if items.is_empty() {
            empty_seen = true;
            continue;
        }

        let parsed = validate_records(items);
        if !parsed.customers.is_empty() {
            return Ok(parsed);
        }
        max_rejected = max_rejected.max(parsed.skipped);
    }

    if empty_seen {
        return Ok(ParsedCustomers {
            customers: Vec::new(),
            skipped: 0,
        });
    }

    Err(ParseError::InvalidRecords {
        rejected: max_rejected,
    })
}

/// Trim whitespace and remove markdown code fences
pub fn clean_response(raw: &str) -> String {
    FENCE_RE.replace_all(raw.trim(), "").trim().to_string()
}

/// Every JSON array the text contains, outermost first
fn array_candidates(cleaned: &str) -> Result<Vec<Vec<Value>>, ParseError> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(cleaned) {
        return Ok(vec![items]);
    }

    let mut candidates = Vec::new();
    let mut last_error = None;
    let mut consumed_to = 0;

    for (idx, _) in cleaned.match_indices('[') {
        // Brackets inside an accepted array are already covered by it
        if idx < consumed_to {
            continue;
        }

        let mut stream = serde_json::Deserializer::from_str(&cleaned[idx..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Array(items))) => {
                consumed_to = idx + stream.byte_offset();
                candidates.push(items);
            }
            Some(Err(e)) if last_error.is_none() => last_error = Some(e.to_string()),
            Some(Ok(_)) | Some(Err(_)) | None => {}
        }
    }

    if !candidates.is_empty() {
        return Ok(candidates);
    }

    match last_error {
        Some(e) => Err(ParseError::MalformedJson(e)),
        None => Err(ParseError::NoArrayFound),
    }
}

fn validate_records(items: &[Value]) -> ParsedCustomers {
    let mut customers = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for item in items {
        match validate_record(item) {
            Some(record) => customers.push(record),
            None => {
                tracing::warn!("Skipping non-conforming customer record: {}", item);
                skipped += 1;
            }
        }
    }

    ParsedCustomers { customers, skipped }
}

/// `name` must be a non-empty string, `sales` a finite number or numeric string
fn validate_record(item: &Value) -> Option<CustomerSalesRecord> {
    let obj = item.as_object()?;

    let name = obj.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let sales = match obj.get("sales")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_amount(s)?,
        _ => return None,
    };
    if !sales.is_finite() {
        return None;
    }

    Some(CustomerSalesRecord {
        name: name.to_string(),
        sales,
    })
}

/// "$1,234.50" -> 1234.5
///
/// Separators (`,` or a space) are accepted only between thousands groups:
/// "1,2,3" is not an amount.
fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let s = s.trim_start_matches(|c| matches!(c, '$' | '€' | '£')).trim_start();

    let (int_part, fraction) = match s.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (s, None),
    };

    let mut number = ungroup_thousands(int_part)?;
    if let Some(fraction) = fraction {
        if !is_digits(fraction) {
            return None;
        }
        number.push('.');
        number.push_str(fraction);
    }

    let value: f64 = number.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// "1,234,567" -> "1234567"; a single separator kind, groups of three after the first
fn ungroup_thousands(int_part: &str) -> Option<String> {
    let Some(sep) = int_part.chars().find(|c| *c == ',' || c.is_whitespace()) else {
        return is_digits(int_part).then(|| int_part.to_string());
    };

    let mut groups = int_part.split(sep);
    let first = groups.next()?;
    if first.len() > 3 || !is_digits(first) {
        return None;
    }

    let mut digits = first.to_string();
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
