//! Provider record model and the normalization into ranked [`Candidate`]s.
//!
//! The provider answers with a JSON array of loosely typed records. Each record
//! is decoded on its own so that a single bad entry only drops that entry; a
//! body that is not an array at all fails the whole lookup.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error::SearchFailure;

/// Structured address parts used to build [`Candidate::short_name`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
    pub state: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
}

/// One record exactly as the provider sends it.
///
/// `place_id`, `lat`, `lon` and `importance` may arrive as strings or numbers.
/// A field of an unexpected type reads as absent instead of failing the record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlace {
    pub place_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
    pub lat: Option<Value>,
    pub lon: Option<Value>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<RawAddress>,
    pub importance: Option<Value>,
}

impl RawPlace {
    /// Provider id, when present and a non-negative integer.
    pub fn id(&self) -> Option<u64> {
        match self.place_id.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// One normalized, selectable geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: u64,
    pub full_name: String,
    pub short_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub kind: String,
    pub importance: f64,
}

impl Candidate {
    /// Label for list rendering; the condensed name when one could be derived.
    pub fn label(&self) -> &str {
        if self.short_name.is_empty() {
            &self.full_name
        } else {
            &self.short_name
        }
    }
}

/// Why a record was left out of the candidate list. Never surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedRecord {
    NotAnObject,
    MissingId,
    MissingName,
    MissingCoordinate,
    BadCoordinate,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Builds the condensed label: locality, then region, then country.
///
/// Falls back to `full_name` when the address carries none of those parts.
pub fn short_name(address: Option<&RawAddress>, full_name: &str) -> String {
    let Some(address) = address else {
        return full_name.to_string();
    };

    let locality = non_empty(address.city.as_ref())
        .or_else(|| non_empty(address.town.as_ref()))
        .or_else(|| non_empty(address.village.as_ref()))
        .or_else(|| non_empty(address.hamlet.as_ref()));
    let region =
        non_empty(address.state.as_ref()).or_else(|| non_empty(address.province.as_ref()));
    let country = non_empty(address.country.as_ref());

    let parts: Vec<&str> = [locality, region, country].into_iter().flatten().collect();
    if parts.is_empty() {
        full_name.to_string()
    } else {
        parts.join(", ")
    }
}

fn parse_coordinate(value: Option<&Value>, bound: f64) -> Result<f64, MalformedRecord> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(MalformedRecord::MissingCoordinate),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(MalformedRecord::MissingCoordinate);
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| MalformedRecord::BadCoordinate)?,
        Some(Value::Number(n)) => n.as_f64().ok_or(MalformedRecord::BadCoordinate)?,
        Some(_) => return Err(MalformedRecord::BadCoordinate),
    };

    if parsed.is_finite() && parsed.abs() <= bound {
        Ok(parsed)
    } else {
        Err(MalformedRecord::BadCoordinate)
    }
}

impl TryFrom<RawPlace> for Candidate {
    type Error = MalformedRecord;

    fn try_from(raw: RawPlace) -> Result<Self, Self::Error> {
        let full_name = non_empty(raw.display_name.as_ref())
            .ok_or(MalformedRecord::MissingName)?
            .to_string();
        let latitude = parse_coordinate(raw.lat.as_ref(), 90.0)?;
        let longitude = parse_coordinate(raw.lon.as_ref(), 180.0)?;
        let id = raw.id().ok_or(MalformedRecord::MissingId)?;
        let importance = raw
            .importance
            .as_ref()
            .and_then(number_like)
            .filter(|value| value.is_finite())
            .unwrap_or(0.0);

        Ok(Self {
            id,
            short_name: short_name(raw.address.as_ref(), &full_name),
            full_name,
            latitude,
            longitude,
            kind: raw.kind.unwrap_or_default(),
            importance,
        })
    }
}

/// Records without a usable `place_id` are keyed by their position in the
/// response instead.
fn decode_record(position: usize, value: Value) -> Result<Candidate, MalformedRecord> {
    let mut raw: RawPlace =
        serde_json::from_value(value).map_err(|_| MalformedRecord::NotAnObject)?;
    if raw.id().is_none() {
        raw.place_id = Some(Value::from(position as u64));
    }
    Candidate::try_from(raw)
}

/// Sorts by importance, highest first. The sort is stable so ties keep the
/// provider's order.
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.importance.total_cmp(&a.importance));
}

/// Turns a raw response body into the ranked candidate list.
///
/// Only an envelope that is not a JSON array fails the lookup.
pub fn normalize_response(body: &[u8]) -> Result<Vec<Candidate>, SearchFailure> {
    let records: Vec<Value> = serde_json::from_slice(body).map_err(|err| {
        debug!(error = %err, "Response envelope is not a record list");
        SearchFailure::Unknown
    })?;

    let total = records.len();
    let mut candidates: Vec<Candidate> = records
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| match decode_record(position, value) {
            Ok(candidate) => Some(candidate),
            Err(reason) => {
                debug!(position, ?reason, "Dropping malformed record");
                None
            }
        })
        .collect();

    rank(&mut candidates);
    debug!(total, kept = candidates.len(), "Normalized provider response");
    Ok(candidates)
}
