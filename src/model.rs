//! Serde data structures for the upstream tracking payload.
//!
//! The La Poste API returns a bare object for a single tracking number
//! and an array for several; [`resolve_batch`] flattens both shapes
//! exactly once at the boundary into a `Vec<TrackingResult>` so that
//! downstream code never re-branches on it. Every optional upstream
//! field is `Option` or defaulted: the schema is documented but
//! unstable, and deserialization must never fail on an absent field.

use serde::{Deserialize, Serialize};

use crate::error::FacteurError;

/// One raw item of the upstream response, before classification.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_code: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_ship: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment: Option<Shipment>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(default)]
    pub id_ship: String,

    #[serde(default)]
    pub is_final: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    /// Holder enum code 1–4, see [`codes::holder_label`](crate::codes::holder_label).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_data: Option<ContextData>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event: Vec<Event>,

    /// Deserialized for schema fidelity; the formatter hides it in
    /// favor of the event list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<TimelineStep>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removal_point: Option<RemovalPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_choice: Option<DeliveryChoice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<Partner>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryChoice {
    #[serde(default)]
    pub delivery_choice: u8,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default)]
    pub status: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<i8>,
}

/// Per-identifier tracking failure. This is data, not a process error:
/// a batch mixes failures and successes freely.
#[derive(Debug, Clone, Default)]
pub struct TrackingFailure {
    pub id_ship: String,
    pub return_code: Option<u16>,
    pub return_message: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TrackingResult {
    Success(Shipment),
    Failure(TrackingFailure),
}

impl TrackingResult {
    /// The tracking number this result belongs to.
    #[must_use]
    pub fn id_ship(&self) -> &str {
        match self {
            Self::Success(shipment) => &shipment.id_ship,
            Self::Failure(failure) => &failure.id_ship,
        }
    }
}

/// Resolve the upstream shape-shifting response (bare object for one
/// identifier, array for several) into classified results.
///
/// Classification per item: a `shipment` field means success; else a
/// `returnCode`/`returnMessage` means a per-identifier failure; an item
/// carrying neither is malformed and fatal for the whole lookup — the
/// raw JSON text is propagated unformatted.
pub fn resolve_batch(body: &[u8]) -> Result<(bool, Vec<TrackingResult>), FacteurError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| FacteurError::MalformedResponse {
            body: String::from_utf8_lossy(body).into_owned(),
        })?;

    let (single, raw_items) = match value {
        serde_json::Value::Array(items) => (false, items),
        other => (true, vec![other]),
    };

    let mut results = Vec::with_capacity(raw_items.len());
    for raw in raw_items {
        let item: TrackingItem =
            serde_json::from_value(raw.clone()).map_err(|_| FacteurError::MalformedResponse {
                body: raw.to_string(),
            })?;
        results.push(classify(item, &raw)?);
    }

    Ok((single, results))
}

fn classify(item: TrackingItem, raw: &serde_json::Value) -> Result<TrackingResult, FacteurError> {
    if let Some(shipment) = item.shipment {
        // A 2xx returnCode with shipment data is the success shape.
        let code = item.return_code.unwrap_or(200);
        if (200..300).contains(&code) {
            return Ok(TrackingResult::Success(shipment));
        }
        // Error code alongside shipment data: trust the error.
        return Ok(TrackingResult::Failure(TrackingFailure {
            id_ship: item.id_ship.unwrap_or(shipment.id_ship),
            return_code: item.return_code,
            return_message: item.return_message,
        }));
    }

    if item.return_code.is_some() || item.return_message.is_some() {
        return Ok(TrackingResult::Failure(TrackingFailure {
            id_ship: item.id_ship.unwrap_or_default(),
            return_code: item.return_code,
            return_message: item.return_message,
        }));
    }

    Err(FacteurError::MalformedResponse {
        body: raw.to_string(),
    })
}

/// Re-sort results to mirror the input identifier order, independent of
/// the API response order. Exactly one result per input identifier: an
/// identifier with no matching item synthesizes an empty failure, and
/// the formatter falls back to its default error text for it.
#[must_use]
pub fn align_results(results: Vec<TrackingResult>, input_order: &[String]) -> Vec<TrackingResult> {
    let mut pool: Vec<Option<TrackingResult>> = results.into_iter().map(Some).collect();

    input_order
        .iter()
        .map(|id| {
            pool.iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|r| r.id_ship() == id))
                .and_then(Option::take)
                .unwrap_or_else(|| {
                    TrackingResult::Failure(TrackingFailure {
                        id_ship: id.clone(),
                        return_code: None,
                        return_message: None,
                    })
                })
        })
        .collect()
}
