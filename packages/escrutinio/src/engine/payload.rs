//! Structured payload parsing.
//!
//! The source sometimes answers with JSON (a direct endpoint hit or an
//! intercepted API response) whose shape has never been stable. This
//! module searches a payload for known key aliases at any nesting depth,
//! unwrapping common envelope keys, and never fails: an unrecognizable
//! payload just parses to nothing.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::numeric;
use crate::types::{CandidateTally, Tally};

/// Candidate/party label keys.
const NAME_KEYS: &[&str] = &["nombre", "name", "candidato", "partido"];
/// Vote-count keys.
const VOTE_KEYS: &[&str] = &["votos", "votes", "total"];
/// Completion-percentage keys.
const PCT_KEYS: &[&str] = &["porcentaje_actas", "actas_percentage", "avance"];
/// Region-name keys on per-region objects.
const REGION_KEYS: &[&str] = &["departamento", "department"];
/// Region-array envelope keys.
const REGION_ARRAY_KEYS: &[&str] = &["departamentos", "departments"];
/// Candidate-array keys.
const CANDIDATE_ARRAY_KEYS: &[&str] = &["candidatos", "candidates"];
/// Generic envelope keys unwrapped before giving up on an object.
const ENVELOPE_KEYS: &[&str] = &["data", "results", "resultados", "response"];

/// Recursion guard for adversarially deep payloads.
const MAX_DEPTH: usize = 8;

fn get_alias<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

/// Read a count that may arrive as a JSON number or a separator-laden
/// string.
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => numeric::parse_vote_count(s),
        _ => None,
    }
}

fn as_pct(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => numeric::parse_percentage(s),
        _ => None,
    }
}

/// One candidate tally from an object carrying name and vote aliases.
fn candidate_from_object(obj: &Map<String, Value>) -> Option<CandidateTally> {
    let name = get_alias(obj, NAME_KEYS)?.as_str()?.trim().to_string();
    if name.is_empty() {
        return None;
    }
    let votes = as_count(get_alias(obj, VOTE_KEYS)?)?;
    Some(CandidateTally { name, votes })
}

/// Candidate tallies from an array of candidate objects.
fn candidates_from_array(items: &[Value]) -> Vec<CandidateTally> {
    items
        .iter()
        .filter_map(|v| v.as_object())
        .filter_map(candidate_from_object)
        .collect()
}

/// Tally for one region object: its candidate array plus its own
/// completion percentage. Absent completion reads as 0, which projection
/// passes through unchanged.
fn tally_from_region_object(obj: &Map<String, Value>) -> Option<Tally> {
    let candidates = get_alias(obj, CANDIDATE_ARRAY_KEYS)
        .and_then(|v| v.as_array())
        .map(|items| candidates_from_array(items))?;
    if candidates.is_empty() {
        return None;
    }
    let actas_pct = get_alias(obj, PCT_KEYS).and_then(as_pct).unwrap_or(0.0);
    Some(Tally::new(actas_pct, candidates))
}

/// Best-effort single-result search: the reading used when the payload is
/// the answer to one region's query.
///
/// Looks for a candidate array (or an array of candidate objects) wherever
/// the aliases place one; when only a region array is present, the first
/// entry with a usable tally is taken.
pub fn tally_from_value(value: &Value) -> Option<Tally> {
    tally_at_depth(value, 0)
}

fn tally_at_depth(value: &Value, depth: usize) -> Option<Tally> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Array(items) => {
            let candidates = candidates_from_array(items);
            if candidates.is_empty() {
                return None;
            }
            // A bare candidate array carries no completion figure of its
            // own; hunt the items for one.
            let actas_pct = items
                .iter()
                .filter_map(|v| v.as_object())
                .find_map(|o| get_alias(o, PCT_KEYS).and_then(as_pct))
                .unwrap_or(0.0);
            Some(Tally::new(actas_pct, candidates))
        }
        Value::Object(obj) => {
            // Envelope unwrap first: {"data": {...}} and friends.
            for key in ENVELOPE_KEYS {
                if let Some(inner) = obj.get(*key) {
                    if let Some(tally) = tally_at_depth(inner, depth + 1) {
                        return Some(tally);
                    }
                }
            }

            if let Some(regions) = get_alias(obj, REGION_ARRAY_KEYS).and_then(|v| v.as_array()) {
                if let Some(tally) = regions
                    .iter()
                    .filter_map(|v| v.as_object())
                    .find_map(tally_from_region_object)
                {
                    return Some(tally);
                }
            }

            if let Some(tally) = tally_from_region_object(obj) {
                return Some(tally);
            }

            // Last resort: scan every value for an array that parses.
            obj.values()
                .filter(|v| v.is_array() || v.is_object())
                .find_map(|v| tally_at_depth(v, depth + 1))
        }
        _ => None,
    }
}

/// Recursive search for a completion percentage anywhere in the payload.
pub fn completion_pct(value: &Value) -> Option<f64> {
    completion_at_depth(value, 0)
}

fn completion_at_depth(value: &Value, depth: usize) -> Option<f64> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Object(obj) => get_alias(obj, PCT_KEYS)
            .and_then(as_pct)
            .or_else(|| obj.values().find_map(|v| completion_at_depth(v, depth + 1))),
        Value::Array(items) => items.iter().find_map(|v| completion_at_depth(v, depth + 1)),
        _ => None,
    }
}

/// Multi-region parse: region name → tally, in payload order.
///
/// Handles the shapes the source has produced: a region array under an
/// envelope, a flat array of candidate objects each naming a region, and a
/// top-level candidate array (which belongs to the national umbrella and is
/// keyed by its upstream label, `Nacional`).
pub fn regional_map(value: &Value) -> IndexMap<String, Tally> {
    let mut map = IndexMap::new();
    regional_at_depth(value, 0, &mut map);
    map
}

fn regional_at_depth(value: &Value, depth: usize, out: &mut IndexMap<String, Tally>) {
    if depth > MAX_DEPTH {
        return;
    }
    match value {
        Value::Array(items) => {
            // Flat array of candidate objects, each tagged with a region.
            for obj in items.iter().filter_map(|v| v.as_object()) {
                let Some(candidate) = candidate_from_object(obj) else {
                    continue;
                };
                let region = get_alias(obj, REGION_KEYS)
                    .and_then(|v| v.as_str())
                    .unwrap_or("Nacional")
                    .trim()
                    .to_string();
                let actas_pct = get_alias(obj, PCT_KEYS).and_then(as_pct).unwrap_or(0.0);
                out.entry(region)
                    .or_insert_with(|| Tally::new(actas_pct, Vec::new()))
                    .candidates
                    .push(candidate);
            }
        }
        Value::Object(obj) => {
            if let Some(regions) = get_alias(obj, REGION_ARRAY_KEYS).and_then(|v| v.as_array()) {
                for region_obj in regions.iter().filter_map(|v| v.as_object()) {
                    let name = get_alias(region_obj, NAME_KEYS)
                        .or_else(|| get_alias(region_obj, REGION_KEYS))
                        .and_then(|v| v.as_str())
                        .unwrap_or("Unknown")
                        .trim()
                        .to_string();
                    if let Some(tally) = tally_from_region_object(region_obj) {
                        out.insert(name, tally);
                    }
                }
                if !out.is_empty() {
                    return;
                }
            }

            if let Some(tally) = tally_from_region_object(obj) {
                out.insert("Nacional".to_string(), tally);
                return;
            }

            for key in ENVELOPE_KEYS {
                if let Some(inner) = obj.get(*key) {
                    regional_at_depth(inner, depth + 1, out);
                    if !out.is_empty() {
                        return;
                    }
                }
            }

            for inner in obj.values().filter(|v| v.is_array()) {
                regional_at_depth(inner, depth + 1, out);
                if !out.is_empty() {
                    return;
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_region_object_with_spanish_aliases() {
        let payload = json!({
            "porcentaje_actas": "57,3",
            "candidatos": [
                {"nombre": "PARTIDO A", "votos": "1.234"},
                {"partido": "PARTIDO B", "total": 900},
            ]
        });
        let tally = tally_from_value(&payload).unwrap();
        assert_eq!(tally.actas_pct, 57.3);
        assert_eq!(tally.candidates.len(), 2);
        assert_eq!(tally.candidates[0].votes, 1234);
    }

    #[test]
    fn unwraps_envelope_keys() {
        let payload = json!({
            "data": {
                "results": {
                    "actas_percentage": 80,
                    "candidates": [
                        {"name": "A", "votes": 10},
                        {"name": "B", "votes": 20},
                    ]
                }
            }
        });
        let tally = tally_from_value(&payload).unwrap();
        assert_eq!(tally.actas_pct, 80.0);
        assert_eq!(tally.candidates.len(), 2);
    }

    #[test]
    fn malformed_payload_parses_to_nothing() {
        assert!(tally_from_value(&json!(null)).is_none());
        assert!(tally_from_value(&json!({"status": "pending"})).is_none());
        assert!(tally_from_value(&json!([1, 2, 3])).is_none());
    }

    #[test]
    fn regional_map_reads_department_array() {
        let payload = json!({
            "departamentos": [
                {
                    "nombre": "CORTES",
                    "avance": 45.5,
                    "candidatos": [
                        {"nombre": "A", "votos": 1000},
                        {"nombre": "B", "votos": 500},
                    ]
                },
                {
                    "nombre": "VALLE",
                    "avance": 90,
                    "candidatos": [{"nombre": "A", "votos": 300}]
                }
            ]
        });
        let map = regional_map(&payload);
        assert_eq!(map.len(), 2);
        assert_eq!(map["CORTES"].actas_pct, 45.5);
        assert_eq!(map["VALLE"].candidates.len(), 1);
    }

    #[test]
    fn regional_map_groups_flat_candidate_rows() {
        let payload = json!([
            {"nombre": "A", "votos": 100, "departamento": "CORTES"},
            {"nombre": "B", "votos": 50, "departamento": "CORTES"},
            {"nombre": "A", "votos": 70},
        ]);
        let map = regional_map(&payload);
        assert_eq!(map["CORTES"].candidates.len(), 2);
        assert_eq!(map["Nacional"].candidates.len(), 1);
    }

    #[test]
    fn completion_found_at_depth() {
        let payload = json!({"response": {"resumen": {"avance": "62,5"}}});
        assert_eq!(completion_pct(&payload), Some(62.5));
    }
}
