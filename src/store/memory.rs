//! In-process store backend.
//!
//! Evaluates the same predicate combinators the Redis backend sends to
//! RediSearch, against documents held in a map. Field aliases resolve
//! through the declared index schema's JSON paths, so a field that is not in
//! the schema is not queryable here either. Backs the test suite.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::error::{Result, RolodexError};
use crate::model::{GeoPoint, Person};
use crate::query::Predicate;
use crate::schema::IndexSchema;

// Mean earth radius used by Redis's geo commands.
const EARTH_RADIUS_M: f64 = 6_372_797.560856;

#[derive(Debug, Default)]
struct Inner {
    people: BTreeMap<String, Person>,
    indexes: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    schema: Arc<IndexSchema>,
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new(schema: Arc<IndexSchema>) -> Self {
        Self {
            schema,
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    pub fn put(&self, id: &str, person: &Person) -> Result<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.people.insert(id.to_string(), person.clone());
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Person> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.people.get(id).cloned()
    }

    pub fn delete(&self, id: &str) {
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.people.remove(id);
    }

    pub fn search(&self, predicate: &Predicate, limit: usize) -> Result<Vec<Person>> {
        let inner = self.inner.read().expect("store lock poisoned");
        let mut matches = Vec::new();
        for person in inner.people.values() {
            let doc = serde_json::to_value(person)?;
            if matches_predicate(&self.schema, predicate, &doc) {
                matches.push(person.clone());
                if matches.len() >= limit {
                    break;
                }
            }
        }
        Ok(matches)
    }

    pub fn list_index_names(&self) -> Vec<String> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.indexes.iter().cloned().collect()
    }

    pub fn create_index(&self, schema: &IndexSchema) -> Result<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if !inner.indexes.insert(schema.name.clone()) {
            return Err(RolodexError::Query(format!(
                "index already exists: {}",
                schema.name
            )));
        }
        Ok(())
    }
}

/// Evaluate a predicate against a stored document.
fn matches_predicate(schema: &IndexSchema, predicate: &Predicate, doc: &Value) -> bool {
    match predicate {
        // Tag matching is case-insensitive, as in the indexed store's
        // default tag configuration. On array fields this is membership.
        Predicate::Tag { field, value } => resolve(schema, field, doc)
            .iter()
            .any(|v| v.as_str().is_some_and(|s| s.eq_ignore_ascii_case(value))),

        // Both bounds are inclusive.
        Predicate::NumericRange { field, min, max } => resolve(schema, field, doc)
            .iter()
            .any(|v| v.as_f64().is_some_and(|n| n >= *min && n <= *max)),

        // Every query token must occur in the field's token set.
        Predicate::Text { field, query } => {
            let needles = tokenize(query);
            if needles.is_empty() {
                return false;
            }
            resolve(schema, field, doc).iter().any(|v| {
                v.as_str().is_some_and(|text| {
                    let haystack = tokenize(text);
                    needles.iter().all(|t| haystack.contains(t))
                })
            })
        }

        // A point exactly on the circle counts as inside.
        Predicate::GeoRadius {
            field,
            longitude,
            latitude,
            radius,
            unit,
        } => {
            let center = GeoPoint::new(*longitude, *latitude);
            let radius_m = unit.to_meters(*radius);
            resolve(schema, field, doc).iter().any(|v| {
                v.as_str()
                    .and_then(|s| s.parse::<GeoPoint>().ok())
                    .is_some_and(|point| haversine_m(&center, &point) <= radius_m)
            })
        }

        Predicate::And(parts) => parts.iter().all(|p| matches_predicate(schema, p, doc)),

        Predicate::Or(parts) => parts.iter().any(|p| matches_predicate(schema, p, doc)),
    }
}

/// Resolve a field alias to its values in the document by walking the
/// schema's JSON path. A trailing `[*]` segment expands array elements.
fn resolve<'a>(schema: &IndexSchema, alias: &str, doc: &'a Value) -> Vec<&'a Value> {
    let Some(field) = schema.field(alias) else {
        return Vec::new();
    };
    let Some(path) = field.path.strip_prefix("$.") else {
        return Vec::new();
    };

    let mut current = vec![doc];
    for segment in path.split('.') {
        let (name, expand) = match segment.strip_suffix("[*]") {
            Some(name) => (name, true),
            None => (segment, false),
        };
        let mut next = Vec::new();
        for value in current {
            let Some(child) = value.get(name) else {
                continue;
            };
            if expand {
                if let Some(items) = child.as_array() {
                    next.extend(items);
                }
            } else {
                next.push(child);
            }
        }
        current = next;
    }
    current
}

fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Great-circle distance in meters.
fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
