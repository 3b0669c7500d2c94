//! The Person/Address data model and its declarative index schema.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RolodexError;
use crate::schema::{FieldKind, FieldSchema, IndexSchema};

/// Query aliases for the indexed fields of [`Person`]. Address fields carry
/// an `address_` prefix because they are cascaded one level into the index.
pub mod fields {
    pub const ID: &str = "id";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const AGE: &str = "age";
    pub const PERSONAL_STATEMENT: &str = "personal_statement";
    pub const SKILLS: &str = "skills";
    pub const HOME_LOC: &str = "home_loc";
    pub const ADDRESS_STREET_NUMBER: &str = "address_street_number";
    pub const ADDRESS_UNIT: &str = "address_unit";
    pub const ADDRESS_STREET_NAME: &str = "address_street_name";
    pub const ADDRESS_CITY: &str = "address_city";
    pub const ADDRESS_STATE: &str = "address_state";
    pub const ADDRESS_POSTAL_CODE: &str = "address_postal_code";
    pub const ADDRESS_COUNTRY: &str = "address_country";
    pub const ADDRESS_LOCATION: &str = "address_location";
}

/// A longitude/latitude pair. Stored and transported in the store's native
/// `"lon,lat"` string form so geo-indexed lookups work on the raw document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.longitude, self.latitude)
    }
}

impl FromStr for GeoPoint {
    type Err = RolodexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lon, lat) = s.split_once(',').ok_or_else(|| {
            RolodexError::Validation(format!("invalid geo point {s:?}, expected \"lon,lat\""))
        })?;
        let longitude = lon.trim().parse::<f64>().map_err(|e| {
            RolodexError::Validation(format!("invalid longitude in geo point {s:?}: {e}"))
        })?;
        let latitude = lat.trim().parse::<f64>().map_err(|e| {
            RolodexError::Validation(format!("invalid latitude in geo point {s:?}: {e}"))
        })?;
        Ok(Self {
            longitude,
            latitude,
        })
    }
}

impl Serialize for GeoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// A postal address embedded in a [`Person`]. Owned by its parent record,
/// indexed one cascade level deep, no independent lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// A person record. The id is assigned at insert time and never reassigned;
/// all other fields are mutable in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_statement: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_loc: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// The index schema for [`Person`] documents: every indexed field with its
/// JSON path, query alias, and index kind, including the one-level cascade
/// into the embedded [`Address`].
pub fn person_schema(index_name: &str, key_prefix: &str) -> IndexSchema {
    IndexSchema {
        name: index_name.to_string(),
        key_prefix: key_prefix.to_string(),
        fields: vec![
            FieldSchema::new("$.id", fields::ID, FieldKind::Tag),
            FieldSchema::new("$.first_name", fields::FIRST_NAME, FieldKind::Tag),
            FieldSchema::new("$.last_name", fields::LAST_NAME, FieldKind::Tag),
            FieldSchema::new("$.age", fields::AGE, FieldKind::Numeric),
            FieldSchema::new(
                "$.personal_statement",
                fields::PERSONAL_STATEMENT,
                FieldKind::Text,
            ),
            FieldSchema::new("$.skills[*]", fields::SKILLS, FieldKind::Tag),
            FieldSchema::new("$.home_loc", fields::HOME_LOC, FieldKind::Geo),
            FieldSchema::new(
                "$.address.street_number",
                fields::ADDRESS_STREET_NUMBER,
                FieldKind::Numeric,
            ),
            FieldSchema::new("$.address.unit", fields::ADDRESS_UNIT, FieldKind::Tag),
            FieldSchema::new(
                "$.address.street_name",
                fields::ADDRESS_STREET_NAME,
                FieldKind::Text,
            ),
            FieldSchema::new("$.address.city", fields::ADDRESS_CITY, FieldKind::Tag),
            FieldSchema::new("$.address.state", fields::ADDRESS_STATE, FieldKind::Tag),
            FieldSchema::new(
                "$.address.postal_code",
                fields::ADDRESS_POSTAL_CODE,
                FieldKind::Tag,
            ),
            FieldSchema::new("$.address.country", fields::ADDRESS_COUNTRY, FieldKind::Tag),
            FieldSchema::new(
                "$.address.location",
                fields::ADDRESS_LOCATION,
                FieldKind::Geo,
            ),
        ],
    }
}
