//! Explicit index-schema description consumed by the store's index builder.
//!
//! The model declares which fields are indexed and how (exact-match tag,
//! numeric range, full-text, geo-radius); this module turns that declaration
//! into the store's native `FT.CREATE` argument list.

use serde::{Deserialize, Serialize};

/// How a field is indexed in the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Exact-match / membership queries.
    Tag,
    /// Numeric range queries.
    Numeric,
    /// Full-text queries.
    Text,
    /// Geo-radius queries over a `"lon,lat"` coordinate pair.
    Geo,
}

impl FieldKind {
    /// The index-type token used in the store's schema syntax.
    pub fn type_token(&self) -> &'static str {
        match self {
            FieldKind::Tag => "TAG",
            FieldKind::Numeric => "NUMERIC",
            FieldKind::Text => "TEXT",
            FieldKind::Geo => "GEO",
        }
    }
}

/// A single indexed field: the JSON path inside the stored document, the
/// alias it is queried under, and the index kind.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub path: String,
    pub alias: String,
    pub kind: FieldKind,
}

impl FieldSchema {
    pub fn new(path: &str, alias: &str, kind: FieldKind) -> Self {
        Self {
            path: path.to_string(),
            alias: alias.to_string(),
            kind,
        }
    }
}

/// The full index description: index name, storage key prefix, and the
/// indexed fields (including fields cascaded from nested objects).
#[derive(Debug, Clone)]
pub struct IndexSchema {
    pub name: String,
    pub key_prefix: String,
    pub fields: Vec<FieldSchema>,
}

impl IndexSchema {
    /// Look up a field schema by its query alias.
    pub fn field(&self, alias: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.alias == alias)
    }

    /// Render the argument list for `FT.CREATE` (everything after the command
    /// name): `<index> ON JSON PREFIX 1 <prefix> SCHEMA <path> AS <alias> <kind> ...`
    pub fn create_args(&self) -> Vec<String> {
        let mut args = vec![
            self.name.clone(),
            "ON".into(),
            "JSON".into(),
            "PREFIX".into(),
            "1".into(),
            self.key_prefix.clone(),
            "SCHEMA".into(),
        ];
        for field in &self.fields {
            args.push(field.path.clone());
            args.push("AS".into());
            args.push(field.alias.clone());
            args.push(field.kind.type_token().into());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> IndexSchema {
        IndexSchema {
            name: "sample-idx".into(),
            key_prefix: "sample:".into(),
            fields: vec![
                FieldSchema::new("$.name", "name", FieldKind::Tag),
                FieldSchema::new("$.age", "age", FieldKind::Numeric),
                FieldSchema::new("$.bio", "bio", FieldKind::Text),
                FieldSchema::new("$.loc", "loc", FieldKind::Geo),
            ],
        }
    }

    #[test]
    fn test_create_args_shape() {
        let args = sample_schema().create_args();
        assert_eq!(
            args,
            vec![
                "sample-idx", "ON", "JSON", "PREFIX", "1", "sample:", "SCHEMA", "$.name", "AS",
                "name", "TAG", "$.age", "AS", "age", "NUMERIC", "$.bio", "AS", "bio", "TEXT",
                "$.loc", "AS", "loc", "GEO",
            ]
        );
    }

    #[test]
    fn test_field_lookup() {
        let schema = sample_schema();
        assert_eq!(schema.field("age").unwrap().kind, FieldKind::Numeric);
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_type_tokens() {
        assert_eq!(FieldKind::Tag.type_token(), "TAG");
        assert_eq!(FieldKind::Numeric.type_token(), "NUMERIC");
        assert_eq!(FieldKind::Text.type_token(), "TEXT");
        assert_eq!(FieldKind::Geo.type_token(), "GEO");
    }
}
