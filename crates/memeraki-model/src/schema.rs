//! Static column schemas for the artist and artform pipelines.
//!
//! Each pipeline reads a CSV file whose header names the columns below. The
//! schema is the single place that knows which columns exist, which are
//! required, and how each raw string is coerced before it becomes part of a
//! document.
//!
//! # Artist columns (`artists` collection)
//!
//! `name`* and `slug`* plus profile, location, analytics and social fields.
//!
//! # Artform columns (`artforms` collection)
//!
//! `name`* and `slug`* plus description, origin, heritage level and sales
//! analytics.
//!
//! Columns marked `*` are required. Both pipelines use `slug` as the natural
//! key for document identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Allowed values for the artform `heritage_level` column.
pub const HERITAGE_LEVELS: &[&str] = &["UNESCO", "National", "State", "Local", "Unrecognized"];

/// The two upload pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Artists,
    Artforms,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 2] = [PipelineKind::Artists, PipelineKind::Artforms];

    /// Collection the pipeline writes to unless configured otherwise.
    #[must_use]
    pub const fn default_collection(self) -> &'static str {
        match self {
            Self::Artists => "artists",
            Self::Artforms => "artforms",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Artists => "Artist",
            Self::Artforms => "Artform",
        }
    }

    #[must_use]
    pub fn schema(self) -> &'static Schema {
        match self {
            Self::Artists => &ARTIST_SCHEMA,
            Self::Artforms => &ARTFORM_SCHEMA,
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_collection())
    }
}

/// How a raw cell is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed free text with control characters stripped.
    Text,
    Integer,
    Float,
    Boolean,
    /// Pipe-separated list of text items.
    List,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    /// One of a fixed set of values, matched case-insensitively.
    Enum(&'static [&'static str]),
}

impl FieldKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Date => "date",
            Self::Enum(_) => "enum",
        }
    }
}

/// A single column of a pipeline schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    const fn required(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: true,
        }
    }
}

/// Column schema of one pipeline.
#[derive(Debug)]
pub struct Schema {
    pub pipeline: PipelineKind,
    pub fields: &'static [FieldSpec],
    /// Fields whose values determine the document identifier.
    pub natural_key: &'static [&'static str],
}

/// Result of comparing a CSV header against a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCheck {
    /// Header columns the schema does not know about.
    pub unknown: Vec<String>,
    /// Required schema columns absent from the header.
    pub missing_required: Vec<&'static str>,
}

impl HeaderCheck {
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.missing_required.is_empty()
    }
}

impl Schema {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|spec| spec.required)
    }

    /// Compare header column names against the schema.
    #[must_use]
    pub fn check_headers(&self, headers: &[String]) -> HeaderCheck {
        let unknown = headers
            .iter()
            .filter(|header| !header.is_empty() && self.field(header).is_none())
            .cloned()
            .collect();
        let missing_required = self
            .required_fields()
            .map(|spec| spec.name)
            .filter(|name| !headers.iter().any(|header| header == name))
            .collect();
        HeaderCheck {
            unknown,
            missing_required,
        }
    }
}

pub static ARTIST_SCHEMA: Schema = Schema {
    pipeline: PipelineKind::Artists,
    fields: &[
        FieldSpec::required("name"),
        FieldSpec::required("slug"),
        FieldSpec::optional("bio", FieldKind::Text),
        FieldSpec::optional("profile_image_url", FieldKind::Text),
        FieldSpec::optional("cover_image_url", FieldKind::Text),
        FieldSpec::optional("city", FieldKind::Text),
        FieldSpec::optional("state", FieldKind::Text),
        FieldSpec::optional("country", FieldKind::Text),
        FieldSpec::optional("language", FieldKind::List),
        FieldSpec::optional("years_of_practice", FieldKind::Integer),
        FieldSpec::optional("art_form_ids", FieldKind::List),
        FieldSpec::optional("specialization", FieldKind::Text),
        FieldSpec::optional("awards", FieldKind::List),
        FieldSpec::optional("highlights", FieldKind::List),
        FieldSpec::optional("is_active", FieldKind::Boolean),
        FieldSpec::optional("total_value_sold", FieldKind::Float),
        FieldSpec::optional("total_units_sold", FieldKind::Integer),
        FieldSpec::optional("last_sale_date", FieldKind::Date),
        FieldSpec::optional("bank_account", FieldKind::Text),
        FieldSpec::optional("instagram_handle", FieldKind::Text),
        FieldSpec::optional("website_url", FieldKind::Text),
        FieldSpec::optional("contact_number", FieldKind::Text),
        FieldSpec::optional("whatsapp_enabled", FieldKind::Boolean),
    ],
    natural_key: &["slug"],
};

pub static ARTFORM_SCHEMA: Schema = Schema {
    pipeline: PipelineKind::Artforms,
    fields: &[
        FieldSpec::required("name"),
        FieldSpec::required("slug"),
        FieldSpec::optional("description", FieldKind::Text),
        FieldSpec::optional("origin_region", FieldKind::List),
        FieldSpec::optional("heritage_level", FieldKind::Enum(HERITAGE_LEVELS)),
        FieldSpec::optional("thumbnail_url", FieldKind::Text),
        FieldSpec::optional("banner_image_url", FieldKind::Text),
        FieldSpec::optional("category", FieldKind::Text),
        FieldSpec::optional("materials_used", FieldKind::List),
        FieldSpec::optional("colours_used", FieldKind::List),
        FieldSpec::optional("related_art_form_ids", FieldKind::List),
        FieldSpec::optional("artist_ids", FieldKind::List),
        FieldSpec::optional("total_value_sold", FieldKind::Float),
        FieldSpec::optional("artist_count", FieldKind::Integer),
        FieldSpec::optional("total_unit_sold", FieldKind::Integer),
    ],
    natural_key: &["slug"],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn natural_keys_are_schema_fields() {
        for pipeline in PipelineKind::ALL {
            let schema = pipeline.schema();
            assert_eq!(schema.pipeline, pipeline);
            for key in schema.natural_key {
                let spec = schema.field(key).expect("natural key in schema");
                assert!(spec.required, "{key} must be required");
            }
        }
    }

    #[test]
    fn check_headers_reports_unknown_and_missing() {
        let check = ARTIST_SCHEMA.check_headers(&headers(&["slug", "bio", "favourite_colour"]));
        assert_eq!(check.unknown, vec!["favourite_colour".to_string()]);
        assert_eq!(check.missing_required, vec!["name"]);
        assert!(!check.is_usable());
    }

    #[test]
    fn check_headers_accepts_required_only() {
        let check = ARTFORM_SCHEMA.check_headers(&headers(&["name", "slug"]));
        assert!(check.is_usable());
        assert!(check.unknown.is_empty());
    }

    #[test]
    fn heritage_level_is_enumerated() {
        let spec = ARTFORM_SCHEMA.field("heritage_level").unwrap();
        assert_eq!(spec.kind, FieldKind::Enum(HERITAGE_LEVELS));
        assert_eq!(spec.kind.label(), "enum");
    }

    #[test]
    fn default_collections() {
        assert_eq!(PipelineKind::Artists.default_collection(), "artists");
        assert_eq!(PipelineKind::Artforms.to_string(), "artforms");
    }
}
