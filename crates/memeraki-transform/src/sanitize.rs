//! Row sanitizer: `RawRow` → `CleanRecord` or `ValidationError`.
//!
//! Every schema field is visited in order and all problems of a row are
//! collected, so one rejection tells the operator everything that is wrong
//! with that line. Columns the schema does not know are ignored here; they
//! are reported once per file by [`Sanitizer::check_headers`].

use memeraki_model::{
    CleanRecord, FieldIssue, FieldKind, FieldSpec, FieldValue, HeaderCheck, IssueKind,
    PipelineKind, RawRow, Schema, ValidationError,
};
use tracing::{trace, warn};

use crate::normalization::boolean::parse_bool;
use crate::normalization::date::parse_iso_date;
use crate::normalization::list::parse_list;
use crate::normalization::numeric::{parse_f64, parse_i64};
use crate::normalization::text::{clean_text, is_absent, match_allowed};

/// Validates and normalizes rows against a fixed pipeline schema.
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer {
    schema: &'static Schema,
}

impl Sanitizer {
    pub fn new(schema: &'static Schema) -> Self {
        Self { schema }
    }

    pub fn for_pipeline(pipeline: PipelineKind) -> Self {
        Self::new(pipeline.schema())
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Compare the source header with the schema, warning about unknown
    /// columns.
    pub fn check_headers(&self, headers: &[String]) -> HeaderCheck {
        let check = self.schema.check_headers(headers);
        for column in &check.unknown {
            warn!(
                pipeline = %self.schema.pipeline,
                column = %column,
                "unknown column in source; values will be ignored"
            );
        }
        check
    }

    /// Sanitize one row.
    pub fn sanitize(&self, row: &RawRow) -> Result<CleanRecord, ValidationError> {
        let mut record = CleanRecord::new(row.line, self.schema.pipeline);
        let mut issues = Vec::new();

        for spec in self.schema.fields {
            match sanitize_field(spec, row.get(spec.name)) {
                Ok(Some(value)) => record.insert(spec.name, value),
                Ok(None) if spec.required => issues.push(FieldIssue::missing(spec.name)),
                Ok(None) => {}
                Err(issue) => issues.push(issue),
            }
        }

        if issues.is_empty() {
            trace!(line = row.line, fields = record.len(), "row accepted");
            Ok(record)
        } else {
            Err(ValidationError {
                line: row.line,
                issues,
            })
        }
    }
}

/// `Ok(None)` means the field is absent after normalization.
fn sanitize_field(spec: &FieldSpec, raw: Option<&str>) -> Result<Option<FieldValue>, FieldIssue> {
    let Some(raw) = raw.filter(|value| !is_absent(value)) else {
        return Ok(None);
    };
    let invalid = |kind: IssueKind| FieldIssue::invalid(spec.name, kind, raw);

    let value = match spec.kind {
        FieldKind::Text => {
            let text = clean_text(raw);
            (!text.is_empty()).then_some(FieldValue::Text(text))
        }
        FieldKind::Integer => Some(FieldValue::Integer(
            parse_i64(raw).ok_or_else(|| invalid(IssueKind::NotInteger))?,
        )),
        FieldKind::Float => Some(FieldValue::Float(
            parse_f64(raw).ok_or_else(|| invalid(IssueKind::NotFloat))?,
        )),
        FieldKind::Boolean => Some(FieldValue::Boolean(
            parse_bool(raw).ok_or_else(|| invalid(IssueKind::NotBoolean))?,
        )),
        FieldKind::Date => Some(FieldValue::Text(
            parse_iso_date(raw).ok_or_else(|| invalid(IssueKind::InvalidDate))?,
        )),
        FieldKind::Enum(allowed) => Some(FieldValue::Text(
            match_allowed(raw, allowed)
                .ok_or_else(|| invalid(IssueKind::NotAllowed { allowed }))?
                .to_string(),
        )),
        FieldKind::List => {
            let items = parse_list(raw);
            (!items.is_empty()).then_some(FieldValue::List(items))
        }
    };
    Ok(value)
}
