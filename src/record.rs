//! Image records returned by the API and their on-disk form
//!
//! A record is kept as a raw JSON object so that every field the API sends is written
//! back out unchanged. Only `pid`, `p` and `urls.regular` are looked at.

use crate::error::RecordError;
use serde_json::{Map, Value};

/// Page label used when a record carries no `p` field
pub const MISSING_PAGE: &str = "N/A";

/// One raw image-metadata item from the `data` array
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pid: String,
    page: String,
    regular_url: String,
    fields: Map<String, Value>,
}

impl Record {
    /// Validate one item of the response
    ///
    /// Fails if the item is not an object, has no `pid`, or has no string at
    /// `urls.regular`.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let Value::Object(fields) = value else {
            return Err(RecordError::NotAnObject);
        };

        let pid = fields
            .get("pid")
            .and_then(label)
            .ok_or(RecordError::MissingPid)?;

        let page = fields
            .get("p")
            .and_then(label)
            .unwrap_or_else(|| MISSING_PAGE.to_string());

        let regular_url = fields
            .get("urls")
            .and_then(|urls| urls.get("regular"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RecordError::MissingUrl { pid: pid.clone() })?;

        Ok(Self {
            pid,
            page,
            regular_url,
            fields,
        })
    }

    /// The record's `pid`, as rendered in file names
    pub fn pid(&self) -> &str {
        &self.pid
    }

    /// The record's page index, or [`MISSING_PAGE`]
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Absolute image URL from `urls.regular`
    pub fn regular_url(&self) -> &str {
        &self.regular_url
    }

    /// Add the relative `url` field by removing `host_prefix` from `urls.regular`
    pub fn derive(self, host_prefix: &str) -> DerivedRecord {
        let relative = if host_prefix.is_empty() {
            self.regular_url.clone()
        } else {
            self.regular_url.replace(host_prefix, "")
        };

        let mut fields = self.fields;
        fields.insert("url".to_string(), Value::String(relative));

        DerivedRecord {
            file_name: artifact_file_name(&self.pid, &self.page),
            fields,
        }
    }
}

/// A record with the relative `url` field added, ready to be written
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedRecord {
    file_name: String,
    fields: Map<String, Value>,
}

impl DerivedRecord {
    /// `{pid}_{p}.json`
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The relative image path
    pub fn url(&self) -> Option<&str> {
        self.fields.get("url").and_then(Value::as_str)
    }

    /// All fields, including the pass-through ones
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Compact JSON with non-ASCII characters left as-is
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.fields)
    }
}

/// Name of the artifact file for a `pid`/`p` pair
///
/// Path separators are replaced so the file always lands directly in the output
/// directory (the `N/A` page sentinel becomes `N_A`).
pub fn artifact_file_name(pid: &str, page: &str) -> String {
    format!("{pid}_{page}.json").replace(['/', '\\'], "_")
}

// Strings are used without quotes, numbers and booleans in their JSON form.
// Null counts as absent.
fn label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
