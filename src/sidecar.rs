//! Sidecar documents: a JSON array of (mostly single-key) objects.
//!
//! Only `sort` and `signature_id` are decoded; every other entry is carried
//! through untouched when the document is rewritten.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};

use crate::constants::sidecar::{DEFAULT_SORT, WRITE_INDENT};
use crate::errors::{ParseError, SignatureError};
use crate::metadata::{FIELD_SIGNATURE_ID, FIELD_SORT, FieldKey};

/// Fields decoded from a sidecar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidecarFields {
    /// Tie-break within a model level; `1` when absent.
    pub sort: i64,
    /// Stored resolved signature; empty when absent.
    pub signature_id: String,
}

impl Default for SidecarFields {
    fn default() -> Self {
        Self {
            sort: DEFAULT_SORT,
            signature_id: String::new(),
        }
    }
}

/// A loaded sidecar document.
#[derive(Clone, Debug)]
pub struct SidecarDocument {
    path: PathBuf,
    entries: Vec<Map<String, Value>>,
}

impl SidecarDocument {
    /// Read and parse the sidecar at `path`.
    pub fn read(path: impl Into<PathBuf>) -> Result<Self, SignatureError> {
        let path = path.into();
        let text = fs::read_to_string(&path)?;
        Ok(Self::parse(path, &text)?)
    }

    /// Parse sidecar text; `path` is only used for error reporting and writes.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self, ParseError> {
        let path = path.into();
        let value: Value = serde_json::from_str(text).map_err(|err| malformed(&path, err))?;
        let Value::Array(items) = value else {
            return Err(malformed(&path, "top level is not an array"));
        };
        let mut entries = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(entry) => entries.push(entry),
                other => {
                    return Err(malformed(
                        &path,
                        format!("entry {idx} is not an object: {other}"),
                    ));
                }
            }
        }
        Ok(Self { path, entries })
    }

    /// Location the document was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value of the first entry keyed by `key`.
    pub fn get(&self, key: FieldKey) -> Option<&Value> {
        self.entries.iter().find_map(|entry| key.value_in(entry))
    }

    /// Replace the entry keyed by `key`, appending one if none exists.
    pub fn set(&mut self, key: FieldKey, value: Value) {
        let existing = self
            .entries
            .iter_mut()
            .find(|entry| key.value_in(entry).is_some());
        match existing {
            Some(entry) => {
                entry.insert(key.as_str().to_string(), value);
            }
            None => self.entries.push(key.entry(value)),
        }
    }

    /// Decode the whitelisted fields, applying defaults.
    pub fn fields(&self) -> Result<SidecarFields, ParseError> {
        let mut fields = SidecarFields::default();
        if let Some(value) = self.get(FIELD_SORT)
            && let Some(sort) = coerce_sort(value, &self.path)?
        {
            fields.sort = sort;
        }
        if let Some(value) = self.get(FIELD_SIGNATURE_ID) {
            fields.signature_id = match value {
                Value::Null => String::new(),
                Value::String(text) => text.clone(),
                other => {
                    return Err(malformed(
                        &self.path,
                        format!("signature_id must be a string, found {other}"),
                    ));
                }
            };
        }
        Ok(fields)
    }

    /// Stored `signature_id`, or empty when absent.
    pub fn signature_id(&self) -> Result<String, ParseError> {
        Ok(self.fields()?.signature_id)
    }

    /// Set the `signature_id` entry.
    pub fn set_signature_id(&mut self, signature_id: &str) {
        self.set(FIELD_SIGNATURE_ID, Value::String(signature_id.to_string()));
    }

    /// Render the document with four-space indentation.
    pub fn to_json_string(&self) -> Result<String, ParseError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(WRITE_INDENT);
        let mut serializer = Serializer::with_formatter(&mut buf, formatter);
        self.entries
            .serialize(&mut serializer)
            .map_err(|err| malformed(&self.path, err))?;
        let mut text = String::from_utf8(buf).map_err(|err| malformed(&self.path, err))?;
        text.push('\n');
        Ok(text)
    }

    /// Write the document back to its path.
    pub fn write(&self) -> Result<(), SignatureError> {
        let text = self.to_json_string()?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Coerce a `sort` value to an integer; `None` means "use the default".
fn coerce_sort(value: &Value, path: &Path) -> Result<Option<i64>, ParseError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => {
            if let Some(sort) = number.as_i64() {
                return Ok(Some(sort));
            }
            match number.as_f64() {
                Some(float)
                    if number.is_f64()
                        && float.is_finite()
                        && float >= i64::MIN as f64
                        && float < i64::MAX as f64 =>
                {
                    Ok(Some(float.trunc() as i64))
                }
                _ => Err(malformed(
                    path,
                    format!("sort {number} is out of the integer range"),
                )),
            }
        }
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| malformed(path, format!("sort '{text}' is not an integer"))),
        other => Err(malformed(path, format!("sort must be a number, found {other}"))),
    }
}

fn malformed(path: &Path, reason: impl ToString) -> ParseError {
    ParseError::Sidecar {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn doc(text: &str) -> SidecarDocument {
        SidecarDocument::parse("entity.json", text).unwrap()
    }

    #[test]
    fn decodes_whitelisted_fields_and_ignores_others() {
        let document = doc(
            r#"[
                {"application": "ddr-cmdln", "commit": "abc"},
                {"id": "ddr-densho-10-1"},
                {"title": "Letters"},
                {"sort": "3"},
                {"signature_id": "ddr-densho-10-1-master-a1b2c3d4e5"}
            ]"#,
        );
        assert_eq!(
            document.fields().unwrap(),
            SidecarFields {
                sort: 3,
                signature_id: "ddr-densho-10-1-master-a1b2c3d4e5".to_string(),
            }
        );
    }

    #[test]
    fn missing_or_empty_fields_use_defaults() {
        assert_eq!(doc("[]").fields().unwrap(), SidecarFields::default());
        let document = doc(r#"[{"sort": null}, {"signature_id": null}]"#);
        assert_eq!(document.fields().unwrap(), SidecarFields::default());
        let document = doc(r#"[{"sort": ""}]"#);
        assert_eq!(document.fields().unwrap().sort, 1);
    }

    #[test]
    fn float_sort_is_truncated() {
        assert_eq!(doc(r#"[{"sort": 4.7}]"#).fields().unwrap().sort, 4);
    }

    #[test]
    fn sort_outside_integer_range_is_rejected() {
        for text in [
            r#"[{"sort": 18446744073709551615}]"#,
            r#"[{"sort": 9223372036854775808}]"#,
            r#"[{"sort": 1e300}]"#,
            r#"[{"sort": -1e300}]"#,
        ] {
            let err = doc(text).fields().unwrap_err();
            assert!(matches!(err, ParseError::Sidecar { .. }), "{text}");
        }
        let sort = doc(r#"[{"sort": 9223372036854775807}]"#).fields().unwrap().sort;
        assert_eq!(sort, i64::MAX);
    }

    #[test]
    fn uncoercible_fields_are_parse_errors() {
        for text in [
            r#"[{"sort": "first"}]"#,
            r#"[{"sort": [1]}]"#,
            r#"[{"signature_id": 12}]"#,
        ] {
            let err = doc(text).fields().unwrap_err();
            assert!(matches!(err, ParseError::Sidecar { .. }), "{text}");
        }
    }

    #[test]
    fn malformed_documents_are_parse_errors() {
        for text in ["{", r#"{"sort": 1}"#, r#"[{"sort": 1}, 5]"#] {
            let err = SidecarDocument::parse("entity.json", text).unwrap_err();
            assert!(matches!(err, ParseError::Sidecar { .. }), "{text}");
        }
    }

    #[test]
    fn set_replaces_existing_entry_in_place() {
        let mut document = doc(r#"[{"id": "x"}, {"signature_id": "old"}, {"sort": 2}]"#);
        document.set_signature_id("new");
        let text = document.to_json_string().unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!([{"id": "x"}, {"signature_id": "new"}, {"sort": 2}])
        );
    }

    #[test]
    fn set_appends_missing_entry() {
        let mut document = doc(r#"[{"id": "x"}]"#);
        document.set_signature_id("new");
        assert_eq!(document.signature_id().unwrap(), "new");
        let value: Value = serde_json::from_str(&document.to_json_string().unwrap()).unwrap();
        assert_eq!(value, json!([{"id": "x"}, {"signature_id": "new"}]));
    }

    #[test]
    fn rendering_keeps_key_order_and_uses_four_spaces() {
        let document = doc(r#"[{"zeta": 1, "alpha": 2}]"#);
        let text = document.to_json_string().unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
        assert!(text.contains("\n        \"zeta\""));
    }

    #[test]
    fn write_then_read_keeps_fields() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("entity.json");
        fs::write(&path, r#"[{"id": "ddr-densho-10-1"}, {"sort": 2}]"#).unwrap();

        let mut document = SidecarDocument::read(&path).unwrap();
        document.set_signature_id("ddr-densho-10-1-master-a1b2c3d4e5");
        document.write().unwrap();

        let reread = SidecarDocument::read(&path).unwrap();
        assert_eq!(reread.fields().unwrap().sort, 2);
        assert_eq!(
            reread.signature_id().unwrap(),
            "ddr-densho-10-1-master-a1b2c3d4e5"
        );
    }
}
