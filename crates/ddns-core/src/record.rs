//! DNS record model and record-identifier resolution
//!
//! The provider's listing is decoded here rather than in the provider crate so that
//! resolution stays a pure function over a fixed listing.

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Status code the provider uses for a successful call
const STATUS_OK: &str = "1";

/// Status code the provider uses for "this domain has no records"
const STATUS_NO_RECORDS: &str = "10";

/// One entry of a record listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Record label
    pub name: String,
    /// Record type ("A", "CNAME", ...)
    #[serde(rename = "type")]
    pub record_type: String,
}

impl DnsRecord {
    /// Create a record snapshot
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            record_type: record_type.into(),
        }
    }

    /// Whether this is an A record
    pub fn is_a_record(&self) -> bool {
        self.record_type == "A"
    }
}

/// Status block attached to every provider reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiStatus {
    #[serde(deserialize_with = "string_or_number")]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// A decoded record listing, in provider order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecordList {
    #[serde(default)]
    pub status: Option<ApiStatus>,
    #[serde(default)]
    pub records: Vec<DnsRecord>,
}

impl RecordList {
    /// Build a listing from records, with no status block
    pub fn from_records(records: Vec<DnsRecord>) -> Self {
        Self {
            status: None,
            records,
        }
    }

    /// Decode a raw listing body.
    ///
    /// A status other than ok or "no records" is surfaced as a provider error.
    pub fn from_json(raw: &str) -> Result<Self> {
        let list: RecordList = serde_json::from_str(raw)?;

        if let Some(status) = &list.status
            && status.code != STATUS_OK
            && status.code != STATUS_NO_RECORDS
        {
            return Err(Error::provider(
                "dnspod",
                format!("{} (code {})", status.message, status.code),
            ));
        }

        Ok(list)
    }

    /// Find the identifier of the A record named `record`.
    ///
    /// The first entry with a matching name decides: it must be an A record, later
    /// entries with the same name are never considered.
    pub fn find_record_id(&self, record: &str, domain: &str) -> Result<String> {
        match self.records.iter().find(|r| r.name == record) {
            Some(found) if found.is_a_record() => Ok(found.id.clone()),
            Some(found) => Err(Error::type_mismatch(&found.name, &found.record_type)),
            None => Err(Error::record_not_found(record, domain)),
        }
    }
}

/// Canonical form of a plain-text lookup body
pub fn normalize_lookup_body(body: &str) -> String {
    body.trim().to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_padded_lookup_body() {
        assert_eq!(normalize_lookup_body("  1.2.3.4\n"), "1.2.3.4");
        assert_eq!(normalize_lookup_body("1.2.3.4"), "1.2.3.4");
        assert_eq!(normalize_lookup_body("\r\n"), "");
    }

    #[test]
    fn decodes_provider_listing() {
        let raw = r#"{
            "status": {"code": "1", "message": "Action completed successful"},
            "domain": {"id": 1, "name": "example.com"},
            "records": [
                {"id": "42", "name": "test", "type": "A", "value": "1.1.1.1", "line_id": "0"},
                {"id": 43, "name": "www", "type": "CNAME", "value": "example.com."}
            ]
        }"#;

        let list = RecordList::from_json(raw).unwrap();
        assert_eq!(list.records.len(), 2);
        assert_eq!(list.records[0], DnsRecord::new("42", "test", "A"));
        assert_eq!(list.records[1].id, "43");
    }

    #[test]
    fn missing_records_is_empty_listing() {
        let list = RecordList::from_json(r#"{"status": {"code": "10", "message": "No records"}}"#)
            .unwrap();
        assert!(list.records.is_empty());
        assert!(matches!(
            list.find_record_id("test", "example.com"),
            Err(Error::RecordNotFound { .. })
        ));
    }

    #[test]
    fn failed_status_is_provider_error() {
        let raw = r#"{"status": {"code": "-1", "message": "Login failed"}}"#;
        match RecordList::from_json(raw) {
            Err(Error::Provider { message, .. }) => assert!(message.contains("Login failed")),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn garbage_body_is_json_error() {
        assert!(matches!(
            RecordList::from_json("<html>502</html>"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn first_matching_name_wins() {
        let list = RecordList::from_records(vec![
            DnsRecord::new("7", "test", "A"),
            DnsRecord::new("8", "test", "A"),
        ]);
        assert_eq!(list.find_record_id("test", "example.com").unwrap(), "7");

        let list = RecordList::from_records(vec![
            DnsRecord::new("1", "test", "TXT"),
            DnsRecord::new("2", "test", "A"),
        ]);
        assert!(matches!(
            list.find_record_id("test", "example.com"),
            Err(Error::RecordTypeMismatch { .. })
        ));
    }
}
