//! Document-store vocabulary shared by every storage backend.
//!
//! A [`Document`] is a JSON object. Every document the application writes
//! carries a string `id` and an RFC 3339 `createdAt`; backends rely on both.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Identifier some document databases add on their own; never trusted from clients.
pub const INTERNAL_ID_FIELD: &str = "_id";

/// One collection per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Testimonials,
    Orders,
    Retailers,
    CampusInvites,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Testimonials,
        Collection::Orders,
        Collection::Retailers,
        Collection::CampusInvites,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Testimonials => "testimonials",
            Collection::Orders => "orders",
            Collection::Retailers => "retailers",
            Collection::CampusInvites => "campus_invites",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<prefix>-<uuid v4>`; independent of clock resolution.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

/// Millisecond-precision UTC timestamp, the format written into `createdAt`.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `#[serde(with = "document::millis")]` for `createdAt` fields, so API
/// responses and stored documents carry the same text.
pub mod millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::timestamp(*at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

pub fn id_of(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

pub fn created_at_of(doc: &Document) -> Option<DateTime<Utc>> {
    doc.get(CREATED_AT_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Shallow merge with `$set` semantics: top-level keys of `patch` replace
/// the document's.
pub fn merge(doc: &mut Document, patch: Document) {
    for (k, v) in patch {
        doc.insert(k, v);
    }
}

/// Byte comparison whose running time depends only on the lengths.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Clone)]
pub struct Clause {
    pub field: String,
    pub value: Value,
    /// Compared in constant time by in-process backends and never logged.
    pub secret: bool,
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value: &dyn fmt::Debug = if self.secret { &"***" } else { &self.value };
        f.debug_struct("Clause").field("field", &self.field).field("value", value).finish()
    }
}

impl Clause {
    fn matches(&self, doc: &Document) -> bool {
        let Some(stored) = doc.get(&self.field) else { return false };
        if self.secret {
            return match (stored.as_str(), self.value.as_str()) {
                (Some(a), Some(b)) => constant_time_eq(a.as_bytes(), b.as_bytes()),
                _ => false,
            };
        }
        stored == &self.value
    }
}

/// Conjunction of field-equality clauses.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq(ID_FIELD, id.into())
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause { field: field.into(), value: value.into(), secret: false });
        self
    }

    pub fn eq_secret(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push(Clause { field: field.into(), value: Value::String(value.into()), secret: true });
        self
    }

    /// An empty filter matches every document.
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|c| c.matches(doc))
    }

    /// The filter as a JSON object, suitable for JSONB containment (`@>`).
    pub fn to_json(&self) -> Value {
        let map: Document = self
            .clauses
            .iter()
            .map(|c| (c.field.clone(), c.value.clone()))
            .collect();
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn filter_requires_every_clause() {
        let d = doc(json!({"id": "t-1", "editToken": "abc", "rating": 5}));
        assert!(Filter::by_id("t-1").matches(&d));
        assert!(Filter::by_id("t-1").eq_secret("editToken", "abc").matches(&d));
        assert!(!Filter::by_id("t-1").eq_secret("editToken", "abd").matches(&d));
        assert!(!Filter::by_id("t-2").eq_secret("editToken", "abc").matches(&d));
        assert!(!Filter::by_id("t-1").eq_secret("editToken", "").matches(&d));
        assert!(Filter::new().matches(&d));
    }

    #[test]
    fn secret_clause_never_matches_missing_or_non_string_field() {
        let legacy = doc(json!({"id": "t-1"}));
        assert!(!Filter::by_id("t-1").eq_secret("editToken", "").matches(&legacy));
        let odd = doc(json!({"id": "t-1", "editToken": 7}));
        assert!(!Filter::by_id("t-1").eq_secret("editToken", "7").matches(&odd));
    }

    #[test]
    fn secret_clause_is_redacted_in_debug() {
        let f = Filter::by_id("t-1").eq_secret("editToken", "super-secret");
        let dbg = format!("{f:?}");
        assert!(dbg.contains("t-1"));
        assert!(!dbg.contains("super-secret"));
    }

    #[test]
    fn merge_replaces_top_level_keys_only() {
        let mut d = doc(json!({"id": "x", "name": "a", "media": [{"type": "image", "url": "/uploads/a.png"}]}));
        merge(&mut d, doc(json!({"name": "b", "media": []})));
        assert_eq!(d["id"], "x");
        assert_eq!(d["name"], "b");
        assert_eq!(d["media"], json!([]));
    }

    #[test]
    fn constant_time_eq_behaves_like_eq() {
        assert!(constant_time_eq(b"token", b"token"));
        assert!(!constant_time_eq(b"token", b"tokeN"));
        assert!(!constant_time_eq(b"token", b"token2"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn ids_are_prefixed_and_unique() {
        let a = new_id("order");
        let b = new_id("order");
        assert!(a.starts_with("order-"));
        assert_ne!(a, b);
    }

    #[test]
    fn millis_serializes_like_stored_timestamps() {
        #[derive(serde::Serialize)]
        struct Stamped {
            #[serde(with = "super::millis")]
            at: DateTime<Utc>,
        }
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:20:30.123456789Z").unwrap().with_timezone(&Utc);
        let v = serde_json::to_value(Stamped { at }).unwrap();
        assert_eq!(v["at"], "2024-05-01T10:20:30.123Z");
        assert_eq!(v["at"], timestamp(at));
    }

    #[test]
    fn created_at_round_trips_through_timestamp() {
        let now = Utc::now();
        let d = doc(json!({"createdAt": timestamp(now)}));
        let parsed = created_at_of(&d).unwrap();
        assert_eq!(parsed.timestamp_millis(), now.timestamp_millis());
        assert!(created_at_of(&doc(json!({"createdAt": "yesterday"}))).is_none());
    }
}
