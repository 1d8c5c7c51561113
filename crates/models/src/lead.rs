//! Append-only lead records: orders, retailer enquiries and campus invites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{self, Collection, Document, CREATED_AT_FIELD, ID_FIELD, INTERNAL_ID_FIELD};
use crate::errors::ModelError;

pub const ORDER_STATUS_RECEIVED: &str = "received";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadKind {
    Order,
    RetailerEnquiry,
    CampusInvite,
}

impl LeadKind {
    pub fn collection(self) -> Collection {
        match self {
            LeadKind::Order => Collection::Orders,
            LeadKind::RetailerEnquiry => Collection::Retailers,
            LeadKind::CampusInvite => Collection::CampusInvites,
        }
    }

    pub fn id_prefix(self) -> &'static str {
        match self {
            LeadKind::Order => "order",
            LeadKind::RetailerEnquiry => "retailer",
            LeadKind::CampusInvite => "campus-invite",
        }
    }

    /// Response key wrapping one record.
    pub fn singular(self) -> &'static str {
        match self {
            LeadKind::Order => "order",
            LeadKind::RetailerEnquiry => "enquiry",
            LeadKind::CampusInvite => "invite",
        }
    }

    /// Response key wrapping a list.
    pub fn plural(self) -> &'static str {
        match self {
            LeadKind::Order => "orders",
            LeadKind::RetailerEnquiry => "enquiries",
            LeadKind::CampusInvite => "invites",
        }
    }

    /// Build the document to insert from a submitted JSON object.
    pub fn build_record(self, body: Document) -> Result<Document, ModelError> {
        match self {
            LeadKind::Order => Ok(passthrough(self, body, Some(ORDER_STATUS_RECEIVED))),
            LeadKind::RetailerEnquiry => Ok(passthrough(self, body, None)),
            LeadKind::CampusInvite => CampusInvite::from_submission(&body)?.to_document(),
        }
    }
}

/// Keep whatever the client sent, trimmed, under server-generated identity.
fn passthrough(kind: LeadKind, body: Document, status: Option<&str>) -> Document {
    let mut record: Document = body
        .into_iter()
        .filter(|(k, _)| k != ID_FIELD && k != CREATED_AT_FIELD && k != INTERNAL_ID_FIELD)
        .map(|(k, v)| match v {
            Value::String(s) => (k, Value::String(s.trim().to_string())),
            other => (k, other),
        })
        .collect();
    record.insert(ID_FIELD.into(), Value::String(document::new_id(kind.id_prefix())));
    record.insert(CREATED_AT_FIELD.into(), Value::String(document::timestamp(Utc::now())));
    // a client-sent status wins; missing, null or blank falls back to the default
    if let Some(status) = status {
        let sent = match record.get("status") {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };
        if !sent {
            record.insert("status".into(), Value::String(status.into()));
        }
    }
    record
}

/// Scalar form field as trimmed text; numbers and booleans are stringified.
fn field_text(body: &Document, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn required(body: &Document, key: &str) -> Result<String, ModelError> {
    match field_text(body, key) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ModelError::missing(key)),
    }
}

/// Request for an on-campus awareness session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusInvite {
    pub id: String,
    #[serde(with = "document::millis")]
    pub created_at: DateTime<Utc>,
    pub campus_name: String,
    pub city_state: String,
    pub contact_name: String,
    pub contact_role: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub preferred_month: String,
    pub campus_note: String,
}

impl CampusInvite {
    /// Checked in this order; the first missing one is reported.
    pub const REQUIRED_FIELDS: [&'static str; 5] =
        ["campusName", "cityState", "contactName", "contactEmail", "contactPhone"];

    pub fn from_submission(body: &Document) -> Result<Self, ModelError> {
        for field in Self::REQUIRED_FIELDS {
            required(body, field)?;
        }
        let optional = |key: &str| field_text(body, key).unwrap_or_default();
        Ok(Self {
            id: document::new_id(LeadKind::CampusInvite.id_prefix()),
            created_at: Utc::now(),
            campus_name: required(body, "campusName")?,
            city_state: required(body, "cityState")?,
            contact_name: required(body, "contactName")?,
            contact_role: optional("contactRole"),
            contact_email: required(body, "contactEmail")?,
            contact_phone: required(body, "contactPhone")?,
            preferred_month: optional("preferredMonth"),
            campus_note: optional("campusNote"),
        })
    }

    pub fn to_document(&self) -> Result<Document, ModelError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ModelError::Validation("campus invite did not serialize to an object".into())),
            Err(e) => Err(ModelError::Validation(e.to_string())),
        }
    }
}
