//! Storefront checkout: a validated order built from the shop form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{self, Document};
use crate::errors::ModelError;
use crate::lead::{LeadKind, ORDER_STATUS_RECEIVED};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    Online,
}

impl PaymentMethod {
    fn parse(raw: &str) -> Result<Self, ModelError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cod" => Ok(Self::Cod),
            "online" => Ok(Self::Online),
            _ => Err(ModelError::invalid("paymentMethod", "must be cod or online")),
        }
    }
}

/// What the shop sells; comes from configuration, never from the request.
#[derive(Clone, Debug)]
pub struct Catalogue {
    pub product: String,
    pub price: u32,
    pub currency: String,
    pub sizes: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CustomerInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// `POST /checkout` body.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub size: Option<String>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub customer: CustomerInput,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub id: String,
    #[serde(with = "document::millis")]
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub product: String,
    pub size: String,
    pub price: u32,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub customer: Customer,
}

fn required(value: Option<String>, field: &str) -> Result<String, ModelError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ModelError::missing(field)),
    }
}

impl CheckoutRequest {
    pub fn into_order(self, catalogue: &Catalogue) -> Result<PlacedOrder, ModelError> {
        let customer = Customer {
            name: required(self.customer.name, "customer.name")?,
            phone: required(self.customer.phone, "customer.phone")?,
            address: required(self.customer.address, "customer.address")?,
        };
        let size = match self.size.as_deref().map(str::trim) {
            None | Some("") => catalogue
                .sizes
                .first()
                .cloned()
                .ok_or_else(|| ModelError::Validation("no sizes configured".into()))?,
            Some(s) => catalogue
                .sizes
                .iter()
                .find(|known| known.eq_ignore_ascii_case(s))
                .cloned()
                .ok_or_else(|| ModelError::invalid("size", format!("must be one of {}", catalogue.sizes.join(", "))))?,
        };
        let payment_method = match self.payment_method.as_deref() {
            None => PaymentMethod::default(),
            Some(raw) => PaymentMethod::parse(raw)?,
        };
        Ok(PlacedOrder {
            id: document::new_id(LeadKind::Order.id_prefix()),
            created_at: Utc::now(),
            status: ORDER_STATUS_RECEIVED.into(),
            product: catalogue.product.clone(),
            size,
            price: catalogue.price,
            currency: catalogue.currency.clone(),
            payment_method,
            customer,
        })
    }
}

impl PlacedOrder {
    pub fn to_document(&self) -> Result<Document, ModelError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ModelError::Validation("order did not serialize to an object".into())),
            Err(e) => Err(ModelError::Validation(e.to_string())),
        }
    }
}
