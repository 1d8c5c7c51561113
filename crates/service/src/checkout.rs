use std::sync::Arc;

use configs::ShopConfig;
use models::checkout::{Catalogue, CheckoutRequest, PlacedOrder};
use models::lead::LeadKind;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::errors::ServiceError;
use crate::metrics;
use crate::storage::DocumentStore;

pub fn catalogue_from(shop: &ShopConfig) -> Catalogue {
    Catalogue {
        product: shop.product.clone(),
        price: shop.price,
        currency: shop.currency.clone(),
        sizes: shop.sizes.clone(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order: PlacedOrder,
    /// False when the order was accepted but could not be written.
    pub persisted: bool,
}

/// Storefront checkout. Persistence is best effort: the shopper is never
/// shown a failure because the store was unavailable.
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn DocumentStore>,
    catalogue: Arc<Catalogue>,
}

impl CheckoutService {
    pub fn new(store: Arc<dyn DocumentStore>, catalogue: Catalogue) -> Self {
        Self { store, catalogue: Arc::new(catalogue) }
    }

    #[instrument(skip_all)]
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<CheckoutReceipt, ServiceError> {
        let order = request.into_order(&self.catalogue)?;
        let persisted = match self.persist(&order).await {
            Ok(()) => {
                metrics::LEADS_CREATED_TOTAL.with_label_values(&[LeadKind::Order.singular()]).inc();
                true
            }
            Err(e) => {
                metrics::BEST_EFFORT_FAILURES_TOTAL.inc();
                error!(id = %order.id, error = %e, "order not persisted; continuing checkout");
                false
            }
        };
        info!(id = %order.id, size = %order.size, persisted, "checkout completed");
        Ok(CheckoutReceipt { order, persisted })
    }

    async fn persist(&self, order: &PlacedOrder) -> Result<(), ServiceError> {
        let doc = order.to_document()?;
        self.store.insert(LeadKind::Order.collection(), doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_store;
    use async_trait::async_trait;
    use models::checkout::CustomerInput;
    use models::document::{Collection, Document, Filter};

    struct Unavailable;

    #[async_trait]
    impl DocumentStore for Unavailable {
        fn backend(&self) -> &'static str {
            "unavailable"
        }
        async fn insert(&self, _: Collection, _: Document) -> Result<(), ServiceError> {
            Err(ServiceError::Db("connection refused".into()))
        }
        async fn find_all(&self, _: Collection) -> Result<Vec<Document>, ServiceError> {
            Err(ServiceError::Db("connection refused".into()))
        }
        async fn find_one_and_update(&self, _: Collection, _: &Filter, _: Document) -> Result<Option<Document>, ServiceError> {
            Err(ServiceError::Db("connection refused".into()))
        }
        async fn delete_one(&self, _: Collection, _: &Filter) -> Result<u64, ServiceError> {
            Err(ServiceError::Db("connection refused".into()))
        }
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            size: Some("XXL".into()),
            payment_method: None,
            customer: CustomerInput {
                name: Some("Riya".into()),
                phone: Some("98765 43210".into()),
                address: Some("12 MG Road, Pune".into()),
            },
        }
    }

    #[tokio::test]
    async fn order_is_persisted_with_configured_price() -> Result<(), anyhow::Error> {
        let store = memory_store();
        let svc = CheckoutService::new(store.clone(), catalogue_from(&ShopConfig::default()));
        let receipt = svc.place_order(request()).await?;
        assert!(receipt.persisted);
        assert_eq!(receipt.order.price, 199);

        let orders = store.find_all(Collection::Orders).await?;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["id"], serde_json::json!(receipt.order.id));
        assert_eq!(orders[0]["size"], "XXL");
        Ok(())
    }

    #[tokio::test]
    async fn storage_failure_does_not_fail_checkout() -> Result<(), anyhow::Error> {
        let svc = CheckoutService::new(Arc::new(Unavailable), catalogue_from(&ShopConfig::default()));
        let receipt = svc.place_order(request()).await?;
        assert!(!receipt.persisted);
        assert!(receipt.order.id.starts_with("order-"));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_form_is_still_an_error() {
        let svc = CheckoutService::new(memory_store(), catalogue_from(&ShopConfig::default()));
        let mut r = request();
        r.customer.phone = None;
        assert!(matches!(svc.place_order(r).await, Err(ServiceError::Model(_))));
    }
}
