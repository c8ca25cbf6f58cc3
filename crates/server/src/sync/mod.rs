//! Reconciliation of derived product data after a product update.
//!
//! Each accepted webhook dispatches one detached task that runs the two
//! reconcilers - collection order and related products - concurrently.
//! The webhook response has already been sent by the time these run, so
//! there is no caller to report to: every failure past this point is
//! logged and swallowed.
//!
//! There is deliberately no per-product serialization. Two overlapping
//! events for the same product may interleave and the last write wins;
//! callers needing strict ordering must serialize upstream.

pub mod collection_order;
pub mod related_products;

use tracing::{error, info_span};
use tracing::Instrument as _;
use volo_sync_core::ProductId;

use crate::shopify::{ShopifyError, SyncClient};
use crate::tenants::Tenant;

/// Kick off reconciliation for one product-update event.
///
/// Returns immediately; the work runs on a detached task. The task itself
/// never fails: each reconciler is wrapped in a log-and-swallow boundary,
/// and a failure in one does not prevent the other from running.
pub fn dispatch(tenant: Tenant, client: SyncClient, product: ProductId) {
    let span = info_span!("reconcile", shop = %tenant.domain, product = %product);

    tokio::spawn(
        async move {
            let order = guard(
                "collection order",
                collection_order::reconcile(&client, product),
            );

            if tenant.related_products_enabled {
                let related = guard(
                    "related products",
                    related_products::reconcile(&client, product),
                );
                tokio::join!(order, related);
            } else {
                order.await;
            }
        }
        .instrument(span),
    );
}

/// Failure boundary around one reconciliation step.
async fn guard<F>(step: &'static str, fut: F)
where
    F: Future<Output = Result<(), ShopifyError>>,
{
    if let Err(error) = fut.await {
        error!(step, %error, "reconciliation step failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_failed_step_does_not_block_sibling() {
        let sibling_ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&sibling_ran);

        let failing = guard("failing step", async {
            Err(ShopifyError::Unauthorized("expired token".to_string()))
        });
        let succeeding = guard("succeeding step", async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        tokio::join!(failing, succeeding);

        assert!(sibling_ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_guard_swallows_errors() {
        // Must not panic or propagate
        guard("step", async {
            Err(ShopifyError::RateLimited(30))
        })
        .await;
    }
}
