//! Collection order reconciliation.
//!
//! Each member product of a custom collection carries a numeric
//! `product_order` metafield. The collection's manual order must follow
//! those values; this module computes the desired order and issues a
//! reorder mutation only when the platform's current order differs.

use tracing::{debug, error, info, instrument};
use volo_sync_core::ProductId;

use crate::shopify::types::{CollectionMember, ReorderMove};
use crate::shopify::{ShopifyError, SyncClient};

/// Parse a member's order value; missing or non-numeric values sort as 0.
fn order_value(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(0)
}

/// Compute the move list that brings a collection into its desired order.
///
/// Members are stable-sorted by order value ascending, so ties keep their
/// fetch order - repeated runs over partially tied values converge instead
/// of oscillating. Positions are 1-based over the full member list.
///
/// Returns `None` when the desired id sequence already equals the fetch
/// order: an unchanged collection must produce zero mutations.
#[must_use]
pub fn plan_reorder(members: &[CollectionMember]) -> Option<Vec<ReorderMove>> {
    let mut desired: Vec<&CollectionMember> = members.iter().collect();
    desired.sort_by_key(|m| order_value(m.order_value.as_deref()));

    let unchanged = desired
        .iter()
        .zip(members)
        .all(|(want, have)| want.id == have.id);
    if unchanged {
        return None;
    }

    Some(
        desired
            .iter()
            .enumerate()
            .map(|(idx, member)| ReorderMove {
                id: member.id.clone(),
                new_position: (idx + 1).to_string(),
            })
            .collect(),
    )
}

/// Re-sync the manual order of every custom collection the product belongs to.
///
/// Best-effort per collection: a reorder failure (including field-level user
/// errors) is logged and the remaining collections are still processed. The
/// reorder job runs asynchronously on the platform side and is not polled.
///
/// # Errors
///
/// Returns an error only when the initial product fetch fails; everything
/// after that is handled per collection.
#[instrument(skip(client), fields(shop = %client.shop(), product = %product))]
pub async fn reconcile(client: &SyncClient, product: ProductId) -> Result<(), ShopifyError> {
    let Some(overview) = client.product_overview(product).await? else {
        debug!("product no longer exists, skipping collection order sync");
        return Ok(());
    };

    for collection in &overview.collections {
        let Some(moves) = plan_reorder(&collection.members) else {
            debug!(collection = %collection.handle, "collection already in desired order");
            continue;
        };

        match client.reorder_collection(&collection.id, moves).await {
            Ok(job) => {
                info!(
                    collection = %collection.handle,
                    job = job.as_deref().unwrap_or("-"),
                    "collection reorder enqueued"
                );
            }
            Err(error) => {
                // One collection failing must not stop the others.
                error!(collection = %collection.handle, %error, "collection reorder failed");
            }
        }
    }

    Ok(())
}
