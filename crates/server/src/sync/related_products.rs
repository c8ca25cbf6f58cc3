//! Related-products reconciliation.
//!
//! The merchandising team curates related products per variant in the
//! `custom.related_products_from_volo` metafield: a JSON array of
//! comma-joined variant id groups, e.g. `["111,222","333"]`. This module
//! flattens that list, resolves every variant to its parent product and
//! writes the resulting product list into the storefront-visible
//! recommendation metafield, fully replacing the previous value.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};
use volo_sync_core::{ProductId, VariantId};

use crate::shopify::{ShopifyError, SyncClient, VARIANT_LOOKUP_LIMIT};

/// Flatten the curated metafield value into an ordered variant-reference list.
///
/// The value is a JSON array of strings, each a comma-joined group of
/// variant ids. Group boundaries carry no meaning downstream; the flat
/// list keeps source order. Blank segments are dropped.
///
/// # Errors
///
/// Returns the JSON error when the value is not an array of strings.
pub fn flatten_variant_groups(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    let groups: Vec<String> = serde_json::from_str(raw)?;

    Ok(groups
        .iter()
        .flat_map(|group| group.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Map the ordered variant list to parent product gids.
///
/// Source order is preserved and duplicate parents are intentionally kept:
/// the curated list has one entry per variant, so two variants of the same
/// product keep that product listed twice. Variants the platform did not
/// resolve are skipped.
#[must_use]
pub fn resolve_in_order(ordered: &[VariantId], parents: &HashMap<u64, String>) -> Vec<String> {
    ordered
        .iter()
        .filter_map(|variant| parents.get(&variant.as_u64()).cloned())
        .collect()
}

/// Re-sync the related-products recommendation metafield for a product.
///
/// No-ops when the curated metafield is absent, empty, or contains no
/// parseable variant references. Otherwise the computed parent list fully
/// replaces the recommendation value (last-writer-wins).
///
/// # Errors
///
/// Returns an error if a fetch or the final write fails, or if the curated
/// value is not valid JSON.
#[instrument(skip(client), fields(shop = %client.shop(), product = %product))]
pub async fn reconcile(client: &SyncClient, product: ProductId) -> Result<(), ShopifyError> {
    let Some(overview) = client.product_overview(product).await? else {
        debug!("product no longer exists, skipping related products sync");
        return Ok(());
    };

    let Some(raw) = overview.related_source else {
        debug!("no curated related-products metafield, nothing to sync");
        return Ok(());
    };
    if raw.trim().is_empty() {
        debug!("curated related-products metafield is empty, nothing to sync");
        return Ok(());
    }

    let references = flatten_variant_groups(&raw)?;

    let variants: Vec<VariantId> = references
        .iter()
        .filter_map(|reference| match VariantId::parse(reference) {
            Ok(variant) => Some(variant),
            Err(error) => {
                warn!(%error, "skipping unparsable variant reference");
                None
            }
        })
        .collect();

    if variants.is_empty() {
        debug!("curated list contains no variant references, nothing to sync");
        return Ok(());
    }

    let mut parents: HashMap<u64, String> = HashMap::with_capacity(variants.len());
    for chunk in variants.chunks(VARIANT_LOOKUP_LIMIT) {
        for parent in client.variant_parents(chunk).await? {
            parents.insert(parent.variant_id, parent.product_gid);
        }
    }

    let related = resolve_in_order(&variants, &parents);
    client.set_related_products(product, &related).await?;

    debug!(count = related.len(), "related products synchronized");
    Ok(())
}
