//! Domain and wire types for the Shopify Admin API client.
//!
//! The public types at the top are what the reconcilers consume; the
//! `wire` module mirrors the exact JSON shape of each GraphQL response and
//! is converted at the client boundary.

use serde::{Deserialize, Serialize};

// =============================================================================
// Domain types (consumed by the reconcilers)
// =============================================================================

/// Everything the reconcilers need to know about one product.
#[derive(Debug, Clone)]
pub struct ProductOverview {
    /// Product gid.
    pub id: String,
    /// Raw value of the curated related-products metafield, if set.
    pub related_source: Option<String>,
    /// The product's custom collections with their current member ordering.
    pub collections: Vec<CollectionSnapshot>,
}

/// One collection and its members in current (fetch) order.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot {
    /// Collection gid.
    pub id: String,
    /// Collection handle (for log readability).
    pub handle: String,
    /// Members in the order the platform currently serves them.
    pub members: Vec<CollectionMember>,
}

/// One product inside a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMember {
    /// Product gid.
    pub id: String,
    /// Raw `product_order` metafield value, if set.
    pub order_value: Option<String>,
}

/// One entry of a collection reorder move list.
///
/// `newPosition` is an `UnsignedInt64` scalar, serialized as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReorderMove {
    /// Product gid to move.
    pub id: String,
    /// New 1-based position.
    #[serde(rename = "newPosition")]
    pub new_position: String,
}

/// A variant resolved to its parent product.
#[derive(Debug, Clone)]
pub struct VariantParent {
    /// Numeric variant id.
    pub variant_id: u64,
    /// Parent product gid.
    pub product_gid: String,
}

/// A registered webhook subscription.
#[derive(Debug, Clone)]
pub struct WebhookSubscription {
    /// Subscription gid.
    pub id: String,
    /// Current callback URL, when the endpoint is an HTTP endpoint.
    pub callback_url: Option<String>,
}

/// Input for the `metafieldsSet` mutation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsSetInput {
    /// Gid of the entity owning the metafield.
    pub owner_id: String,
    /// Metafield namespace.
    pub namespace: String,
    /// Metafield key.
    pub key: String,
    /// Metafield type tag (e.g. `list.product_reference`).
    #[serde(rename = "type")]
    pub value_type: String,
    /// JSON-encoded metafield value.
    pub value: String,
}

// =============================================================================
// Wire types (exact response shapes, converted at the client boundary)
// =============================================================================

pub(crate) mod wire {
    use super::Deserialize;

    /// A connection in `nodes` form.
    #[derive(Debug, Deserialize)]
    pub struct Connection<T> {
        #[serde(default = "Vec::new")]
        pub nodes: Vec<T>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MetafieldValue {
        pub value: String,
    }

    /// A field-level error from a mutation payload.
    #[derive(Debug, Deserialize)]
    pub struct UserError {
        pub field: Option<Vec<String>>,
        pub message: String,
    }

    // -- product overview ----------------------------------------------------

    #[derive(Debug, Deserialize)]
    pub struct ProductOverviewData {
        pub product: Option<ProductNode>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductNode {
        pub id: String,
        pub related_source: Option<MetafieldValue>,
        pub collections: Connection<CollectionNode>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CollectionNode {
        pub id: String,
        pub handle: String,
        pub products: Connection<MemberNode>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MemberNode {
        pub id: String,
        pub order: Option<MetafieldValue>,
    }

    // -- variant parents -----------------------------------------------------

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VariantParentsData {
        pub product_variants: Connection<VariantNode>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VariantNode {
        pub legacy_resource_id: String,
        pub product: ProductRef,
    }

    #[derive(Debug, Deserialize)]
    pub struct ProductRef {
        pub id: String,
    }

    // -- metafieldsSet -------------------------------------------------------

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MetafieldsSetData {
        pub metafields_set: Option<MetafieldsSetPayload>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MetafieldsSetPayload {
        #[serde(default = "Vec::new")]
        pub user_errors: Vec<UserError>,
    }

    // -- collectionReorderProducts -------------------------------------------

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CollectionReorderData {
        pub collection_reorder_products: Option<CollectionReorderPayload>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CollectionReorderPayload {
        pub job: Option<JobRef>,
        #[serde(default = "Vec::new")]
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Deserialize)]
    pub struct JobRef {
        pub id: String,
    }

    // -- webhook subscriptions -----------------------------------------------

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WebhookSubscriptionsData {
        pub webhook_subscriptions: Connection<WebhookSubscriptionNode>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WebhookSubscriptionNode {
        pub id: String,
        pub endpoint: Option<WebhookEndpoint>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WebhookEndpoint {
        pub callback_url: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WebhookDeleteData {
        pub webhook_subscription_delete: Option<WebhookDeletePayload>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WebhookDeletePayload {
        #[serde(default = "Vec::new")]
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WebhookCreateData {
        pub webhook_subscription_create: Option<WebhookCreatePayload>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WebhookCreatePayload {
        pub webhook_subscription: Option<WebhookSubscriptionRef>,
        #[serde(default = "Vec::new")]
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WebhookSubscriptionRef {
        pub id: String,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder_move_serializes_camel_case() {
        let mv = ReorderMove {
            id: "gid://shopify/Product/1".to_string(),
            new_position: "3".to_string(),
        };
        let json = serde_json::to_value(&mv).unwrap();
        assert_eq!(json["newPosition"], "3");
        assert_eq!(json["id"], "gid://shopify/Product/1");
    }

    #[test]
    fn test_metafields_set_input_type_field() {
        let input = MetafieldsSetInput {
            owner_id: "gid://shopify/Product/1".to_string(),
            namespace: "shopify--discovery--product_recommendation".to_string(),
            key: "related_products".to_string(),
            value_type: "list.product_reference".to_string(),
            value: "[]".to_string(),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["ownerId"], "gid://shopify/Product/1");
        assert_eq!(json["type"], "list.product_reference");
    }

    #[test]
    fn test_product_overview_wire_deserialization() {
        let payload = serde_json::json!({
            "product": {
                "id": "gid://shopify/Product/123",
                "relatedSource": { "value": "[\"1,2\",\"3\"]" },
                "collections": {
                    "nodes": [{
                        "id": "gid://shopify/Collection/9",
                        "handle": "front-page",
                        "products": {
                            "nodes": [
                                { "id": "gid://shopify/Product/1", "order": { "value": "2" } },
                                { "id": "gid://shopify/Product/2", "order": null }
                            ]
                        }
                    }]
                }
            }
        });

        let data: wire::ProductOverviewData = serde_json::from_value(payload).unwrap();
        let product = data.product.unwrap();
        assert_eq!(product.id, "gid://shopify/Product/123");
        assert!(product.related_source.is_some());
        let collection = &product.collections.nodes[0];
        assert_eq!(collection.handle, "front-page");
        assert_eq!(collection.products.nodes.len(), 2);
        assert!(collection.products.nodes[1].order.is_none());
    }

    #[test]
    fn test_variant_parents_wire_deserialization() {
        let payload = serde_json::json!({
            "productVariants": {
                "nodes": [
                    {
                        "legacyResourceId": "41558712521234",
                        "product": { "id": "gid://shopify/Product/77" }
                    }
                ]
            }
        });

        let data: wire::VariantParentsData = serde_json::from_value(payload).unwrap();
        assert_eq!(data.product_variants.nodes[0].legacy_resource_id, "41558712521234");
        assert_eq!(
            data.product_variants.nodes[0].product.id,
            "gid://shopify/Product/77"
        );
    }
}
