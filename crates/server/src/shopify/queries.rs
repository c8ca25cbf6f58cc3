//! GraphQL documents for the Shopify Admin API.
//!
//! Metafield coordinates are passed as variables so the documents stay in
//! sync with the constants below.

/// Namespace of the sync input metafields (order value, curated related list).
pub const CUSTOM_NAMESPACE: &str = "custom";

/// Per-collection manual order value on each member product.
pub const PRODUCT_ORDER_KEY: &str = "product_order";

/// Curated related-variant groups, maintained by the merchandising team.
pub const RELATED_SOURCE_KEY: &str = "related_products_from_volo";

/// Shopify's recommendation namespace; writing here feeds the storefront's
/// related-products section.
pub const RECOMMENDATION_NAMESPACE: &str = "shopify--discovery--product_recommendation";

/// Output key inside the recommendation namespace.
pub const RELATED_PRODUCTS_KEY: &str = "related_products";

/// Metafield type tag of the recommendation list.
pub const RELATED_PRODUCTS_TYPE: &str = "list.product_reference";

/// Webhook topic this service subscribes to.
pub const PRODUCTS_UPDATE_TOPIC: &str = "PRODUCTS_UPDATE";

/// Everything one product-update event needs in a single fetch: the curated
/// related-products source value and the product's custom collections with
/// each member's order value.
pub const PRODUCT_SYNC_OVERVIEW: &str = r#"
query ProductSyncOverview($id: ID!, $customNamespace: String!, $relatedKey: String!, $orderKey: String!) {
  product(id: $id) {
    id
    relatedSource: metafield(namespace: $customNamespace, key: $relatedKey) {
      value
    }
    collections(first: 10, query: "collection_type:custom") {
      nodes {
        id
        handle
        products(first: 250) {
          nodes {
            id
            order: metafield(namespace: $customNamespace, key: $orderKey) {
              value
            }
          }
        }
      }
    }
  }
}
"#;

/// Resolve a batch of variants (by id disjunction query) to parent products.
pub const VARIANT_PARENTS: &str = r"
query VariantParents($first: Int!, $query: String!) {
  productVariants(first: $first, query: $query) {
    nodes {
      legacyResourceId
      product {
        id
      }
    }
  }
}
";

/// Write metafields; used for the related-products recommendation list.
pub const METAFIELDS_SET: &str = r"
mutation SetMetafields($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields {
      id
    }
    userErrors {
      field
      message
    }
  }
}
";

/// Reorder collection members; returns an asynchronous job handle.
pub const COLLECTION_REORDER_PRODUCTS: &str = r"
mutation ReorderCollectionProducts($id: ID!, $moves: [MoveInput!]!) {
  collectionReorderProducts(id: $id, moves: $moves) {
    job {
      id
    }
    userErrors {
      field
      message
    }
  }
}
";

/// List webhook subscriptions for given topics (startup bootstrap only).
pub const WEBHOOK_SUBSCRIPTIONS: &str = r"
query WebhookSubscriptions($topics: [WebhookSubscriptionTopic!]) {
  webhookSubscriptions(first: 25, topics: $topics) {
    nodes {
      id
      endpoint {
        __typename
        ... on WebhookHttpEndpoint {
          callbackUrl
        }
      }
    }
  }
}
";

/// Delete a webhook subscription (startup bootstrap only).
pub const WEBHOOK_SUBSCRIPTION_DELETE: &str = r"
mutation WebhookSubscriptionDelete($id: ID!) {
  webhookSubscriptionDelete(id: $id) {
    deletedWebhookSubscriptionId
    userErrors {
      field
      message
    }
  }
}
";

/// Create a webhook subscription (startup bootstrap only).
pub const WEBHOOK_SUBSCRIPTION_CREATE: &str = r"
mutation WebhookSubscriptionCreate($topic: WebhookSubscriptionTopic!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionCreate(topic: $topic, webhookSubscription: $webhookSubscription) {
    webhookSubscription {
      id
    }
    userErrors {
      field
      message
    }
  }
}
";
