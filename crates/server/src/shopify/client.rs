//! Shopify Admin API GraphQL client.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use volo_sync_core::{ProductId, ShopDomain, VariantId};

use crate::tenants::Tenant;

use super::{
    GraphQLError, GraphQLErrorLocation, ShopifyError, queries,
    types::{
        CollectionMember, CollectionSnapshot, MetafieldsSetInput, ProductOverview, ReorderMove,
        VariantParent, WebhookSubscription, wire,
    },
};

/// Maximum variants per parent-lookup query; callers chunk above this.
pub const VARIANT_LOOKUP_LIMIT: usize = 100;

/// Per-tenant Shopify Admin API client.
///
/// Cheap to clone; the inner HTTP client and credentials are shared.
#[derive(Clone)]
pub struct SyncClient {
    inner: Arc<SyncClientInner>,
}

struct SyncClientInner {
    client: reqwest::Client,
    shop: ShopDomain,
    endpoint: String,
    access_token: SecretString,
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("shop", &self.inner.shop)
            .field("endpoint", &self.inner.endpoint)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl SyncClient {
    /// Create a client for one tenant.
    ///
    /// The `reqwest::Client` is shared across tenants; per-tenant state is
    /// only the endpoint and the access token.
    #[must_use]
    pub fn new(client: reqwest::Client, tenant: &Tenant, api_version: &str) -> Self {
        let endpoint = format!(
            "https://{}/admin/api/{}/graphql.json",
            tenant.domain, api_version
        );

        Self {
            inner: Arc::new(SyncClientInner {
                client,
                shop: tenant.domain.clone(),
                endpoint,
                access_token: tenant.access_token.clone(),
            }),
        }
    }

    /// The shop this client talks to.
    #[must_use]
    pub fn shop(&self) -> &ShopDomain {
        &self.inner.shop
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL document with JSON variables.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let body = serde_json::json!({ "query": query, "variables": variables });

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(protocol_error(&format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )));
        }

        let parsed: GraphQLResponse<T> = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse Shopify GraphQL response"
            );
            ShopifyError::Parse(e)
        })?;

        // Check for GraphQL errors
        if let Some(errors) = parsed.errors
            && !errors.is_empty()
        {
            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        locations: e
                            .locations
                            .into_iter()
                            .map(|l| GraphQLErrorLocation {
                                line: l.line,
                                column: l.column,
                            })
                            .collect(),
                        path: e.path,
                    })
                    .collect(),
            ));
        }

        parsed
            .data
            .ok_or_else(|| protocol_error("No data in response"))
    }

    // =========================================================================
    // Product sync reads
    // =========================================================================

    /// Fetch the sync overview for a product: curated related-products source
    /// and custom collections with current member ordering.
    ///
    /// Returns `Ok(None)` when the product no longer exists (e.g. deleted
    /// between the webhook and this fetch).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self), fields(shop = %self.inner.shop, product = %product))]
    pub async fn product_overview(
        &self,
        product: ProductId,
    ) -> Result<Option<ProductOverview>, ShopifyError> {
        let variables = serde_json::json!({
            "id": product.gid(),
            "customNamespace": queries::CUSTOM_NAMESPACE,
            "relatedKey": queries::RELATED_SOURCE_KEY,
            "orderKey": queries::PRODUCT_ORDER_KEY,
        });

        let data: wire::ProductOverviewData =
            self.execute(queries::PRODUCT_SYNC_OVERVIEW, variables).await?;

        Ok(data.product.map(|p| ProductOverview {
            id: p.id,
            related_source: p.related_source.map(|m| m.value),
            collections: p
                .collections
                .nodes
                .into_iter()
                .map(|c| CollectionSnapshot {
                    id: c.id,
                    handle: c.handle,
                    members: c
                        .products
                        .nodes
                        .into_iter()
                        .map(|m| CollectionMember {
                            id: m.id,
                            order_value: m.order.map(|o| o.value),
                        })
                        .collect(),
                })
                .collect(),
        }))
    }

    /// Resolve one batch of variants to their parent products.
    ///
    /// At most [`VARIANT_LOOKUP_LIMIT`] variants per call; callers chunk
    /// larger lists. Result order is whatever the platform returns - callers
    /// that care about order must re-sort against their own input.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, variants), fields(shop = %self.inner.shop, count = variants.len()))]
    pub async fn variant_parents(
        &self,
        variants: &[VariantId],
    ) -> Result<Vec<VariantParent>, ShopifyError> {
        if variants.is_empty() {
            return Ok(Vec::new());
        }

        let variables = serde_json::json!({
            "first": VARIANT_LOOKUP_LIMIT,
            "query": variant_lookup_query(variants),
        });

        let data: wire::VariantParentsData =
            self.execute(queries::VARIANT_PARENTS, variables).await?;

        Ok(data
            .product_variants
            .nodes
            .into_iter()
            .filter_map(|node| match node.legacy_resource_id.parse::<u64>() {
                Ok(variant_id) => Some(VariantParent {
                    variant_id,
                    product_gid: node.product.id,
                }),
                Err(_) => {
                    tracing::warn!(
                        id = %node.legacy_resource_id,
                        "variant lookup returned non-numeric legacy id"
                    );
                    None
                }
            })
            .collect())
    }

    // =========================================================================
    // Product sync writes
    // =========================================================================

    /// Replace the related-products recommendation metafield of a product.
    ///
    /// The previous value is fully overwritten (last-writer-wins, no merge).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self, related), fields(shop = %self.inner.shop, product = %product, count = related.len()))]
    pub async fn set_related_products(
        &self,
        product: ProductId,
        related: &[String],
    ) -> Result<(), ShopifyError> {
        let input = MetafieldsSetInput {
            owner_id: product.gid(),
            namespace: queries::RECOMMENDATION_NAMESPACE.to_string(),
            key: queries::RELATED_PRODUCTS_KEY.to_string(),
            value_type: queries::RELATED_PRODUCTS_TYPE.to_string(),
            value: serde_json::to_string(related)?,
        };

        let variables = serde_json::json!({ "metafields": [input] });

        let data: wire::MetafieldsSetData =
            self.execute(queries::METAFIELDS_SET, variables).await?;

        let payload = data
            .metafields_set
            .ok_or_else(|| protocol_error("No metafieldsSet payload in response"))?;

        if let Some(message) = collect_user_errors(&payload.user_errors) {
            return Err(ShopifyError::UserError(message));
        }

        Ok(())
    }

    /// Reorder collection members.
    ///
    /// The platform enqueues the reorder as an asynchronous job; the job
    /// handle is returned for logging only and is never polled.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self, moves), fields(shop = %self.inner.shop, collection = %collection_id, moves = moves.len()))]
    pub async fn reorder_collection(
        &self,
        collection_id: &str,
        moves: Vec<ReorderMove>,
    ) -> Result<Option<String>, ShopifyError> {
        let variables = serde_json::json!({ "id": collection_id, "moves": moves });

        let data: wire::CollectionReorderData = self
            .execute(queries::COLLECTION_REORDER_PRODUCTS, variables)
            .await?;

        let payload = data
            .collection_reorder_products
            .ok_or_else(|| protocol_error("No collectionReorderProducts payload in response"))?;

        if let Some(message) = collect_user_errors(&payload.user_errors) {
            return Err(ShopifyError::UserError(message));
        }

        Ok(payload.job.map(|j| j.id))
    }

    // =========================================================================
    // Webhook subscriptions (startup bootstrap only)
    // =========================================================================

    /// List webhook subscriptions for a topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self), fields(shop = %self.inner.shop))]
    pub async fn webhook_subscriptions(
        &self,
        topic: &str,
    ) -> Result<Vec<WebhookSubscription>, ShopifyError> {
        let variables = serde_json::json!({ "topics": [topic] });

        let data: wire::WebhookSubscriptionsData =
            self.execute(queries::WEBHOOK_SUBSCRIPTIONS, variables).await?;

        Ok(data
            .webhook_subscriptions
            .nodes
            .into_iter()
            .map(|n| WebhookSubscription {
                id: n.id,
                callback_url: n.endpoint.and_then(|e| e.callback_url),
            })
            .collect())
    }

    /// Delete a webhook subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self), fields(shop = %self.inner.shop, subscription = %id))]
    pub async fn delete_webhook_subscription(&self, id: &str) -> Result<(), ShopifyError> {
        let variables = serde_json::json!({ "id": id });

        let data: wire::WebhookDeleteData = self
            .execute(queries::WEBHOOK_SUBSCRIPTION_DELETE, variables)
            .await?;

        let payload = data
            .webhook_subscription_delete
            .ok_or_else(|| protocol_error("No webhookSubscriptionDelete payload in response"))?;

        if let Some(message) = collect_user_errors(&payload.user_errors) {
            return Err(ShopifyError::UserError(message));
        }

        Ok(())
    }

    /// Create a webhook subscription pointing at `callback_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self), fields(shop = %self.inner.shop))]
    pub async fn create_webhook_subscription(
        &self,
        topic: &str,
        callback_url: &str,
    ) -> Result<String, ShopifyError> {
        let variables = serde_json::json!({
            "topic": topic,
            "webhookSubscription": { "callbackUrl": callback_url, "format": "JSON" },
        });

        let data: wire::WebhookCreateData = self
            .execute(queries::WEBHOOK_SUBSCRIPTION_CREATE, variables)
            .await?;

        let payload = data
            .webhook_subscription_create
            .ok_or_else(|| protocol_error("No webhookSubscriptionCreate payload in response"))?;

        if let Some(message) = collect_user_errors(&payload.user_errors) {
            return Err(ShopifyError::UserError(message));
        }

        payload
            .webhook_subscription
            .map(|s| s.id)
            .ok_or_else(|| protocol_error("No subscription returned from create"))
    }
}

/// Build the id-disjunction search query for a variant batch.
fn variant_lookup_query(variants: &[VariantId]) -> String {
    variants
        .iter()
        .map(|v| format!("id:{}", v.as_u64()))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Format mutation `userErrors` the way they are logged and surfaced.
fn collect_user_errors(errors: &[wire::UserError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }

    let message = errors
        .iter()
        .map(|e| {
            let field = e.field.as_ref().map_or_else(String::new, |f| f.join("."));
            format!("{}: {}", field, e.message)
        })
        .collect::<Vec<_>>()
        .join("; ");

    Some(message)
}

fn protocol_error(message: &str) -> ShopifyError {
    ShopifyError::GraphQL(vec![GraphQLError {
        message: message.to_string(),
        locations: vec![],
        path: vec![],
    }])
}
