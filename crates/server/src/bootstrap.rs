//! One-time webhook subscription registration.
//!
//! Invoked exactly once from process entry, before the server starts
//! accepting traffic. Nothing in the request path touches subscription
//! state; the reconciliation core never sees this module.

use tracing::{debug, info, instrument, warn};

use crate::shopify::queries::PRODUCTS_UPDATE_TOPIC;
use crate::shopify::{ShopifyError, SyncClient};
use crate::state::AppState;

/// Point every tenant's product-update webhook subscription at this server.
///
/// Existing subscriptions for the topic are removed first so that redeploys
/// with a changed public URL do not accumulate stale registrations. Failures
/// are logged per tenant and never abort startup - a tenant whose
/// registration failed simply receives no events until the next restart.
pub async fn register_webhook_subscriptions(state: &AppState) {
    let callback_url = format!(
        "{}{}",
        state.config().public_base_url,
        crate::routes::webhooks::WEBHOOK_PATH
    );

    for (tenant, client) in state.tenant_clients() {
        if let Err(error) = register_for_tenant(client, &callback_url).await {
            warn!(shop = %tenant.domain, %error, "webhook subscription registration failed");
        }
    }
}

#[instrument(skip(client), fields(shop = %client.shop()))]
async fn register_for_tenant(
    client: &SyncClient,
    callback_url: &str,
) -> Result<(), ShopifyError> {
    let existing = client.webhook_subscriptions(PRODUCTS_UPDATE_TOPIC).await?;

    for subscription in existing {
        client.delete_webhook_subscription(&subscription.id).await?;
        debug!(
            subscription = %subscription.id,
            previous_url = subscription.callback_url.as_deref().unwrap_or("-"),
            "removed stale product update subscription"
        );
    }

    let id = client
        .create_webhook_subscription(PRODUCTS_UPDATE_TOPIC, callback_url)
        .await?;
    info!(subscription = %id, callback_url, "registered product update subscription");

    Ok(())
}
