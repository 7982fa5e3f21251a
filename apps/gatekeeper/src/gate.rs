use crate::{
    batcher::build_batch,
    cache::{Clock, EntitlementCache, SystemClock},
    config::GateConfig,
    decoder::decode_snapshot,
    error::GateError,
    requirements::TokenRequirement,
    retry::{RateLimiter, RetryPolicy, with_retry},
    rpc::MulticallClient,
    snapshot::{EntitlementSnapshot, parse_wallet_address},
};
use alloy::primitives::Address;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BountyPermissions {
    /// Wears the Bounty Management hat.
    pub can_create_bounty: bool,
    /// Holds any pod or market admin token, which makes the wallet a
    /// recipient of bounty notifications.
    pub is_token_holder: bool,
}

impl From<&EntitlementSnapshot> for BountyPermissions {
    fn from(snapshot: &EntitlementSnapshot) -> Self {
        Self {
            can_create_bounty: snapshot.has_bounty_hat,
            is_token_holder: snapshot.has_executive_pod || snapshot.has_dev_pod || snapshot.has_market_admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventManagementPermissions {
    pub can_manage_events: bool,
}

impl From<&EntitlementSnapshot> for EventManagementPermissions {
    fn from(snapshot: &EntitlementSnapshot) -> Self {
        Self {
            can_manage_events: snapshot.has_event_management,
        }
    }
}

/// Entry point for every entitlement check in the app.
pub struct TokenGate<C> {
    config: GateConfig,
    client: C,
    cache: EntitlementCache,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl<C: MulticallClient> TokenGate<C> {
    pub fn new(config: GateConfig, client: C) -> Self {
        Self::with_clock(config, client, Arc::new(SystemClock))
    }

    pub fn with_clock(config: GateConfig, client: C, clock: Arc<dyn Clock>) -> Self {
        let cache = EntitlementCache::new(config.cache_ttl, clock);
        let limiter = RateLimiter::from(&config.rpc);
        let retry = RetryPolicy::from(&config.rpc);
        Self {
            config,
            client,
            cache,
            limiter,
            retry,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn cache(&self) -> &EntitlementCache {
        &self.cache
    }

    /// Returns the wallet's entitlements, from cache when fresh. Never fails:
    /// if the chain cannot be read the wallet gets the empty snapshot.
    #[instrument(skip(self, wallet), fields(wallet = %wallet))]
    pub async fn fetch_token_balances(&self, wallet: Address) -> EntitlementSnapshot {
        if let Some(snapshot) = self.cache.get(&wallet) {
            debug!("Serving entitlements from cache");
            return snapshot;
        }

        let batch = build_batch(&self.config, wallet);
        if batch.is_empty() {
            info!("No entitlement contracts configured, skipping RPC");
            let snapshot = EntitlementSnapshot::default();
            self.cache.insert(wallet, snapshot.clone());
            return snapshot;
        }

        let calls = batch.calls();
        let (limiter, client, pending) = (&self.limiter, &self.client, calls.as_slice());
        let result = with_retry(self.retry, || async move {
            limiter.acquire().await;
            client.aggregate(pending).await
        })
        .await;

        match result {
            Ok(return_data) => {
                let snapshot = decode_snapshot(&batch, &return_data);
                self.cache.insert(wallet, snapshot.clone());
                debug!(calls = calls.len(), snapshot = ?snapshot, "Entitlements refreshed");
                snapshot
            }
            Err(e) => {
                // Not cached: the next request gets a fresh retry budget.
                error!(error = %e, "Failed to fetch entitlements, denying access");
                EntitlementSnapshot::default()
            }
        }
    }

    /// Same as [`Self::fetch_token_balances`] for an unparsed address.
    pub async fn fetch_token_balances_for(&self, raw: &str) -> Result<EntitlementSnapshot, GateError> {
        let wallet = parse_wallet_address(raw)?;
        Ok(self.fetch_token_balances(wallet).await)
    }

    pub async fn fetch_many(&self, wallets: &[Address]) -> Vec<(Address, EntitlementSnapshot)> {
        let snapshots = join_all(wallets.iter().map(|wallet| self.fetch_token_balances(*wallet))).await;
        wallets.iter().copied().zip(snapshots).collect()
    }

    /// Filters `wallets` down to the ones meeting `requirement`, keeping order.
    pub async fn token_holders(&self, wallets: &[Address], requirement: &TokenRequirement) -> Vec<Address> {
        self.fetch_many(wallets)
            .await
            .into_iter()
            .filter(|(_, snapshot)| requirement.is_satisfied_by(snapshot))
            .map(|(wallet, _)| wallet)
            .collect()
    }

    pub async fn check_bounty_permissions(&self, wallet: Address) -> BountyPermissions {
        BountyPermissions::from(&self.fetch_token_balances(wallet).await)
    }

    pub async fn check_event_management_permissions(&self, wallet: Address) -> EventManagementPermissions {
        EventManagementPermissions::from(&self.fetch_token_balances(wallet).await)
    }

    pub async fn check_market_management_access(&self, wallet: Address) -> bool {
        self.fetch_token_balances(wallet).await.can_manage_market()
    }
}
