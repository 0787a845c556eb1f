//! Per-visitor in-memory state.
//!
//! A [`VisitorContext`] holds what the storefront remembers about one visitor
//! between requests: whether their stored token has been checked with the
//! platform since this process started, and their cart count. Contexts live
//! in a [`VisitorRegistry`] keyed by the [`VisitorId`] kept in the session.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::SecretString;
use tokio::sync::{OnceCell, RwLock};

use crate::models::VisitorId;
use crate::platform::{PlatformClient, Profile};
use crate::services::cart_count::{CartCounter, LoadPhase};

/// Upper bound on live visitor contexts.
const MAX_VISITORS: u64 = 100_000;

/// Result of checking a stored token with the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The platform accepted the token and reported the admin flag, if any.
    Confirmed { admin: Option<bool> },
    /// The platform rejected the token, or could not be asked.
    Rejected,
    /// The token was issued by a login in this process; nothing to check.
    Fresh,
}

/// State remembered for one visitor.
#[derive(Debug, Default)]
pub struct VisitorContext {
    probe: OnceCell<ProbeOutcome>,
    cart: CartCounter,
    profile: RwLock<Option<Profile>>,
}

impl VisitorContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a visitor who just logged in: the token is known good,
    /// and the cart count starts over for the new account.
    #[must_use]
    pub fn after_login() -> Self {
        Self {
            probe: OnceCell::new_with(Some(ProbeOutcome::Fresh)),
            ..Self::default()
        }
    }

    /// Run the identity probe unless it already ran for this context.
    pub async fn probe_once<F, Fut>(&self, probe: F) -> ProbeOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ProbeOutcome>,
    {
        *self.probe.get_or_init(probe).await
    }

    /// Outcome of the probe, if it has completed.
    #[must_use]
    pub fn probe_outcome(&self) -> Option<ProbeOutcome> {
        self.probe.get().copied()
    }

    #[must_use]
    pub const fn cart(&self) -> &CartCounter {
        &self.cart
    }

    /// Fetch the profile once, seeding the cart count from it.
    pub async fn ensure_profile(&self, platform: &PlatformClient, token: &SecretString) -> LoadPhase {
        self.cart
            .ensure_loaded(|| async {
                let profile = platform.profile(token).await?;
                let count = profile.total_cart_count;
                *self.profile.write().await = Some(profile);
                Ok::<_, crate::platform::PlatformError>(count)
            })
            .await
    }

    /// The profile fetched by [`Self::ensure_profile`], if it succeeded.
    pub async fn profile(&self) -> Option<Profile> {
        self.profile.read().await.clone()
    }
}

/// All live visitor contexts.
#[derive(Clone)]
pub struct VisitorRegistry {
    contexts: Cache<VisitorId, Arc<VisitorContext>>,
}

impl VisitorRegistry {
    /// Contexts idle for longer than `idle` are dropped.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            contexts: Cache::builder()
                .max_capacity(MAX_VISITORS)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// The visitor's context, created empty on first sight.
    pub async fn get_or_create(&self, id: VisitorId) -> Arc<VisitorContext> {
        self.contexts
            .get_with(id, async { Arc::new(VisitorContext::new()) })
            .await
    }

    /// Swap in a new context, e.g. after login.
    pub async fn replace(&self, id: VisitorId, context: VisitorContext) -> Arc<VisitorContext> {
        let context = Arc::new(context);
        self.contexts.insert(id, Arc::clone(&context)).await;
        context
    }

    /// Forget a visitor.
    pub async fn remove(&self, id: VisitorId) {
        self.contexts.invalidate(&id).await;
    }

    /// Forget every visitor. Stored tokens are probed again on next sight,
    /// as after a restart.
    pub fn clear(&self) {
        self.contexts.invalidate_all();
    }
}

impl std::fmt::Debug for VisitorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisitorRegistry")
            .field("contexts", &self.contexts.entry_count())
            .finish()
    }
}
