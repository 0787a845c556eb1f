//! Shared cart count.
//!
//! One counter per visitor context. It is seeded once from the platform and
//! afterwards moved by ±1 on every successful add/remove, without asking the
//! platform again. It can drift from the platform's own count; nothing
//! reconciles the two.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};

use tokio::sync::OnceCell;

/// Where the one-time load stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl LoadPhase {
    const fn to_u8(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Loading => 1,
            Self::Ready => 2,
            Self::Failed => 3,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Loading,
            2 => Self::Ready,
            3 => Self::Failed,
            _ => Self::Uninitialized,
        }
    }
}

/// The visitor's cart count.
#[derive(Debug, Default)]
pub struct CartCounter {
    count: AtomicI64,
    phase: AtomicU8,
    load: OnceCell<LoadPhase>,
}

impl CartCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count; 0 until the first load lands.
    #[must_use]
    pub fn read(&self) -> i64 {
        self.count.load(Ordering::Acquire)
    }

    /// Replace the count. No clamping: negative values are kept as-is.
    pub fn set(&self, count: i64) {
        self.count.store(count, Ordering::Release);
    }

    #[must_use]
    pub fn phase(&self) -> LoadPhase {
        LoadPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// `set(read() + 1)`. Concurrent adjustments may overwrite each other.
    pub fn increment(&self) -> i64 {
        let next = self.read().saturating_add(1);
        self.set(next);
        next
    }

    /// `set(read() - 1)`.
    pub fn decrement(&self) -> i64 {
        let next = self.read().saturating_sub(1);
        self.set(next);
        next
    }

    /// Run `load` at most once for this counter.
    ///
    /// Callers arriving while the load is in flight wait for it instead of
    /// starting their own. On failure the count keeps whatever value it had.
    pub async fn ensure_loaded<F, Fut, E>(&self, load: F) -> LoadPhase
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<i64, E>>,
        E: Display,
    {
        *self
            .load
            .get_or_init(|| async {
                self.store_phase(LoadPhase::Loading);
                let phase = match load().await {
                    Ok(count) => {
                        self.set(count);
                        LoadPhase::Ready
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Cart count load failed");
                        LoadPhase::Failed
                    }
                };
                self.store_phase(phase);
                phase
            })
            .await
    }

    fn store_phase(&self, phase: LoadPhase) {
        self.phase.store(phase.to_u8(), Ordering::Release);
    }
}
