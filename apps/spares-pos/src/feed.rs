//! # Live Inventory Feed
//!
//! Pushes the full product snapshot to every observer whenever the
//! inventory changes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Inventory Feed                                   │
//! │                                                                         │
//! │  InventoryStore write ──► list_products() ──► CatalogFeed::publish()    │
//! │  (create/update/adjust)                              │                  │
//! │                                                      │ watch channel    │
//! │  spawn_refresh (poll) ──► refresh() ─────────────────┤                  │
//! │  (other terminals)                                   ▼                  │
//! │                                   ┌──────────────────┼───────────────┐  │
//! │                                   ▼                  ▼               ▼  │
//! │                             LiveCatalog        LiveCatalog     LiveCatalog
//! │                             (cart commands)    (dashboard)     (UI)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `watch` channel keeps only the latest snapshot; intermediate ones
//! may be skipped by slow observers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use spares_core::{Catalog, Product};

use crate::store::InventoryStore;

/// Publishing side of the feed, owned by an inventory store.
#[derive(Debug)]
pub struct CatalogFeed {
    tx: watch::Sender<Catalog>,
}

impl CatalogFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Catalog::default());
        CatalogFeed { tx }
    }

    /// Replaces the current snapshot and wakes every observer.
    pub fn publish(&self, products: Vec<Product>) {
        let catalog = Catalog::new(products);
        debug!(count = catalog.len(), "Publishing catalog snapshot");
        self.tx.send_replace(catalog);
    }

    pub fn subscribe(&self) -> LiveCatalog {
        LiveCatalog {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CatalogFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of the feed. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LiveCatalog {
    rx: watch::Receiver<Catalog>,
}

impl LiveCatalog {
    /// Runs `f` against the current snapshot without copying it.
    ///
    /// Keep `f` short: publishers wait while it runs.
    pub fn with<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        f(&self.rx.borrow())
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> Catalog {
        self.rx.borrow().clone()
    }

    /// Latest copy of one product.
    pub fn product(&self, id: &str) -> Option<Product> {
        self.rx.borrow().get(id).cloned()
    }

    /// Waits for the next published snapshot.
    ///
    /// Returns `false` once the publishing store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// Periodically re-reads the inventory so stock changes made outside this
/// process (another terminal on the same database) reach the feed.
///
/// A failed refresh is logged and the previous snapshot stays current.
pub fn spawn_refresh(store: Arc<dyn InventoryStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = store.refresh().await {
                warn!(error = %e, "Inventory refresh failed");
            }
        }
    })
}
