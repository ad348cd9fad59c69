//! Client-side copy of the catalog, refreshed by user actions and the poller.

use homerent_core::catalog::{self, Catalog};
use homerent_core::config::DisplayConfig;
use homerent_core::domain::appliance::Appliance;
use homerent_core::pricing::price_label;
use homerent_core::{RefreshSequencer, RefreshTicket};
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::client::CatalogClient;
use crate::error::ClientError;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub appliances: Vec<Appliance>,
    pub loading: bool,
    pub error: Option<String>,
    /// Ticket of the fetch whose result is shown.
    pub applied: Option<u64>,
}

#[derive(Debug)]
pub struct CatalogStore {
    sequencer: RefreshSequencer,
    snapshot: RwLock<CatalogSnapshot>,
    display: DisplayConfig,
}

impl CatalogStore {
    pub fn new(display: DisplayConfig) -> Self {
        Self {
            sequencer: RefreshSequencer::new(),
            snapshot: RwLock::new(CatalogSnapshot { loading: true, ..CatalogSnapshot::default() }),
            display,
        }
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn begin(&self) -> RefreshTicket {
        self.sequencer.issue()
    }

    /// Applies a fetch result unless a newer fetch has started since its
    /// ticket was issued. Returns whether the result was applied.
    pub async fn apply(
        &self,
        ticket: RefreshTicket,
        result: Result<Vec<Appliance>, ClientError>,
    ) -> bool {
        if !self.sequencer.is_latest(ticket) {
            debug!(
                event_name = "client.catalog.stale_discarded",
                correlation_id = "catalog",
                ticket = ticket.value(),
                "discarding a superseded catalog response"
            );
            return false;
        }

        let mut snapshot = self.snapshot.write().await;
        snapshot.loading = false;
        snapshot.applied = Some(ticket.value());
        match result {
            Ok(appliances) => {
                snapshot.appliances = appliances;
                snapshot.error = None;
            }
            Err(failure) => {
                error!(
                    event_name = "client.catalog.fetch_failed",
                    correlation_id = "catalog",
                    error = %failure,
                    "catalog fetch failed"
                );
                snapshot.error = Some(failure.user_message());
            }
        }
        true
    }

    pub async fn refresh(&self, client: &CatalogClient) -> bool {
        let ticket = self.begin();
        let result = client.fetch_catalog().await;
        self.apply(ticket, result).await
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn search(&self, term: &str) -> Vec<Appliance> {
        catalog::search(&self.snapshot.read().await.appliances, term)
    }

    pub async fn catalog(&self) -> Catalog {
        Catalog::new(self.snapshot.read().await.appliances.clone())
    }

    /// Whole-unit price label in the configured currency.
    pub fn price_label(&self, appliance: &Appliance) -> String {
        price_label(&appliance.price.to_string(), &self.display.currency)
    }
}
