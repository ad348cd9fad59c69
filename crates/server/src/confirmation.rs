use std::time::Duration;

use async_trait::async_trait;
use homerent_core::checkout::{ConfirmationSink, RentalOrder};
use tracing::info;

/// Holds the confirmation for the configured processing delay, standing in
/// for a dispatch system.
#[derive(Clone, Copy, Debug)]
pub struct SimulatedConfirmation {
    delay: Duration,
}

impl SimulatedConfirmation {
    pub fn new(delay_ms: u64) -> Self {
        Self { delay: Duration::from_millis(delay_ms) }
    }
}

#[async_trait]
impl ConfirmationSink for SimulatedConfirmation {
    async fn process(&self, order: &RentalOrder) -> Result<(), String> {
        tokio::time::sleep(self.delay).await;
        info!(
            event_name = "checkout.order.dispatched",
            correlation_id = "checkout",
            appliance = order.appliance.as_ref().map(|appliance| appliance.name.as_str()).unwrap_or(""),
            final_amount = %order.totals.final_amount,
            delay_ms = self.delay.as_millis() as u64,
            "rental order handed to delivery"
        );
        Ok(())
    }
}
