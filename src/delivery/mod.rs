// Delivery module - hands a finished report to the user

pub mod mailgun;

use async_trait::async_trait;
use std::io::Write;
use tracing::info;

use crate::error::DeliveryError;

pub use mailgun::MailgunDelivery;

/// Sink for rendered reports. A failure loses the report; nothing retries.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, body: &str) -> Result<(), DeliveryError>;

    /// Short description for status lines, e.g. the recipient address
    fn describe(&self) -> String;
}

/// Writes the report to standard output
pub struct StdoutDelivery;

#[async_trait]
impl Delivery for StdoutDelivery {
    async fn deliver(&self, body: &str) -> Result<(), DeliveryError> {
        info!("Writing report to stdout");
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(body.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        "stdout".to_string()
    }
}
