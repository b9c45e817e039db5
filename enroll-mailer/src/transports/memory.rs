use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Transport that keeps every sent email in memory
///
/// Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    outbox: Arc<Mutex<Vec<Email>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every email sent so far
    pub fn outbox(&self) -> Vec<Email> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.outbox.lock().map(|outbox| outbox.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.clear();
        }
    }
}

#[async_trait]
impl Mailer for MemoryTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        email.validate()?;
        tracing::debug!(to = ?email.to, subject = %email.subject, "Storing email in memory outbox");

        self.outbox
            .lock()
            .map_err(|e| MailerError::Builder(format!("Outbox lock poisoned: {e}")))?
            .push(email);

        Ok(())
    }
}
