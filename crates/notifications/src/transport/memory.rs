use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::EmailTransport;
use crate::{EmailMessage, NotificationError, Result};

#[derive(Debug, Default)]
struct InMemoryTransportState {
    sent: Vec<EmailMessage>,
    fail: bool,
    failing_addresses: HashSet<String>,
}

/// Transport that records messages instead of sending them.
#[derive(Debug, Clone)]
pub struct InMemoryTransport {
    name: &'static str,
    state: Arc<RwLock<InMemoryTransportState>>,
}

impl InMemoryTransport {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::default(),
        }
    }

    /// Configures the transport to reject every message.
    pub fn set_fail(&self, fail: bool) {
        self.state.write().unwrap().fail = fail;
    }

    /// Configures the transport to reject messages addressed to `address` only.
    pub fn fail_for(&self, address: impl Into<String>) {
        self.state
            .write()
            .unwrap()
            .failing_addresses
            .insert(address.into());
    }

    /// Messages delivered so far, in order.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.state.read().unwrap().sent.clone()
    }

    pub fn sent_to(&self, address: &str) -> Vec<EmailMessage> {
        self.state
            .read()
            .unwrap()
            .sent
            .iter()
            .filter(|message| message.to == address)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EmailTransport for InMemoryTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail {
            return Err(NotificationError::Unavailable(format!(
                "{} transport is down",
                self.name
            )));
        }
        if state.failing_addresses.contains(&message.to) {
            return Err(NotificationError::Unavailable(format!(
                "{} transport rejected {}",
                self.name, message.to
            )));
        }
        state.sent.push(message.clone());
        Ok(())
    }
}
