//! Checkout session collaborator
//!
//! The payment processor is an external collaborator reached through two
//! opaque operations: create a session (returns a redirect URL and id) and
//! retrieve a session's payment status by id. `CheckoutService` is that
//! seam; `SessionLedger` is the in-process implementation that issues ids
//! and tracks status. Webhook and signature verification belong to the
//! processor side and are out of scope here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("unknown checkout session: {0}")]
    UnknownSession(String),

    #[error("checkout service unavailable")]
    Unavailable,
}

/// Payment status of a checkout session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Open,
    Paid,
}

/// A created or retrieved checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Where to send the visitor to complete payment
    pub url: String,
    pub status: PaymentStatus,
}

/// The two opaque operations the site needs from the payment side
pub trait CheckoutService: Send + Sync {
    /// Create a session; no input is required.
    fn create_session(&self) -> Result<CheckoutSession, CheckoutError>;

    /// Retrieve a session's payment status by identifier
    fn retrieve_session(&self, id: &str) -> Result<CheckoutSession, CheckoutError>;
}

/// In-process session issuer and status ledger
pub struct SessionLedger {
    base_url: String,
    counter: AtomicU64,
    sessions: Mutex<HashMap<String, PaymentStatus>>,
}

impl SessionLedger {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            counter: AtomicU64::new(0),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn session_url(&self, id: &str) -> String {
        format!("{}/success?session_id={}", self.base_url, id)
    }

    /// Record processor confirmation for a session. This is where a real
    /// integration's completed-checkout event would land.
    pub fn mark_paid(&self, id: &str) -> Result<(), CheckoutError> {
        let mut sessions = self.sessions.lock().map_err(|_| CheckoutError::Unavailable)?;
        match sessions.get_mut(id) {
            Some(status) => {
                *status = PaymentStatus::Paid;
                tracing::info!("checkout session {} paid", id);
                Ok(())
            }
            None => Err(CheckoutError::UnknownSession(id.to_string())),
        }
    }
}

impl CheckoutService for SessionLedger {
    fn create_session(&self) -> Result<CheckoutSession, CheckoutError> {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let id = format!(
            "cs_{}_{}",
            chrono::Local::now().format("%Y%m%d%H%M%S"),
            seq
        );

        let mut sessions = self.sessions.lock().map_err(|_| CheckoutError::Unavailable)?;
        sessions.insert(id.clone(), PaymentStatus::Open);

        Ok(CheckoutSession {
            url: self.session_url(&id),
            id,
            status: PaymentStatus::Open,
        })
    }

    fn retrieve_session(&self, id: &str) -> Result<CheckoutSession, CheckoutError> {
        let sessions = self.sessions.lock().map_err(|_| CheckoutError::Unavailable)?;
        let status = sessions
            .get(id)
            .copied()
            .ok_or_else(|| CheckoutError::UnknownSession(id.to_string()))?;

        Ok(CheckoutSession {
            id: id.to_string(),
            url: self.session_url(id),
            status,
        })
    }
}
