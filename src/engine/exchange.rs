//! Registry of securities and the shared ledger.
//!
//! The exchange is the request entry point. Each security sits behind its
//! own mutex, held for the whole request including the activation cascade,
//! so requests for different instruments run in parallel while requests for
//! one instrument are serialized.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::engine::security::Security;
use crate::engine::validation::validate_enter_order;
use crate::error::{RegistryError, RejectReason, ValidationError};
use crate::ledger::Ledger;
use crate::types::{DeleteOrderRq, EnterOrderRq, Event};

/// Securities by isin, plus the broker/shareholder ledger they share.
#[derive(Debug, Default)]
pub struct Exchange {
    securities: RwLock<HashMap<String, Arc<Mutex<Security>>>>,
    ledger: Ledger,
    config: EngineConfig,
}

impl Exchange {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            securities: RwLock::new(HashMap::new()),
            ledger: Ledger::new(),
            config,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register a security, optionally with a reference market price for
    /// stop orders entered before its first trade. An isin is registered at
    /// most once, so reservations held by resting orders are never orphaned.
    pub fn add_security(
        &self,
        isin: &str,
        market_price: Option<u64>,
    ) -> Result<Arc<Mutex<Security>>, RegistryError> {
        let mut securities = self.securities.write();
        if securities.contains_key(isin) {
            warn!(isin, "security already registered");
            return Err(RegistryError::DuplicateSecurity(isin.to_string()));
        }

        let mut security = Security::with_capacity(
            isin,
            self.config.order_capacity,
            self.config.stop_order_capacity,
        );
        if let Some(price) = market_price {
            security = security.with_market_price(price);
        }
        let security = Arc::new(Mutex::new(security));
        securities.insert(isin.to_string(), Arc::clone(&security));
        info!(isin, ?market_price, "security registered");
        Ok(security)
    }

    pub fn security(&self, isin: &str) -> Option<Arc<Mutex<Security>>> {
        self.securities.read().get(isin).cloned()
    }

    /// Handle a new-order or update-order request.
    pub fn handle_enter_order(&self, rq: &EnterOrderRq) -> Vec<Event> {
        let Some(security) = self.security(&rq.isin) else {
            let mut errors = validate_enter_order(rq, &self.ledger);
            errors.push(RejectReason::Validation(ValidationError::UnknownSecurity));
            warn!(isin = %rq.isin, order_id = rq.order_id, ?errors, "order rejected");
            return vec![Event::rejected(rq.request_id, rq.order_id, errors)];
        };
        let mut security = security.lock();
        security.enter_order(rq, &self.ledger)
    }

    /// Handle a delete-order request.
    pub fn handle_delete_order(&self, rq: &DeleteOrderRq) -> Vec<Event> {
        let Some(security) = self.security(&rq.isin) else {
            warn!(isin = %rq.isin, order_id = rq.order_id, "delete for unknown security");
            return vec![Event::rejected(
                rq.request_id,
                rq.order_id,
                vec![RejectReason::Validation(ValidationError::UnknownSecurity)],
            )];
        };
        let mut security = security.lock();
        security.delete_order(rq, &self.ledger)
    }
}
