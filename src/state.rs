//! Shared application state.
//!
//! Every handle a component needs is built here at process start and passed
//! down explicitly — there are no global connection or client singletons.
//! Wrapped in `Arc` at startup so all request workers share one instance.
//!
//! Each operation opens its own short-lived SQLite connection via
//! `open_db()`; workers never share a connection, and the slot ledger's
//! read-modify-write runs unsynchronized across them.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::auth::{Principal, TokenStore};
use crate::avatars::{AvatarError, AvatarStore};
use crate::booking::BookingService;
use crate::config::Config;
use crate::db::{self, DatabaseError};
use crate::payments::{RazorpayClient, StripeClient};
use crate::slots::SlotLedger;

/// Errors from AppState construction and access.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Avatar store error: {0}")]
    Avatars(#[from] AvatarError),
    #[error("Data directory error: {0}")]
    DataDir(#[from] std::io::Error),
}

pub struct AppState {
    pub config: Config,
    db_path: PathBuf,
    pub booking: BookingService,
    pub avatars: AvatarStore,
    pub razorpay: Option<RazorpayClient>,
    pub stripe: Option<StripeClient>,
    tokens: RwLock<TokenStore>,
}

impl AppState {
    /// Build the process-wide state: create the data directory, run
    /// migrations once, and construct every collaborator from the config.
    pub fn new(config: Config) -> Result<Self, StateError> {
        std::fs::create_dir_all(&config.data_dir)?;
        let db_path = config.db_path();
        // Open once up front so migrations run before the first request.
        db::open_database(&db_path)?;

        let avatars = AvatarStore::open(&config.avatars_dir())?;
        let razorpay = match (&config.razorpay_key_id, &config.razorpay_key_secret) {
            (Some(id), Some(secret)) => Some(RazorpayClient::new(
                id.clone(),
                secret.clone(),
                config.currency.clone(),
            )),
            _ => None,
        };
        let stripe = config
            .stripe_secret_key
            .as_ref()
            .map(|key| StripeClient::new(key.clone(), config.currency.clone()));

        Ok(Self {
            config,
            db_path,
            booking: BookingService::new(SlotLedger::new()),
            avatars,
            razorpay,
            stripe,
            tokens: RwLock::new(TokenStore::new()),
        })
    }

    /// Open a database connection for the current operation.
    pub fn open_db(&self) -> Result<rusqlite::Connection, StateError> {
        db::open_database(&self.db_path).map_err(StateError::Database)
    }

    pub fn issue_token(&self, principal: Principal) -> Result<String, StateError> {
        let mut tokens = self.tokens.write().map_err(|_| StateError::LockPoisoned)?;
        Ok(tokens.issue(principal))
    }

    pub fn verify_token(&self, token: &str) -> Option<Principal> {
        self.tokens
            .read()
            .ok()
            .and_then(|tokens| tokens.verify(token))
    }
}
