//! Env-driven service configuration.
//!
//! Everything the process needs is read once at startup and carried in a
//! `Config` passed to the components that use it — no globals.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medibook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn default_log_filter() -> &'static str {
    "info,medibook=debug"
}

/// Get the default application data directory
/// ~/Medibook/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join("Medibook")
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub admin_email: String,
    pub admin_password: String,
    pub currency: String,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub stripe_secret_key: Option<String>,
}

impl Config {
    /// Load from the environment. Unset variables fall back to development
    /// defaults; payment keys stay `None` until provided.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Config rooted at an explicit data directory (tests, embedded use).
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        let mut config = Self::from_lookup(|_| None);
        config.data_dir = data_dir;
        config
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("MEDIBOOK_BIND")
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| "127.0.0.1:4000".parse().expect("static addr"));
        let data_dir = lookup("MEDIBOOK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(app_data_dir);

        Self {
            bind_addr,
            data_dir,
            admin_email: lookup("ADMIN_EMAIL").unwrap_or_else(|| "admin@medibook.local".into()),
            admin_password: lookup("ADMIN_PASSWORD").unwrap_or_else(|| "change-me".into()),
            currency: lookup("CURRENCY").unwrap_or_else(|| "usd".into()),
            razorpay_key_id: lookup("RAZORPAY_KEY_ID"),
            razorpay_key_secret: lookup("RAZORPAY_KEY_SECRET"),
            stripe_secret_key: lookup("STRIPE_SECRET_KEY"),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("medibook.db")
    }

    pub fn avatars_dir(&self) -> PathBuf {
        self.data_dir.join("avatars")
    }
}
