//! Client library for the classroom drill platform.
//!
//! The backend owns authentication, persisted scores and transfer
//! workflows; this crate carries the client-side pieces: deterministic
//! drill ordering and scoring, per-user classroom preferences, and the
//! notification cache with its polling task.

pub mod api;
pub mod config;
pub mod drill;
pub mod error;
pub mod logging;
pub mod notifications;
pub mod preferences;
pub mod storage;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use notifications::{NotificationCenter, NotificationPoller, NotificationSource};
pub use preferences::ClassroomPreferences;
