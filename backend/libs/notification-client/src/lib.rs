//! Client side of the notification pipeline
//!
//! ```text
//! broker ──new-notification──> ClientSubscriber ──Command::Append──┐
//!                                                                  ├──> NotificationSession ──> Projection
//! user: mark_all_as_read / toggle_notifications ──Command::*───────┘      (owns NotificationStore)
//! ```
//!
//! All state changes go through the session's command queue and are applied one at a
//! time, so the unread counter and the item list are never observed out of step.

pub mod api;
pub mod config;
pub mod error;
pub mod notification;
pub mod session;
pub mod store;
pub mod subscriber;
pub mod system;

pub use api::{NotificationApi, SendRequest};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use notification::{Notification, NotificationId, DEFAULT_MESSAGE, DEFAULT_TITLE};
pub use session::{Command, CommandSender, NotificationSession, SessionHandle};
pub use store::{NotificationStore, Projection};
pub use subscriber::{ClientSubscriber, SubscriberState};
pub use system::NotificationSystem;
