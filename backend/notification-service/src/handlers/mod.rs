/// HTTP handlers for notification service API
pub mod notifications;

pub use notifications::*;
