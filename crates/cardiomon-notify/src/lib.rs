//! Alert delivery with pluggable channel support.
//!
//! The [`manager::NotificationManager`] is the engine's [`AlertSink`]: it
//! decorates each alert with a priority and repeat count, then routes it to
//! one or more [`NotificationChannel`] implementations. Built-in channels
//! write structured log events or JSON lines to a file.

pub mod channels;
pub mod decorator;
pub mod manager;
pub mod memory;
pub mod plugin;
pub mod routing;


use anyhow::Result;
use decorator::DecoratedAlert;

pub use cardiomon_common::sink::AlertSink;
pub use decorator::{AlertDecoration, Priority};
pub use manager::NotificationManager;
pub use memory::MemorySink;

/// A delivery channel for decorated alerts (e.g., log, file).
///
/// Implementations are created by the corresponding [`plugin::ChannelPlugin`]
/// and registered in the notification manager's routing table.
pub trait NotificationChannel: Send + Sync {
    /// Delivers the alert through this channel.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails. The manager logs it and carries on
    /// with the remaining channels.
    fn send(&self, alert: &DecoratedAlert) -> Result<()>;

    /// Returns the channel type name (e.g., `"log"`, `"file"`).
    fn channel_name(&self) -> &str;
}
