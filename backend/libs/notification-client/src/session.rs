/// Session event loop
///
/// The session owns the `NotificationStore` and is the only place it is mutated.
/// Broker events and user actions arrive as `Command`s on one queue and are applied
/// strictly one after another. After each command a fresh `Projection` is published,
/// so readers only ever see the state between two commands.
use crate::error::{ClientError, Result};
use crate::notification::Notification;
use crate::store::{NotificationStore, Projection};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum Command {
    Append(Notification),
    MarkAllRead,
    ToggleVisibility,
}

pub type CommandSender = mpsc::UnboundedSender<Command>;

pub struct NotificationSession {
    store: NotificationStore,
    commands: mpsc::UnboundedReceiver<Command>,
    projection: watch::Sender<Projection>,
}

impl NotificationSession {
    pub fn new() -> (Self, SessionHandle) {
        let store = NotificationStore::new();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (projection_tx, projection_rx) = watch::channel(store.projection());

        let session = Self {
            store,
            commands: command_rx,
            projection: projection_tx,
        };
        let handle = SessionHandle {
            commands: command_tx,
            projection: projection_rx,
        };
        (session, handle)
    }

    /// Create a session and run it on its own task
    pub fn spawn() -> (SessionHandle, JoinHandle<()>) {
        let (session, handle) = Self::new();
        (handle, tokio::spawn(session.run()))
    }

    /// Apply a single command to the store
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Append(notification) => {
                self.store.append(notification);
            }
            Command::MarkAllRead => {
                let marked = self.store.mark_all_read();
                debug!(marked, "Marked all notifications read");
            }
            Command::ToggleVisibility => {
                let visible = self.store.toggle_visibility();
                debug!(visible, "Toggled notification panel");
            }
        }
    }

    /// Process commands until every sender is gone
    pub async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.apply(command);
            self.projection.send_replace(self.store.projection());
        }

        debug!("Notification session ended");
    }
}

/// Cloneable front door to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: CommandSender,
    projection: watch::Receiver<Projection>,
}

impl SessionHandle {
    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    pub fn append(&self, notification: Notification) -> Result<()> {
        self.send(Command::Append(notification))
    }

    pub fn mark_all_read(&self) -> Result<()> {
        self.send(Command::MarkAllRead)
    }

    pub fn toggle_visibility(&self) -> Result<()> {
        self.send(Command::ToggleVisibility)
    }

    /// Latest published snapshot
    pub fn projection(&self) -> Projection {
        self.projection.borrow().clone()
    }

    /// Wait for the next snapshot
    pub async fn changed(&mut self) -> Result<Projection> {
        self.projection
            .changed()
            .await
            .map_err(|_| ClientError::SessionClosed)?;
        Ok(self.projection.borrow_and_update().clone())
    }

    /// Wait until a snapshot satisfies `predicate`
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Result<Projection>
    where
        F: FnMut(&Projection) -> bool,
    {
        loop {
            {
                let current = self.projection.borrow_and_update();
                if predicate(&current) {
                    return Ok(current.clone());
                }
            }
            self.projection
                .changed()
                .await
                .map_err(|_| ClientError::SessionClosed)?;
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| ClientError::SessionClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sequence() {
        let (mut session, handle) = NotificationSession::new();

        session.apply(Command::Append(Notification::new("a", "1")));
        session.apply(Command::Append(Notification::new("b", "2")));
        session.apply(Command::MarkAllRead);
        session.apply(Command::Append(Notification::new("c", "3")));
        session.apply(Command::ToggleVisibility);

        // Snapshots are only published by the run loop
        assert_eq!(handle.projection(), Projection::default());

        let projection = session.store.projection();
        assert_eq!(projection.items.len(), 3);
        assert_eq!(projection.unread_count, 1);
        assert_eq!(projection.items[0].title, "c");
        assert!(projection.visible);
    }

    #[tokio::test]
    async fn test_run_publishes_after_each_command() {
        let (mut handle, task) = NotificationSession::spawn();

        handle.append(Notification::new("Hi", "There")).unwrap();
        let projection = handle.wait_for(|p| p.unread_count == 1).await.unwrap();
        assert_eq!(projection.items[0].title, "Hi");

        handle.mark_all_read().unwrap();
        let projection = handle.wait_for(|p| p.unread_count == 0).await.unwrap();
        assert!(projection.items[0].read);

        handle.toggle_visibility().unwrap();
        let projection = handle.wait_for(|p| p.visible).await.unwrap();
        assert_eq!(projection.items.len(), 1);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_snapshots_are_always_consistent() {
        let (mut handle, _task) = NotificationSession::spawn();

        for idx in 0..50 {
            handle
                .append(Notification::new(format!("n{idx}"), "body"))
                .unwrap();
            if idx % 7 == 0 {
                handle.mark_all_read().unwrap();
            }
        }

        loop {
            let projection = handle.changed().await.unwrap();
            assert_eq!(projection.unread_count, projection.derived_unread_count());
            if projection.items.len() == 50 {
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_commands_after_session_end_fail() {
        let (session, handle) = NotificationSession::new();
        drop(session);

        assert!(matches!(
            handle.mark_all_read(),
            Err(ClientError::SessionClosed)
        ));
    }
}
