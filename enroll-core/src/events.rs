use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{RequestContext, User, error::EventError};

/// Represents events that can be emitted by the event bus
///
/// Every event carries the affected user, the request that caused it, and the
/// identity of the component that emitted it.
#[derive(Debug, Clone)]
pub enum Event {
    /// A new inactive account was created and its activation email sent
    UserRegistered {
        user: User,
        request: RequestContext,
        sender: &'static str,
    },

    /// An account was activated with its activation key
    UserActivated {
        user: User,
        request: RequestContext,
        sender: &'static str,
    },
}

impl Event {
    pub fn user(&self) -> &User {
        match self {
            Event::UserRegistered { user, .. } | Event::UserActivated { user, .. } => user,
        }
    }

    pub fn sender(&self) -> &'static str {
        match self {
            Event::UserRegistered { sender, .. } | Event::UserActivated { sender, .. } => sender,
        }
    }
}

/// A trait for handling events emitted by the event bus
///
/// Handlers run in registration order. An error stops delivery to the remaining
/// handlers and is returned to whoever emitted the event.
///
/// # Examples
///
/// ```
/// # use enroll_core::{error::EventError, events::{Event, EventHandler}};
/// # use async_trait::async_trait;
/// struct WelcomeLogger;
///
/// #[async_trait]
/// impl EventHandler for WelcomeLogger {
///     async fn handle_event(&self, event: &Event) -> Result<(), EventError> {
///         if let Event::UserRegistered { user, .. } = event {
///             println!("welcome {}", user.username);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle_event(&self, event: &Event) -> Result<(), EventError>;
}

/// Event bus that can emit events and register event handlers
///
/// Clones share the same handler list.
#[derive(Clone)]
pub struct EventBus {
    handlers: Arc<RwLock<Vec<Arc<dyn EventHandler>>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register an event handler with the event bus
    pub async fn register(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.write().await.push(handler);
    }

    pub async fn handler_count(&self) -> usize {
        self.handlers.read().await.len()
    }

    /// Emit an event to all registered handlers, stopping at the first error
    pub async fn emit(&self, event: &Event) -> Result<(), EventError> {
        for handler in self.handlers.read().await.iter() {
            handler.handle_event(event).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        call_count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle_event(&self, _event: &Event) -> Result<(), EventError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ErroringEventHandler;

    #[async_trait]
    impl EventHandler for ErroringEventHandler {
        async fn handle_event(&self, _event: &Event) -> Result<(), EventError> {
            Err(EventError::HandlerError("Test error".into()))
        }
    }

    fn registered_event() -> Event {
        let user = User::builder()
            .username("alice".to_string())
            .email("alice@example.com".to_string())
            .build()
            .expect("Failed to build test user");

        Event::UserRegistered {
            user,
            request: RequestContext::new("example.com"),
            sender: "tests",
        }
    }

    #[tokio::test]
    async fn test_event_bus_empty() {
        let event_bus = EventBus::default();

        event_bus
            .emit(&registered_event())
            .await
            .expect("Failed to emit event");
    }

    #[tokio::test]
    async fn test_event_bus_multiple_handlers() {
        let event_bus = EventBus::default();
        let count1 = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::new(AtomicUsize::new(0));

        event_bus
            .register(Arc::new(CountingHandler {
                call_count: count1.clone(),
            }))
            .await;
        event_bus
            .register(Arc::new(CountingHandler {
                call_count: count2.clone(),
            }))
            .await;
        assert_eq!(event_bus.handler_count().await, 2);

        event_bus
            .emit(&registered_event())
            .await
            .expect("Failed to emit event");

        assert_eq!(count1.load(Ordering::SeqCst), 1);
        assert_eq!(count2.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_event_bus_error_stops_delivery() {
        let event_bus = EventBus::default();
        let count = Arc::new(AtomicUsize::new(0));

        event_bus.register(Arc::new(ErroringEventHandler)).await;
        event_bus
            .register(Arc::new(CountingHandler {
                call_count: count.clone(),
            }))
            .await;

        let result = event_bus.emit(&registered_event()).await;
        assert!(matches!(result, Err(EventError::HandlerError(_))));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clones_share_handlers() {
        let event_bus = EventBus::default();
        let clone = event_bus.clone();
        let count = Arc::new(AtomicUsize::new(0));

        clone
            .register(Arc::new(CountingHandler {
                call_count: count.clone(),
            }))
            .await;
        event_bus.emit(&registered_event()).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_accessors() {
        let event = registered_event();
        assert_eq!(event.user().username, "alice");
        assert_eq!(event.sender(), "tests");
    }
}
