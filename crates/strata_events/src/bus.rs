//! Named-channel publish/subscribe.
//!
//! Channels must be registered before anyone can subscribe or publish.
//! Delivery is synchronous and follows subscription order. Subscribers are
//! not isolated from one another: the first failing subscriber stops
//! delivery and its error is returned from `publish`. Callers that want
//! isolation wrap their handlers themselves.
//!
//! Each publish delivers to a snapshot of the channel's subscribers taken
//! when it starts. A subscriber may publish again, on the same channel or
//! another, and may subscribe new handlers; those run from the next
//! publish on.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use strata_foundation::{Error, Result};
use tracing::{debug, trace};

/// Event subscriber. Receives the bus context and the event being delivered.
///
/// Subscribers are shared so a publish can snapshot them cheaply. Keep any
/// mutable state behind a `Cell` or `RefCell`.
pub type Handler<C> = Rc<dyn Fn(&mut C, &Event<'_>) -> Result<()>>;

/// An event in flight: the channel name and its payload.
///
/// The payload is passed through untouched. A subscriber asking for a
/// payload type the publisher did not send gets `PayloadMismatch`, so
/// signature mismatches surface at publish time.
#[derive(Clone, Copy)]
pub struct Event<'a> {
    channel: &'a str,
    payload: &'a dyn Any,
}

impl<'a> Event<'a> {
    /// Creates an event for `channel` carrying `payload`.
    #[must_use]
    pub fn new(channel: &'a str, payload: &'a dyn Any) -> Self {
        Self { channel, payload }
    }

    /// Returns the channel name.
    #[must_use]
    pub fn channel(&self) -> &'a str {
        self.channel
    }

    /// Returns the payload as `T`.
    ///
    /// # Errors
    ///
    /// Returns `PayloadMismatch` if the payload is not a `T`.
    pub fn payload<T: Any>(&self) -> Result<&'a T> {
        self.payload
            .downcast_ref::<T>()
            .ok_or_else(|| Error::payload_mismatch(self.channel, std::any::type_name::<T>()))
    }

    /// Returns the untyped payload.
    #[must_use]
    pub fn payload_any(&self) -> &'a dyn Any {
        self.payload
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// Registry of named channels and their subscribers.
///
/// `C` is the context every subscriber receives mutably during delivery.
pub struct EventBus<C> {
    channels: BTreeMap<String, Vec<Handler<C>>>,
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.channels
                    .iter()
                    .map(|(name, subscribers)| (name, subscribers.len())),
            )
            .finish()
    }
}

impl<C> EventBus<C> {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: BTreeMap::new(),
        }
    }

    /// Registers a channel with no subscribers.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateChannel` if `name` is already registered.
    pub fn register_event(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.channels.contains_key(&name) {
            return Err(Error::duplicate_channel(name));
        }
        debug!(channel = %name, "event channel registered");
        self.channels.insert(name, Vec::new());
        Ok(())
    }

    /// Appends a subscriber to a channel.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChannel` if `name` was never registered.
    pub fn subscribe<F>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut C, &Event<'_>) -> Result<()> + 'static,
    {
        self.subscribe_handler(name, Rc::new(handler))
    }

    /// Appends an already shared subscriber to a channel.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChannel` if `name` was never registered.
    pub fn subscribe_handler(&mut self, name: &str, handler: Handler<C>) -> Result<()> {
        let subscribers = self
            .channels
            .get_mut(name)
            .ok_or_else(|| Error::unknown_channel(name))?;
        subscribers.push(handler);
        trace!(channel = name, subscribers = subscribers.len(), "subscribed");
        Ok(())
    }

    /// Delivers `payload` to every subscriber of `name`, in order.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChannel` if `name` was never registered, or the
    /// first error returned by a subscriber.
    pub fn publish(&self, ctx: &mut C, name: &str, payload: &dyn Any) -> Result<()> {
        let subscribers = self.subscribers(name)?;
        deliver(&subscribers, ctx, &Event::new(name, payload))
    }

    /// Publishes through a bus owned by the context itself.
    ///
    /// `bus` locates the bus inside `ctx`. Subscribers receive `ctx` mutably,
    /// so they may publish or subscribe through it while delivery runs.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChannel` if `name` was never registered, or the
    /// first error returned by a subscriber.
    pub fn publish_in<F>(ctx: &mut C, bus: F, name: &str, payload: &dyn Any) -> Result<()>
    where
        F: Fn(&C) -> &EventBus<C>,
    {
        let subscribers = bus(&*ctx).subscribers(name)?;
        deliver(&subscribers, ctx, &Event::new(name, payload))
    }

    /// Returns a snapshot of the subscribers of `name`, in order.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChannel` if `name` was never registered.
    pub fn subscribers(&self, name: &str) -> Result<Vec<Handler<C>>> {
        self.channels
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_channel(name))
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Returns the number of subscribers on `name`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChannel` if `name` was never registered.
    pub fn subscriber_count(&self, name: &str) -> Result<usize> {
        self.channels
            .get(name)
            .map(Vec::len)
            .ok_or_else(|| Error::unknown_channel(name))
    }

    /// Iterates registered channel names in sorted order.
    pub fn channels(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.keys().map(String::as_str)
    }
}

/// Runs `subscribers` in order against `event`, stopping at the first failure.
fn deliver<C>(subscribers: &[Handler<C>], ctx: &mut C, event: &Event<'_>) -> Result<()> {
    for (index, handler) in subscribers.iter().enumerate() {
        trace!(channel = event.channel(), subscriber = index, "delivering event");
        handler(ctx, event)
            .map_err(|e| e.with_frame(format!("event `{}` subscriber {index}", event.channel())))?;
    }
    Ok(())
}
