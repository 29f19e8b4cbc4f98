//! Observable preference store
//!
//! A [`PreferenceStore`] holds one value out of the fixed set declared by its
//! [`PreferenceDef`]. The value is seeded from [`Storage`] when a valid entry
//! exists there, otherwise from the definition's default.
//!
//! Every accepted `set` writes through to storage (best effort) and updates
//! the in-memory value under one lock, then calls each subscriber in
//! subscription order. Callbacks run without any internal lock held, so they
//! may read the store, subscribe, release handles or `set` again.
//!
//! Notifications are queued. A `set` issued while subscribers are being
//! notified (from a callback, or from another thread) only enqueues its value;
//! the caller already delivering drains the queue in order, so every
//! subscriber hears the latest value last.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::storage::Storage;
use crate::values::PreferenceValue;
use crate::PreferenceError;

/// Subscriber callback, called with the current value.
pub type Callback = Arc<dyn Fn(&str) + Send + Sync>;

/// Declaration of a preference: storage key, allowed values and default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreferenceDef {
    key: Cow<'static, str>,
    allowed: Vec<Cow<'static, str>>,
    default: usize,
}

impl PreferenceDef {
    /// Fails when `allowed` is empty, contains duplicates, or does not
    /// contain `default`.
    pub fn new<I, S>(
        key: impl Into<Cow<'static, str>>,
        allowed: I,
        default: &str,
    ) -> Result<Self, PreferenceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        let key = key.into();
        let allowed: Vec<Cow<'static, str>> = allowed.into_iter().map(Into::into).collect();
        let invalid = |reason: String| PreferenceError::InvalidDefinition {
            key: key.to_string(),
            reason,
        };

        if allowed.is_empty() {
            return Err(invalid("no allowed values".to_string()));
        }
        for (i, v) in allowed.iter().enumerate() {
            if allowed[..i].contains(v) {
                return Err(invalid(format!("duplicate value `{v}`")));
            }
        }
        let Some(default) = allowed.iter().position(|v| v == default) else {
            return Err(invalid(format!("default `{default}` is not allowed")));
        };

        Ok(Self {
            key,
            allowed,
            default,
        })
    }

    pub(crate) fn from_kind<T: PreferenceValue>() -> Self {
        Self {
            key: Cow::Borrowed(T::KEY),
            allowed: T::ALL.iter().map(|v| Cow::Borrowed(v.as_str())).collect(),
            default: T::ALL.iter().position(|v| *v == T::DEFAULT).unwrap_or(0),
        }
    }

    /// Replace the default with another allowed value.
    pub fn with_default(mut self, default: &str) -> Result<Self, PreferenceError> {
        self.default = self.position(default).ok_or_else(|| self.not_allowed(default))?;
        Ok(self)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn allowed(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(|v| v.as_ref())
    }

    pub fn default_value(&self) -> &str {
        &self.allowed[self.default]
    }

    pub fn contains(&self, value: &str) -> bool {
        self.position(value).is_some()
    }

    fn position(&self, value: &str) -> Option<usize> {
        self.allowed.iter().position(|v| v == value)
    }

    fn not_allowed(&self, value: &str) -> PreferenceError {
        PreferenceError::NotAllowed {
            key: self.key.to_string(),
            value: value.to_string(),
            allowed: self.allowed().map(str::to_string).collect(),
        }
    }
}

struct Inner {
    def: PreferenceDef,
    /// Index into `def.allowed`
    current: usize,
    subscribers: IndexMap<u64, Callback>,
    next_subscriber: u64,
    /// Committed values not yet delivered to subscribers
    pending: VecDeque<usize>,
    /// Some caller is draining `pending`
    notifying: bool,
}

impl Inner {
    fn value(&self) -> &str {
        &self.def.allowed[self.current]
    }
}

struct Shared {
    storage: Arc<dyn Storage>,
    inner: Mutex<Inner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A persisted, observable preference.
///
/// Clones are handles to the same preference.
#[derive(Clone)]
pub struct PreferenceStore {
    shared: Arc<Shared>,
}

impl PreferenceStore {
    /// Create the store, seeding its value from `storage`.
    ///
    /// A missing entry, an entry outside the allowed set and a storage read
    /// error all fall back to the definition's default.
    pub fn init(def: PreferenceDef, storage: Arc<dyn Storage>) -> Self {
        let current = match storage.get_item(def.key()) {
            Ok(Some(stored)) => match def.position(&stored) {
                Some(index) => index,
                None => {
                    debug!(key = def.key(), %stored, "ignoring stored value outside allowed set");
                    def.default
                }
            },
            Ok(None) => def.default,
            Err(e) => {
                debug!(key = def.key(), error = %e, "storage read failed, using default");
                def.default
            }
        };

        debug!(
            key = def.key(),
            value = %def.allowed[current],
            "PreferenceStore::init"
        );

        Self {
            shared: Arc::new(Shared {
                storage,
                inner: Mutex::new(Inner {
                    def,
                    current,
                    subscribers: IndexMap::new(),
                    next_subscriber: 0,
                    pending: VecDeque::new(),
                    notifying: false,
                }),
            }),
        }
    }

    /// Build the definition from parts and [`init`](Self::init) it.
    pub fn with_values<I, S>(
        key: impl Into<Cow<'static, str>>,
        allowed: I,
        default: &str,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, PreferenceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Ok(Self::init(PreferenceDef::new(key, allowed, default)?, storage))
    }

    /// Store for one of the enum-backed preference kinds.
    pub fn for_kind<T: PreferenceValue>(storage: Arc<dyn Storage>) -> Self {
        Self::init(T::definition(), storage)
    }

    pub fn key(&self) -> String {
        self.shared.lock().def.key().to_string()
    }

    pub fn definition(&self) -> PreferenceDef {
        self.shared.lock().def.clone()
    }

    /// Current value.
    pub fn get(&self) -> String {
        self.shared.lock().value().to_string()
    }

    /// Current value as an enum-backed kind, `None` if it does not parse.
    pub fn get_as<T: PreferenceValue>(&self) -> Option<T> {
        T::from_wire(self.shared.lock().value())
    }

    /// Set a new value.
    ///
    /// A value outside the allowed set is rejected: nothing is written,
    /// nobody is notified and the value is unchanged.
    pub fn set(&self, value: &str) -> Result<(), PreferenceError> {
        let index = {
            let inner = self.shared.lock();
            inner
                .def
                .position(value)
                .ok_or_else(|| inner.def.not_allowed(value))?
        };
        self.commit(index);
        Ok(())
    }

    pub fn set_as<T: PreferenceValue>(&self, value: T) -> Result<(), PreferenceError> {
        self.set(value.as_str())
    }

    /// Switch to the next allowed value (the other one, for two-valued
    /// preferences) and return it.
    pub fn toggle(&self) -> String {
        let index = {
            let inner = self.shared.lock();
            (inner.current + 1) % inner.def.allowed.len()
        };
        self.commit(index)
    }

    /// Register `callback`. It is called with the current value right away,
    /// then after every change until the returned [`Subscription`] is released
    /// or dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        let (id, value) = {
            let mut inner = self.shared.lock();
            let id = inner.next_subscriber;
            inner.next_subscriber += 1;
            inner.subscribers.insert(id, Arc::clone(&callback));
            (id, inner.value().to_string())
        };

        callback(&value);

        Subscription {
            shared: Arc::downgrade(&self.shared),
            id: Some(id),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.lock().subscribers.len()
    }

    fn commit(&self, index: usize) -> String {
        let value = {
            let mut inner = self.shared.lock();
            let value = inner.def.allowed[index].to_string();

            // Storage never calls back into the store, so it is written under
            // the lock and always agrees with `current`.
            if let Err(e) = self.shared.storage.set_item(inner.def.key(), &value) {
                warn!(key = inner.def.key(), %value, error = %e, "failed to persist preference");
            }
            if inner.current != index {
                debug!(
                    key = inner.def.key(),
                    from = %inner.value(),
                    to = %value,
                    "PreferenceStore::set"
                );
            }
            inner.current = index;
            inner.pending.push_back(index);

            if inner.notifying {
                return value;
            }
            inner.notifying = true;
            value
        };

        self.deliver();
        value
    }

    /// Drain queued values, calling every subscriber for each one.
    fn deliver(&self) {
        let _reset = DeliveryGuard(&self.shared);
        loop {
            let (value, callbacks) = {
                let mut inner = self.shared.lock();
                let Some(index) = inner.pending.pop_front() else {
                    inner.notifying = false;
                    return;
                };
                let callbacks: SmallVec<[Callback; 4]> =
                    inner.subscribers.values().cloned().collect();
                (inner.def.allowed[index].to_string(), callbacks)
            };

            for callback in &callbacks {
                callback(&value);
            }
        }
    }
}

/// Clears the delivery state when a subscriber panics, so later sets still
/// notify.
struct DeliveryGuard<'a>(&'a Shared);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut inner = self.0.lock();
            inner.pending.clear();
            inner.notifying = false;
        }
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("PreferenceStore")
            .field("key", &inner.def.key())
            .field("value", &inner.value())
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// Registration handle returned by [`PreferenceStore::subscribe`].
///
/// Dropping it unregisters the callback.
pub struct Subscription {
    shared: Weak<Shared>,
    id: Option<u64>,
}

impl Subscription {
    /// Unregister the callback.
    pub fn release(self) {}

    /// Keep the callback registered for the lifetime of the store.
    pub fn detach(mut self) {
        self.id = None;
    }

    pub fn is_active(&self) -> bool {
        match (self.id, self.shared.upgrade()) {
            (Some(id), Some(shared)) => shared.lock().subscribers.contains_key(&id),
            _ => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(shared) = self.shared.upgrade() {
            shared.lock().subscribers.shift_remove(&id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
