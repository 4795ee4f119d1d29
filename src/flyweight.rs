//! Flyweight: one shared copy of the intrinsic state per distinct key.
//!
//! A car is split into what many cars have in common (brand, model, color)
//! and what only it has (owner, plates). The registry interns the common part;
//! callers bring the unique part along every time they use a flyweight.

use crate::error::{PatternError, Result};
use crate::output::Sink;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fmt;
use std::rc::Rc;

pub const DEFAULT_SEPARATOR: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct SharedState {
    pub brand: String,
    pub model: String,
    pub color: String,
}

impl SharedState {
    pub fn new(
        brand: impl Into<String>,
        model: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        SharedState {
            brand: brand.into(),
            model: model.into(),
            color: color.into(),
        }
    }

    /// Field order matters: `[a, b, c]` and `[b, a, c]` are different keys.
    pub fn key(&self, separator: &str) -> String {
        [
            self.brand.as_str(),
            self.model.as_str(),
            self.color.as_str(),
        ]
        .join(separator)
    }
}

impl fmt::Display for SharedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {}, {}, {} ]", self.brand, self.model, self.color)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueState {
    pub owner: String,
    pub plates: String,
}

impl UniqueState {
    pub fn new(owner: impl Into<String>, plates: impl Into<String>) -> Self {
        UniqueState {
            owner: owner.into(),
            plates: plates.into(),
        }
    }
}

impl fmt::Display for UniqueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {}, {} ]", self.owner, self.plates)
    }
}

/// Handle to an interned [`SharedState`]. Clones point at the same storage.
#[derive(Debug, Clone)]
pub struct Flyweight {
    shared: Rc<SharedState>,
}

impl Flyweight {
    fn new(shared: SharedState) -> Self {
        Flyweight {
            shared: Rc::new(shared),
        }
    }

    pub fn shared_state(&self) -> &SharedState {
        &self.shared
    }

    pub fn ptr_eq(&self, other: &Flyweight) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    pub fn describe(&self, unique: &UniqueState) -> String {
        format!(
            "Flyweight: Displaying shared ({}) and unique ({}) state.",
            self.shared, unique
        )
    }

    /// Combines intrinsic and extrinsic state. The shared part is only read.
    pub fn operation(&self, unique: &UniqueState, sink: &dyn Sink) {
        sink.line(&self.describe(unique));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Created,
    Reused,
}

impl Lookup {
    pub fn message(self) -> &'static str {
        match self {
            Lookup::Created => "FlyweightFactory: Can't find a flyweight, creating a new one.",
            Lookup::Reused => "FlyweightFactory: Reusing existing flyweight.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Interned {
    pub flyweight: Flyweight,
    pub lookup: Lookup,
}

pub struct FlyweightRegistry {
    separator: String,
    flyweights: FxHashMap<String, Flyweight>,
}

impl FlyweightRegistry {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        FlyweightRegistry {
            separator: separator.into(),
            flyweights: FxHashMap::default(),
        }
    }

    /// Pre-populates the cache. Repeated states collapse into one entry.
    pub fn with_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = SharedState>,
    {
        let mut registry = Self::new();
        registry.extend(states);
        registry
    }

    pub fn extend<I>(&mut self, states: I)
    where
        I: IntoIterator<Item = SharedState>,
    {
        for state in states {
            self.intern(&state);
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn key_of(&self, state: &SharedState) -> String {
        state.key(&self.separator)
    }

    pub fn contains(&self, state: &SharedState) -> bool {
        self.flyweights.contains_key(&self.key_of(state))
    }

    pub fn intern(&mut self, state: &SharedState) -> Interned {
        let key = self.key_of(state);
        if let Some(existing) = self.flyweights.get(&key) {
            tracing::debug!(%key, "reusing flyweight");
            return Interned {
                flyweight: existing.clone(),
                lookup: Lookup::Reused,
            };
        }

        tracing::debug!(%key, total = self.flyweights.len() + 1, "creating flyweight");
        let flyweight = Flyweight::new(state.clone());
        self.flyweights.insert(key, flyweight.clone());
        Interned {
            flyweight,
            lookup: Lookup::Created,
        }
    }

    pub fn apply(&self, flyweight: &Flyweight, unique: &UniqueState, sink: &dyn Sink) {
        flyweight.operation(unique, sink);
    }

    pub fn count(&self) -> usize {
        self.flyweights.len()
    }

    pub fn keys(&self) -> Vec<String> {
        self.flyweights.keys().sorted().cloned().collect()
    }

    pub fn list_flyweights(&self, sink: &dyn Sink) {
        sink.line(&format!("\nFlyweightFactory: I have {} flyweights:", self.count()));
        for key in self.keys() {
            sink.line(&key);
        }
    }
}

impl Default for FlyweightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A registry that refuses to grow past a fixed number of entries.
pub struct BoundedRegistry {
    inner: FlyweightRegistry,
    capacity: usize,
}

impl BoundedRegistry {
    pub fn new(inner: FlyweightRegistry, capacity: usize) -> Result<Self> {
        if inner.count() > capacity {
            return Err(PatternError::invalid_config(
                "flyweight.capacity",
                format!(
                    "{} preloaded flyweights do not fit in {}",
                    inner.count(),
                    capacity
                ),
            ));
        }
        Ok(BoundedRegistry { inner, capacity })
    }

    /// Reuse always succeeds; only a miss on a full registry fails.
    pub fn try_intern(&mut self, state: &SharedState) -> Result<Interned> {
        if !self.inner.contains(state) && self.inner.count() >= self.capacity {
            let key = self.inner.key_of(state);
            tracing::debug!(%key, capacity = self.capacity, "flyweight registry full");
            return Err(PatternError::CapacityExceeded {
                capacity: self.capacity,
                key,
            });
        }
        Ok(self.inner.intern(state))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn registry(&self) -> &FlyweightRegistry {
        &self.inner
    }
}

/// The client side of the demo: registers a car by pairing its shared model
/// data with the owner and plates.
pub fn add_car_to_police_database(
    registry: &mut FlyweightRegistry,
    sink: &dyn Sink,
    plates: &str,
    owner: &str,
    brand: &str,
    model: &str,
    color: &str,
) -> Interned {
    sink.line("\nClient: Adding a car to database.");
    let interned = registry.intern(&SharedState::new(brand, model, color));
    sink.line(interned.lookup.message());

    registry.apply(&interned.flyweight, &UniqueState::new(owner, plates), sink);
    interned
}
