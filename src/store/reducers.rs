use crate::error::{Result, StoreError};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;

/// Type-erased reducer argument.
pub(crate) type Payload = Box<dyn Any + Send>;

/// A reducer as registered by the reducer creator, before interception.
pub(crate) type RawReducer<S> = Box<dyn Fn(&mut S, Payload) -> Result<()> + Send + Sync>;

/// A reducer after interception. Mutates, then notifies.
pub(crate) type WrappedReducer = Box<dyn Fn(Payload) -> Result<()> + Send + Sync>;

/// Builder handed to the reducer creator.
///
/// Reducers receive the store-owned state by `&mut` each time they are
/// called. A reducer with more than one argument takes a tuple payload.
///
/// # Examples
///
/// ```
/// use observable_store::create_store;
///
/// #[derive(Clone, PartialEq)]
/// struct Counter {
///     count: i32,
/// }
///
/// let store = create_store(Counter { count: 0 }, |reducers| {
///     reducers
///         .add("increment", |state: &mut Counter| state.count += 1)
///         .add_with("plus", |state: &mut Counter, amount: i32| state.count += amount)
/// })
/// .unwrap();
///
/// store.reducers().call("increment").unwrap();
/// store.reducers().call_with("plus", 4).unwrap();
/// assert_eq!(store.get_state().count, 5);
/// ```
pub struct ReducerSet<S> {
    entries: Vec<(String, RawReducer<S>)>,
}

impl<S: 'static> ReducerSet<S> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a reducer that takes no arguments.
    pub fn add<F>(mut self, name: impl Into<String>, reducer: F) -> Self
    where
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        let name = name.into();
        let reducer_name = name.clone();
        let raw: RawReducer<S> = Box::new(move |state: &mut S, payload: Payload| -> Result<()> {
            if !payload.is::<()>() {
                return Err(StoreError::PayloadMismatch {
                    reducer: reducer_name.clone(),
                    expected: type_name::<()>(),
                });
            }
            reducer(state);
            Ok(())
        });
        self.entries.push((name, raw));
        self
    }

    /// Register a reducer that takes a payload of type `P`.
    pub fn add_with<P, F>(mut self, name: impl Into<String>, reducer: F) -> Self
    where
        P: Any + Send,
        F: Fn(&mut S, P) + Send + Sync + 'static,
    {
        let name = name.into();
        let reducer_name = name.clone();
        let raw: RawReducer<S> = Box::new(move |state: &mut S, payload: Payload| -> Result<()> {
            let payload = payload
                .downcast::<P>()
                .map_err(|_| StoreError::PayloadMismatch {
                    reducer: reducer_name.clone(),
                    expected: type_name::<P>(),
                })?;
            reducer(state, *payload);
            Ok(())
        });
        self.entries.push((name, raw));
        self
    }

    /// Number of reducers registered so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply `wrap` to every registered reducer.
    ///
    /// Fails on an empty or duplicated name.
    pub(crate) fn wrap<W>(self, wrap: W) -> Result<Reducers>
    where
        W: Fn(&str, RawReducer<S>) -> WrappedReducer,
    {
        let mut reducers = Reducers {
            names: Vec::with_capacity(self.entries.len()),
            wrapped: HashMap::with_capacity(self.entries.len()),
        };

        for (name, raw) in self.entries {
            if name.is_empty() {
                return Err(StoreError::InvalidReducerName);
            }
            if reducers.wrapped.contains_key(&name) {
                return Err(StoreError::DuplicateReducer(name));
            }
            let wrapped = wrap(&name, raw);
            reducers.names.push(name.clone());
            reducers.wrapped.insert(name, wrapped);
        }

        Ok(reducers)
    }
}

/// The wrapped reducer set exposed by a store.
///
/// Every successful call runs the mutation and then exactly one
/// notification pass before returning. A failed call changes nothing.
pub struct Reducers {
    names: Vec<String>,
    wrapped: HashMap<String, WrappedReducer>,
}

impl Reducers {
    /// Call a reducer that takes no arguments.
    pub fn call(&self, name: &str) -> Result<()> {
        self.dispatch(name, Box::new(()))
    }

    /// Call a reducer with a payload.
    pub fn call_with<P: Any + Send>(&self, name: &str, payload: P) -> Result<()> {
        self.dispatch(name, Box::new(payload))
    }

    fn dispatch(&self, name: &str, payload: Payload) -> Result<()> {
        let reducer = self
            .wrapped
            .get(name)
            .ok_or_else(|| StoreError::UnknownReducer(name.to_string()))?;
        reducer(payload)
    }

    /// Reducer names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.wrapped.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Debug for Reducers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducers")
            .field("names", &self.names)
            .finish()
    }
}
