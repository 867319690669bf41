//! Per-invocation values shared with resolvers.
use std::any::Any;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::request::ProxyEvent;

/// A trait for types that can be stored in the context.
/// Any type that is Clone, Send, Sync and 'static can be stored in the context.
pub trait ContextValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> ContextValue for T {}

type Entries = DashMap<TypeId, Arc<dyn Any + Send + Sync + 'static>>;

/// Values handed to every resolver of a GraphQL execution, stored by type.
///
/// Clones share the same storage. The handler gives each invocation its own context
/// (see [`Context::extend`]) with the inbound [`ProxyEvent`] attached, readable through
/// [`Context::request`].
///
/// Values are cloned when retrieved. For types that are expensive to clone (connection pools,
/// clients), store them in an `Arc`:
///
/// ```rust
/// use std::sync::Arc;
/// use graphql_lambda::Context;
///
/// let context = Context::new();
/// context.insert(Arc::new(vec![1, 2, 3]));
/// assert_eq!(context.get::<Arc<Vec<i32>>>().unwrap().len(), 3);
/// ```
#[derive(Clone, Default)]
pub struct Context {
    entries: Arc<Entries>,
}

impl Context {
    /// Creates a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a value from the context by type.
    pub fn get<T: ContextValue>(&self) -> Option<T> {
        self.entries.get(&TypeId::of::<T>()).and_then(|value| {
            // keyed by type id, the downcast cannot fail
            value.value().downcast_ref::<T>().cloned()
        })
    }

    /// Inserts a value into the context, replacing any value of the same type.
    pub fn insert<T: ContextValue>(&self, value: T) {
        self.entries.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Removes a value from the context.
    pub fn remove<T: ContextValue>(&self) {
        self.entries.remove(&TypeId::of::<T>());
    }

    /// Returns true if a value of this type is stored.
    pub fn contains<T: ContextValue>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Copies every value of `other` into this context.
    pub fn extend(&self, other: &Context) {
        for entry in other.entries.iter() {
            self.entries.insert(*entry.key(), entry.value().clone());
        }
    }

    /// The proxy event of the invocation this context belongs to.
    pub fn request(&self) -> Option<Arc<ProxyEvent>> {
        self.get::<Arc<ProxyEvent>>()
    }

    pub(crate) fn for_request(base: &Context, request: Arc<ProxyEvent>) -> Self {
        let context = Context::new();
        context.extend(base);
        context.insert(request);
        context
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("entries", &self.entries.len())
            .finish()
    }
}
