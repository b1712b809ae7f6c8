use std::any::TypeId;
use std::sync::{Arc, RwLock};

use ahash::{HashMap, HashMapExt};

use crate::class::{Class, ClassId};

/// The global type-to-class map.
///
/// Classes are registered under a stable key derived from the host type's
/// identity and owned here for the life of the process; unregistering a
/// key only severs the key from its class, which is the documented
/// leak-until-exit tradeoff of dropping the weak-map design.
///
/// Lookups take the shared read path. Registration serializes on the
/// write lock, and the create callback runs inside it so it runs at most
/// once per key; the callback must not reenter the registry.
#[derive(Debug)]
pub struct ClassRegistry {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    by_key: HashMap<TypeId, ClassId>,
    classes: Vec<Arc<Class>>,
}

impl ClassRegistry {
    pub(crate) fn new() -> Self {
        ClassRegistry {
            inner: RwLock::new(Inner {
                by_key: HashMap::new(),
                classes: Vec::new(),
            }),
        }
    }

    /// The class with the given id.
    pub fn get(&self, id: ClassId) -> Arc<Class> {
        self.inner.read().unwrap().classes[id.index()].clone()
    }

    /// The class registered under a host type key, if any.
    pub fn lookup(&self, key: TypeId) -> Option<ClassId> {
        self.inner.read().unwrap().by_key.get(&key).copied()
    }

    /// The class registered under the key, creating and registering it if
    /// absent. The callback receives the id the class will live under.
    pub fn get_or_register<F>(&self, key: TypeId, create: F) -> ClassId
    where
        F: FnOnce(ClassId) -> Class,
    {
        if let Some(id) = self.lookup(key) {
            return id;
        }
        let mut inner = self.inner.write().unwrap();
        // racing registrations resolve to whoever got the lock first
        if let Some(id) = inner.by_key.get(&key) {
            return *id;
        }
        let id = ClassId::new(inner.classes.len());
        let class = create(id);
        inner.classes.push(Arc::new(class));
        inner.by_key.insert(key, id);
        id
    }

    /// Sever a key from its class, for host types that unload. The class
    /// itself stays resolvable by id.
    pub fn unregister(&self, key: TypeId) -> bool {
        self.inner.write().unwrap().by_key.remove(&key).is_some()
    }

    /// The number of registered classes.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().classes.len()
    }

    /// Whether no classes are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
