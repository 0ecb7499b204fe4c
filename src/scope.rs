//! Object storage that outlives a screen's view.
//!
//! A `ScreenScope` keeps objects (typically a presenter) alive while the
//! screen's view is torn down and rebuilt, e.g. across a configuration
//! change. It is destroyed only with the screen itself, at which point its
//! destroy listeners run once. `ScopeRegistry` is the arena that owns the
//! scopes and finds them again by screen name.
//!
//! Scopes are meant to be driven from the UI thread and are not `Send`.
//!
//! ```rust
//! use rxferro::scope::ScopeRegistry;
//!
//! let mut registry = ScopeRegistry::new();
//! let (scope, recreated) = registry.find_or_create("catalog");
//! assert!(!recreated);
//! scope.put_object("query", String::from("rust")).unwrap();
//!
//! // The view is rebuilt: the same scope comes back.
//! let (scope, recreated) = registry.find_or_create("catalog");
//! assert!(recreated);
//! assert_eq!(scope.get_object::<String>("query").unwrap().map(String::as_str), Some("rust"));
//! ```

use std::{
  any::{type_name, Any, TypeId},
  collections::{hash_map::Entry, HashMap},
  fmt,
};

use crate::{error::ScopeError, subscription::DynamicSubscriptions};

/// Key of an object stored in a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKey {
  Name(String),
  /// Keyed by the stored type, see `put_typed`.
  Type(TypeId),
}

impl fmt::Display for ObjectKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ObjectKey::Name(name) => f.write_str(name),
      ObjectKey::Type(id) => write!(f, "{id:?}"),
    }
  }
}

impl From<&str> for ObjectKey {
  fn from(name: &str) -> Self { ObjectKey::Name(name.to_owned()) }
}

impl From<String> for ObjectKey {
  fn from(name: String) -> Self { ObjectKey::Name(name) }
}

/// Handle of a registered destroy listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

pub struct ScreenScope {
  name: String,
  objects: HashMap<ObjectKey, Box<dyn Any>>,
  listeners: DynamicSubscriptions<Box<dyn FnOnce()>>,
  destroyed: bool,
  screen_recreated: bool,
}

impl fmt::Debug for ScreenScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ScreenScope")
      .field("name", &self.name)
      .field("objects", &self.objects.len())
      .field("listeners", &self.listeners.len())
      .field("destroyed", &self.destroyed)
      .field("screen_recreated", &self.screen_recreated)
      .finish()
  }
}

impl ScreenScope {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      objects: HashMap::new(),
      listeners: DynamicSubscriptions::new(),
      destroyed: false,
      screen_recreated: false,
    }
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn is_destroyed(&self) -> bool { self.destroyed }

  /// Whether the screen's view has been rebuilt at least once while this
  /// scope was alive.
  pub fn is_screen_recreated(&self) -> bool { self.screen_recreated }

  pub fn mark_recreated(&mut self) { self.screen_recreated = true; }

  /// Store `object` under `name`, replacing any previous object.
  pub fn put_object<T: Any>(
    &mut self, name: impl Into<String>, object: T,
  ) -> Result<(), ScopeError> {
    self.put(ObjectKey::Name(name.into()), object)
  }

  /// Store `object` keyed by its own type.
  pub fn put_typed<T: Any>(&mut self, object: T) -> Result<(), ScopeError> {
    self.put(ObjectKey::Type(TypeId::of::<T>()), object)
  }

  /// The object stored under `name`, if any. Fails when the object has
  /// another type than `T`.
  pub fn get_object<T: Any>(&self, name: &str) -> Result<Option<&T>, ScopeError> {
    self.get(&ObjectKey::from(name))
  }

  pub fn get_object_mut<T: Any>(&mut self, name: &str) -> Result<Option<&mut T>, ScopeError> {
    self.get_mut(ObjectKey::from(name))
  }

  pub fn get_typed<T: Any>(&self) -> Result<Option<&T>, ScopeError> {
    self.get(&ObjectKey::Type(TypeId::of::<T>()))
  }

  pub fn get_typed_mut<T: Any>(&mut self) -> Result<Option<&mut T>, ScopeError> {
    self.get_mut(ObjectKey::Type(TypeId::of::<T>()))
  }

  /// Take an object out of the scope. An object of another type than `T` is
  /// left in place.
  pub fn remove_object<T: Any>(&mut self, key: impl Into<ObjectKey>) -> Result<Option<T>, ScopeError> {
    self.ensure_alive()?;
    let key = key.into();
    let Some(object) = self.objects.remove(&key) else {
      return Ok(None);
    };
    match object.downcast::<T>() {
      Ok(object) => Ok(Some(*object)),
      Err(object) => {
        let err = ScopeError::TypeMismatch { key: key.to_string() };
        self.objects.insert(key, object);
        Err(err)
      }
    }
  }

  pub fn contains(&self, key: &ObjectKey) -> bool { self.objects.contains_key(key) }

  pub fn len(&self) -> usize { self.objects.len() }

  pub fn is_empty(&self) -> bool { self.objects.is_empty() }

  /// Drop every stored object. Destroy listeners stay registered.
  pub fn clear(&mut self) { self.objects.clear(); }

  /// Run `listener` once when the scope is destroyed.
  pub fn add_destroy_listener(
    &mut self, listener: impl FnOnce() + 'static,
  ) -> Result<ListenerId, ScopeError> {
    self.ensure_alive()?;
    Ok(ListenerId(self.listeners.add(Box::new(listener))))
  }

  /// Returns whether the listener was still registered.
  pub fn remove_destroy_listener(&mut self, id: ListenerId) -> bool {
    self.listeners.remove(id.0).is_some()
  }

  /// Destroy the scope: run every destroy listener once, in registration
  /// order, then drop the stored objects. Destroying twice does nothing.
  pub fn destroy(&mut self) {
    if self.destroyed {
      return;
    }
    self.destroyed = true;
    let listeners: Vec<_> = self.listeners.drain().collect();
    tracing::debug!(
      scope = %self.name,
      listeners = listeners.len(),
      objects = self.objects.len(),
      "destroying screen scope"
    );
    for listener in listeners {
      listener();
    }
    self.objects.clear();
  }

  fn put<T: Any>(&mut self, key: ObjectKey, object: T) -> Result<(), ScopeError> {
    self.ensure_alive()?;
    tracing::trace!(scope = %self.name, %key, ty = type_name::<T>(), "storing object");
    self.objects.insert(key, Box::new(object));
    Ok(())
  }

  fn get<T: Any>(&self, key: &ObjectKey) -> Result<Option<&T>, ScopeError> {
    self.ensure_alive()?;
    match self.objects.get(key) {
      None => Ok(None),
      Some(object) => object
        .downcast_ref::<T>()
        .map(Some)
        .ok_or_else(|| ScopeError::TypeMismatch { key: key.to_string() }),
    }
  }

  fn get_mut<T: Any>(&mut self, key: ObjectKey) -> Result<Option<&mut T>, ScopeError> {
    self.ensure_alive()?;
    match self.objects.get_mut(&key) {
      None => Ok(None),
      Some(object) => object
        .downcast_mut::<T>()
        .map(Some)
        .ok_or_else(|| ScopeError::TypeMismatch { key: key.to_string() }),
    }
  }

  fn ensure_alive(&self) -> Result<(), ScopeError> {
    if self.destroyed {
      Err(ScopeError::Destroyed { name: self.name.clone() })
    } else {
      Ok(())
    }
  }
}

impl Drop for ScreenScope {
  fn drop(&mut self) { self.destroy(); }
}

/// Owns the live scopes, one per screen name.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
  scopes: HashMap<String, ScreenScope>,
}

impl ScopeRegistry {
  pub fn new() -> Self { Self::default() }

  pub fn find(&self, screen: &str) -> Option<&ScreenScope> { self.scopes.get(screen) }

  pub fn find_mut(&mut self, screen: &str) -> Option<&mut ScreenScope> {
    self.scopes.get_mut(screen)
  }

  /// The scope of `screen`, and whether it already existed. An existing
  /// scope is marked as recreated.
  pub fn find_or_create(&mut self, screen: &str) -> (&mut ScreenScope, bool) {
    match self.scopes.entry(screen.to_owned()) {
      Entry::Occupied(entry) => {
        let scope = entry.into_mut();
        scope.mark_recreated();
        (scope, true)
      }
      Entry::Vacant(entry) => {
        tracing::debug!(scope = screen, "creating screen scope");
        (entry.insert(ScreenScope::new(screen)), false)
      }
    }
  }

  /// Destroy and forget the scope of `screen`. Returns whether it existed.
  pub fn destroy(&mut self, screen: &str) -> bool {
    match self.scopes.remove(screen) {
      Some(mut scope) => {
        scope.destroy();
        true
      }
      None => false,
    }
  }

  pub fn destroy_all(&mut self) {
    for (_, mut scope) in self.scopes.drain() {
      scope.destroy();
    }
  }

  pub fn len(&self) -> usize { self.scopes.len() }

  pub fn is_empty(&self) -> bool { self.scopes.is_empty() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  #[rxferro_macro::test]
  fn named_and_typed_objects() {
    let mut scope = ScreenScope::new("books");
    scope.put_object("title", "Dune").unwrap();
    scope.put_typed(42_u32).unwrap();

    assert_eq!(scope.get_object::<&str>("title"), Ok(Some(&"Dune")));
    assert_eq!(scope.get_typed::<u32>(), Ok(Some(&42)));
    assert_eq!(scope.get_typed::<u64>(), Ok(None));
    assert_eq!(scope.get_object::<&str>("missing"), Ok(None));
    assert!(matches!(scope.get_object::<u8>("title"), Err(ScopeError::TypeMismatch { .. })));
  }

  #[rxferro_macro::test]
  fn remove_keeps_mismatched_object() {
    let mut scope = ScreenScope::new("books");
    scope.put_object("count", 3_i32).unwrap();

    assert!(scope.remove_object::<String>("count").is_err());
    assert!(scope.contains(&ObjectKey::from("count")));
    assert_eq!(scope.remove_object::<i32>("count"), Ok(Some(3)));
    assert!(scope.is_empty());
  }

  #[rxferro_macro::test]
  fn listeners_run_once_in_order() {
    let calls = Rc::new(RefCell::new(vec![]));
    let mut scope = ScreenScope::new("books");
    for n in 0..3 {
      let calls = calls.clone();
      scope
        .add_destroy_listener(move || calls.borrow_mut().push(n))
        .unwrap();
    }

    scope.destroy();
    scope.destroy();
    assert_eq!(*calls.borrow(), vec![0, 1, 2]);
    assert!(scope.is_destroyed());
  }

  #[rxferro_macro::test]
  fn removed_listener_is_not_called() {
    let called = Rc::new(RefCell::new(false));
    let flag = called.clone();
    let mut scope = ScreenScope::new("books");
    let id = scope
      .add_destroy_listener(move || *flag.borrow_mut() = true)
      .unwrap();

    assert!(scope.remove_destroy_listener(id));
    assert!(!scope.remove_destroy_listener(id));
    scope.destroy();
    assert!(!*called.borrow());
  }

  #[rxferro_macro::test]
  fn destroyed_scope_rejects_access() {
    let mut scope = ScreenScope::new("books");
    scope.put_object("title", "Dune").unwrap();
    scope.destroy();

    let destroyed = ScopeError::Destroyed { name: "books".into() };
    assert_eq!(scope.get_object::<&str>("title"), Err(destroyed.clone()));
    assert_eq!(scope.put_typed(1_u8), Err(destroyed.clone()));
    assert_eq!(scope.add_destroy_listener(|| {}).err(), Some(destroyed));
  }

  #[rxferro_macro::test]
  fn registry_recreates_and_destroys() {
    let destroyed = Rc::new(RefCell::new(false));
    let flag = destroyed.clone();
    let mut registry = ScopeRegistry::new();

    let (scope, recreated) = registry.find_or_create("catalog");
    assert!(!recreated && !scope.is_screen_recreated());
    scope
      .add_destroy_listener(move || *flag.borrow_mut() = true)
      .unwrap();

    let (scope, recreated) = registry.find_or_create("catalog");
    assert!(recreated && scope.is_screen_recreated());
    assert_eq!(registry.len(), 1);

    assert!(registry.destroy("catalog"));
    assert!(!registry.destroy("catalog"));
    assert!(*destroyed.borrow());
    assert!(registry.find("catalog").is_none());
  }

  #[rxferro_macro::test]
  fn dropping_registry_destroys_scopes() {
    let destroyed = Rc::new(RefCell::new(0));
    {
      let mut registry = ScopeRegistry::new();
      for screen in ["a", "b"] {
        let counter = destroyed.clone();
        registry
          .find_or_create(screen)
          .0
          .add_destroy_listener(move || *counter.borrow_mut() += 1)
          .unwrap();
      }
    }
    assert_eq!(*destroyed.borrow(), 2);
  }
}
