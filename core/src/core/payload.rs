// park/src/core/payload.rs
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// The payload of a work item, shared between the item, its stage invocations
/// and the events emitted for it.
///
/// Only the executor currently holding the item runs a stage against it, so
/// writes never contend in practice. Events keep a clone of the `Payload`, which
/// is why the final value stays readable after the item itself has been dropped.
///
/// IMPORTANT: guards are blocking and MUST NOT be held across `.await` points
/// inside stage functions.
#[derive(Debug)]
pub struct Payload<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> Payload<T> {
  pub fn new(value: T) -> Self {
    Payload(Arc::new(RwLock::new(value)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Read access to one part of the payload, e.g. `payload.map_read(|order| &order.lines)`.
  pub fn map_read<F, U: ?Sized>(&self, f: F) -> MappedRwLockReadGuard<'_, U>
  where
    F: FnOnce(&T) -> &U,
  {
    RwLockReadGuard::map(self.read(), f)
  }

  /// Replaces the value, returning the previous one.
  pub fn replace(&self, value: T) -> T {
    std::mem::replace(&mut *self.write(), value)
  }

  /// Unwraps the value if this is the last handle to it.
  pub fn try_into_inner(self) -> Result<T, Self> {
    Arc::try_unwrap(self.0).map(RwLock::into_inner).map_err(Payload)
  }
}

impl<T: Clone + Send + Sync + 'static> Payload<T> {
  /// Clones the current value out from under a read lock.
  pub fn snapshot(&self) -> T {
    self.read().clone()
  }
}

impl<T: Send + Sync + 'static> Clone for Payload<T> {
  fn clone(&self) -> Self {
    Payload(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for Payload<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn try_into_inner_requires_sole_handle() {
    let payload = Payload::new(5);
    let shared = payload.clone();
    let payload = payload.try_into_inner().unwrap_err();
    drop(shared);
    assert_eq!(payload.try_into_inner().ok(), Some(5));
  }

  #[test]
  fn writes_are_visible_through_clones() {
    let payload = Payload::new(String::from("a"));
    let other = payload.clone();
    payload.write().push('b');
    assert_eq!(other.snapshot(), "ab");
    assert_eq!(other.replace(String::new()), "ab");
  }

  #[test]
  fn map_read_narrows_to_a_field() {
    let payload = Payload::new((1u8, String::from("lines")));
    assert_eq!(&*payload.map_read(|pair| pair.1.as_str()), "lines");
  }
}
