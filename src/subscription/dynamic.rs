use smallvec::SmallVec;

/// Id-keyed registry of subscriptions, observers or listeners.
///
/// Ids are never reused, so a stale id removes nothing. Backed by
/// `SmallVec<[_; 2]>` since most registries hold one or two entries.
///
/// ```rust
/// use rxferro::subscription::DynamicSubscriptions;
///
/// let mut subs: DynamicSubscriptions<()> = DynamicSubscriptions::default();
/// let first = subs.add(());
///
/// let second = subs.reserve_id();
/// subs.insert(second, ());
/// assert_eq!(subs.len(), 2);
///
/// assert!(subs.remove(first).is_some());
/// assert!(subs.remove(first).is_none());
/// ```
pub struct DynamicSubscriptions<U> {
  next_id: usize,
  items: SmallVec<[(usize, U); 2]>,
}

impl<U> Default for DynamicSubscriptions<U> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<U> DynamicSubscriptions<U> {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Add an item and return its id.
  #[inline]
  pub fn add(&mut self, item: U) -> usize {
    let id = self.reserve_id();
    self.items.push((id, item));
    id
  }

  /// Allocate an id for an item that does not exist yet, see `insert`.
  #[inline]
  pub fn reserve_id(&mut self) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    id
  }

  #[inline]
  pub fn insert(&mut self, id: usize, item: U) { self.items.push((id, item)); }

  pub fn remove(&mut self, id: usize) -> Option<U> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub fn get(&self, id: usize) -> Option<&U> {
    self.items.iter().find(|(i, _)| *i == id).map(|(_, item)| item)
  }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Remove every item, in insertion order.
  #[inline]
  pub fn drain(&mut self) -> impl Iterator<Item = U> + '_ {
    self.items.drain(..).map(|(_, item)| item)
  }

  /// Move the entries out while keeping the id counter, so ids handed out
  /// meanwhile stay unique once the entries are `restore`d.
  pub fn take_entries(&mut self) -> SmallVec<[(usize, U); 2]> { std::mem::take(&mut self.items) }

  /// Put entries taken with `take_entries` back in front of the ones added
  /// since, dropping the ids listed in `removed`.
  pub fn restore(&mut self, mut entries: SmallVec<[(usize, U); 2]>, removed: &[usize]) {
    entries.retain(|(id, _)| !removed.contains(id));
    entries.extend(self.items.drain(..));
    self.items = entries;
  }

  /// Remove the items `finished` selects. The rest keep their order.
  pub fn remove_where(&mut self, mut finished: impl FnMut(&U) -> bool) -> Vec<U> {
    let (gone, kept): (SmallVec<[_; 2]>, SmallVec<[_; 2]>) =
      std::mem::take(&mut self.items).into_iter().partition(|(_, item)| finished(item));
    self.items = kept;
    gone.into_iter().map(|(_, item)| item).collect()
  }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &U> { self.items.iter().map(|(_, item)| item) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxferro_macro::test]
  fn ids_are_not_reused() {
    let mut subs = DynamicSubscriptions::new();
    let a = subs.add("a");
    subs.remove(a);
    let b = subs.add("b");
    assert_ne!(a, b);
    assert_eq!(subs.get(b), Some(&"b"));
  }

  #[rxferro_macro::test]
  fn remove_where_keeps_order() {
    let mut subs = DynamicSubscriptions::new();
    let ids: Vec<_> = (1..=5).map(|n| subs.add(n)).collect();
    assert_eq!(subs.remove_where(|n| n % 2 == 0), vec![2, 4]);
    assert_eq!(subs.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    assert!(!subs.contains(ids[1]));
    assert!(subs.contains(ids[4]));
  }

  #[rxferro_macro::test]
  fn restore_keeps_order_and_drops_removed() {
    let mut subs = DynamicSubscriptions::new();
    let a = subs.add('a');
    let b = subs.add('b');
    let taken = subs.take_entries();
    assert!(subs.is_empty());

    let c = subs.add('c');
    subs.restore(taken, &[b]);

    assert!(subs.contains(a) && subs.contains(c) && !subs.contains(b));
    assert_eq!(subs.iter().copied().collect::<Vec<_>>(), vec!['a', 'c']);
  }
}
