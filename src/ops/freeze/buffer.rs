use std::collections::VecDeque;

/// Decides whether a held value is superseded by an incoming one.
///
/// Runs while the freeze state is locked: it must not touch the stream it
/// compacts.
pub trait ReplaceFrozen<Item, Err> {
  fn should_replace(&mut self, held: &Item, incoming: &Item) -> Result<bool, Err>;
}

/// Keeps every held value.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

/// Drops held values for which the closure returns `true`.
#[derive(Clone)]
pub struct ReplaceWith<F>(pub F);

/// Like `ReplaceWith`, but the closure may fail. A failure ends the stream.
#[derive(Clone)]
pub struct TryReplaceWith<F>(pub F);

impl<Item, Err> ReplaceFrozen<Item, Err> for KeepAll {
  #[inline]
  fn should_replace(&mut self, _: &Item, _: &Item) -> Result<bool, Err> { Ok(false) }
}

impl<Item, Err, F> ReplaceFrozen<Item, Err> for ReplaceWith<F>
where
  F: FnMut(&Item, &Item) -> bool,
{
  #[inline]
  fn should_replace(&mut self, held: &Item, incoming: &Item) -> Result<bool, Err> {
    Ok((self.0)(held, incoming))
  }
}

impl<Item, Err, F> ReplaceFrozen<Item, Err> for TryReplaceWith<F>
where
  F: FnMut(&Item, &Item) -> Result<bool, Err>,
{
  #[inline]
  fn should_replace(&mut self, held: &Item, incoming: &Item) -> Result<bool, Err> {
    (self.0)(held, incoming)
  }
}

/// Values held while frozen, in arrival order.
#[derive(Debug, Clone)]
pub struct FrozenBuffer<Item> {
  items: VecDeque<Item>,
}

impl<Item> Default for FrozenBuffer<Item> {
  fn default() -> Self { Self { items: VecDeque::new() } }
}

impl<Item> FrozenBuffer<Item> {
  pub fn new() -> Self { Self::default() }

  /// Drop every held value `replace` marks as superseded by `value`, then
  /// append `value`. Returns how many values were dropped.
  ///
  /// On a predicate error `value` is lost and the buffer may be partly
  /// compacted; the caller abandons it.
  pub fn insert<R, Err>(&mut self, value: Item, replace: &mut R) -> Result<usize, Err>
  where
    R: ReplaceFrozen<Item, Err>,
  {
    let before = self.items.len();
    let mut idx = 0;
    while idx < self.items.len() {
      if replace.should_replace(&self.items[idx], &value)? {
        self.items.remove(idx);
      } else {
        idx += 1;
      }
    }
    let dropped = before - self.items.len();
    if dropped > 0 {
      tracing::trace!(dropped, held = self.items.len() + 1, "compacted frozen buffer");
    }
    self.items.push_back(value);
    Ok(dropped)
  }

  pub fn drain(&mut self) -> impl Iterator<Item = Item> + '_ { self.items.drain(..) }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  pub fn clear(&mut self) { self.items.clear() }

  pub fn iter(&self) -> impl Iterator<Item = &Item> { self.items.iter() }
}
