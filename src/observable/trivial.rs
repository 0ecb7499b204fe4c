use std::{convert::Infallible, marker::PhantomData};

use crate::{
  context::Context,
  observable::{CoreObservable, ObservableType},
  observer::Observer,
};

/// Completes immediately.
pub struct Empty<Item>(PhantomData<Item>);

/// Never emits and never finishes.
pub struct Never<Item>(PhantomData<Item>);

/// Fails immediately with the given error.
pub struct ThrowErr<Item, Err> {
  err: Err,
  _marker: PhantomData<Item>,
}

impl<Item> Empty<Item> {
  pub fn new() -> Self { Self(PhantomData) }
}

impl<Item> Default for Empty<Item> {
  fn default() -> Self { Self::new() }
}

impl<Item> Never<Item> {
  pub fn new() -> Self { Self(PhantomData) }
}

impl<Item> Default for Never<Item> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> ThrowErr<Item, Err> {
  pub fn new(err: Err) -> Self { Self { err, _marker: PhantomData } }
}

impl<Item> Clone for Empty<Item> {
  fn clone(&self) -> Self { Self::new() }
}

impl<Item> Clone for Never<Item> {
  fn clone(&self) -> Self { Self::new() }
}

impl<Item, Err: Clone> Clone for ThrowErr<Item, Err> {
  fn clone(&self) -> Self { Self::new(self.err.clone()) }
}

impl<Item> ObservableType for Empty<Item> {
  type Item = Item;
  type Err = Infallible;
}

impl<Item> ObservableType for Never<Item> {
  type Item = Item;
  type Err = Infallible;
}

impl<Item, Err> ObservableType for ThrowErr<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<C, Item> CoreObservable<C> for Empty<Item>
where
  C: Context,
  C::Inner: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn subscribe(self, context: C) -> Self::Unsub { context.into_inner().complete() }
}

impl<C, Item> CoreObservable<C> for Never<Item>
where
  C: Context,
  C::Inner: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn subscribe(self, _context: C) -> Self::Unsub {}
}

impl<C, Item, Err> CoreObservable<C> for ThrowErr<Item, Err>
where
  C: Context,
  C::Inner: Observer<Item, Err>,
{
  type Unsub = ();

  fn subscribe(self, context: C) -> Self::Unsub { context.into_inner().error(self.err) }
}
