use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::{observer::Observer, rc::RcDerefMut, subscription::DynamicSubscriptions};

type Entries<Ob> = SmallVec<[(usize, Ob); 2]>;

/// How a subject finished. Replayed to late subscribers.
#[derive(Clone)]
pub(crate) enum Stopped<Err> {
  Errored(Err),
  Completed,
}

pub(crate) enum Pending<Ob, Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
  /// A behavior subscriber waiting for the current value before it joins.
  Join(usize, Ob),
}

/// The observer list shared by all clones of a subject.
///
/// Emissions are serialized by an emit loop. The emitting caller moves the
/// observers out, releases the lock, delivers, then moves them back. An
/// emission made meanwhile (from inside a callback or from another thread) is
/// queued and delivered by that same caller right after the current one.
/// Observers added during an emission miss it; observers removed during an
/// emission may still receive it.
pub struct Subscribers<Ob, Item, Err> {
  observers: DynamicSubscriptions<Ob>,
  latest: Option<Item>,
  emitting: bool,
  pending: VecDeque<Pending<Ob, Item, Err>>,
  removed: SmallVec<[usize; 2]>,
  stopped: Option<Stopped<Err>>,
}

impl<Ob, Item, Err> Default for Subscribers<Ob, Item, Err> {
  fn default() -> Self {
    Self {
      observers: DynamicSubscriptions::default(),
      latest: None,
      emitting: false,
      pending: VecDeque::new(),
      removed: SmallVec::new(),
      stopped: None,
    }
  }
}

impl<Ob, Item, Err> Subscribers<Ob, Item, Err> {
  /// A list that replays `initial`, then every later value, to new observers.
  pub(crate) fn with_latest(initial: Item) -> Self {
    Self { latest: Some(initial), ..Self::default() }
  }

  pub(crate) fn latest(&self) -> Option<&Item> { self.latest.as_ref() }

  pub(crate) fn is_stopped(&self) -> bool { self.stopped.is_some() }

  pub fn len(&self) -> usize { self.observers.len() }

  pub fn is_empty(&self) -> bool { self.observers.is_empty() }

  pub(crate) fn is_emitting(&self) -> bool { self.emitting }

  pub(crate) fn contains(&self, id: usize) -> bool { self.observers.contains(id) }

  fn replays(&self) -> bool { self.latest.is_some() }

  fn reserve_id(&mut self) -> usize { self.observers.reserve_id() }

  fn insert(&mut self, id: usize, observer: Ob) { self.observers.insert(id, observer) }

  /// Remove an observer, or mark it for removal when it is out for delivery.
  pub(crate) fn remove(&mut self, id: usize) -> Option<Ob> {
    let removed = self.observers.remove(id);
    if removed.is_none() && self.emitting {
      self.removed.push(id);
    }
    removed
  }

  fn accept(&mut self, op: &Pending<Ob, Item, Err>) -> bool
  where
    Err: Clone,
  {
    if self.stopped.is_some() {
      return false;
    }
    match op {
      Pending::Error(err) => self.stopped = Some(Stopped::Errored(err.clone())),
      Pending::Complete => self.stopped = Some(Stopped::Completed),
      _ => {}
    }
    true
  }

  fn restore(&mut self, entries: Entries<Ob>) { self.observers.restore(entries, &self.removed); }
}

/// One unit of work for the emit loop, prepared under the lock.
enum Step<Ob, Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
  Join { id: usize, observer: Ob, replay: Option<Item>, cancelled: bool },
}

impl<Ob, Item: Clone, Err> Subscribers<Ob, Item, Err> {
  fn prepare(&mut self, op: Pending<Ob, Item, Err>) -> Step<Ob, Item, Err> {
    match op {
      Pending::Next(v) => {
        if self.latest.is_some() {
          self.latest = Some(v.clone());
        }
        Step::Next(v)
      }
      Pending::Error(err) => Step::Error(err),
      Pending::Complete => Step::Complete,
      Pending::Join(id, observer) => Step::Join {
        id,
        observer,
        replay: self.latest.clone(),
        cancelled: self.removed.contains(&id),
      },
    }
  }
}

/// Push a value or terminal event through the subject behind `ptr`.
pub(crate) fn emit<P, Ob, Item, Err>(ptr: &P, op: Pending<Ob, Item, Err>)
where
  P: RcDerefMut<Target = Subscribers<Ob, Item, Err>>,
  Ob: Observer<Item, Err>,
  Item: Clone,
  Err: Clone,
{
  let (entries, step) = {
    let mut guard = ptr.rc_deref_mut();
    if !guard.accept(&op) {
      return;
    }
    if guard.emitting {
      guard.pending.push_back(op);
      return;
    }
    guard.emitting = true;
    let step = guard.prepare(op);
    (guard.observers.take_entries(), step)
  };
  drain(ptr, entries, step);
}

/// Register `observer`. Returns its id, or `None` when the subject had
/// already stopped and the observer got the terminal event instead.
///
/// A replaying subject delivers the current value first, in order with the
/// emissions in flight.
pub(crate) fn join<P, Ob, Item, Err>(ptr: &P, observer: Ob) -> Option<usize>
where
  P: RcDerefMut<Target = Subscribers<Ob, Item, Err>>,
  Ob: Observer<Item, Err>,
  Item: Clone,
  Err: Clone,
{
  let (entries, step, id) = {
    let mut guard = ptr.rc_deref_mut();
    match guard.stopped.clone() {
      Some(Stopped::Errored(err)) => {
        drop(guard);
        observer.error(err);
        return None;
      }
      Some(Stopped::Completed) => {
        drop(guard);
        observer.complete();
        return None;
      }
      None => {}
    }
    let id = guard.reserve_id();
    if !guard.replays() {
      guard.insert(id, observer);
      return Some(id);
    }
    if guard.emitting {
      guard.pending.push_back(Pending::Join(id, observer));
      return Some(id);
    }
    guard.emitting = true;
    let step = guard.prepare(Pending::Join(id, observer));
    (guard.observers.take_entries(), step, id)
  };
  drain(ptr, entries, step);
  Some(id)
}

// The emit loop. Runs with `emitting` set and the observers moved out.
fn drain<P, Ob, Item, Err>(ptr: &P, mut entries: Entries<Ob>, mut step: Step<Ob, Item, Err>)
where
  P: RcDerefMut<Target = Subscribers<Ob, Item, Err>>,
  Ob: Observer<Item, Err>,
  Item: Clone,
  Err: Clone,
{
  loop {
    deliver(&mut entries, step);

    let mut guard = ptr.rc_deref_mut();
    guard.restore(entries);
    match guard.pending.pop_front() {
      Some(op) => {
        step = guard.prepare(op);
        entries = guard.observers.take_entries();
      }
      None => {
        guard.emitting = false;
        guard.removed.clear();
        return;
      }
    }
  }
}

fn deliver<Ob, Item, Err>(entries: &mut Entries<Ob>, step: Step<Ob, Item, Err>)
where
  Ob: Observer<Item, Err>,
  Item: Clone,
  Err: Clone,
{
  match step {
    Step::Next(value) => {
      broadcast_value(entries, value);
      entries.retain(|(_, observer)| !observer.is_closed());
    }
    Step::Error(err) => {
      let mut iter = entries.drain(..).peekable();
      while let Some((_, observer)) = iter.next() {
        if iter.peek().is_some() {
          observer.error(err.clone());
        } else {
          observer.error(err);
          break;
        }
      }
    }
    Step::Complete => entries.drain(..).for_each(|(_, observer)| observer.complete()),
    Step::Join { cancelled: true, .. } => {}
    Step::Join { id, mut observer, replay, cancelled: false } => {
      if let Some(value) = replay {
        observer.next(value);
      }
      if !observer.is_closed() {
        entries.push((id, observer));
      }
    }
  }
}

// The last observer receives the moved value, the others a clone.
fn broadcast_value<Ob, Item, Err>(entries: &mut Entries<Ob>, value: Item)
where
  Ob: Observer<Item, Err>,
  Item: Clone,
{
  let mut iter = entries.iter_mut().peekable();
  while let Some((_, observer)) = iter.next() {
    if iter.peek().is_some() {
      observer.next(value.clone());
    } else {
      observer.next(value);
      break;
    }
  }
}
