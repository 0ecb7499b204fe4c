//! Integration tests for the freeze operators.
//!
//! Covers each stream shape end to end, compaction, error precedence and
//! delivery from several threads through the `Shared` context.

use std::{
  cell::RefCell,
  convert::Infallible,
  rc::Rc,
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
  },
  thread,
};

use rxferro::prelude::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
enum LoadError {
  #[error("catalog is offline")]
  Offline,
  #[error("bad predicate input {0}")]
  BadInput(i32),
  #[error(transparent)]
  Freeze(#[from] FreezeError),
}

#[derive(Debug, Clone, PartialEq)]
enum Event<T> {
  Next(T),
  Error(LoadError),
  Complete,
}

struct Recorder<T>(Rc<RefCell<Vec<Event<T>>>>);

impl<T> Observer<T, LoadError> for Recorder<T> {
  fn next(&mut self, value: T) { self.0.borrow_mut().push(Event::Next(value)); }

  fn error(self, err: LoadError) { self.0.borrow_mut().push(Event::Error(err)); }

  fn complete(self) { self.0.borrow_mut().push(Event::Complete); }

  fn is_closed(&self) -> bool { false }
}

fn recorder<T>() -> (Recorder<T>, Rc<RefCell<Vec<Event<T>>>>) {
  let events = Rc::new(RefCell::new(vec![]));
  (Recorder(events.clone()), events)
}

#[rxferro_macro::test]
fn stream_buffers_then_passes_through() {
  let (observer, events) = recorder();
  let mut selector = Local::subject::<bool, LoadError>();
  let mut source = Local::subject::<i32, LoadError>();
  source
    .clone()
    .freeze(selector.clone())
    .subscribe_with(observer);

  source.next(1);
  assert!(events.borrow().is_empty());

  selector.next(false);
  assert_eq!(*events.borrow(), vec![Event::Next(1)]);

  source.next(1);
  assert_eq!(events.borrow().len(), 2);

  selector.next(true);
  source.next(1);
  assert_eq!(events.borrow().len(), 2);

  selector.next(false);
  assert_eq!(*events.borrow(), vec![Event::Next(1); 3]);
}

#[rxferro_macro::test]
fn single_success_waits_for_release() {
  let (observer, events) = recorder();
  let mut selector = Local::subject::<bool, LoadError>();
  Local::create(|emitter: &mut dyn Emitter<i32, LoadError>| {
    emitter.next(1);
    emitter.complete();
  })
  .freeze_single(selector.clone())
  .subscribe_with(observer);
  assert!(events.borrow().is_empty());

  selector.next(false);
  selector.next(true);
  selector.next(false);
  assert_eq!(*events.borrow(), vec![Event::Next(1), Event::Complete]);
}

#[rxferro_macro::test]
fn compaction_keeps_only_latest() {
  let (observer, events) = recorder();
  let mut selector = Local::subject::<bool, LoadError>();
  let mut source = Local::subject::<i32, LoadError>();
  source
    .clone()
    .freeze_with(selector.clone(), |_, _| true)
    .subscribe_with(observer);

  source.next(1);
  source.next(2);
  source.next(3);
  selector.next(false);
  assert_eq!(*events.borrow(), vec![Event::Next(3)]);
}

#[rxferro_macro::test]
fn compaction_by_key_keeps_latest_per_key() {
  let (observer, events) = recorder();
  let mut selector = Local::subject::<bool, LoadError>();
  let mut progress = Local::subject::<(char, u8), LoadError>();
  progress
    .clone()
    .freeze_with(selector.clone(), |held: &(char, u8), incoming: &(char, u8)| held.0 == incoming.0)
    .subscribe_with(observer);

  for update in [('a', 10), ('b', 10), ('a', 50), ('b', 90), ('a', 100)] {
    progress.next(update);
  }
  selector.next(false);
  assert_eq!(*events.borrow(), vec![Event::Next(('b', 90)), Event::Next(('a', 100))]);
}

#[rxferro_macro::test]
fn failing_predicate_ends_the_stream() {
  let (observer, events) = recorder();
  let mut selector = Local::subject::<bool, LoadError>();
  let mut source = Local::subject::<i32, LoadError>();
  source
    .clone()
    .try_freeze_with(selector.clone(), |_, incoming| {
      if *incoming < 0 { Err(LoadError::BadInput(*incoming)) } else { Ok(false) }
    })
    .subscribe_with(observer);

  source.next(1);
  source.next(-4);
  assert_eq!(*events.borrow(), vec![Event::Error(LoadError::BadInput(-4))]);
  assert!(source.inner.is_empty());

  selector.next(false);
  assert_eq!(events.borrow().len(), 1);
}

#[rxferro_macro::test]
fn selector_error_before_source_event() {
  let (observer, events) = recorder::<i32>();
  let selector = Local::throw_err::<bool, _>(LoadError::Offline);
  let mut source = Local::subject::<i32, LoadError>();
  source
    .clone()
    .freeze_single(selector)
    .subscribe_with(observer);

  source.next(1);
  assert_eq!(*events.borrow(), vec![Event::Error(LoadError::Offline)]);
}

#[rxferro_macro::test]
fn selector_error_drops_held_values() {
  let (observer, events) = recorder();
  let mut selector = Local::subject::<bool, LoadError>();
  let mut source = Local::subject::<i32, LoadError>();
  source
    .clone()
    .freeze(selector.clone())
    .subscribe_with(observer);

  source.next(1);
  source.next(2);
  selector.clone().error(LoadError::Offline);
  assert_eq!(*events.borrow(), vec![Event::Error(LoadError::Offline)]);

  selector.next(false);
  assert_eq!(events.borrow().len(), 1);
}

#[rxferro_macro::test]
fn error_while_frozen_is_delivered_once() {
  let (observer, events) = recorder::<i32>();
  let mut selector = Local::subject::<bool, LoadError>();
  let source = Local::subject::<i32, LoadError>();
  source
    .clone()
    .freeze(selector.clone())
    .subscribe_with(observer);

  source.clone().error(LoadError::Offline);
  source.clone().error(LoadError::BadInput(0));
  assert!(events.borrow().is_empty());

  selector.next(false);
  selector.next(true);
  selector.next(false);
  assert_eq!(*events.borrow(), vec![Event::Error(LoadError::Offline)]);
}

#[rxferro_macro::test]
fn single_selector_completion_is_an_error() {
  let (observer, events) = recorder::<i32>();
  let selector = Local::subject::<bool, LoadError>();
  let source = Local::subject::<i32, LoadError>();
  source
    .clone()
    .freeze_single(selector.clone())
    .subscribe_with(observer);

  selector.clone().complete();
  assert_eq!(
    *events.borrow(),
    vec![Event::Error(LoadError::Freeze(FreezeError::SelectorCompleted))]
  );
  assert!(source.inner.is_empty());
}

#[rxferro_macro::test]
fn single_without_value_is_an_error() {
  let (observer, events) = recorder::<i32>();
  let mut selector = Local::subject::<bool, LoadError>();
  Local::create(|emitter: &mut dyn Emitter<i32, LoadError>| emitter.complete())
    .freeze_single(selector.clone())
    .subscribe_with(observer);

  selector.next(false);
  assert_eq!(*events.borrow(), vec![Event::Error(LoadError::Freeze(FreezeError::EmptySource))]);
}

#[rxferro_macro::test]
fn maybe_without_value_completes() {
  let (observer, events) = recorder::<i32>();
  let mut selector = Local::subject::<bool, LoadError>();
  Local::create(|emitter: &mut dyn Emitter<i32, LoadError>| emitter.complete())
    .freeze_maybe(selector.clone())
    .subscribe_with(observer);

  selector.next(false);
  assert_eq!(*events.borrow(), vec![Event::Complete]);
}

#[rxferro_macro::test]
fn maybe_selector_completion_completes() {
  let (observer, events) = recorder::<i32>();
  let selector = Local::subject::<bool, LoadError>();
  let mut source = Local::subject::<i32, LoadError>();
  source
    .clone()
    .freeze_maybe(selector.clone())
    .subscribe_with(observer);

  source.next(1);
  selector.clone().complete();
  assert_eq!(*events.borrow(), vec![Event::Complete]);
  assert!(source.inner.is_empty());
}

#[rxferro_macro::test]
fn completable_discards_values() {
  let (observer, events) = recorder::<i32>();
  let mut selector = Local::subject::<bool, LoadError>();
  Local::create(|emitter: &mut dyn Emitter<i32, LoadError>| {
    emitter.next(1);
    emitter.complete();
  })
  .freeze_completable(selector.clone())
  .subscribe_with(observer);

  selector.next(false);
  assert_eq!(*events.borrow(), vec![Event::Complete]);
}

#[rxferro_macro::test]
fn multi_value_selector_completion_completes() {
  let (observer, events) = recorder();
  let selector = Local::subject::<bool, LoadError>();
  let mut source = Local::subject::<i32, LoadError>();
  source
    .clone()
    .freeze(selector.clone())
    .subscribe_with(observer);

  source.next(1);
  selector.clone().complete();
  assert_eq!(*events.borrow(), vec![Event::Complete]);
}

#[rxferro_macro::test]
fn cancel_is_idempotent() {
  let (observer, events) = recorder();
  let mut selector = Local::subject::<bool, LoadError>();
  let mut source = Local::subject::<i32, LoadError>();
  let subscription = source
    .clone()
    .freeze(selector.clone())
    .subscribe_with(observer);

  source.next(1);
  subscription.clone().unsubscribe();
  subscription.clone().unsubscribe();
  source.next(2);
  selector.next(false);
  assert!(events.borrow().is_empty());
  assert!(subscription.is_closed());
}

#[rxferro_macro::test]
fn threads_deliver_serialized_and_ordered() {
  const THREADS: usize = 4;
  const PER_THREAD: usize = 200;

  let seen = Arc::new(Mutex::new(vec![]));
  let in_callback = Arc::new(Mutex::new(false));
  let selector = Shared::subject::<bool, Infallible>();
  let source = Shared::subject::<(usize, usize), Infallible>();

  let (sink, busy) = (seen.clone(), in_callback.clone());
  source
    .clone()
    .freeze(selector.clone())
    .subscribe(move |v| {
      // A concurrent call would find the flag set.
      assert!(!std::mem::replace(&mut *busy.lock().unwrap(), true));
      sink.lock().unwrap().push(v);
      *busy.lock().unwrap() = false;
    });

  let mut handles: Vec<_> = (0..THREADS)
    .map(|t| {
      let mut source = source.clone();
      thread::spawn(move || {
        for i in 0..PER_THREAD {
          source.next((t, i));
        }
      })
    })
    .collect();
  let mut control = selector.clone();
  handles.push(thread::spawn(move || {
    for frozen in [false, true, false, true, false] {
      control.next(frozen);
      thread::yield_now();
    }
  }));
  for handle in handles {
    handle.join().unwrap();
  }

  let seen = seen.lock().unwrap();
  assert_eq!(seen.len(), THREADS * PER_THREAD);
  for t in 0..THREADS {
    let order: Vec<_> = seen
      .iter()
      .filter(|(thread, _)| *thread == t)
      .map(|(_, i)| *i)
      .collect();
    assert_eq!(order, (0..PER_THREAD).collect::<Vec<_>>());
  }
}

#[rxferro_macro::test]
fn cancel_from_another_thread_stops_delivery() {
  const THREADS: usize = 3;
  const PER_THREAD: usize = 2_000;

  let delivered = Arc::new(AtomicUsize::new(0));
  let after_cancel = Arc::new(AtomicUsize::new(0));
  let cancelled = Arc::new(AtomicBool::new(false));
  let mut selector = Shared::subject::<bool, Infallible>();
  let source = Shared::subject::<usize, Infallible>();

  let (count, late, done) = (delivered.clone(), after_cancel.clone(), cancelled.clone());
  let subscription = source
    .clone()
    .freeze(selector.clone())
    .subscribe(move |_| {
      if done.load(Ordering::SeqCst) {
        late.fetch_add(1, Ordering::SeqCst);
      }
      count.fetch_add(1, Ordering::SeqCst);
    });
  selector.next(false);

  let mut handles: Vec<_> = (0..THREADS)
    .map(|_| {
      let mut source = source.clone();
      thread::spawn(move || {
        for i in 0..PER_THREAD {
          source.next(i);
        }
      })
    })
    .collect();
  let mut control = selector.clone();
  handles.push(thread::spawn(move || {
    for i in 0..100 {
      control.next(i % 3 == 0);
    }
    control.next(false);
  }));
  let (handle, flag) = (subscription.clone(), cancelled.clone());
  handles.push(thread::spawn(move || {
    for _ in 0..50 {
      thread::yield_now();
    }
    handle.unsubscribe();
    flag.store(true, Ordering::SeqCst);
  }));
  for handle in handles {
    handle.join().unwrap();
  }

  // Only a delivery already handed out when cancel ran may still land.
  assert!(after_cancel.load(Ordering::SeqCst) <= 1);
  assert!(subscription.is_closed());
  assert!(source.inner.is_empty());
  assert!(selector.inner.is_empty());

  let total = delivered.load(Ordering::SeqCst);
  subscription.clone().unsubscribe();
  let mut source = source.clone();
  source.next(0);
  selector.next(false);
  assert_eq!(delivered.load(Ordering::SeqCst), total);
}

#[rxferro_macro::test(local)]
async fn frozen_stream_can_be_awaited() {
  use futures::StreamExt;

  let mut selector = Local::behavior_subject::<bool, Infallible>(true);
  let mut source = Local::subject::<i32, Infallible>();
  let mut stream = source.clone().freeze(selector.clone()).into_stream();

  source.next(1);
  source.next(2);
  source.clone().complete();
  selector.next(false);

  let mut values = vec![];
  while let Some(item) = stream.next().await {
    values.push(item);
  }
  assert_eq!(values, vec![Ok(1), Ok(2)]);
}
