//! A presenter whose subscriptions follow the lifecycle of its screen.
//!
//! Every stream subscribed through a `FreezePresenter` is frozen by the
//! presenter's own selector. While the view is detached, or the screen is
//! stopped (and, by default, paused), events are held back. They are
//! replayed once the screen is visible again. Destroying the presenter
//! cancels every subscription it made.
//!
//! | Lifecycle call | Selector |
//! |----------------|----------|
//! | `on_load_finished`, `on_start` | unfrozen |
//! | `on_resume` | unfrozen when `freeze_on_pause` |
//! | `on_pause` | frozen when `freeze_on_pause` |
//! | `on_stop`, `detach_view` | frozen |
//! | `on_destroy` | every subscription cancelled |
//!
//! The selector starts frozen, so nothing reaches a view before the screen
//! has finished loading.

use std::convert::Infallible;

use crate::{
  context::{Context, Local, Shared},
  error::ScopeError,
  observable::{CoreObservable, Observable},
  observer::Observer,
  ops::freeze::{Cardinality, Freeze, FreezeErrors, KeepAll, ReplaceWith},
  rc::{RcDeref, RcDerefMut},
  scope::{ListenerId, ScreenScope},
  subject::{BehaviorSubject, SubjectPtr},
  subscription::{CompositeState, CompositeSubscription, IntoBoxedSubscription, Subscription},
};

/// The freeze selector owned by a presenter in context `C`.
pub type PresenterSelector<C> = BehaviorSubject<SubjectPtr<'static, C, bool, Infallible>>;

type PresenterSubscriptions<C> =
  CompositeSubscription<<C as Context>::RcMut<CompositeState<<C as Context>::BoxedSubscription>>>;

/// The operator a presenter puts in front of its observers.
pub type PresenterFreeze<C, S, R, E> = Freeze<S, PresenterSelector<C>, R, FreezeErrors<Infallible, E>>;

pub type LocalPresenter<V> = FreezePresenter<Local<()>, V>;
pub type SharedPresenter<V> = FreezePresenter<Shared<()>, V>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterState {
  /// No view attached.
  Unbound,
  /// View attached, events delivered.
  Active,
  /// View attached, events held back.
  Frozen,
  Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenterConfig {
  /// Also freeze while the screen is paused, so an attached but invisible
  /// view receives nothing.
  pub freeze_on_pause: bool,
}

impl Default for PresenterConfig {
  fn default() -> Self { Self { freeze_on_pause: true } }
}

impl PresenterConfig {
  pub fn freeze_on_pause(mut self, freeze_on_pause: bool) -> Self {
    self.freeze_on_pause = freeze_on_pause;
    self
  }
}

// The part of a presenter that destroy listeners and handles share.
struct PresenterCore<C: Context> {
  selector: PresenterSelector<C>,
  subscriptions: PresenterSubscriptions<C>,
  state: C::RcMut<PresenterState>,
}

impl<C: Context> Clone for PresenterCore<C> {
  fn clone(&self) -> Self {
    Self {
      selector: self.selector.clone(),
      subscriptions: self.subscriptions.clone(),
      state: self.state.clone(),
    }
  }
}

impl<C: Context> PresenterCore<C> {
  fn state(&self) -> PresenterState { *self.state.rc_deref() }

  /// Returns whether this call destroyed the core.
  fn destroy(&self) -> bool {
    {
      let mut state = self.state.rc_deref_mut();
      if *state == PresenterState::Destroyed {
        return false;
      }
      *state = PresenterState::Destroyed;
    }
    let cancelled = self.subscriptions.len();
    self.subscriptions.clone().unsubscribe();
    tracing::debug!(cancelled, "presenter destroyed");
    true
  }
}

/// Presenter base binding a freeze selector to the lifecycle of view `V`.
pub struct FreezePresenter<C: Context, V> {
  core: PresenterCore<C>,
  view: Option<V>,
  config: PresenterConfig,
  screen_recreated: bool,
  /// The flag last pushed to the selector. It may still be queued behind an
  /// emission in progress.
  frozen: bool,
}

/// Handle of one presenter subscription. Unsubscribing cancels the stream
/// and forgets it.
pub struct PresenterSubscription<C: Context> {
  subscriptions: PresenterSubscriptions<C>,
  id: Option<usize>,
}

impl<C: Context> Clone for PresenterSubscription<C> {
  fn clone(&self) -> Self { Self { subscriptions: self.subscriptions.clone(), id: self.id } }
}

impl<C: Context> Subscription for PresenterSubscription<C> {
  fn unsubscribe(self) {
    if let Some(id) = self.id {
      self.subscriptions.cancel(id);
    }
  }

  fn is_closed(&self) -> bool {
    self
      .id
      .is_none_or(|id| self.subscriptions.is_entry_closed(id))
  }
}

/// Observer fed by presenter subscriptions. Completion is not reported.
pub struct PresenterObserver<N, E> {
  on_next: N,
  on_error: E,
}

impl<Item, Err, N, E> Observer<Item, Err> for PresenterObserver<N, E>
where
  N: FnMut(Item),
  E: FnOnce(Err),
{
  fn next(&mut self, value: Item) { (self.on_next)(value) }

  fn error(self, err: Err) { (self.on_error)(err) }

  fn complete(self) {}

  fn is_closed(&self) -> bool { false }
}

fn unreachable_selector_error<E>(err: Infallible) -> E { match err {} }

impl<C: Context, V> FreezePresenter<C, V> {
  pub fn new() -> Self { Self::with_config(PresenterConfig::default()) }

  pub fn with_config(config: PresenterConfig) -> Self {
    Self {
      core: PresenterCore {
        selector: BehaviorSubject::new(true),
        subscriptions: CompositeSubscription::new(),
        state: PresenterState::Unbound.into(),
      },
      view: None,
      config,
      screen_recreated: false,
      frozen: true,
    }
  }

  pub fn config(&self) -> PresenterConfig { self.config }

  pub fn state(&self) -> PresenterState { self.core.state() }

  pub fn is_destroyed(&self) -> bool { self.state() == PresenterState::Destroyed }

  /// Whether the lifecycle last asked to hold events back.
  pub fn is_frozen(&self) -> bool { self.frozen }

  pub fn view(&self) -> Option<&V> { self.view.as_ref() }

  pub fn view_mut(&mut self) -> Option<&mut V> { self.view.as_mut() }

  /// The flag passed to the last `on_load`.
  pub fn is_screen_recreated(&self) -> bool { self.screen_recreated }

  /// The selector the presenter's subscriptions are frozen by.
  pub fn freeze_selector(&self) -> C::With<PresenterSelector<C>> {
    C::lift(self.core.selector.clone())
  }

  /// Number of subscriptions made through this presenter that are still
  /// running.
  pub fn subscription_count(&self) -> usize {
    self.core.subscriptions.prune_closed();
    self.core.subscriptions.len()
  }

  /// Whether `subscription` is missing or no longer delivers anything.
  pub fn is_subscription_inactive(&self, subscription: Option<&PresenterSubscription<C>>) -> bool {
    subscription.is_none_or(Subscription::is_closed)
  }

  pub fn on_destroy(&mut self) {
    if !self.core.destroy() {
      tracing::warn!("presenter destroyed twice");
    }
    self.view = None;
  }

  /// Destroy the presenter together with `scope`.
  pub fn bind_to_scope(&self, scope: &mut ScreenScope) -> Result<ListenerId, ScopeError>
  where
    C: 'static,
  {
    let core = self.core.clone();
    scope.add_destroy_listener(move || {
      core.destroy();
    })
  }

  // Finished entries are forgotten here, so a long-lived presenter only keeps
  // the streams still running.
  fn track<U>(&self, unsub: U) -> PresenterSubscription<C>
  where
    U: IntoBoxedSubscription<C::BoxedSubscription>,
  {
    let pruned = self.core.subscriptions.prune_closed();
    if pruned > 0 {
      tracing::trace!(pruned, "forgot finished presenter subscriptions");
    }
    let unsub = unsub.into_boxed();
    let id = if unsub.is_closed() { None } else { self.core.subscriptions.add(unsub) };
    PresenterSubscription { subscriptions: self.core.subscriptions.clone(), id }
  }

  fn inactive(&self, event: &'static str) -> Option<PresenterSubscription<C>> {
    if !self.is_destroyed() {
      return None;
    }
    tracing::warn!(event, "presenter already destroyed, call ignored");
    Some(PresenterSubscription { subscriptions: self.core.subscriptions.clone(), id: None })
  }

  /// Deliver `observable` to the callbacks, frozen by the presenter.
  /// Completion is not reported.
  pub fn subscribe<O, N, E>(&self, observable: O, on_next: N, on_error: E) -> PresenterSubscription<C>
  where
    O: Observable,
    N: FnMut(O::Item),
    E: FnOnce(O::Err),
    PresenterFreeze<C, O::Inner, KeepAll, O::Err>: CoreObservable<C::With<PresenterObserver<N, E>>>,
    <PresenterFreeze<C, O::Inner, KeepAll, O::Err> as CoreObservable<
      C::With<PresenterObserver<N, E>>,
    >>::Unsub: IntoBoxedSubscription<C::BoxedSubscription>,
  {
    self.subscribe_frozen(observable, KeepAll, PresenterObserver { on_next, on_error })
  }

  /// `subscribe` with a full observer, which also hears completion.
  pub fn subscribe_with<O, Obs>(&self, observable: O, observer: Obs) -> PresenterSubscription<C>
  where
    O: Observable,
    Obs: Observer<O::Item, O::Err>,
    PresenterFreeze<C, O::Inner, KeepAll, O::Err>: CoreObservable<C::With<Obs>>,
    <PresenterFreeze<C, O::Inner, KeepAll, O::Err> as CoreObservable<C::With<Obs>>>::Unsub:
      IntoBoxedSubscription<C::BoxedSubscription>,
  {
    self.subscribe_frozen(observable, KeepAll, observer)
  }

  /// `subscribe` that compacts the held values with `replace`, see
  /// `Observable::freeze_with`.
  pub fn subscribe_with_replace<O, F, N, E>(
    &self, observable: O, replace: F, on_next: N, on_error: E,
  ) -> PresenterSubscription<C>
  where
    O: Observable,
    F: FnMut(&O::Item, &O::Item) -> bool,
    N: FnMut(O::Item),
    E: FnOnce(O::Err),
    PresenterFreeze<C, O::Inner, ReplaceWith<F>, O::Err>:
      CoreObservable<C::With<PresenterObserver<N, E>>>,
    <PresenterFreeze<C, O::Inner, ReplaceWith<F>, O::Err> as CoreObservable<
      C::With<PresenterObserver<N, E>>,
    >>::Unsub: IntoBoxedSubscription<C::BoxedSubscription>,
  {
    let observer = PresenterObserver { on_next, on_error };
    self.subscribe_frozen(observable, ReplaceWith(replace), observer)
  }

  /// Deliver `observable` to the callbacks right away, regardless of the
  /// lifecycle. The subscription is still cancelled on destroy.
  pub fn subscribe_without_freezing<O, N, E>(
    &self, observable: O, on_next: N, on_error: E,
  ) -> PresenterSubscription<C>
  where
    O: Observable,
    N: FnMut(O::Item),
    E: FnOnce(O::Err),
    O::Inner: CoreObservable<C::With<PresenterObserver<N, E>>>,
    <O::Inner as CoreObservable<C::With<PresenterObserver<N, E>>>>::Unsub:
      IntoBoxedSubscription<C::BoxedSubscription>,
  {
    if let Some(handle) = self.inactive("subscribe_without_freezing") {
      return handle;
    }
    let unsub = observable
      .into_inner()
      .subscribe(C::lift(PresenterObserver { on_next, on_error }));
    self.track(unsub)
  }

  fn subscribe_frozen<O, R, Obs>(
    &self, observable: O, replace: R, observer: Obs,
  ) -> PresenterSubscription<C>
  where
    O: Observable,
    PresenterFreeze<C, O::Inner, R, O::Err>: CoreObservable<C::With<Obs>>,
    <PresenterFreeze<C, O::Inner, R, O::Err> as CoreObservable<C::With<Obs>>>::Unsub:
      IntoBoxedSubscription<C::BoxedSubscription>,
  {
    if let Some(handle) = self.inactive("subscribe") {
      return handle;
    }
    let freeze: PresenterFreeze<C, O::Inner, R, O::Err> = Freeze::new(
      observable.into_inner(),
      self.core.selector.clone(),
      replace,
      Cardinality::STREAM,
      FreezeErrors::new(unreachable_selector_error),
    );
    let unsub = freeze.subscribe(C::lift(observer));
    self.track(unsub)
  }
}

impl<C: Context, V> Default for FreezePresenter<C, V> {
  fn default() -> Self { Self::new() }
}

impl<C, V> FreezePresenter<C, V>
where
  C: Context,
  PresenterSelector<C>: Observer<bool, Infallible>,
{
  pub fn attach_view(&mut self, view: V) {
    if self.inactive("attach_view").is_some() {
      return;
    }
    self.view = Some(view);
    self.sync_state();
  }

  pub fn on_load(&mut self, screen_recreated: bool) {
    if self.inactive("on_load").is_some() {
      return;
    }
    tracing::debug!(screen_recreated, "presenter loaded");
    self.screen_recreated = screen_recreated;
  }

  pub fn on_load_finished(&mut self) { self.set_frozen(false, "on_load_finished"); }

  pub fn on_start(&mut self) { self.set_frozen(false, "on_start"); }

  pub fn on_resume(&mut self) {
    if self.config.freeze_on_pause {
      self.set_frozen(false, "on_resume");
    }
  }

  pub fn on_pause(&mut self) {
    if self.config.freeze_on_pause {
      self.set_frozen(true, "on_pause");
    }
  }

  pub fn on_stop(&mut self) { self.set_frozen(true, "on_stop"); }

  /// Freeze and drop the view. Returns the detached view.
  pub fn detach_view(&mut self) -> Option<V> {
    let view = self.view.take();
    self.set_frozen(true, "detach_view");
    view
  }

  fn set_frozen(&mut self, frozen: bool, event: &'static str) {
    if self.inactive(event).is_some() {
      return;
    }
    if self.frozen != frozen {
      tracing::trace!(event, frozen, "toggling presenter freeze");
    }
    self.frozen = frozen;
    // Unfreezing replays held events before this returns, unless the selector
    // is already emitting.
    let mut selector = self.core.selector.clone();
    selector.next(frozen);
    self.sync_state();
  }

  fn sync_state(&self) {
    let next = match (self.view.is_some(), self.frozen) {
      (false, _) => PresenterState::Unbound,
      (true, true) => PresenterState::Frozen,
      (true, false) => PresenterState::Active,
    };
    let mut state = self.core.state.rc_deref_mut();
    if *state != PresenterState::Destroyed && *state != next {
      tracing::debug!(from = ?*state, to = ?next, "presenter state changed");
      *state = next;
    }
  }
}
