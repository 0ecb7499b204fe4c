//! A book catalog screen that survives a configuration change.
//!
//! A worker thread loads books while the screen's view is destroyed and
//! rebuilt. The presenter lives in a `ScreenScope`, so it outlives the view;
//! books that arrive while no view is attached are held and shown to the new
//! view once it has loaded.
//!
//! Run with `RUST_LOG=rxferro=debug cargo run --example book_catalog` to see
//! the presenter and scope lifecycle.

use std::{
  convert::Infallible,
  sync::{mpsc, Arc, Mutex},
  thread,
  time::Duration,
};

use rxferro::prelude::*;
use tracing_subscriber::EnvFilter;

const SCREEN: &str = "catalog";

#[derive(Debug, Clone)]
struct Book {
  title: &'static str,
  author: &'static str,
}

/// What the current view displays.
#[derive(Default)]
struct CatalogView {
  generation: u32,
  rows: Vec<String>,
}

type Display = Arc<Mutex<CatalogView>>;
type Presenter = SharedPresenter<u32>;

fn load_books(
  mut repository: Shared<Subject<SubjectPtr<'static, Shared<()>, Book, Infallible>>>,
  step: mpsc::Receiver<()>,
) -> thread::JoinHandle<()> {
  let books = [
    Book { title: "Dune", author: "Frank Herbert" },
    Book { title: "Solaris", author: "Stanisław Lem" },
    Book { title: "Hyperion", author: "Dan Simmons" },
    Book { title: "Ubik", author: "Philip K. Dick" },
  ];
  thread::spawn(move || {
    for book in books {
      // Wait for the main thread to let the next book through.
      if step.recv().is_err() {
        return;
      }
      println!("[worker] loaded {}", book.title);
      repository.next(book);
    }
    repository.complete();
  })
}

fn create_view(registry: &mut ScopeRegistry, display: &Display, generation: u32) {
  display.lock().unwrap().generation = generation;
  let (scope, recreated) = registry.find_or_create(SCREEN);
  let presenter = scope.get_typed_mut::<Presenter>().unwrap().unwrap();
  presenter.attach_view(generation);
  presenter.on_load(recreated);
  presenter.on_load_finished();
  presenter.on_start();
  presenter.on_resume();
  println!("[main] view #{generation} ready ({:?})", presenter.state());
}

fn destroy_view(registry: &mut ScopeRegistry) {
  let scope = registry.find_mut(SCREEN).unwrap();
  let presenter = scope.get_typed_mut::<Presenter>().unwrap().unwrap();
  presenter.on_pause();
  presenter.on_stop();
  let view = presenter.detach_view();
  println!("[main] view #{} destroyed", view.unwrap_or_default());
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let mut registry = ScopeRegistry::new();
  let display: Display = Arc::default();
  let repository = Shared::subject::<Book, Infallible>();

  {
    let (scope, _) = registry.find_or_create(SCREEN);
    let presenter = Presenter::new();
    presenter.bind_to_scope(scope).unwrap();

    let shown = display.clone();
    presenter.subscribe(
      repository.clone(),
      move |book: Book| {
        let mut view = shown.lock().unwrap();
        let row = format!("{} by {}", book.title, book.author);
        println!("[view #{}] {row}", view.generation);
        view.rows.push(row);
      },
      |e: Infallible| match e {},
    );
    scope.put_typed(presenter).unwrap();
  }

  let (step, steps) = mpsc::channel();
  let worker = load_books(repository.clone(), steps);

  create_view(&mut registry, &display, 1);
  step.send(()).unwrap();
  thread::sleep(Duration::from_millis(50));

  // Rotation: the view is torn down while two more books load.
  destroy_view(&mut registry);
  step.send(()).unwrap();
  step.send(()).unwrap();
  thread::sleep(Duration::from_millis(50));
  println!("[main] {} rows shown so far", display.lock().unwrap().rows.len());

  create_view(&mut registry, &display, 2);
  step.send(()).unwrap();
  worker.join().unwrap();

  println!("[main] final rows: {:?}", display.lock().unwrap().rows);
  registry.destroy(SCREEN);
}
