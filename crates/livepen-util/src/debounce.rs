//! Trailing-edge debounce for rapid-fire events.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Coalesces bursts of calls into a single deferred invocation.
///
/// Each [`Debouncer::call`] supersedes any pending invocation and re-arms the
/// quiescence window; the wrapped action runs exactly once, with the last
/// call's arguments, once `delay` elapses with no further call. The action
/// never runs concurrently with itself and at most one invocation is pending
/// at a time.
///
/// Dropping the debouncer joins the worker and discards a pending
/// not-yet-due invocation; there is no flush or cancel API.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
/// use livepen_util::debounce::Debouncer;
///
/// let last = Arc::new(Mutex::new(None));
/// let sink = last.clone();
/// let debounced = Debouncer::new(Duration::from_millis(20), move |v: u32| {
///     *sink.lock().unwrap() = Some(v);
/// });
/// for v in 1..=5 {
///     debounced.call(v);
/// }
/// std::thread::sleep(Duration::from_millis(200));
/// assert_eq!(*last.lock().unwrap(), Some(5));
/// ```
pub struct Debouncer<T: Send + 'static> {
    tx: Option<Sender<T>>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, mut action: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<T>();
        let worker = thread::spawn(move || {
            while let Ok(mut pending) = rx.recv() {
                loop {
                    match rx.recv_timeout(delay) {
                        // a newer call supersedes the pending one
                        Ok(next) => pending = next,
                        Err(RecvTimeoutError::Timeout) => {
                            action(pending);
                            break;
                        }
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
            }
        });
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Schedules `args` to be delivered after the quiescence window,
    /// superseding any pending invocation. Non-blocking.
    pub fn call(&self, args: T) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(args);
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
