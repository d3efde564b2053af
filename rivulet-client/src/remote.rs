use std::future::Future;
use std::pin::Pin;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use rivulet_core::error::{Error, Result};
use rivulet_core::waiter::{Wait, Waiter};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A scheduler running on its own OS thread.
///
/// Work is handed off through a thread-safe, non-blocking queue; state
/// owned by the remote runtime is never mutated from other threads
/// directly. Use [`submit`](RemoteScheduler::submit) for
/// fire-and-forget work and [`call`](RemoteScheduler::call) when the
/// caller wants to await a result from its own scheduler.
pub struct RemoteScheduler {
    tx: Option<mpsc::UnboundedSender<Job>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RemoteScheduler {
    /// Starts a current-thread runtime on a dedicated thread named
    /// `name`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        let thread = thread::Builder::new().name(name.to_string()).spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!(error = %e, "Failed to build remote scheduler runtime");
                    return;
                }
            };

            runtime.block_on(async move {
                let mut tasks = Vec::new();
                while let Some(job) = rx.recv().await {
                    tasks.push(tokio::spawn(job));
                }
                // Queue closed: let in-flight work finish before the
                // runtime goes away.
                for task in tasks {
                    if task.await.is_err() {
                        warn!("Remote job panicked");
                    }
                }
            });
            debug!("Remote scheduler stopped");
        })?;

        Ok(Self {
            tx: Some(tx),
            thread: Some(thread),
        })
    }

    /// Hands `future` to the remote scheduler. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the scheduler has shut down.
    pub fn submit<F>(&self, future: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Some(tx) = self.tx.as_ref() else {
            return Err(Error::connection("remote scheduler has shut down"));
        };
        tx.send(Box::pin(future))
            .map_err(|_| Error::connection("remote scheduler has shut down"))
    }

    /// Runs `future` on the remote scheduler and returns a future the
    /// caller can await for the result from its own scheduler.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the scheduler has shut down.
    pub fn call<F, T>(&self, future: F) -> Result<Wait<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let waiter = Waiter::new();
        // Claim the wait side before the remote thread can resolve.
        let wait = waiter.wait()?;
        self.submit(async move {
            let value = future.await;
            if let Err(e) = waiter.resolve(value) {
                warn!(error = %e, "Remote result discarded");
            }
        })?;
        Ok(wait)
    }

    /// Closes the hand-off queue and joins the scheduler thread.
    /// Queued work runs to completion first.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Remote scheduler thread panicked");
            }
        }
    }
}

impl Drop for RemoteScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
