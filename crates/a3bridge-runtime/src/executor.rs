//! Running handlers off the host thread.
//!
//! Background handlers are spawned as tokio tasks that first wait for the
//! call's [`ReplyGate`], so the host always has the synchronous reply before
//! a handler can push anything through the callback. The handler itself is
//! synchronous and runs on the blocking pool. An optional semaphore bounds
//! how many run at once.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use a3bridge_core::{DispatchError, DispatchResult, ErrorSink, Invocation};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::{Semaphore, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::error::{RuntimeError, RuntimeResult};

/// A handler bound to its input, ready to run once.
pub type Job = Box<dyn FnOnce(&Invocation) -> anyhow::Result<String> + Send + 'static>;

/// Run `job`, converting its error or panic into a [`DispatchError`].
pub fn run_guarded(invocation: &Invocation, job: Job) -> DispatchResult<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| job(invocation))) {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(error)) => Err(DispatchError::from_handler_error(invocation.command(), &error)),
        Err(payload) => Err(DispatchError::HandlerPanicked {
            command: invocation.command().to_owned(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

fn join_error(command: &str, error: &JoinError) -> DispatchError {
    if error.is_panic() {
        DispatchError::HandlerPanicked {
            command: command.to_owned(),
            message: error.to_string(),
        }
    } else {
        DispatchError::Aborted {
            command: command.to_owned(),
        }
    }
}

/// Released once the synchronous reply has been handed to the host.
///
/// Dropping the gate releases it too.
#[derive(Debug)]
pub struct ReplyGate(oneshot::Sender<()>);

impl ReplyGate {
    /// Let the background handler start.
    pub fn open(self) {
        // The task may already be gone if the runtime shut down.
        let _ = self.0.send(());
    }
}

/// Handle to a background handler.
///
/// Dropping it detaches the handler; it still runs to completion.
#[derive(Debug)]
pub struct BackgroundTask {
    command: String,
    handle: JoinHandle<DispatchResult<String>>,
}

impl BackgroundTask {
    /// The command being served.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether the handler has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the handler if it has not started yet. A handler already
    /// running on the blocking pool runs to completion.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait for the handler's result.
    ///
    /// # Errors
    ///
    /// Returns the handler's [`DispatchError`], or
    /// [`DispatchError::Aborted`] if the task was cancelled.
    pub async fn join(self) -> DispatchResult<String> {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(join_error(&self.command, &e)),
        }
    }

    /// Block the current thread until the handler finishes.
    ///
    /// Must not be called from inside an async task.
    ///
    /// # Errors
    ///
    /// See [`join`](Self::join).
    pub fn wait(self) -> DispatchResult<String> {
        futures::executor::block_on(self.join())
    }
}

// Bounds, when set, must be at least one.
fn non_zero(field: &'static str, value: Option<usize>) -> RuntimeResult<()> {
    if value == Some(0) {
        return Err(RuntimeError::InvalidSettings {
            field,
            message: "must be at least 1 when set".to_owned(),
        });
    }
    Ok(())
}

fn background_permits(max_background: Option<usize>) -> RuntimeResult<Option<Arc<Semaphore>>> {
    non_zero("max_background", max_background)?;
    Ok(max_background.map(|n| Arc::new(Semaphore::new(n))))
}

enum Workers {
    Owned(Option<Runtime>),
    Shared,
}

/// Executes handlers on a tokio runtime, owned or borrowed.
pub struct BackgroundExecutor {
    workers: Workers,
    handle: Handle,
    permits: Option<Arc<Semaphore>>,
    max_background: Option<usize>,
}

impl BackgroundExecutor {
    /// Start a dedicated multi-thread runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidSettings`] if either bound is zero, or
    /// [`RuntimeError::ExecutorStartup`] if the runtime cannot be built.
    pub fn new(
        worker_threads: Option<usize>,
        max_background: Option<usize>,
    ) -> RuntimeResult<Self> {
        non_zero("worker_threads", worker_threads)?;
        let permits = background_permits(max_background)?;

        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.enable_all().thread_name("a3bridge-worker");
        if let Some(threads) = worker_threads {
            builder.worker_threads(threads);
        }
        let runtime = builder.build()?;
        let handle = runtime.handle().clone();
        debug!(?worker_threads, ?max_background, "started background runtime");

        Ok(Self {
            workers: Workers::Owned(Some(runtime)),
            handle,
            permits,
            max_background,
        })
    }

    /// Run on an existing runtime. The caller keeps it alive.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidSettings`] if `max_background` is zero.
    pub fn with_handle(handle: Handle, max_background: Option<usize>) -> RuntimeResult<Self> {
        Ok(Self {
            workers: Workers::Shared,
            handle,
            permits: background_permits(max_background)?,
            max_background,
        })
    }

    /// The runtime handle handlers are spawned on.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Configured concurrency bound for background handlers.
    #[must_use]
    pub fn max_background(&self) -> Option<usize> {
        self.max_background
    }

    /// Background slots currently free, when bounded.
    #[must_use]
    pub fn available_permits(&self) -> Option<usize> {
        self.permits.as_ref().map(|s| s.available_permits())
    }

    /// Queue `job` to run after the returned gate opens.
    ///
    /// Failures are reported to `errors`; the host already has its reply.
    pub fn spawn(
        &self,
        invocation: Invocation,
        job: Job,
        errors: ErrorSink,
    ) -> (ReplyGate, BackgroundTask) {
        let (gate_tx, gate_rx) = oneshot::channel::<()>();
        let permits = self.permits.clone();
        let command = invocation.command().to_owned();
        let task_command = command.clone();

        let handle = self.handle.spawn(async move {
            // Sent or dropped, either way the reply is with the host.
            let _ = gate_rx.await;

            let _permit = match permits {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return Err(DispatchError::Aborted { command: task_command }),
                },
                None => None,
            };

            if invocation.is_cancelled() {
                let error = DispatchError::Aborted { command: task_command };
                errors.report(&error);
                return Err(error);
            }

            debug!(command = %task_command, "running background handler");
            let worker = tokio::task::spawn_blocking(move || run_guarded(&invocation, job));
            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(e) => Err(join_error(&task_command, &e)),
            };
            if let Err(error) = &outcome {
                errors.report(error);
            }
            outcome
        });

        (ReplyGate(gate_tx), BackgroundTask { command, handle })
    }

    /// Run `job` on the blocking pool and wait at most `deadline` for it.
    ///
    /// On expiry the invocation is cancelled and
    /// [`DispatchError::DeadlineElapsed`] returned. The handler keeps running;
    /// if it later fails, that error goes to `errors` only.
    ///
    /// # Errors
    ///
    /// The handler's error, `DeadlineElapsed`, or `Aborted` if the worker
    /// vanished.
    pub fn run_with_deadline(
        &self,
        invocation: Invocation,
        job: Job,
        deadline: Duration,
        errors: &ErrorSink,
    ) -> DispatchResult<String> {
        // Rendezvous: a send only succeeds while the caller is still waiting.
        let (tx, rx) = mpsc::sync_channel::<DispatchResult<String>>(0);
        let token = invocation.cancellation().clone();
        let command = invocation.command().to_owned();
        let late = errors.clone();

        self.handle.spawn_blocking(move || {
            let outcome = run_guarded(&invocation, job);
            if let Err(unsent) = tx.send(outcome) {
                match unsent.0 {
                    Err(error) => late.report(&error),
                    Ok(_) => debug!(
                        command = invocation.command(),
                        "discarding result that missed its deadline"
                    ),
                }
            }
        });

        match rx.recv_timeout(deadline) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                token.cancel();
                warn!(command = %command, ?deadline, "handler missed reply deadline");
                Err(DispatchError::DeadlineElapsed {
                    command,
                    elapsed_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                })
            },
            Err(RecvTimeoutError::Disconnected) => Err(DispatchError::Aborted { command }),
        }
    }
}

impl Drop for BackgroundExecutor {
    fn drop(&mut self) {
        if let Workers::Owned(runtime) = &mut self.workers {
            // Never block the host on unload waiting for handlers.
            if let Some(runtime) = runtime.take() {
                runtime.shutdown_background();
            }
        }
    }
}

impl std::fmt::Debug for BackgroundExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundExecutor")
            .field("owned", &matches!(self.workers, Workers::Owned(_)))
            .field("max_background", &self.max_background)
            .field("available_permits", &self.available_permits())
            .finish_non_exhaustive()
    }
}
