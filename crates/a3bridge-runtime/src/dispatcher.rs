//! Routing host calls to handlers.
//!
//! Two call paths exist. The single-string path resolves the command by
//! exact match, then by the text before the first `|`, and hands the whole
//! text to the raw handler. The args path resolves by exact match only and
//! hands the argument vector, plus a receipt timestamp, to the args
//! handler. Both then follow the same rules:
//!
//! - background registrations reply with their default response and run
//!   the handler after the reply is written
//! - foreground registrations reply with the handler's output
//! - every failure is reported to the error sink; foreground failures also
//!   become the reply `[command, message]`

use a3bridge_core::{CallShape, DispatchError, Invocation, Registration, Reply, timestamp_string};
use tracing::debug;

use crate::bridge::Bridge;
use crate::executor::{BackgroundTask, Job, ReplyGate, run_guarded};

/// Single-string command answered with the current time in nanoseconds.
pub const TIMESTAMP_COMMAND: &str = ":TIMESTAMP:";

/// The result of dispatching one host call.
///
/// Holds the reply for the host and, for background registrations, the
/// gate that lets the handler start. The gate opens when the dispatch is
/// dropped or [`release`](Self::release)d, so write the reply first.
#[derive(Debug)]
#[must_use = "the background handler starts when the dispatch is dropped or released"]
pub struct Dispatch {
    reply: Reply,
    error: Option<DispatchError>,
    gate: Option<ReplyGate>,
    task: Option<BackgroundTask>,
}

impl Dispatch {
    fn replied(reply: Reply) -> Self {
        Self {
            reply,
            error: None,
            gate: None,
            task: None,
        }
    }

    fn failed(reply: Reply, error: DispatchError) -> Self {
        Self {
            reply,
            error: Some(error),
            gate: None,
            task: None,
        }
    }

    fn deferred(reply: Reply, gate: ReplyGate, task: BackgroundTask) -> Self {
        Self {
            reply,
            error: None,
            gate: Some(gate),
            task: Some(task),
        }
    }

    /// The reply for the host.
    pub fn reply(&self) -> &Reply {
        &self.reply
    }

    /// The failure folded into the reply, if the call failed synchronously.
    pub fn error(&self) -> Option<&DispatchError> {
        self.error.as_ref()
    }

    /// Whether the call failed synchronously.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Whether a background handler is attached.
    pub fn is_background(&self) -> bool {
        self.task.is_some()
    }

    /// Copy the reply into the host buffer. See [`Reply::write_to`].
    pub fn write_reply(&self, buffer: &mut [u8]) -> usize {
        self.reply.write_to(buffer)
    }

    /// Start the background handler, returning a handle to it.
    pub fn release(mut self) -> Option<BackgroundTask> {
        self.open_gate();
        self.task.take()
    }

    fn open_gate(&mut self) {
        if let Some(gate) = self.gate.take() {
            gate.open();
        }
    }
}

impl Drop for Dispatch {
    fn drop(&mut self) {
        self.open_gate();
    }
}

impl Bridge {
    /// Dispatch a single-string call with a host buffer of `capacity` bytes.
    pub fn call(&self, text: &str, capacity: usize) -> Dispatch {
        debug!(command = text, capacity, "dispatching call");

        if text == TIMESTAMP_COMMAND {
            return Dispatch::replied(Reply::bounded(timestamp_string(), capacity));
        }

        let Some(registration) = self.registry.resolve(text) else {
            return self.fail(
                DispatchError::CommandNotRegistered {
                    command: text.to_owned(),
                },
                capacity,
            );
        };
        let Some(handler) = registration.handlers().raw().cloned() else {
            return self.fail(
                DispatchError::HandlerNotSet {
                    command: registration.command().to_owned(),
                    shape: CallShape::Raw,
                },
                capacity,
            );
        };

        let data = text.to_owned();
        self.run(
            &registration,
            Box::new(move |invocation: &Invocation| handler(invocation, &data)),
            capacity,
        )
    }

    /// Dispatch a command with an argument vector.
    ///
    /// The receipt timestamp is appended as the last argument.
    pub fn call_with_args(
        &self,
        command: &str,
        mut args: Vec<String>,
        capacity: usize,
    ) -> Dispatch {
        debug!(command, args = args.len(), capacity, "dispatching call with args");

        let Some(registration) = self.registry.lookup(command) else {
            return self.fail(
                DispatchError::CommandNotRegistered {
                    command: command.to_owned(),
                },
                capacity,
            );
        };
        let Some(handler) = registration.handlers().args().cloned() else {
            return self.fail(
                DispatchError::HandlerNotSet {
                    command: registration.command().to_owned(),
                    shape: CallShape::Args,
                },
                capacity,
            );
        };

        args.push(timestamp_string());
        self.run(
            &registration,
            Box::new(move |invocation: &Invocation| handler(invocation, &args)),
            capacity,
        )
    }

    /// [`call`](Self::call) with the configured default capacity.
    pub fn execute(&self, text: &str) -> Dispatch {
        self.call(text, self.settings.default_reply_capacity)
    }

    /// [`call_with_args`](Self::call_with_args) with the configured default
    /// capacity.
    pub fn execute_with_args(&self, command: &str, args: Vec<String>) -> Dispatch {
        self.call_with_args(command, args, self.settings.default_reply_capacity)
    }

    fn run(&self, registration: &Registration, job: Job, capacity: usize) -> Dispatch {
        let invocation = self.invocation_for(registration);

        if registration.run_in_background() {
            let (gate, task) = self.executor.spawn(invocation, job, self.errors.clone());
            debug!(command = registration.command(), "handler queued behind reply");
            return Dispatch::deferred(
                Reply::bounded(registration.default_response(), capacity),
                gate,
                task,
            );
        }

        let outcome = match self.settings.reply_deadline {
            Some(deadline) => {
                self.executor
                    .run_with_deadline(invocation, job, deadline, &self.errors)
            },
            None => run_guarded(&invocation, job),
        };
        match outcome {
            Ok(response) => Dispatch::replied(Reply::bounded(response, capacity)),
            Err(error) => self.fail(error, capacity),
        }
    }

    fn fail(&self, error: DispatchError, capacity: usize) -> Dispatch {
        self.errors.report(&error);
        Dispatch::failed(Reply::failure(&error, capacity), error)
    }

    fn invocation_for(&self, registration: &Registration) -> Invocation {
        Invocation::new(registration.command())
            .with_extension_name(self.extension_name.as_str())
            .with_context(self.context.snapshot())
            .with_cancellation(self.shutdown.child_token())
            .with_callbacks(self.callbacks.clone())
    }
}
