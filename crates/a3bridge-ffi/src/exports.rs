//! Bodies of the exported host entry points.
//!
//! [`export_extension!`](crate::export_extension) emits thin `extern
//! "system"` functions that forward here. Each body runs under
//! `catch_unwind`; a panic answers with an empty reply instead of unwinding
//! into the host.

use std::ffi::{c_char, c_int, c_uint};
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::callback::{HostCallback, HostCallbackFn};
use crate::extension::Extension;
use crate::strings::{output_buffer, read_argv, read_c_str};

/// `RVExtensionArgs` status for a successful call.
pub const STATUS_OK: c_int = 0;

/// `RVExtensionArgs` status for a call that failed synchronously.
pub const STATUS_FAILED: c_int = 1;

fn guarded<T>(entry: &str, fallback: T, body: impl FnOnce() -> T) -> T {
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|_| {
        error!(entry, "panic caught at host boundary");
        fallback
    })
}

/// `RVExtensionVersion`.
///
/// # Safety
///
/// `output` must be null or valid for `output_size` writes.
pub unsafe fn version(ext: &Extension, output: *mut c_char, output_size: c_uint) {
    guarded("RVExtensionVersion", (), || {
        // SAFETY: forwarded caller contract.
        let buffer = unsafe { output_buffer(output, output_size) };
        ext.version_into(buffer);
    });
}

/// `RVExtension`.
///
/// # Safety
///
/// `output` must be null or valid for `output_size` writes; `function`
/// must be null or a NUL-terminated string.
pub unsafe fn call(
    ext: &Extension,
    output: *mut c_char,
    output_size: c_uint,
    function: *const c_char,
) {
    guarded("RVExtension", (), || {
        // SAFETY: forwarded caller contract.
        let text = unsafe { read_c_str(function) };
        // SAFETY: forwarded caller contract.
        let buffer = unsafe { output_buffer(output, output_size) };
        ext.call_into(&text, buffer);
    });
}

/// `RVExtensionArgs`. Returns [`STATUS_OK`] or [`STATUS_FAILED`].
///
/// # Safety
///
/// As for [`call`], and `argv` must be null or point to `argc` valid string
/// pointers.
pub unsafe fn call_args(
    ext: &Extension,
    output: *mut c_char,
    output_size: c_uint,
    function: *const c_char,
    argv: *const *const c_char,
    argc: c_uint,
) -> c_int {
    let succeeded = guarded("RVExtensionArgs", false, || {
        // SAFETY: forwarded caller contract.
        let (command, args) = unsafe { (read_c_str(function), read_argv(argv, argc)) };
        // SAFETY: forwarded caller contract.
        let buffer = unsafe { output_buffer(output, output_size) };
        ext.call_with_args_into(&command, args, buffer)
    });
    if succeeded { STATUS_OK } else { STATUS_FAILED }
}

/// `RVExtensionContext`.
///
/// # Safety
///
/// `argv` must be null or point to `argc` valid string pointers.
pub unsafe fn context(ext: &Extension, argv: *const *const c_char, argc: c_uint) {
    guarded("RVExtensionContext", (), || {
        // SAFETY: forwarded caller contract.
        let args = unsafe { read_argv(argv, argc) };
        ext.set_context(&args);
    });
}

/// `RVExtensionRegisterCallback`. A null pointer clears the callback.
///
/// # Safety
///
/// See [`HostCallback::new`].
pub unsafe fn register_callback(ext: &Extension, callback: Option<HostCallbackFn>) {
    guarded("RVExtensionRegisterCallback", (), || {
        // SAFETY: forwarded caller contract.
        let callback = callback.map(|f| unsafe { HostCallback::new(f) });
        ext.set_callback(callback);
    });
}
