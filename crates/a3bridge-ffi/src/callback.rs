//! The host's callback function pointer.

use std::ffi::{c_char, c_int};

use a3bridge_core::NativeCallback;

use crate::strings::to_c_string;

/// Signature of the function the host passes to
/// `RVExtensionRegisterCallback`.
pub type HostCallbackFn = unsafe extern "C" fn(
    name: *const c_char,
    function: *const c_char,
    data: *const c_char,
) -> c_int;

/// A host function pointer wrapped as a [`NativeCallback`].
#[derive(Debug, Clone, Copy)]
pub struct HostCallback(HostCallbackFn);

impl HostCallback {
    /// Wrap a host function pointer.
    ///
    /// # Safety
    ///
    /// `callback` must be callable from any thread for as long as the
    /// extension is loaded, and must not retain the string pointers it is
    /// given past the call.
    #[must_use]
    pub unsafe fn new(callback: HostCallbackFn) -> Self {
        Self(callback)
    }
}

impl NativeCallback for HostCallback {
    fn invoke(&self, name: &str, function: &str, data: &str) -> i32 {
        let name = to_c_string(name);
        let function = to_c_string(function);
        let data = to_c_string(data);
        // SAFETY: the pointers are NUL-terminated and outlive the call; the
        // function pointer is valid per `HostCallback::new`.
        unsafe { (self.0)(name.as_ptr(), function.as_ptr(), data.as_ptr()) }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::sync::Mutex;

    use super::*;

    static SEEN: Mutex<Vec<String>> = Mutex::new(Vec::new());

    unsafe extern "C" fn record(
        name: *const c_char,
        function: *const c_char,
        data: *const c_char,
    ) -> c_int {
        let read =
            |ptr: *const c_char| unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        SEEN.lock()
            .unwrap()
            .push(format!("{}/{}/{}", read(name), read(function), read(data)));
        7
    }

    #[test]
    fn forwards_to_function_pointer() {
        let callback = unsafe { HostCallback::new(record) };
        assert_eq!(callback.invoke("ext", "fn", "[\"a\0b\"]"), 7);
        assert_eq!(SEEN.lock().unwrap().as_slice(), ["ext/fn/[\"ab\"]"]);
    }
}
