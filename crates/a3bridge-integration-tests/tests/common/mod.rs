//! Shared helpers for driving the host boundary from tests.

use std::ffi::{CString, c_char};
use std::time::{Duration, Instant};

/// Host strings kept alive alongside the pointer array the host would pass.
#[allow(dead_code)]
pub struct HostArgs {
    _owned: Vec<CString>,
    pointers: Vec<*const c_char>,
}

#[allow(dead_code)]
impl HostArgs {
    /// Build an argument vector from Rust strings.
    pub fn new(args: &[&str]) -> Self {
        let owned: Vec<CString> = args.iter().map(|a| CString::new(*a).unwrap()).collect();
        let pointers = owned.iter().map(|s| s.as_ptr()).collect();
        Self {
            _owned: owned,
            pointers,
        }
    }

    /// Pointer to the first element.
    pub fn as_ptr(&self) -> *const *const c_char {
        self.pointers.as_ptr()
    }

    /// Element count as the host reports it.
    pub fn count(&self) -> u32 {
        u32::try_from(self.pointers.len()).unwrap()
    }
}

/// A host output buffer.
#[allow(dead_code)]
pub struct OutputBuffer {
    bytes: Vec<c_char>,
}

#[allow(dead_code)]
impl OutputBuffer {
    /// A buffer of `size` bytes, pre-filled with a non-zero marker.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0x7F; size],
        }
    }

    /// Pointer passed to the entry point.
    pub fn as_mut_ptr(&mut self) -> *mut c_char {
        self.bytes.as_mut_ptr()
    }

    /// Size passed to the entry point.
    pub fn size(&self) -> u32 {
        u32::try_from(self.bytes.len()).unwrap()
    }

    /// The NUL-terminated reply.
    pub fn text(&self) -> String {
        let bytes: Vec<u8> = self
            .bytes
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c.to_ne_bytes()[0])
            .collect();
        String::from_utf8(bytes).unwrap()
    }

    /// Whether a terminator was written inside the buffer.
    pub fn is_terminated(&self) -> bool {
        self.bytes.contains(&0)
    }
}

/// Poll `condition` until it holds or `timeout` passes.
#[allow(dead_code)]
pub fn eventually(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
