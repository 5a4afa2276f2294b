//! Translating the host's C strings and buffers.
//!
//! Every function that touches a raw pointer is `unsafe` and lists what the
//! caller must guarantee. Null pointers are tolerated everywhere: they read
//! as empty strings and write as nothing.

use std::ffi::{CStr, CString, c_char, c_uint};

/// Read a host string, replacing invalid UTF-8.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub unsafe fn read_c_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    let text = unsafe { CStr::from_ptr(ptr) };
    text.to_string_lossy().into_owned()
}

/// Read the host's argument vector.
///
/// # Safety
///
/// `argv` must be null or point to `argc` readable pointers, each of which
/// satisfies [`read_c_str`]'s contract.
pub unsafe fn read_argv(argv: *const *const c_char, argc: c_uint) -> Vec<String> {
    let count = usize::try_from(argc).unwrap_or_default();
    if argv.is_null() || count == 0 {
        return Vec::new();
    }
    // SAFETY: `argv` points to `count` pointers per the caller's contract.
    let pointers = unsafe { std::slice::from_raw_parts(argv, count) };
    pointers
        .iter()
        // SAFETY: each element satisfies `read_c_str`'s contract.
        .map(|&ptr| unsafe { read_c_str(ptr) })
        .collect()
}

/// View the host's output buffer as bytes.
///
/// Null or zero-sized buffers become an empty slice.
///
/// # Safety
///
/// `output` must be null or point to `size` writable bytes that nothing
/// else accesses while the returned slice is alive.
pub unsafe fn output_buffer<'a>(output: *mut c_char, size: c_uint) -> &'a mut [u8] {
    let len = usize::try_from(size).unwrap_or_default();
    if output.is_null() || len == 0 {
        return &mut [];
    }
    // SAFETY: `output` is valid for `len` exclusive writes per the caller's
    // contract, and `c_char` has the layout of `u8`.
    unsafe { std::slice::from_raw_parts_mut(output.cast::<u8>(), len) }
}

/// Convert text for the host, dropping interior NUL bytes.
#[must_use]
pub fn to_c_string(text: &str) -> CString {
    let bytes: Vec<u8> = text.bytes().filter(|&b| b != 0).collect();
    // No NUL bytes remain, so this cannot fail.
    CString::new(bytes).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::*;

    #[test]
    fn null_reads_as_empty() {
        assert_eq!(unsafe { read_c_str(ptr::null()) }, "");
        assert!(unsafe { read_argv(ptr::null(), 3) }.is_empty());
        assert!(unsafe { output_buffer(ptr::null_mut(), 16) }.is_empty());
    }

    #[test]
    fn reads_strings_lossily() {
        let valid = CString::new("hello").unwrap();
        assert_eq!(unsafe { read_c_str(valid.as_ptr()) }, "hello");

        let invalid = CString::new(vec![b'a', 0xFF, b'b']).unwrap();
        assert_eq!(unsafe { read_c_str(invalid.as_ptr()) }, "a\u{FFFD}b");
    }

    #[test]
    fn reads_argv() {
        let owned: Vec<CString> = ["one", "\"two\""]
            .iter()
            .map(|s| CString::new(*s).unwrap())
            .collect();
        let pointers: Vec<*const c_char> = owned.iter().map(|s| s.as_ptr()).collect();

        let args = unsafe { read_argv(pointers.as_ptr(), 2) };
        assert_eq!(args, ["one", "\"two\""]);
    }

    #[test]
    fn output_buffer_covers_host_memory() {
        let mut memory = [1 as c_char; 8];
        let buffer = unsafe { output_buffer(memory.as_mut_ptr(), 8) };
        assert_eq!(buffer.len(), 8);
        buffer[0] = 0;
        assert_eq!(memory[0], 0);
    }

    #[test]
    fn c_string_strips_nul() {
        assert_eq!(to_c_string("a\0b").as_bytes(), b"ab");
    }
}
