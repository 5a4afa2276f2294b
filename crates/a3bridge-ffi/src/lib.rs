//! a3bridge FFI - the Arma 3 `RVExtension` entry points.
//!
//! This is the only a3bridge crate with `unsafe` code. It reads the host's
//! C strings and argument vectors, writes replies into the host's output
//! buffer, wraps the host's callback pointer, and keeps panics from
//! crossing the boundary.
//!
//! An extension crate builds as a `cdylib` and exports the entry points
//! with one macro call:
//!
//! ```rust,ignore
//! use a3bridge_runtime::Bridge;
//!
//! fn init() -> anyhow::Result<Bridge> {
//!     let bridge = Bridge::builder().extension_name("myExt").build()?;
//!     bridge
//!         .new_registration("hello")
//!         .handler(|_, _| Ok(r#"["hi"]"#.to_owned()))
//!         .register()?;
//!     Ok(bridge)
//! }
//!
//! a3bridge_ffi::export_extension!(init);
//! ```

#![allow(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod callback;
pub mod exports;
pub mod extension;
pub mod strings;

pub use callback::{HostCallback, HostCallbackFn};
pub use exports::{STATUS_FAILED, STATUS_OK};
pub use extension::Extension;

/// Export the five `RVExtension*` entry points for an extension.
///
/// `$init` is called once, on the first host call, and must evaluate to a
/// `FnOnce() -> anyhow::Result<Bridge>`. Use at most once per crate.
#[macro_export]
macro_rules! export_extension {
    ($init:expr) => {
        fn __a3bridge_extension() -> &'static $crate::Extension {
            static EXTENSION: ::std::sync::OnceLock<$crate::Extension> =
                ::std::sync::OnceLock::new();
            EXTENSION.get_or_init(|| $crate::Extension::new($init))
        }

        /// Host entry point: version query, called once at load.
        ///
        /// # Safety
        ///
        /// `output` must be null or valid for `output_size` writes.
        #[allow(non_snake_case)]
        #[unsafe(no_mangle)]
        pub unsafe extern "system" fn RVExtensionVersion(
            output: *mut ::std::ffi::c_char,
            output_size: ::std::ffi::c_uint,
        ) {
            unsafe { $crate::exports::version(__a3bridge_extension(), output, output_size) }
        }

        /// Host entry point: `"ext" callExtension "text"`.
        ///
        /// # Safety
        ///
        /// See `a3bridge_ffi::exports::call`.
        #[allow(non_snake_case)]
        #[unsafe(no_mangle)]
        pub unsafe extern "system" fn RVExtension(
            output: *mut ::std::ffi::c_char,
            output_size: ::std::ffi::c_uint,
            function: *const ::std::ffi::c_char,
        ) {
            unsafe { $crate::exports::call(__a3bridge_extension(), output, output_size, function) }
        }

        /// Host entry point: `"ext" callExtension ["fn", [args]]`.
        ///
        /// # Safety
        ///
        /// See `a3bridge_ffi::exports::call_args`.
        #[allow(non_snake_case)]
        #[unsafe(no_mangle)]
        pub unsafe extern "system" fn RVExtensionArgs(
            output: *mut ::std::ffi::c_char,
            output_size: ::std::ffi::c_uint,
            function: *const ::std::ffi::c_char,
            argv: *const *const ::std::ffi::c_char,
            argc: ::std::ffi::c_uint,
        ) -> ::std::ffi::c_int {
            unsafe {
                $crate::exports::call_args(
                    __a3bridge_extension(),
                    output,
                    output_size,
                    function,
                    argv,
                    argc,
                )
            }
        }

        /// Host entry point: caller context ahead of a call.
        ///
        /// # Safety
        ///
        /// See `a3bridge_ffi::exports::context`.
        #[allow(non_snake_case)]
        #[unsafe(no_mangle)]
        pub unsafe extern "system" fn RVExtensionContext(
            argv: *const *const ::std::ffi::c_char,
            argc: ::std::ffi::c_uint,
        ) {
            unsafe { $crate::exports::context(__a3bridge_extension(), argv, argc) }
        }

        /// Host entry point: installs the callback used for pushed results.
        ///
        /// # Safety
        ///
        /// See `a3bridge_ffi::HostCallback::new`.
        #[allow(non_snake_case)]
        #[unsafe(no_mangle)]
        pub unsafe extern "system" fn RVExtensionRegisterCallback(
            callback: ::std::option::Option<$crate::HostCallbackFn>,
        ) {
            unsafe { $crate::exports::register_callback(__a3bridge_extension(), callback) }
        }
    };
}
