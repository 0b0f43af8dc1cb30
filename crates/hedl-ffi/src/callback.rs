//! The streaming-output callback type used by each emit operation's
//! `*_callback` variant.
//!
//! This implementation hands the whole rendered buffer to the callback in
//! a single invocation. Callers must not assume chunk boundaries align
//! with any semantic unit -- a one-chunk call trivially satisfies that,
//! and incremental emission is not required.

use std::os::raw::{c_char, c_void};

pub type HedlOutputCallback = extern "C" fn(data: *const c_char, len: usize, user_data: *mut c_void);

pub(crate) fn emit(callback: HedlOutputCallback, user_data: *mut c_void, text: &str) {
    callback(text.as_ptr() as *const c_char, text.len(), user_data);
}

pub(crate) fn emit_bytes(callback: HedlOutputCallback, user_data: *mut c_void, bytes: &[u8]) {
    callback(bytes.as_ptr() as *const c_char, bytes.len(), user_data);
}
