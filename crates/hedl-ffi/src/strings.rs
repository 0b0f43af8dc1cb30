//! Helpers for crossing the C string/byte-buffer boundary: reading an
//! `(ptr, len)` pair where `len == -1` means "null-terminated", and
//! handing owned output back as a pointer the caller must release
//! through the matching `hedl_free_*` function.

use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::slice;

use crate::error::HedlStatus;
use crate::last_error;

/// Borrows the bytes behind `ptr`/`len` without copying. `len == -1` means
/// the buffer is null-terminated and its length must be discovered with
/// `strlen`; any other negative length is rejected rather than silently
/// truncated.
///
/// # Safety
/// `ptr` must be valid for `len` bytes (or null-terminated, if `len == -1`).
pub(crate) unsafe fn borrow_input<'a>(ptr: *const c_char, len: c_int) -> Result<&'a [u8], HedlStatus> {
    if ptr.is_null() {
        last_error::set("input pointer is null");
        return Err(HedlStatus::NullArgument);
    }
    if len == -1 {
        let cstr = std::ffi::CStr::from_ptr(ptr);
        return Ok(cstr.to_bytes());
    }
    if len < 0 {
        last_error::set("input length must be -1 or non-negative");
        return Err(HedlStatus::NullArgument);
    }
    Ok(slice::from_raw_parts(ptr as *const u8, len as usize))
}

/// Leaks `text` as a NUL-terminated C string; the caller releases it with
/// [`crate::hedl_free_string`].
pub(crate) fn leak_string(text: String) -> *mut c_char {
    match CString::new(text) {
        Ok(c) => c.into_raw(),
        Err(_) => {
            last_error::set("output contained an interior NUL byte");
            std::ptr::null_mut()
        }
    }
}

/// Leaks `bytes` as a `(ptr, len)` pair; the caller releases it with
/// [`crate::hedl_free_bytes`] passing the same length back.
pub(crate) fn leak_bytes(bytes: Vec<u8>) -> (*mut u8, usize) {
    let mut boxed = bytes.into_boxed_slice();
    let ptr = boxed.as_mut_ptr();
    let len = boxed.len();
    std::mem::forget(boxed);
    (ptr, len)
}
