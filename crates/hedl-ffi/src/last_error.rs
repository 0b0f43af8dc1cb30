//! Per-thread last-error mailbox.
//!
//! Every extern function that can fail writes its message here before
//! returning an error code, and clears the slot on success. The `get`
//! view borrowed out of [`hedl_get_last_error`] is only valid until the
//! next `hedl_*` call on the same thread, since the next write replaces
//! the backing [`CString`].

use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

pub fn set(message: impl Into<Vec<u8>>) {
    let text = CString::new(sanitize(message.into())).unwrap_or_else(|_| CString::new("<error message contained NUL>").unwrap());
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(text));
}

pub fn clear() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Returns a pointer valid until the next call on this thread, or null if
/// the calling thread has no recorded error.
pub fn get() -> *const c_char {
    LAST_ERROR.with(|slot| match slot.borrow().as_ref() {
        Some(message) => message.as_ptr(),
        None => ptr::null(),
    })
}

fn sanitize(mut bytes: Vec<u8>) -> Vec<u8> {
    bytes.retain(|&b| b != 0);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        clear();
        assert!(get().is_null());
    }

    #[test]
    fn set_then_get_round_trips() {
        set("boom");
        let ptr = get();
        assert!(!ptr.is_null());
        let text = unsafe { std::ffi::CStr::from_ptr(ptr) }.to_str().unwrap();
        assert_eq!(text, "boom");
        clear();
        assert!(get().is_null());
    }
}
