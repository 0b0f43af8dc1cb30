//! The opaque `HedlDiagnostics` handle returned by [`crate::hedl_lint`].

use hedl_util::diagnostic::{Diagnostic, Severity};

pub struct HedlDiagnostics {
    pub(crate) entries: Vec<Diagnostic>,
}

pub(crate) const POISON: usize = usize::MAX;

pub(crate) fn poison() -> *mut HedlDiagnostics {
    POISON as *mut HedlDiagnostics
}

pub(crate) fn is_live(ptr: *const HedlDiagnostics) -> bool {
    !ptr.is_null() && ptr as usize != POISON
}

pub(crate) unsafe fn borrow<'a>(ptr: *const HedlDiagnostics) -> Option<&'a [Diagnostic]> {
    if is_live(ptr) {
        Some(&(*ptr).entries)
    } else {
        None
    }
}

pub(crate) fn severity_code(severity: Severity) -> i32 {
    match severity {
        Severity::Hint => 0,
        Severity::Warning => 1,
        Severity::Error => 2,
    }
}
