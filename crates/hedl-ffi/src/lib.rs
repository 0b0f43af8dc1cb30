//! hedl-ffi - The C-callable control surface over the HEDL engine.
//!
//! Every extern function here is a thin wrapper: decode arguments, call
//! into `hedl-lex`/`hedl-par`/`hedl-sem`/`hedl-fmt`/`hedl-lint`/`hedl-render`
//! through the Traversal API, encode the result, and on failure populate
//! the calling thread's last-error slot before returning a stable error
//! code. None of this crate's own code implements lexing, parsing,
//! resolution or rendering -- it only adapts those crates to a pointer-
//! and-integer ABI a C caller can hold.
//!
//! # Memory discipline
//!
//! Every output handed across the boundary -- strings, byte buffers,
//! document handles, diagnostics handles -- is allocated here and must be
//! released through the matching `hedl_free_*` function exactly once.
//! Releasing null is a no-op; releasing the same live handle twice is
//! undefined behavior, though this crate poisons a handle's backing
//! pointer before returning it from `hedl_free_document`/
//! `hedl_free_diagnostics` so a second release is at least detectable
//! rather than silently reusing freed memory.
//!
//! # Thread safety
//!
//! [`hedl_get_last_error`] and [`hedl_clear_error_threadsafe`] operate on
//! a per-thread slot: an error raised on one thread is never
//! visible on another. Document and diagnostics handles are not
//! synchronized; a caller sharing one across threads must provide its own
//! synchronization.

mod callback;
mod diagnostics;
mod document;
mod error;
mod last_error;
mod strings;

use std::os::raw::{c_char, c_int, c_void};
use std::ptr;

use hedl_traverse::{DocumentView, ValueHandle};

pub use callback::HedlOutputCallback;
pub use diagnostics::HedlDiagnostics;
pub use document::HedlDocument;
pub use error::HedlStatus;

macro_rules! require_out {
    ($ptr:expr) => {
        if $ptr.is_null() {
            last_error::set("output pointer is null");
            return HedlStatus::NullArgument.code();
        }
    };
}

// --------------------------------------------------------------------
// Parsing and validation
// --------------------------------------------------------------------

/// Parses `input` into a resolved document handle.
///
/// # Safety
/// `input` must be valid for `input_len` bytes, or null-terminated if
/// `input_len` is `-1`. `out_doc` must be a valid, writable pointer.
#[no_mangle]
pub unsafe extern "C" fn hedl_parse(input: *const c_char, input_len: c_int, strict: c_int, out_doc: *mut *mut HedlDocument) -> c_int {
    require_out!(out_doc);
    *out_doc = document::poison();

    let bytes = match strings::borrow_input(input, input_len) {
        Ok(b) => b,
        Err(status) => return status.code(),
    };
    let text = match document::decode_input(bytes) {
        Ok(t) => t,
        Err(status) => return status.code(),
    };
    match document::parse_document(&text, strict != 0) {
        Ok(doc) => {
            last_error::clear();
            *out_doc = Box::into_raw(Box::new(HedlDocument { doc }));
            HedlStatus::Ok.code()
        }
        Err(status) => status.code(),
    }
}

/// Parses `input` and discards the result, reporting only success or
/// failure.
///
/// # Safety
/// Same contract as [`hedl_parse`], minus the output handle.
#[no_mangle]
pub unsafe extern "C" fn hedl_validate(input: *const c_char, input_len: c_int, strict: c_int) -> c_int {
    let bytes = match strings::borrow_input(input, input_len) {
        Ok(b) => b,
        Err(status) => return status.code(),
    };
    let text = match document::decode_input(bytes) {
        Ok(t) => t,
        Err(status) => return status.code(),
    };
    match document::parse_document(&text, strict != 0) {
        Ok(_) => {
            last_error::clear();
            HedlStatus::Ok.code()
        }
        Err(status) => status.code(),
    }
}

// --------------------------------------------------------------------
// Document introspection
// --------------------------------------------------------------------

/// # Safety
/// `doc`, `major` and `minor` must be valid pointers (or `doc` may be
/// null/poisoned, which is reported as `NullArgument`).
#[no_mangle]
pub unsafe extern "C" fn hedl_get_version(doc: *const HedlDocument, major: *mut c_int, minor: *mut c_int) -> c_int {
    let Some(doc) = document::borrow(doc) else {
        last_error::set("document handle is null or released");
        return HedlStatus::NullArgument.code();
    };
    if major.is_null() || minor.is_null() {
        last_error::set("output pointer is null");
        return HedlStatus::NullArgument.code();
    }
    let (maj, min) = DocumentView::new(doc).version();
    *major = maj as c_int;
    *minor = min as c_int;
    last_error::clear();
    HedlStatus::Ok.code()
}

/// # Safety
/// `doc` may be null or poisoned; any other value must point at a live handle.
#[no_mangle]
pub unsafe extern "C" fn hedl_schema_count(doc: *const HedlDocument) -> c_int {
    count_or_sentinel(doc, |d| DocumentView::new(d).schema_count())
}

/// # Safety
/// `doc` may be null or poisoned; any other value must point at a live handle.
#[no_mangle]
pub unsafe extern "C" fn hedl_alias_count(doc: *const HedlDocument) -> c_int {
    count_or_sentinel(doc, |d| DocumentView::new(d).alias_count())
}

/// # Safety
/// `doc` may be null or poisoned; any other value must point at a live handle.
#[no_mangle]
pub unsafe extern "C" fn hedl_root_item_count(doc: *const HedlDocument) -> c_int {
    count_or_sentinel(doc, |d| DocumentView::new(d).root_item_count())
}

unsafe fn count_or_sentinel(doc: *const HedlDocument, f: impl FnOnce(&hedl_model::Document) -> usize) -> c_int {
    match document::borrow(doc) {
        Some(d) => f(d) as c_int,
        None => -1,
    }
}

// --------------------------------------------------------------------
// Canonicalizer
// --------------------------------------------------------------------

/// # Safety
/// `doc` must be a live handle; `out_str` must be a valid, writable pointer.
#[no_mangle]
pub unsafe extern "C" fn hedl_canonicalize(doc: *const HedlDocument, out_str: *mut *mut c_char) -> c_int {
    require_out!(out_str);
    *out_str = ptr::null_mut();
    let Some(doc) = document::borrow(doc) else {
        last_error::set("document handle is null or released");
        return HedlStatus::NullArgument.code();
    };
    match hedl_fmt::canonicalize(doc) {
        Ok(text) => {
            last_error::clear();
            *out_str = strings::leak_string(text);
            HedlStatus::Ok.code()
        }
        Err(e) => {
            last_error::set(e.to_string());
            HedlStatus::Canonicalize.code()
        }
    }
}

/// # Safety
/// `doc` must be a live handle; `callback` must be safe to call with a
/// buffer valid only for the duration of the call, and must not re-enter
/// any `hedl_*` function.
#[no_mangle]
pub unsafe extern "C" fn hedl_canonicalize_callback(doc: *const HedlDocument, callback: HedlOutputCallback, user_data: *mut c_void) -> c_int {
    let Some(doc) = document::borrow(doc) else {
        last_error::set("document handle is null or released");
        return HedlStatus::NullArgument.code();
    };
    match hedl_fmt::canonicalize(doc) {
        Ok(text) => {
            last_error::clear();
            callback::emit(callback, user_data, &text);
            HedlStatus::Ok.code()
        }
        Err(e) => {
            last_error::set(e.to_string());
            HedlStatus::Canonicalize.code()
        }
    }
}

// --------------------------------------------------------------------
// Linter
// --------------------------------------------------------------------

/// # Safety
/// `doc` must be a live handle; `out_diag` must be a valid, writable pointer.
#[no_mangle]
pub unsafe extern "C" fn hedl_lint(doc: *const HedlDocument, out_diag: *mut *mut HedlDiagnostics) -> c_int {
    require_out!(out_diag);
    *out_diag = diagnostics::poison();
    let Some(doc) = document::borrow(doc) else {
        last_error::set("document handle is null or released");
        return HedlStatus::NullArgument.code();
    };
    let entries = hedl_lint::lint(doc);
    last_error::clear();
    *out_diag = Box::into_raw(Box::new(HedlDiagnostics { entries }));
    HedlStatus::Ok.code()
}

/// # Safety
/// `diag` may be null or poisoned.
#[no_mangle]
pub unsafe extern "C" fn hedl_diagnostics_count(diag: *const HedlDiagnostics) -> c_int {
    match diagnostics::borrow(diag) {
        Some(entries) => entries.len() as c_int,
        None => -1,
    }
}

/// # Safety
/// `diag` may be null or poisoned; `out_str` must be a valid, writable pointer.
#[no_mangle]
pub unsafe extern "C" fn hedl_diagnostics_get(diag: *const HedlDiagnostics, index: c_int, out_str: *mut *mut c_char) -> c_int {
    require_out!(out_str);
    *out_str = ptr::null_mut();
    let Some(entries) = diagnostics::borrow(diag) else {
        last_error::set("diagnostics handle is null or released");
        return HedlStatus::NullArgument.code();
    };
    let Some(entry) = usize::try_from(index).ok().and_then(|i| entries.get(i)) else {
        last_error::set("diagnostic index out of range");
        return HedlStatus::NullArgument.code();
    };
    last_error::clear();
    *out_str = strings::leak_string(entry.message.clone());
    HedlStatus::Ok.code()
}

/// # Safety
/// `diag` may be null or poisoned.
#[no_mangle]
pub unsafe extern "C" fn hedl_diagnostics_severity(diag: *const HedlDiagnostics, index: c_int) -> c_int {
    let Some(entries) = diagnostics::borrow(diag) else {
        return -1;
    };
    match usize::try_from(index).ok().and_then(|i| entries.get(i)) {
        Some(entry) => diagnostics::severity_code(entry.severity),
        None => -1,
    }
}

// --------------------------------------------------------------------
// Renderers -- thin adapters over the Traversal API
// --------------------------------------------------------------------

/// Builds the whole document as one JSON object keyed by root item name;
/// a document with no root items renders as `{}`.
#[cfg(feature = "json")]
fn document_json(doc: &hedl_model::Document, pretty: bool) -> Result<String, hedl_render::RenderError> {
    let view = DocumentView::new(doc);
    let mut map = serde_json::Map::new();
    for item in view.root_items() {
        map.insert(item.key().to_string(), hedl_render::json::to_json_value(item.value()));
    }
    let value = serde_json::Value::Object(map);
    if pretty { serde_json::to_string_pretty(&value) } else { serde_json::to_string(&value) }.map_err(hedl_render::RenderError::from)
}

#[cfg(feature = "yaml")]
fn document_yaml(doc: &hedl_model::Document) -> Result<String, hedl_render::RenderError> {
    let view = DocumentView::new(doc);
    let mut mapping = serde_yaml::Mapping::new();
    for item in view.root_items() {
        mapping.insert(serde_yaml::Value::String(item.key().to_string()), hedl_render::yaml::to_yaml_value(item.value()));
    }
    Ok(serde_yaml::to_string(&serde_yaml::Value::Mapping(mapping))?)
}

#[cfg(feature = "xml")]
fn document_xml(doc: &hedl_model::Document) -> Result<String, hedl_render::RenderError> {
    let view = DocumentView::new(doc);
    let mut out = String::from("<document>");
    for item in view.root_items() {
        out.push_str(&hedl_render::xml::to_string(item.key(), item.value())?);
    }
    out.push_str("</document>");
    Ok(out)
}

/// CSV, Parquet and Cypher are table/graph renderers; they operate on the
/// document's first root item, since only one value at a time can be
/// matrix-shaped in the sense those renderers require.
#[cfg(any(feature = "csv", feature = "parquet", feature = "graph"))]
fn first_root_value(doc: &hedl_model::Document) -> Result<ValueHandle<'_>, hedl_render::RenderError> {
    DocumentView::new(doc)
        .root_items()
        .next()
        .map(|item| item.value())
        .ok_or(hedl_render::RenderError::NotMatrix("this document has no root items"))
}

macro_rules! render_to_string {
    ($name:ident, $callback_name:ident, $status:expr, $body:expr) => {
        /// # Safety
        /// `doc` must be a live handle; `out_str` must be a valid, writable pointer.
        #[no_mangle]
        pub unsafe extern "C" fn $name(doc: *const HedlDocument, out_str: *mut *mut c_char) -> c_int {
            require_out!(out_str);
            *out_str = ptr::null_mut();
            let Some(doc) = document::borrow(doc) else {
                last_error::set("document handle is null or released");
                return HedlStatus::NullArgument.code();
            };
            match $body(doc) {
                Ok(text) => {
                    last_error::clear();
                    *out_str = strings::leak_string(text);
                    HedlStatus::Ok.code()
                }
                Err(e) => {
                    last_error::set(e.to_string());
                    $status.code()
                }
            }
        }

        /// # Safety
        /// Same contract as [`$name`], plus `callback` must not re-enter
        /// any `hedl_*` function and must treat its buffer as valid only
        /// for the duration of the call.
        #[no_mangle]
        pub unsafe extern "C" fn $callback_name(doc: *const HedlDocument, callback: HedlOutputCallback, user_data: *mut c_void) -> c_int {
            let Some(doc) = document::borrow(doc) else {
                last_error::set("document handle is null or released");
                return HedlStatus::NullArgument.code();
            };
            match $body(doc) {
                Ok(text) => {
                    last_error::clear();
                    callback::emit(callback, user_data, &text);
                    HedlStatus::Ok.code()
                }
                Err(e) => {
                    last_error::set(e.to_string());
                    $status.code()
                }
            }
        }
    };
}

#[cfg(feature = "json")]
render_to_string!(hedl_to_json, hedl_to_json_callback, HedlStatus::EmitJson, |doc| document_json(doc, false));

#[cfg(feature = "yaml")]
render_to_string!(hedl_to_yaml, hedl_to_yaml_callback, HedlStatus::EmitYaml, document_yaml);

#[cfg(feature = "xml")]
render_to_string!(hedl_to_xml, hedl_to_xml_callback, HedlStatus::EmitXml, document_xml);

#[cfg(feature = "csv")]
render_to_string!(hedl_to_csv, hedl_to_csv_callback, HedlStatus::EmitCsv, |doc| first_root_value(doc).and_then(hedl_render::tabular::to_string));

#[cfg(feature = "graph")]
render_to_string!(hedl_to_cypher, hedl_to_cypher_callback, HedlStatus::EmitGraph, |doc| first_root_value(doc).and_then(hedl_render::cypher::to_string));

/// # Safety
/// `doc` must be a live handle; `out_data`/`out_len` must be valid, writable pointers.
#[cfg(feature = "parquet")]
#[no_mangle]
pub unsafe extern "C" fn hedl_to_parquet(doc: *const HedlDocument, out_data: *mut *mut u8, out_len: *mut usize) -> c_int {
    if out_data.is_null() || out_len.is_null() {
        last_error::set("output pointer is null");
        return HedlStatus::NullArgument.code();
    }
    *out_data = ptr::null_mut();
    *out_len = 0;
    let Some(doc) = document::borrow(doc) else {
        last_error::set("document handle is null or released");
        return HedlStatus::NullArgument.code();
    };
    match first_root_value(doc).and_then(hedl_render::parquet::to_bytes) {
        Ok(bytes) => {
            last_error::clear();
            let (data, len) = strings::leak_bytes(bytes);
            *out_data = data;
            *out_len = len;
            HedlStatus::Ok.code()
        }
        Err(e) => {
            last_error::set(e.to_string());
            HedlStatus::EmitParquet.code()
        }
    }
}

/// # Safety
/// `doc` must be a live handle; `callback` must not re-enter any `hedl_*` function.
#[cfg(feature = "parquet")]
#[no_mangle]
pub unsafe extern "C" fn hedl_to_parquet_callback(doc: *const HedlDocument, callback: HedlOutputCallback, user_data: *mut c_void) -> c_int {
    let Some(doc) = document::borrow(doc) else {
        last_error::set("document handle is null or released");
        return HedlStatus::NullArgument.code();
    };
    match first_root_value(doc).and_then(hedl_render::parquet::to_bytes) {
        Ok(bytes) => {
            last_error::clear();
            callback::emit_bytes(callback, user_data, &bytes);
            HedlStatus::Ok.code()
        }
        Err(e) => {
            last_error::set(e.to_string());
            HedlStatus::EmitParquet.code()
        }
    }
}

// --------------------------------------------------------------------
// Last-error channel
// --------------------------------------------------------------------

/// Returns the calling thread's last error, or null if it has none. Valid
/// until the next `hedl_*` call on this thread.
#[no_mangle]
pub extern "C" fn hedl_get_last_error() -> *const c_char {
    last_error::get()
}

/// Explicitly named alias making the thread-safety guarantee clear at the
/// call site; behaves identically to [`hedl_get_last_error`].
#[no_mangle]
pub extern "C" fn hedl_get_last_error_threadsafe() -> *const c_char {
    last_error::get()
}

#[no_mangle]
pub extern "C" fn hedl_clear_error_threadsafe() {
    last_error::clear();
}

// --------------------------------------------------------------------
// Release operations
// --------------------------------------------------------------------

/// # Safety
/// `s` must be null, or a pointer previously returned by a `hedl_*`
/// function that allocates strings. Passing any other pointer, or the
/// same live pointer twice, is undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn hedl_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(std::ffi::CString::from_raw(s));
    }
}

/// # Safety
/// `doc` must be null, the poison sentinel, or a pointer previously
/// returned by [`hedl_parse`] that has not already been released.
#[no_mangle]
pub unsafe extern "C" fn hedl_free_document(doc: *mut HedlDocument) {
    if document::is_live(doc) {
        drop(Box::from_raw(doc));
    }
}

/// # Safety
/// `diag` must be null, the poison sentinel, or a pointer previously
/// returned by [`hedl_lint`] that has not already been released.
#[no_mangle]
pub unsafe extern "C" fn hedl_free_diagnostics(diag: *mut HedlDiagnostics) {
    if diagnostics::is_live(diag) {
        drop(Box::from_raw(diag));
    }
}

/// # Safety
/// `data`/`len` must be exactly the pair previously returned by a
/// `hedl_*` function that allocates byte buffers (e.g. [`hedl_to_parquet`]).
#[no_mangle]
pub unsafe extern "C" fn hedl_free_bytes(data: *mut u8, len: usize) {
    if !data.is_null() {
        drop(Box::from_raw(std::slice::from_raw_parts_mut(data, len)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    unsafe fn cstr(ptr: *const c_char) -> String {
        CStr::from_ptr(ptr).to_str().unwrap().to_string()
    }

    #[test]
    fn parse_then_inspect_counts() {
        let src = CString::new("%VERSION: 1.0\n---\nname: Alice\nage: 30\n").unwrap();
        let mut doc: *mut HedlDocument = ptr::null_mut();
        let status = unsafe { hedl_parse(src.as_ptr(), -1, 1, &mut doc) };
        assert_eq!(status, HedlStatus::Ok.code());
        assert_eq!(unsafe { hedl_root_item_count(doc) }, 2);
        assert_eq!(unsafe { hedl_schema_count(doc) }, 0);

        let mut major = 0;
        let mut minor = 0;
        assert_eq!(unsafe { hedl_get_version(doc, &mut major, &mut minor) }, HedlStatus::Ok.code());
        assert_eq!((major, minor), (1, 0));

        unsafe { hedl_free_document(doc) };
    }

    #[test]
    fn strict_unresolved_reference_fails_with_last_error_set() {
        let src = CString::new("%VERSION: 1.0\n---\nref: @missing\n").unwrap();
        let mut doc: *mut HedlDocument = ptr::null_mut();
        let status = unsafe { hedl_parse(src.as_ptr(), -1, 1, &mut doc) };
        assert_eq!(status, HedlStatus::Parse.code());
        let err = unsafe { cstr(hedl_get_last_error()) };
        assert!(err.contains("missing"));
        unsafe { hedl_free_document(doc) };
    }

    #[test]
    fn invalid_utf8_is_rejected_before_lexing() {
        let bytes: &[u8] = b"\xFF\xFE garbage";
        let mut doc: *mut HedlDocument = ptr::null_mut();
        let status = unsafe { hedl_parse(bytes.as_ptr() as *const c_char, bytes.len() as c_int, 1, &mut doc) };
        assert_eq!(status, HedlStatus::InvalidUtf8.code());
    }

    #[test]
    fn canonicalize_round_trips_through_ffi() {
        let src = CString::new("%VERSION: 1.0\n---\nk: 1\n").unwrap();
        let mut doc: *mut HedlDocument = ptr::null_mut();
        assert_eq!(unsafe { hedl_parse(src.as_ptr(), -1, 1, &mut doc) }, HedlStatus::Ok.code());

        let mut out: *mut c_char = ptr::null_mut();
        assert_eq!(unsafe { hedl_canonicalize(doc, &mut out) }, HedlStatus::Ok.code());
        let text = unsafe { cstr(out) };
        assert_eq!(text, "%VERSION: 1.0\n---\nk: 1\n");

        unsafe {
            hedl_free_string(out);
            hedl_free_document(doc);
        }
    }

    #[test]
    fn lint_reports_an_unused_alias() {
        let src = CString::new("%VERSION: 1.0\n%ALIAS: unused = 1\n---\nk: 2\n").unwrap();
        let mut doc: *mut HedlDocument = ptr::null_mut();
        assert_eq!(unsafe { hedl_parse(src.as_ptr(), -1, 1, &mut doc) }, HedlStatus::Ok.code());

        let mut diag: *mut HedlDiagnostics = ptr::null_mut();
        assert_eq!(unsafe { hedl_lint(doc, &mut diag) }, HedlStatus::Ok.code());
        assert!(unsafe { hedl_diagnostics_count(diag) } >= 1);
        assert!(unsafe { hedl_diagnostics_severity(diag, 0) } >= 0);

        let mut msg: *mut c_char = ptr::null_mut();
        assert_eq!(unsafe { hedl_diagnostics_get(diag, 0, &mut msg) }, HedlStatus::Ok.code());
        unsafe {
            hedl_free_string(msg);
            hedl_free_diagnostics(diag);
            hedl_free_document(doc);
        }
    }

    #[test]
    fn release_of_null_is_a_no_op() {
        unsafe {
            hedl_free_document(ptr::null_mut());
            hedl_free_diagnostics(ptr::null_mut());
            hedl_free_string(ptr::null_mut());
            hedl_free_bytes(ptr::null_mut(), 0);
        }
    }

    #[test]
    fn release_of_poison_sentinel_is_a_no_op() {
        unsafe {
            hedl_free_document(document::poison());
            hedl_free_diagnostics(diagnostics::poison());
        }
    }

    #[test]
    fn last_error_is_thread_local() {
        let src = CString::new("%VERSION: 1.0\n---\nref: @missing\n").unwrap();
        let mut doc: *mut HedlDocument = ptr::null_mut();
        unsafe { hedl_parse(src.as_ptr(), -1, 1, &mut doc) };
        assert!(!unsafe { hedl_get_last_error() }.is_null());

        let handle = std::thread::spawn(|| unsafe { hedl_get_last_error() }.is_null());
        assert!(handle.join().unwrap());
        unsafe { hedl_free_document(doc) };
    }

    #[test]
    fn to_json_renders_root_items_as_an_object() {
        let src = CString::new("%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrow: Row { a: 1 }\n").unwrap();
        let mut doc: *mut HedlDocument = ptr::null_mut();
        assert_eq!(unsafe { hedl_parse(src.as_ptr(), -1, 1, &mut doc) }, HedlStatus::Ok.code());

        let mut out: *mut c_char = ptr::null_mut();
        assert_eq!(unsafe { hedl_to_json(doc, &mut out) }, HedlStatus::Ok.code());
        let text = unsafe { cstr(out) };
        assert_eq!(text, r#"{"row":{"a":1}}"#);

        unsafe {
            hedl_free_string(out);
            hedl_free_document(doc);
        }
    }

    #[test]
    fn csv_requires_a_matrix_root_item() {
        let src = CString::new("%VERSION: 1.0\n---\nname: \"solo\"\n").unwrap();
        let mut doc: *mut HedlDocument = ptr::null_mut();
        assert_eq!(unsafe { hedl_parse(src.as_ptr(), -1, 1, &mut doc) }, HedlStatus::Ok.code());

        let mut out: *mut c_char = ptr::null_mut();
        assert_eq!(unsafe { hedl_to_csv(doc, &mut out) }, HedlStatus::EmitCsv.code());
        assert!(out.is_null());

        unsafe { hedl_free_document(doc) };
    }
}
