//! C ABI
//!
//! Exposes a process-wide [`Engine`] through the symbols declared in
//! `include/hilite.h`. Every entry point initializes the engine lazily,
//! runs inside `catch_unwind` and never lets a panic cross the boundary.
//!
//! Ownership: each pointer handed out is recorded in a live-handle table
//! and must be returned through the matching release function. Releasing
//! a pointer that is unknown, already released or of the wrong kind is
//! logged and otherwise ignored.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::Mutex;

use once_cell::sync::{Lazy, OnceCell};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::syntax::StyleRange as CoreStyleRange;

/// A styled byte range, as laid out for C
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRange {
    pub start: usize,
    pub end: usize,
    /// `0xRRGGBBAA`
    pub foreground: u32,
    /// `0xRRGGBBAA`
    pub background: u32,
    /// Bit set: 1 = bold, 2 = italic, 4 = underline
    pub font_style: u32,
}

impl From<&CoreStyleRange> for StyleRange {
    fn from(range: &CoreStyleRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
            foreground: range.style.foreground.to_rgba(),
            background: range.style.background.to_rgba(),
            font_style: range.style.font_style.bits(),
        }
    }
}

/// Result of one highlight call, as laid out for C
#[repr(C)]
#[derive(Debug)]
pub struct HighlightResult {
    /// Copy of the highlighted text
    pub text: *mut c_char,
    /// `range_count` ranges; null when there are none
    pub ranges: *mut StyleRange,
    pub range_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleKind {
    Result,
    String,
    StringArray,
}

static ENGINE: OnceCell<Engine> = OnceCell::new();
static HANDLES: Lazy<Mutex<HashMap<usize, HandleKind>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// The process-wide engine, with built-ins loaded when possible
///
/// A failed load leaves the engine usable with fallbacks; the next
/// call retries it.
fn engine() -> &'static Engine {
    let engine = instance();
    load_builtins(engine);
    engine
}

fn instance() -> &'static Engine {
    ENGINE.get_or_init(|| Engine::new(EngineConfig::from_env()))
}

fn load_builtins(engine: &Engine) -> bool {
    match engine.load_builtins() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "built-in definitions failed to load");
            false
        }
    }
}

fn track<T>(ptr: *mut T, kind: HandleKind) -> *mut T {
    if !ptr.is_null() {
        HANDLES
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(ptr as usize, kind);
    }
    ptr
}

/// Forget a live handle; false when it was not live with this kind
fn untrack<T>(ptr: *mut T, kind: HandleKind) -> bool {
    let mut handles = HANDLES.lock().unwrap_or_else(|p| p.into_inner());
    match handles.get(&(ptr as usize)) {
        Some(&live) if live == kind => {
            handles.remove(&(ptr as usize));
            true
        }
        Some(&live) => {
            tracing::warn!(?live, ?kind, "handle released with the wrong function; ignored");
            false
        }
        None => {
            tracing::warn!(?kind, "release of unknown or already released handle; ignored");
            false
        }
    }
}

/// Run `f`, turning a panic into `fallback`
fn guard<T>(name: &str, fallback: T, f: impl FnOnce() -> T) -> T {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        tracing::error!(function = name, "panic caught at the C boundary");
        fallback
    })
}

/// Borrow a C string; `None` for null or non-UTF-8 input
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives
/// the returned reference.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Borrow the text argument, which unlike the ids is required
///
/// # Safety
/// As for [`str_arg`].
unsafe fn text_arg<'a>(ptr: *const c_char) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(Error::InvalidArgument("text is null".to_string()));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|e| Error::InvalidArgument(format!("text is not UTF-8: {}", e)))
}

fn into_c_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Null-terminated array of owned C strings
fn into_string_array(names: Vec<String>) -> *mut *mut c_char {
    let mut items: Vec<*mut c_char> = names
        .iter()
        .map(|name| into_c_string(name))
        .filter(|p| !p.is_null())
        .collect();
    items.push(ptr::null_mut());
    let array = Box::into_raw(items.into_boxed_slice()) as *mut *mut c_char;
    track(array, HandleKind::StringArray)
}

/// Initialize the engine; false when the built-in definitions failed
/// to load
///
/// Safe to call any number of times: after a success it does nothing,
/// after a failure it tries again.
#[no_mangle]
pub extern "C" fn syntect_initialize() -> bool {
    guard("syntect_initialize", false, || load_builtins(instance()))
}

/// Highlight `text` with a syntax (name or extension) and a theme name
///
/// Returns null when `text` is null or not UTF-8, or when memory runs
/// out. Null or unknown `syntax`/`theme` fall back to plain rendering
/// and the default theme. Release the result with
/// [`syntect_highlight_result_free`].
///
/// # Safety
/// Each pointer must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn syntect_highlight_fast(
    text: *const c_char,
    syntax: *const c_char,
    theme: *const c_char,
) -> *mut HighlightResult {
    guard("syntect_highlight_fast", ptr::null_mut(), || {
        let text = match text_arg(text) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "rejected highlight call");
                return ptr::null_mut();
            }
        };
        let syntax = str_arg(syntax).unwrap_or_default();
        let theme = str_arg(theme).unwrap_or_default();

        let result = match engine().highlight(text, syntax, theme) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "highlight failed");
                return ptr::null_mut();
            }
        };

        let ranges: Vec<StyleRange> = result.ranges().iter().map(StyleRange::from).collect();
        let range_count = ranges.len();
        let ranges = if ranges.is_empty() {
            ptr::null_mut()
        } else {
            Box::into_raw(ranges.into_boxed_slice()) as *mut StyleRange
        };

        let out = Box::into_raw(Box::new(HighlightResult {
            text: into_c_string(text),
            ranges,
            range_count,
        }));
        track(out, HandleKind::Result)
    })
}

/// Name of the syntax registered for a file extension, or null
///
/// Release the string with [`syntect_free_string`].
///
/// # Safety
/// `extension` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn syntect_get_syntax_by_extension(extension: *const c_char) -> *mut c_char {
    guard("syntect_get_syntax_by_extension", ptr::null_mut(), || {
        let Some(ext) = str_arg(extension) else {
            return ptr::null_mut();
        };
        match engine().resolve_syntax_by_extension(ext) {
            Some(name) => track(into_c_string(&name), HandleKind::String),
            None => ptr::null_mut(),
        }
    })
}

/// Null-terminated array of syntax names
///
/// Release with [`syntect_free_string_array`].
#[no_mangle]
pub extern "C" fn syntect_get_syntax_names() -> *mut *mut c_char {
    guard("syntect_get_syntax_names", ptr::null_mut(), || {
        into_string_array(engine().syntax_names())
    })
}

/// Null-terminated array of theme names
///
/// Release with [`syntect_free_string_array`].
#[no_mangle]
pub extern "C" fn syntect_get_theme_names() -> *mut *mut c_char {
    guard("syntect_get_theme_names", ptr::null_mut(), || {
        into_string_array(engine().theme_names())
    })
}

#[no_mangle]
pub extern "C" fn syntect_clear_cache() {
    guard("syntect_clear_cache", (), || engine().clear_cache())
}

/// Number of cached results
#[no_mangle]
pub extern "C" fn syntect_cache_size() -> usize {
    guard("syntect_cache_size", 0, || engine().cache_size())
}

/// Release a result from [`syntect_highlight_fast`]
///
/// # Safety
/// `result` must be null or a pointer returned by
/// [`syntect_highlight_fast`]. Releasing it twice is ignored.
#[no_mangle]
pub unsafe extern "C" fn syntect_highlight_result_free(result: *mut HighlightResult) {
    guard("syntect_highlight_result_free", (), || {
        if result.is_null() || !untrack(result, HandleKind::Result) {
            return;
        }
        let result = Box::from_raw(result);
        if !result.text.is_null() {
            drop(CString::from_raw(result.text));
        }
        if !result.ranges.is_null() {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                result.ranges,
                result.range_count,
            )));
        }
    })
}

/// Release an array from the name listing functions
///
/// # Safety
/// `strings` must be null or a pointer returned by
/// [`syntect_get_syntax_names`] or [`syntect_get_theme_names`].
#[no_mangle]
pub unsafe extern "C" fn syntect_free_string_array(strings: *mut *mut c_char) {
    guard("syntect_free_string_array", (), || {
        if strings.is_null() || !untrack(strings, HandleKind::StringArray) {
            return;
        }
        let mut len = 0;
        while !(*strings.add(len)).is_null() {
            drop(CString::from_raw(*strings.add(len)));
            len += 1;
        }
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(strings, len + 1)));
    })
}

/// Release a string from [`syntect_get_syntax_by_extension`]
///
/// # Safety
/// `s` must be null or a pointer returned by
/// [`syntect_get_syntax_by_extension`].
#[no_mangle]
pub unsafe extern "C" fn syntect_free_string(s: *mut c_char) {
    guard("syntect_free_string", (), || {
        if s.is_null() || !untrack(s, HandleKind::String) {
            return;
        }
        drop(CString::from_raw(s));
    })
}
