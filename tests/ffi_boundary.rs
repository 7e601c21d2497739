//! C entry points, called the way a C host would

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::slice;
use std::sync::Mutex;

use hilite::ffi::*;

// The C engine is process-wide; cache assertions must not interleave
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> std::sync::MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|p| p.into_inner())
}

fn c(s: &str) -> CString {
    CString::new(s).unwrap()
}

unsafe fn collect(array: *mut *mut c_char) -> Vec<String> {
    let mut names = Vec::new();
    let mut i = 0;
    while !(*array.add(i)).is_null() {
        names.push(CStr::from_ptr(*array.add(i)).to_str().unwrap().to_string());
        i += 1;
    }
    names
}

unsafe fn ranges<'a>(result: *mut HighlightResult) -> &'a [StyleRange] {
    let result = &*result;
    if result.ranges.is_null() {
        &[]
    } else {
        slice::from_raw_parts(result.ranges, result.range_count)
    }
}

#[test]
fn test_initialize_is_idempotent() {
    let _serial = serial();
    assert!(syntect_initialize());
    assert!(syntect_initialize());
}

#[test]
fn test_highlight_covers_text() {
    let _serial = serial();
    let text = "fn main() { println!(\"hi\"); }";
    unsafe {
        let result = syntect_highlight_fast(c(text).as_ptr(), c("rs").as_ptr(), c("Monokai").as_ptr());
        assert!(!result.is_null());
        assert_eq!(CStr::from_ptr((*result).text).to_str().unwrap(), text);

        let ranges = ranges(result);
        assert!(ranges.len() > 1);
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges.last().unwrap().end, text.len());
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        // Monokai background is #272822
        assert!(ranges.iter().all(|r| r.background == 0x2728_22ff));

        syntect_highlight_result_free(result);
    }
}

#[test]
fn test_bad_text_returns_null() {
    let _serial = serial();
    unsafe {
        assert!(syntect_highlight_fast(ptr::null(), c("rs").as_ptr(), c("Monokai").as_ptr()).is_null());

        let invalid = CString::new(vec![b'a', 0xff, b'b']).unwrap();
        assert!(syntect_highlight_fast(invalid.as_ptr(), c("rs").as_ptr(), ptr::null()).is_null());
    }
}

#[test]
fn test_null_ids_fall_back() {
    let _serial = serial();
    unsafe {
        let result = syntect_highlight_fast(c("some text").as_ptr(), ptr::null(), ptr::null());
        assert!(!result.is_null());
        let ranges = ranges(result);
        assert_eq!(ranges.len(), 1);
        assert_eq!((ranges[0].start, ranges[0].end), (0, 9));
        assert_eq!(ranges[0].font_style, 0);
        syntect_highlight_result_free(result);

        let empty = syntect_highlight_fast(c("").as_ptr(), ptr::null(), ptr::null());
        assert!(!empty.is_null());
        assert_eq!((*empty).range_count, 0);
        assert!((*empty).ranges.is_null());
        syntect_highlight_result_free(empty);
    }
}

#[test]
fn test_double_free_is_ignored() {
    let _serial = serial();
    unsafe {
        let result = syntect_highlight_fast(c("x").as_ptr(), c("Rust").as_ptr(), ptr::null());
        syntect_highlight_result_free(result);
        syntect_highlight_result_free(result);
        syntect_highlight_result_free(ptr::null_mut());

        let names = syntect_get_theme_names();
        syntect_free_string_array(names);
        syntect_free_string_array(names);
        syntect_free_string_array(ptr::null_mut());
        syntect_free_string(ptr::null_mut());
    }
}

#[test]
fn test_name_listings() {
    let _serial = serial();
    unsafe {
        let syntaxes = syntect_get_syntax_names();
        assert!(!syntaxes.is_null());
        let names = collect(syntaxes);
        assert!(names.contains(&"Rust".to_string()));
        assert!(names.contains(&"Plain Text".to_string()));
        syntect_free_string_array(syntaxes);

        let themes = syntect_get_theme_names();
        let names = collect(themes);
        assert!(names.contains(&"InspiredGitHub".to_string()));
        assert!(names.contains(&"Monokai".to_string()));
        syntect_free_string_array(themes);
    }
}

#[test]
fn test_syntax_by_extension() {
    let _serial = serial();
    unsafe {
        let name = syntect_get_syntax_by_extension(c("rs").as_ptr());
        assert!(!name.is_null());
        assert_eq!(CStr::from_ptr(name).to_str().unwrap(), "Rust");
        syntect_free_string(name);

        let name = syntect_get_syntax_by_extension(c(".PY").as_ptr());
        assert_eq!(CStr::from_ptr(name).to_str().unwrap(), "Python");
        syntect_free_string(name);

        assert!(syntect_get_syntax_by_extension(c("zzz").as_ptr()).is_null());
        assert!(syntect_get_syntax_by_extension(ptr::null()).is_null());
    }
}

#[test]
fn test_cache_controls() {
    let _serial = serial();
    unsafe {
        syntect_clear_cache();
        assert_eq!(syntect_cache_size(), 0);

        let text = c("let cached = 1;");
        let first = syntect_highlight_fast(text.as_ptr(), c("Rust").as_ptr(), c("Monokai").as_ptr());
        assert_eq!(syntect_cache_size(), 1);
        let second = syntect_highlight_fast(text.as_ptr(), c("Rust").as_ptr(), c("Monokai").as_ptr());
        assert_eq!(syntect_cache_size(), 1);

        // Each call hands out its own copy
        assert_ne!(first, second);
        assert_eq!(ranges(first), ranges(second));
        syntect_highlight_result_free(first);
        syntect_highlight_result_free(second);

        syntect_clear_cache();
        assert_eq!(syntect_cache_size(), 0);
    }
}
