//! FNL sandbox runtime.
//!
//! Native hosts call [`run`] with their own [`Host`]. WASM embedders use the
//! three C-ABI functions below after instantiating the module:
//!
//! | Function | Description |
//! |---|---|
//! | `fnl_alloc(size) -> *mut u8` | Allocate `size` bytes; JS writes source here |
//! | `fnl_free(ptr, size)` | Free a buffer previously returned by this module |
//! | `fnl_run(src_ptr, src_len) -> *mut u8` | Run FNL; returns `[u32-le len][utf-8 bytes]` |
//!
//! On WASM the clock and `random` need `js_performance_now` and
//! `js_math_random` imports from the host.

pub mod ast;
pub mod cli;
pub mod commands;
pub mod compiler;
pub mod config;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod host;
pub mod lexer;
pub mod parser;
pub mod rpn;
pub mod stack;
pub mod state;
pub mod value;

use std::alloc::{alloc, dealloc, Layout};

use config::RunConfig;
use evaluator::Evaluator;
use host::{BufferSink, Host, MemoryStore, OfflineNetwork, OutputLine, RecordingSurface, SystemClock, ThreadRandom};

/// What a finished run reports back to its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    pub exit_code: i32,
    pub elapsed_ms: f64,
}

/// Run `source` as a top-level program with a fresh environment.
pub fn run(source: &str, host: &mut Host, config: &RunConfig) -> RunReport {
    let mut evaluator = Evaluator::new(host, config);
    evaluator.run_program(source);

    let report = RunReport {
        exit_code: evaluator.state().exit_code(),
        elapsed_ms: evaluator.elapsed(),
    };
    tracing::debug!(exit_code = report.exit_code, elapsed_ms = report.elapsed_ms, "run finished");
    report
}

/// Closing line printed after a top-level run.
pub fn exit_banner(code: i32) -> String {
    format!("[ Exited application with code {} ]", code)
}

// ---------------------------------------------------------------------------
// Exported C-ABI surface
// ---------------------------------------------------------------------------

/// Allocate a byte buffer of `size` bytes and return its pointer.
/// The caller is responsible for freeing it with `fnl_free`.
#[no_mangle]
pub extern "C" fn fnl_alloc(size: usize) -> *mut u8 {
    match Layout::from_size_align(size, 1) {
        Ok(layout) if size > 0 => unsafe { alloc(layout) },
        _ => std::ptr::null_mut(),
    }
}

/// Free a buffer previously returned by `fnl_alloc` or `fnl_run`.
#[no_mangle]
pub extern "C" fn fnl_free(ptr: *mut u8, size: usize) {
    if ptr.is_null() || size == 0 {
        return;
    }
    if let Ok(layout) = Layout::from_size_align(size, 1) {
        unsafe { dealloc(ptr, layout) };
    }
}

/// Run an FNL script.
///
/// * `src_ptr`: pointer to UTF-8 encoded source (allocated by `fnl_alloc`).
/// * `src_len`: byte length of the source.
///
/// Returns a pointer to a buffer with layout:
/// ```text
/// [4 bytes little-endian u32 = output_len][output_len bytes of UTF-8]
/// ```
/// The caller must free the returned pointer with `fnl_free(ptr, 4 + output_len)`.
#[no_mangle]
pub extern "C" fn fnl_run(src_ptr: *const u8, src_len: usize) -> *mut u8 {
    let source = if src_ptr.is_null() {
        ""
    } else {
        unsafe {
            let slice = std::slice::from_raw_parts(src_ptr, src_len);
            std::str::from_utf8(slice).unwrap_or("")
        }
    };

    let output = run_captured(source);
    let out_bytes = output.as_bytes();
    let total = 4 + out_bytes.len();

    let ptr = fnl_alloc(total);
    if ptr.is_null() {
        return ptr;
    }

    let len_bytes = (out_bytes.len() as u32).to_le_bytes();
    unsafe {
        std::ptr::copy_nonoverlapping(len_bytes.as_ptr(), ptr, 4);
        std::ptr::copy_nonoverlapping(out_bytes.as_ptr(), ptr.add(4), out_bytes.len());
    }

    ptr
}

// ---------------------------------------------------------------------------
// Internal engine
// ---------------------------------------------------------------------------

/// Run against an in-memory host and return everything it wrote, one line
/// per entry, errors prefixed with `[error] `, followed by the exit banner.
fn run_captured(source: &str) -> String {
    let config = RunConfig::default();
    let sink = BufferSink::new();
    let mut host = Host {
        output: Box::new(sink.clone()),
        surface: Box::new(RecordingSurface::new(config.canvas_width, config.canvas_height)),
        store: Box::new(MemoryStore::new()),
        network: Box::new(OfflineNetwork),
        clock: Box::new(SystemClock::new()),
        random: Box::new(ThreadRandom),
    };

    let report = run(source, &mut host, &config);

    let mut lines: Vec<String> = sink
        .lines()
        .into_iter()
        .map(|line| match line {
            OutputLine::Log(text) => text,
            OutputLine::Error(text) => format!("[error] {}", text),
        })
        .collect();
    lines.push(exit_banner(report.exit_code));
    lines.join("\n")
}
