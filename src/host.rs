//! Capability interfaces the interpreter calls through, plus the stock
//! implementations used by the command-line host, the C ABI and tests.
//!
//! Every capability is a plain blocking call: the interpreter does not move
//! on to the next statement until the collaborator has answered.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::error::{FnlError, Result};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Append-only log and error streams.
pub trait OutputSink {
    fn write_log(&mut self, text: &str);
    fn write_error(&mut self, text: &str);
}

/// 2-D drawing surface.
pub trait Surface {
    fn set_fill_color(&mut self, color: &str);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn width(&self) -> f64;
    fn height(&self) -> f64;
}

/// Durable key-value store. Values must survive between runs.
pub trait Store {
    fn get(&mut self, key: &str) -> Result<Option<Value>>;
    fn put(&mut self, key: &str, value: &Value) -> Result<()>;
}

/// Result of a network fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub ok: bool,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    /// The record handed to scripts: `{status, ok, headers, body}`.
    pub fn into_value(self) -> Value {
        let headers: IndexMap<String, Value> = self
            .headers
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        let mut fields = IndexMap::new();
        fields.insert("status".to_string(), Value::Number(f64::from(self.status)));
        fields.insert("ok".to_string(), Value::Bool(self.ok));
        fields.insert("headers".to_string(), Value::record(headers));
        fields.insert("body".to_string(), Value::String(self.body));
        Value::record(fields)
    }
}

pub trait Network {
    fn request(&mut self, url: &str) -> Result<Response>;
}

/// Monotonic clock in milliseconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Uniform random numbers in `[0, 1)`.
pub trait RandomSource {
    fn draw(&mut self) -> f64;
}

/// Every capability the interpreter may reach during a run.
pub struct Host {
    pub output: Box<dyn OutputSink>,
    pub surface: Box<dyn Surface>,
    pub store: Box<dyn Store>,
    pub network: Box<dyn Network>,
    pub clock: Box<dyn Clock>,
    pub random: Box<dyn RandomSource>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    Log(String),
    Error(String),
}

/// Captures output in memory. Clones share the same buffer, so a caller can
/// keep one handle and give another to the [`Host`].
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    lines: Rc<RefCell<Vec<OutputLine>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<OutputLine> {
        self.lines.borrow().clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter_map(|l| match l {
                OutputLine::Log(s) => Some(s.clone()),
                OutputLine::Error(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter_map(|l| match l {
                OutputLine::Error(s) => Some(s.clone()),
                OutputLine::Log(_) => None,
            })
            .collect()
    }
}

impl OutputSink for BufferSink {
    fn write_log(&mut self, text: &str) {
        self.lines.borrow_mut().push(OutputLine::Log(text.to_string()));
    }

    fn write_error(&mut self, text: &str) {
        self.lines.borrow_mut().push(OutputLine::Error(text.to_string()));
    }
}

/// Writes logs to stdout and errors to stderr.
#[derive(Debug, Default)]
pub struct StdSink;

impl OutputSink for StdSink {
    fn write_log(&mut self, text: &str) {
        println!("{}", text);
    }

    fn write_error(&mut self, text: &str) {
        eprintln!("{}", text);
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillColor(String),
    FillRect { x: f64, y: f64, w: f64, h: f64 },
}

/// A surface with a fixed size that records the draw calls it receives.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    ops: Rc<RefCell<Vec<DrawOp>>>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Rc::default(),
        }
    }

    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.borrow().clone()
    }
}

impl Surface for RecordingSurface {
    fn set_fill_color(&mut self, color: &str) {
        tracing::debug!(color, "fill color");
        self.ops.borrow_mut().push(DrawOp::FillColor(color.to_string()));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        tracing::debug!(x, y, w, h, "fill rect");
        self.ops.borrow_mut().push(DrawOp::FillRect { x, y, w, h });
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// In-memory store. Values are stored as JSON snapshots, so a later mutation
/// of an array that was stored does not change the stored copy.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, Json>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&mut self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.borrow().get(key).map(Value::from_json))
    }

    fn put(&mut self, key: &str, value: &Value) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_json());
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk.
///
/// The file is re-read on every access so separate runs (and separate
/// processes) observe each other's writes. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<serde_json::Map<String, Json>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Default::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&text).map_err(invalid_data)? {
            Json::Object(map) => Ok(map),
            _ => Err(invalid_data(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }
}

impl Store for JsonFileStore {
    fn get(&mut self, key: &str) -> Result<Option<Value>> {
        Ok(self.load()?.get(key).map(Value::from_json))
    }

    fn put(&mut self, key: &str, value: &Value) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_json());
        let text = serde_json::to_string_pretty(&Json::Object(map)).map_err(invalid_data)?;
        std::fs::write(&self.path, text)?;
        tracing::debug!(key, path = %self.path.display(), "store write");
        Ok(())
    }
}

fn invalid_data(e: impl ToString) -> FnlError {
    FnlError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        e.to_string(),
    ))
}

// ---------------------------------------------------------------------------
// Network, clock and randomness
// ---------------------------------------------------------------------------

/// A network that refuses every request.
#[derive(Debug, Default)]
pub struct OfflineNetwork;

impl Network for OfflineNetwork {
    fn request(&mut self, url: &str) -> Result<Response> {
        Err(FnlError::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("network access is disabled: {}", url),
        )))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::{HttpNetwork, SystemClock, ThreadRandom};

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Instant;

    use rand::Rng;

    use super::{Clock, Network, RandomSource, Response};
    use crate::error::{FnlError, Result};

    /// Blocking HTTP GET through `ureq`.
    ///
    /// Non-2xx statuses are answers, not failures: they come back with
    /// `ok == false`. Only transport errors fail the request.
    #[derive(Debug, Default)]
    pub struct HttpNetwork;

    impl Network for HttpNetwork {
        fn request(&mut self, url: &str) -> Result<Response> {
            let response = match ureq::get(url).call() {
                Ok(r) => r,
                Err(ureq::Error::Status(_, r)) => r,
                Err(e) => {
                    return Err(FnlError::Io(std::io::Error::other(e.to_string())));
                }
            };
            let status = response.status();
            let headers = response
                .headers_names()
                .into_iter()
                .filter_map(|name| {
                    let value = response.header(&name)?.to_string();
                    Some((name, value))
                })
                .collect();
            let body = response.into_string()?;
            tracing::debug!(url, status, "fetch");
            Ok(Response {
                status,
                ok: (200..300).contains(&status),
                headers,
                body,
            })
        }
    }

    #[derive(Debug)]
    pub struct SystemClock {
        origin: Instant,
    }

    impl SystemClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
            }
        }
    }

    impl Default for SystemClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for SystemClock {
        fn now(&self) -> f64 {
            self.origin.elapsed().as_secs_f64() * 1000.0
        }
    }

    #[derive(Debug, Default)]
    pub struct ThreadRandom;

    impl RandomSource for ThreadRandom {
        fn draw(&mut self) -> f64 {
            rand::thread_rng().gen::<f64>()
        }
    }
}

// WASM: the clock and the random source come from the JavaScript host.
#[cfg(target_arch = "wasm32")]
extern "C" {
    fn js_performance_now() -> f64;
    fn js_math_random() -> f64;
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct SystemClock;

#[cfg(target_arch = "wasm32")]
impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "wasm32")]
impl Clock for SystemClock {
    fn now(&self) -> f64 {
        unsafe { js_performance_now() }
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct ThreadRandom;

#[cfg(target_arch = "wasm32")]
impl RandomSource for ThreadRandom {
    fn draw(&mut self) -> f64 {
        unsafe { js_math_random() }
    }
}
