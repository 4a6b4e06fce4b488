#![allow(dead_code)]

use std::collections::HashMap;

use fnl::config::RunConfig;
use fnl::error::{FnlError, Result};
use fnl::host::{
    BufferSink, Clock, DrawOp, Host, MemoryStore, Network, RandomSource, RecordingSurface, Response,
};

pub const CANVAS_WIDTH: f64 = 320.0;
pub const CANVAS_HEIGHT: f64 = 240.0;

/// Clock that never moves.
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

/// Random source that always draws the same number.
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn draw(&mut self) -> f64 {
        self.0
    }
}

/// Network answering from a fixed table of URL → response.
#[derive(Default)]
pub struct ScriptedNetwork {
    pub responses: HashMap<String, Response>,
}

impl ScriptedNetwork {
    pub fn with(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            Response {
                status,
                ok: (200..300).contains(&status),
                headers: vec![("content-type".to_string(), "text/plain".to_string())],
                body: body.to_string(),
            },
        );
        self
    }
}

impl Network for ScriptedNetwork {
    fn request(&mut self, url: &str) -> Result<Response> {
        self.responses.get(url).cloned().ok_or_else(|| {
            FnlError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no route to {}", url),
            ))
        })
    }
}

/// Everything a run left behind.
pub struct Outcome {
    pub logs: Vec<String>,
    pub errors: Vec<String>,
    pub exit_code: i32,
    pub ops: Vec<DrawOp>,
}

pub struct TestHost {
    pub store: MemoryStore,
    pub network: ScriptedNetwork,
    pub random: f64,
    pub config: RunConfig,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            network: ScriptedNetwork::default(),
            random: 0.5,
            config: RunConfig::default(),
        }
    }

    /// Run `source` once. The store is shared between runs of the same
    /// `TestHost`; output and drawing are reported per run.
    pub fn run(&mut self, source: &str) -> Outcome {
        let sink = BufferSink::new();
        let surface = RecordingSurface::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let mut host = Host {
            output: Box::new(sink.clone()),
            surface: Box::new(surface.clone()),
            store: Box::new(self.store.clone()),
            network: Box::new(ScriptedNetwork {
                responses: self.network.responses.clone(),
            }),
            clock: Box::new(FixedClock(1000.0)),
            random: Box::new(FixedRandom(self.random)),
        };
        let report = fnl::run(source, &mut host, &self.config);
        Outcome {
            logs: sink.logs(),
            errors: sink.errors(),
            exit_code: report.exit_code,
            ops: surface.ops(),
        }
    }
}

/// Run `source` against a fresh fake host.
pub fn run(source: &str) -> Outcome {
    TestHost::new().run(source)
}

/// Logs of a run that must finish without errors.
pub fn logs_of(source: &str) -> Vec<String> {
    let outcome = run(source);
    assert_eq!(outcome.errors, Vec::<String>::new(), "unexpected errors for {source:?}");
    outcome.logs
}
