use std::fs;
use std::io::{self, Read};
use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fnl::cli::Args;
use fnl::config::RunConfig;
use fnl::host::{HttpNetwork, Host, JsonFileStore, RecordingSurface, StdSink, SystemClock, ThreadRandom};

fn init_tracing(config: &RunConfig) {
    let filter = if config.verbose {
        EnvFilter::new("fnl=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn read_source(args: &Args) -> io::Result<String> {
    match &args.file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn main() {
    let args = Args::parse();
    let config = RunConfig::from_args(&args);
    init_tracing(&config);

    let source = match read_source(&args) {
        Ok(s) => s,
        Err(e) => {
            match &args.file {
                Some(path) => eprintln!("Error reading '{}': {}", path.display(), e),
                None => eprintln!("Error reading stdin: {}", e),
            }
            process::exit(1);
        }
    };

    let mut host = Host {
        output: Box::new(StdSink),
        surface: Box::new(RecordingSurface::new(config.canvas_width, config.canvas_height)),
        store: Box::new(JsonFileStore::new(config.store_path.clone())),
        network: Box::new(HttpNetwork),
        clock: Box::new(SystemClock::new()),
        random: Box::new(ThreadRandom),
    };

    let report = fnl::run(&source, &mut host, &config);
    tracing::info!(elapsed_ms = report.elapsed_ms, "done");
    println!("{}", fnl::exit_banner(report.exit_code));
    process::exit(report.exit_code);
}
