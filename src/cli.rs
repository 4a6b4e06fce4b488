use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fnl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FNL sandbox language runtime", long_about = None)]
pub struct Args {
    /// Script to run; read from stdin when omitted.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// JSON file backing `fnl:idbSet` / `fnl:idbGet`.
    #[arg(long, value_name = "PATH", default_value = ".fnl_store.json")]
    pub store: PathBuf,

    #[arg(long, value_name = "PX", default_value_t = 800.0)]
    pub width: f64,

    #[arg(long, value_name = "PX", default_value_t = 600.0)]
    pub height: f64,

    #[arg(long = "max-depth", value_name = "N", default_value_t = crate::state::MAX_DEPTH)]
    pub max_depth: usize,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
