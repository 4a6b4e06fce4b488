use std::path::PathBuf;

use crate::cli::Args;
use crate::state::MAX_DEPTH;

/// Settings for one run and for the native host around it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub max_depth: usize,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub store_path: PathBuf,
    pub verbose: bool,
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Self {
        RunConfig {
            max_depth: args.max_depth,
            canvas_width: args.width,
            canvas_height: args.height,
            store_path: args.store.clone(),
            verbose: args.verbose,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            max_depth: MAX_DEPTH,
            canvas_width: 800.0,
            canvas_height: 600.0,
            store_path: PathBuf::from(".fnl_store.json"),
            verbose: false,
        }
    }
}
