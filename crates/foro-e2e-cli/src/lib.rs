//! foro CLI: command-line runner for the foro end-to-end suite.
//!
//! ```bash
//! foro --headless                          # run all suites
//! foro --filter register --fail-fast      # filter by case id fragment
//! foro --data-dir ./data --store forum.db # custom data and cleanup store
//! ```

pub mod args;
pub mod output;
pub mod runner;

pub use args::Cli;
pub use runner::SuiteRunner;
