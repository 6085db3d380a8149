//! Command-line interface

pub mod output;

use crate::execution::resolver::RunRequest;
use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Named-operation runner for data and database setup tasks
#[derive(Debug, Parser, Clone)]
#[command(name = "opsrun")]
#[command(version = "0.1.0")]
#[command(about = "Run named setup operations against the configured environment", long_about = None)]
pub struct Cli {
    /// List every operation's name and description, then exit
    #[arg(long, conflicts_with = "run")]
    pub list: bool,

    /// Run specific operations (by default run all)
    #[arg(long, num_args = 1.., value_name = "OPERATION")]
    pub run: Option<Vec<String>>,

    /// Additional config override file(s), highest precedence last
    #[arg(long, value_name = "FILE")]
    pub config: Vec<PathBuf>,

    /// Print the run report as JSON instead of the console summary
    #[arg(long)]
    pub json: bool,

    /// Increase verbosity (repeatable)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Decrease verbosity (repeatable)
    #[arg(short = 'q', action = ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// The run request this invocation asks for
    pub fn request(&self) -> RunRequest {
        match &self.run {
            Some(names) => RunRequest::Selected(names.clone()),
            None => RunRequest::All,
        }
    }
}
