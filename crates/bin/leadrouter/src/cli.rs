//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{Config, SourceKind, SurfaceKind};

/// Propagate lead-routing rules into form notification routing settings.
#[derive(Parser, Debug)]
#[command(name = "leadrouter", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile every active form against the rule source
    Run(RunArgs),
    /// Read and validate the rule source only
    Validate(SourceArgs),
}

/// Rule source selection shared by every command.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "leadrouter.toml")]
    pub config: PathBuf,

    /// Spreadsheet id or sharing URL
    #[arg(long, conflicts_with = "values_file")]
    pub spreadsheet: Option<String>,

    /// Read the rules from a JSON values file instead of the sheets API
    #[arg(long)]
    pub values_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// WordPress site root of the console
    #[arg(long)]
    pub console_url: Option<String>,

    /// How the console is driven
    #[arg(long, value_enum)]
    pub surface: Option<SurfaceKind>,

    /// Fixture for the virtual console
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Configure text notifications on location-based forms
    #[arg(long, value_enum)]
    pub text_for_location_forms: Option<Answer>,

    /// Start automation without waiting for the operator to log in
    #[arg(long)]
    pub skip_login_wait: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Answer {
    Yes,
    No,
}

impl From<Answer> for bool {
    fn from(answer: Answer) -> Self {
        answer == Answer::Yes
    }
}

impl SourceArgs {
    /// Layer the flags over `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(spreadsheet) = &self.spreadsheet {
            config.source.kind = SourceKind::SheetsApi;
            config.source.spreadsheet = Some(spreadsheet.clone());
        }
        if let Some(path) = &self.values_file {
            config.source.kind = SourceKind::ValuesFile;
            config.source.values_file = Some(path.clone());
        }
    }
}

impl RunArgs {
    /// Layer the flags over `config`.
    pub fn apply(&self, config: &mut Config) {
        self.source.apply(config);
        if let Some(url) = &self.console_url {
            config.console.base_url.clone_from(url);
        }
        if let Some(kind) = self.surface {
            config.surface.kind = kind;
        }
        if let Some(path) = &self.fixture {
            config.surface.kind = SurfaceKind::Virtual;
            config.surface.fixture = Some(path.clone());
        }
        if let Some(answer) = self.text_for_location_forms {
            config.routing.text_for_location_forms = Some(answer.into());
        }
        if self.skip_login_wait {
            config.operator.login_wait_secs = 0;
        }
    }
}
