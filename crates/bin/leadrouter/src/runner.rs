//! Wiring of the configured adapters into a routing run.

use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use tokio::io::BufReader;

use leadrouter_adapter_sheets::{SheetsApiSource, ValuesFileSource, sheet_id_from_url};
use leadrouter_adapter_virtual::VirtualConsole;
use leadrouter_adapter_webdriver::GravityFormsConsole;
use leadrouter_app::options::RunOptions;
use leadrouter_app::ports::{FormSurface, RuleSource};
use leadrouter_app::routing_run::{RoutingRun, load_rules};
use leadrouter_domain::error::LeadRouterError;
use leadrouter_domain::outcome::{RunStatus, RunSummary};
use leadrouter_domain::rule::RuleRecord;

use crate::cli::{Cli, Command};
use crate::config::{Config, RoutingConfig, SourceConfig, SourceKind, SurfaceKind};
use crate::operator;
use crate::report;

/// The run could not start or was cut short before any summary.
pub const EXIT_ABORTED: u8 = 1;

const TEXT_QUESTION: &str =
    "Configure Text Formatted Notifications for location-based forms as well?";

/// Process exit code for a finished run.
#[must_use]
pub fn exit_code(status: RunStatus) -> u8 {
    match status {
        RunStatus::AllSucceeded => 0,
        RunStatus::Partial => 2,
        RunStatus::NoneSucceeded => 3,
    }
}

/// The rule source selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Sheets(SheetsApiSource),
    File(ValuesFileSource),
}

impl ConfiguredSource {
    /// Build the source named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when a required setting is missing or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &SourceConfig) -> anyhow::Result<Self> {
        match config.kind {
            SourceKind::SheetsApi => {
                let spreadsheet = config
                    .spreadsheet
                    .as_deref()
                    .context("no spreadsheet configured")?;
                let token = config
                    .access_token
                    .as_deref()
                    .context("no sheets access token configured")?;
                let source =
                    SheetsApiSource::new(sheet_id_from_url(spreadsheet), &config.range, token)?;
                Ok(Self::Sheets(source))
            }
            SourceKind::ValuesFile => {
                let path = config
                    .values_file
                    .as_deref()
                    .context("no values file configured")?;
                Ok(Self::File(ValuesFileSource::new(path)))
            }
        }
    }
}

impl RuleSource for ConfiguredSource {
    async fn read_rules(&self) -> Result<Vec<RuleRecord>, LeadRouterError> {
        match self {
            Self::Sheets(source) => source.read_rules().await,
            Self::File(source) => source.read_rules().await,
        }
    }
}

/// Resolve the run-wide options once, asking the operator when the
/// configuration leaves a choice open.
///
/// # Errors
///
/// Returns an I/O error if the terminal cannot be used for the question.
pub async fn resolve_run_options(routing: &RoutingConfig) -> std::io::Result<RunOptions> {
    let text_for_location_forms = match routing.text_for_location_forms {
        Some(answer) => answer,
        None => {
            operator::ask_yes_no(
                BufReader::new(tokio::io::stdin()),
                &mut tokio::io::stderr(),
                TEXT_QUESTION,
            )
            .await?
        }
    };
    tracing::info!(text_for_location_forms, "run options resolved");
    Ok(RunOptions {
        text_for_location_forms,
    })
}

/// Read and validate the rule source without touching any console.
///
/// # Errors
///
/// Returns the source or validation error.
pub async fn validate(config: &Config) -> anyhow::Result<Vec<RuleRecord>> {
    let source = ConfiguredSource::from_config(&config.source)?;
    Ok(load_rules(&source).await?)
}

/// Run a full reconciliation with the configured adapters.
///
/// # Errors
///
/// Returns an error when the rules are invalid, the console cannot be
/// reached, or the active forms cannot be listed.
pub async fn run(config: &Config) -> anyhow::Result<RunSummary> {
    // Rules
    let source = ConfiguredSource::from_config(&config.source)?;
    let rules = load_rules(&source).await?;

    // Options
    let options = resolve_run_options(&config.routing).await?;

    // Console
    match config.surface.kind {
        SurfaceKind::Virtual => {
            let console = match &config.surface.fixture {
                Some(path) => VirtualConsole::from_json_file(path)
                    .with_context(|| format!("loading console fixture {}", path.display()))?,
                None => VirtualConsole::default(),
            };
            reconcile(source, console, options, &rules).await
        }
        SurfaceKind::Webdriver => {
            let console =
                GravityFormsConsole::connect(&config.console.base_url, &config.surface.webdriver)
                    .await
                    .context("starting the browser session")?;
            if config.operator.login_wait_secs > 0 {
                console.open_admin().await?;
                operator::wait_for_login(
                    BufReader::new(tokio::io::stdin()),
                    &mut tokio::io::stderr(),
                    &console.admin_url(),
                    Duration::from_secs(config.operator.login_wait_secs),
                )
                .await?;
            }
            let summary = reconcile(source, console.clone(), options, &rules).await;
            if let Err(err) = console.quit().await {
                tracing::warn!(error = %err, "could not close the browser session");
            }
            summary
        }
    }
}

async fn reconcile<S>(
    source: ConfiguredSource,
    surface: S,
    options: RunOptions,
    rules: &[RuleRecord],
) -> anyhow::Result<RunSummary>
where
    S: FormSurface + Clone,
{
    let run = RoutingRun::new(source, surface, options);
    Ok(run.execute(rules).await?)
}

fn init_logging(filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn dispatch(cli: Cli) -> anyhow::Result<u8> {
    match cli.command {
        Command::Validate(args) => {
            let mut config = Config::load(&args.config)?;
            args.apply(&mut config);
            config.validate_source()?;
            init_logging(&config.logging.filter);

            let rules = validate(&config).await?;
            println!(
                "{} {} rule record(s) ready",
                "Rule source is valid:".green().bold(),
                rules.len()
            );
            Ok(0)
        }
        Command::Run(args) => {
            let mut config = Config::load(&args.source.config)?;
            args.apply(&mut config);
            config.validate()?;
            init_logging(&config.logging.filter);

            let summary = run(&config).await?;
            tracing::info!(status = ?summary.status(), "run finished\n{summary}");
            println!("{}", report::format_summary(&summary));
            Ok(exit_code(summary.status()))
        }
    }
}

fn report_error(err: &anyhow::Error) {
    if let Some(LeadRouterError::Validation(validation)) = err.downcast_ref::<LeadRouterError>() {
        eprint!("{}", report::format_validation(validation));
        return;
    }
    eprintln!("{} {err:#}", "error:".red().bold());
}

/// Run the command and return the process exit code.
pub async fn execute(cli: Cli) -> u8 {
    match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("run aborted: {err:#}");
            report_error(&err);
            EXIT_ABORTED
        }
    }
}
