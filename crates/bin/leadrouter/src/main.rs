use std::process::ExitCode;

use clap::Parser;

use leadrouter::cli::Cli;
use leadrouter::runner::{self, EXIT_ABORTED};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: cannot start the async runtime: {err}");
            return ExitCode::from(EXIT_ABORTED);
        }
    };
    let code = runtime.block_on(runner::execute(cli));
    // A timed-out login wait leaves a stdin read pending.
    runtime.shutdown_background();
    ExitCode::from(code)
}
