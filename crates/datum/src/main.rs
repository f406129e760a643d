use std::process::ExitCode;

use clap::Parser;

use cli::{App, Commands};

mod cli;
mod logging;
mod tracker;

fn main() -> ExitCode {
    let app = App::parse();
    logging::init(app.verbose, app.quiet);

    let result = match app.cmd {
        Commands::Extract(arg) => arg.run(app.quiet),
        Commands::Formats => {
            cli::formats();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
