use clap::Parser;
use pcopy::cli::{Args, run_cli};
use pcopy::file_organizer::OrganizeError;
use pcopy::output::OutputFormatter;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let json = args.json;

    let stdin = io::stdin();
    let options = match args.into_options(&mut stdin.lock(), &mut io::stdout()) {
        Ok(options) => options,
        Err(e) => {
            OutputFormatter::error(&format!("ERROR: {}", e));
            return ExitCode::FAILURE;
        }
    };
    log::debug!("run options: {:?}", options);

    let report = match run_cli(&options) {
        Ok(report) => report,
        // An unreadable source still completes, with nothing processed.
        Err(e @ OrganizeError::SourceUnreadable { .. }) => {
            OutputFormatter::error(&e.to_string());
            OutputFormatter::plain(&format!(
                "Complete! 0 files processed. Check {}",
                options.target.display()
            ));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            OutputFormatter::error(&format!("ERROR: {}", e));
            return ExitCode::FAILURE;
        }
    };

    if json {
        match report.to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                OutputFormatter::error(&e.to_string());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
