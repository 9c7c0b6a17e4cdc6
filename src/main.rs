use std::process::ExitCode;

use git_clang_format::cli;

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let args = cli::parse();
    init_logging(args.verbose);

    // Failures go to stdout, same as the informational messages.
    match cli::run(args) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            println!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
