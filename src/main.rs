use std::process::ExitCode;

use clap::Parser;
use costwatch::cli::Cli;
use costwatch::types::CostwatchError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    costwatch::init_tracing(cli.default_log_filter());

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[costwatch] Error: {:#}", e);
            let no_data = e
                .downcast_ref::<CostwatchError>()
                .is_some_and(CostwatchError::is_no_data);
            if no_data {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
