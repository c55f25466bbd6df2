use clap::Parser;
use geocore_cli::Geocore;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Geocore::parse();
    match args.run(true) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}
