use clap::Parser;
use idis_processor::cli::{self, Args, Outcome};
use std::process;

fn main() {
    let args = Args::parse();
    cli::init_logging(args.verbose, args.quiet);

    match cli::run(args) {
        Ok(Outcome::Success) => process::exit(0),
        Ok(Outcome::PartialFailure) => {
            // Per-file failures were already reported as they happened
            process::exit(2);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
