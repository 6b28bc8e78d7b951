use std::process::ExitCode;

use clap::Parser;
use lsmake::cli::Cli;

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let args = Cli::parse();
    lsmake::cli::main(&args)
}
