use clap::Parser;
use tibasic_compiler::cli::{init_tracing, Cli, CliHandler};
use std::process;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level());
    let handler = CliHandler::new();

    if let Err(e) = handler.handle(cli) {
        tracing::error!("{:#}", e);
        process::exit(1);
    }
}
