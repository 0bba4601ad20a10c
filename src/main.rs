use blobvault::cli::Cli;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let result = if cli.extract {
        blobvault::cli::commands::extract::execute(&cli)
    } else {
        blobvault::cli::commands::add::execute(&cli)
    };

    if let Err(e) = result {
        blobvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
