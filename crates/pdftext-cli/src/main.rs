mod cli;
mod page_range;
mod shared;
mod text_cmd;
mod tokens_cmd;

use clap::Parser;
use cli::Cli;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let result = match cli.command {
        cli::Commands::Text {
            ref file,
            ref pages,
            ref format,
            max_depth,
            max_spans,
        } => text_cmd::run(file, pages.as_deref(), format, max_depth, max_spans),
        cli::Commands::Tokens {
            ref file,
            ref pages,
        } => tokens_cmd::run(file, pages.as_deref()),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
