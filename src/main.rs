use anyhow::Result;
use clap::Parser;
use mockmart::cli::Cli;

fn main() -> Result<()> {
    Cli::parse().run()
}
