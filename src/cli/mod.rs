mod catalog;
mod password;
mod search;
pub mod shop;

use std::path::PathBuf;

use anyhow::Result;
use catalog::CatalogCmd;
use clap::{ArgAction, Parser, Subcommand};
use password::GenPassword;
use search::Search;
use shop::ShopCmd;

use crate::{logging, shop_config};
use crate::shop_config::Settings;

pub trait Command {
    fn run(&self, settings: &Settings) -> Result<()>;
}

#[derive(Parser, Debug)]
#[command(name = "mockmart", version, about = "A console mock shop")]
pub struct Cli {
    /// Directory holding warehouse*.txt and accounts.txt
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log more, and echo log records to stderr
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Shop(ShopCmd),
    Search(Search),
    Catalog(CatalogCmd),
    GenPassword(GenPassword),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let settings = shop_config::load_config(self.data_dir.clone())?;
        let level = logging::level_filter(&settings.log_level, self.verbose)?;
        logging::setup_logger(&settings.log_file(), level, self.verbose > 0)?;
        log::debug!("Using data directory {}", settings.data_dir.display());

        match self.command.unwrap_or(Commands::Shop(ShopCmd::default())) {
            Commands::Shop(cmd) => cmd.run(&settings),
            Commands::Search(cmd) => cmd.run(&settings),
            Commands::Catalog(cmd) => cmd.run(&settings),
            Commands::GenPassword(cmd) => cmd.run(&settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_is_the_default_command() {
        let cli = Cli::try_parse_from(["mockmart"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mockmart",
            "search",
            "apple",
            "watch",
            "-vv",
            "--data-dir",
            "/srv/shop",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/shop")));
        assert!(matches!(cli.command, Some(Commands::Search(_))));
    }

    #[test]
    fn verifies_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
