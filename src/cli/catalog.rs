use anyhow::Result;
use clap::Parser;
use console::style;

use super::Command;
use crate::{catalog::Catalog, shop_config::Settings};

#[derive(Parser, Debug)]
#[command(about = "List every item in the catalog")]
pub struct CatalogCmd {}

impl Command for CatalogCmd {
    fn run(&self, settings: &Settings) -> Result<()> {
        let catalog = Catalog::load(&settings.data_dir)?;
        if catalog.is_empty() {
            println!(
                "No inventory items found in {}.",
                style(settings.data_dir.display()).yellow()
            );
            return Ok(());
        }
        for item in catalog.iter() {
            println!("{}", item);
        }
        Ok(())
    }
}
