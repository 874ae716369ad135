use anyhow::Result;
use clap::Parser;
use console::style;

use super::Command;
use crate::{
    catalog::{Catalog, CatalogItem},
    query::Query,
    shop_config::Settings,
};

#[derive(Parser, Debug)]
#[command(about = "Search the catalog without signing in")]
pub struct Search {
    /// Every term must appear in the item name, in any case
    query: Vec<String>,

    #[arg(short, long, default_value = "30")]
    num_hits: usize,
}

impl Command for Search {
    fn run(&self, settings: &Settings) -> Result<()> {
        let catalog = Catalog::load(&settings.data_dir)?;
        let query = Query::from(self.query.join(" "));
        log::info!("Searching {} items for {:?}", catalog.len(), query.to_string());

        let hits = top_hits(&catalog, &query, self.num_hits);
        if hits.is_empty() {
            println!("No items found matching your search.");
        } else {
            for (i, item) in hits.iter().enumerate() {
                println!("{}. {} - {}", i + 1, style(&item.name).bold(), item.price);
            }
        }
        Ok(())
    }
}

/// The first `num_hits` matches in catalog order.
fn top_hits<'a>(catalog: &'a Catalog, query: &'a Query, num_hits: usize) -> Vec<&'a CatalogItem> {
    catalog.iter_matches(query).take(num_hits).collect()
}
