use anyhow::{Context, Result};
use itertools::Itertools;
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::money::Money;
use crate::query::Query;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub name: String,
    pub price: Money,
}

impl std::fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.price)
    }
}

/// Products for sale, in the order they were first listed.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Reads every `warehouse*.txt` in `data_dir`, in file name order.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Catalog> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).with_context(|| {
            format!("unable to create data directory: {}", data_dir.display())
        })?;

        let mut catalog = Catalog::default();
        for path in warehouse_files(data_dir)? {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("could not read warehouse: {}", path.display()))?;
            let before = catalog.len();
            catalog.extend(Catalog::parse(&content));
            log::info!(
                "Loaded {} new items from {}",
                catalog.len() - before,
                path.display()
            );
        }
        Ok(catalog)
    }

    /// Parses `name:price;name:price;...`, skipping entries that do not fit.
    pub fn parse(content: &str) -> Catalog {
        let mut catalog = Catalog::default();
        for entry in content.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            match parse_entry(entry) {
                Some(item) => catalog.insert(item),
                None => log::warn!("Skipping malformed catalog entry {:?}", entry),
            }
        }
        catalog
    }

    /// Adds an item, or updates the price of an item with the same name.
    pub fn insert(&mut self, item: CatalogItem) {
        match self.items.iter_mut().find(|i| i.name == item.name) {
            None => self.items.push(item),
            Some(i) => i.price = item.price,
        }
    }

    pub fn extend(&mut self, other: Catalog) {
        for item in other.items {
            self.insert(item);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn price(&self, name: &str) -> Option<Money> {
        self.get(name).map(|i| i.price)
    }

    pub fn iter_matches<'a>(&'a self, query: &'a Query) -> impl Iterator<Item = &'a CatalogItem> {
        self.items.iter().filter(move |item| query.matches(&item.name))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn parse_entry(entry: &str) -> Option<CatalogItem> {
    let (name, price) = entry.rsplit_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let price = price.parse::<Money>().ok()?;
    Some(CatalogItem {
        name: name.to_owned(),
        price,
    })
}

fn warehouse_files(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let re = Regex::new(r"^warehouse.*\.txt$")?;
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("could not list data directory: {}", data_dir.display()))?;
    let mut files = vec![];
    for entry in entries {
        let entry = entry?;
        let is_warehouse = entry
            .file_name()
            .to_str()
            .map(|name| re.is_match(name))
            .unwrap_or(false);
        if is_warehouse && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files.into_iter().sorted().collect())
}
