use anyhow::Result;
use clap::Parser;

use super::Command;
use crate::{password, shop_config::Settings};

#[derive(Parser, Debug)]
#[command(about = "Print a strong random password")]
pub struct GenPassword {
    /// Defaults to the configured password length
    #[arg(short, long)]
    length: Option<usize>,
}

impl Command for GenPassword {
    fn run(&self, settings: &Settings) -> Result<()> {
        let length = self.length.unwrap_or(settings.password_length);
        println!("{}", password::generate(length));
        Ok(())
    }
}
