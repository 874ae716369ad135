mod account;
mod prompt;
mod purchase;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use crate::{
    accounts::{Account, AccountStore, Accounts, FlatFileStore},
    catalog::Catalog,
    password,
    shop_config::Settings,
};

pub use self::account::AccountOutcome;
pub use self::prompt::{InputClosed, Prompt, ScriptedPrompt, TermPrompt};

use super::Command;

#[derive(Parser, Debug, Default)]
#[command(about = "Open the interactive shop (default)")]
pub struct ShopCmd {}

impl Command for ShopCmd {
    fn run(&self, settings: &Settings) -> Result<()> {
        let store = FlatFileStore::new(&settings.data_dir);
        let catalog = Catalog::load(&settings.data_dir)?;
        if catalog.is_empty() {
            anyhow::bail!(
                "No inventory items found. Add warehouse*.txt files to {}",
                settings.data_dir.display()
            );
        }
        log::info!("Catalog loaded! {} items.", catalog.len());

        let mut shop = Shop::new(store, catalog, settings.clone(), TermPrompt::new())?;
        match shop.run() {
            Err(e) if e.is::<InputClosed>() => {
                log::info!("Input closed, leaving the shop");
                Ok(())
            }
            other => other,
        }
    }
}

/// One run of the interactive shop.
pub struct Shop<S, P> {
    store: S,
    accounts: Accounts,
    catalog: Catalog,
    settings: Settings,
    prompt: P,
}

impl<S: AccountStore, P: Prompt> Shop<S, P> {
    pub fn new(store: S, catalog: Catalog, settings: Settings, prompt: P) -> Result<Self> {
        let accounts = store.load()?;
        Ok(Shop {
            store,
            accounts,
            catalog,
            settings,
            prompt,
        })
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Alternates between the login menu and a signed in session until the
    /// shopper chooses to exit.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.login_menu()? {
                Some(username) => {
                    self.main_menu(username)?;
                    self.prompt.say("\nReturning to login...")?;
                }
                None => return Ok(()),
            }
        }
    }

    fn login_menu(&mut self) -> Result<Option<String>> {
        loop {
            self.banner("WELCOME TO MOCKMART")?;
            match self.choose(&["Sign In", "Sign Up", "Exit"])? {
                1 => {
                    if let Some(username) = self.sign_in()? {
                        return Ok(Some(username));
                    }
                }
                2 => self.sign_up()?,
                _ => {
                    self.prompt.say("\nThank you for visiting! Goodbye!")?;
                    return Ok(None);
                }
            }
        }
    }

    fn sign_in(&mut self) -> Result<Option<String>> {
        self.prompt.say("\n--- SIGN IN ---")?;
        let login = self.prompt.ask("Enter username or email: ")?;
        if self.accounts.find_by_login(&login).is_none() {
            self.error("Username or email not found.")?;
            return Ok(None);
        }
        let password = self.prompt.ask_secret("Enter password: ")?;

        match self.accounts.authenticate(&login, &password) {
            Ok(account) => {
                let username = account.username.clone();
                log::info!("{} signed in", username);
                self.prompt
                    .say(&format!("\nWelcome back, {}!", style(&username).bold()))?;
                Ok(Some(username))
            }
            Err(err) => {
                self.error(&err.to_string())?;
                Ok(None)
            }
        }
    }

    fn sign_up(&mut self) -> Result<()> {
        self.prompt.say("\n--- SIGN UP ---")?;

        let username = loop {
            let username = self.prompt.ask("Enter username: ")?;
            match self.accounts.check_username(&username) {
                Ok(()) => break username,
                Err(err) => self.prompt.say(&err.to_string())?,
            }
        };

        let email = loop {
            let email = self.prompt.ask("Enter email: ")?;
            match self.accounts.check_email(&email, None) {
                Ok(()) => break email,
                Err(err) => self.prompt.say(&err.to_string())?,
            }
        };

        self.prompt.say("\nPassword Options:")?;
        let password = match self.choose(&[
            "Enter password manually",
            "Generate password automatically",
        ])? {
            1 => self.ask_new_password("Enter password")?,
            _ => {
                let generated = password::generate(self.settings.password_length);
                self.prompt.say(&format!(
                    "Generated password: {}",
                    style(&generated).yellow().bold()
                ))?;
                generated
            }
        };

        self.accounts.register(&username, &email, &password)?;
        self.persist()?;
        self.prompt.say(&format!(
            "\nAccount created successfully! Welcome, {}!",
            style(&username).bold()
        ))?;
        Ok(())
    }

    fn main_menu(&mut self, username: String) -> Result<()> {
        let mut username = username;
        loop {
            self.banner(&format!("MAIN MENU - {}", username))?;
            match self.choose(&["Fund Wallet", "Purchase", "Manage Account", "Exit"])? {
                1 => self.fund_wallet(&username)?,
                2 => self.purchase_menu(&username)?,
                3 => match self.manage_account(&username)? {
                    AccountOutcome::Stay(name) => username = name,
                    AccountOutcome::LoggedOut => return Ok(()),
                },
                _ => {
                    self.prompt.say(&format!(
                        "\nThank you for your visit, {}!\nWe look forward to seeing you again. Goodbye!",
                        username
                    ))?;
                    return Ok(());
                }
            }
        }
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&mut self.accounts)
    }

    fn account(&self, username: &str) -> Result<&Account> {
        self.accounts
            .get(username)
            .with_context(|| format!("no account named {}", username))
    }

    fn account_mut(&mut self, username: &str) -> Result<&mut Account> {
        self.accounts
            .get_mut(username)
            .with_context(|| format!("no account named {}", username))
    }

    fn banner(&mut self, title: &str) -> Result<()> {
        let rule = "=".repeat(50);
        self.prompt
            .say(&format!("\n{}\n{}\n{}", rule, style(title).bold(), rule))
    }

    fn error(&mut self, message: &str) -> Result<()> {
        self.prompt
            .say(&format!("{} {}", style("ERROR:").red().bold(), message))
    }

    /// Lists `options` and returns the 1-based choice.
    fn choose(&mut self, options: &[&str]) -> Result<usize> {
        let listing = options
            .iter()
            .enumerate()
            .map(|(i, o)| format!("{}. {}", i + 1, o))
            .collect::<Vec<_>>()
            .join("\n");
        self.prompt.say(&format!("\n{}", listing))?;
        loop {
            let answer = self
                .prompt
                .ask(&format!("\nSelect option (1-{}): ", options.len()))?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n),
                _ => self.prompt.say("Invalid option. Please try again.")?,
            }
        }
    }

    /// Reads a non-negative number, `None` if the answer is not one.
    fn ask_number(&mut self, prompt: &str) -> Result<Option<u32>> {
        let answer = self.prompt.ask(prompt)?;
        match answer.parse::<u32>() {
            Ok(n) => Ok(Some(n)),
            Err(_) => {
                self.prompt.say("Invalid input.")?;
                Ok(None)
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.prompt.ask(&format!("{} (yes/no): ", prompt))?;
        Ok(answer.to_lowercase() == "yes")
    }

    fn ask_new_password(&mut self, prompt: &str) -> Result<String> {
        loop {
            let candidate = self.prompt.ask_secret(&format!(
                "{} (min {} chars, must include uppercase, lowercase, digit, special char): ",
                prompt,
                password::MIN_LENGTH
            ))?;
            match password::validate(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(err) => self
                    .prompt
                    .say(&format!("Password does not meet requirements: {}.", err))?,
            }
        }
    }

    fn verify_password(&mut self, username: &str) -> Result<bool> {
        let password = self.prompt.ask_secret("Enter your password to verify: ")?;
        let ok = self.account(username)?.check_password(&password);
        if !ok {
            self.error("Incorrect password.")?;
        }
        Ok(ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::MemoryStore;
    use crate::money::Money;
    use crate::shop_config::build_settings;

    pub(super) const STRONG: &str = "Correct-Horse-42-Battery";

    pub(super) fn shop(answers: &[&str]) -> Shop<MemoryStore, ScriptedPrompt> {
        let store = MemoryStore::new(vec![Account {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: STRONG.into(),
            balance: Money::from_naira(50000),
        }]);
        let catalog = Catalog::parse(
            "Apple iPhone 14:850000;Apple Watch Series 8:300000;Samsung Galaxy Buds:45000;USB-C Cable:2500",
        );
        let mut settings = build_settings(None, Some("/tmp/mockmart-test".into())).unwrap();
        settings.default_stock = 5;
        Shop::new(store, catalog, settings, ScriptedPrompt::new(answers.iter().copied())).unwrap()
    }

    #[test]
    fn exit_right_away() {
        let mut shop = shop(&["3"]);
        shop.run().unwrap();
        assert!(shop.prompt().transcript().contains("Goodbye!"));
    }

    #[test]
    fn invalid_options_are_asked_again() {
        let mut shop = shop(&["9", "abc", "3"]);
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert_eq!(transcript.matches("Invalid option.").count(), 2);
    }

    #[test]
    fn sign_in_with_email() {
        let mut shop = shop(&["1", "ada@example.com", STRONG, "4", "3"]);
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("Welcome back, ada!"));
        assert!(transcript.contains("MAIN MENU - ada"));
        assert!(transcript.contains("Returning to login..."));
    }

    #[test]
    fn sign_in_failures() {
        let mut shop = shop(&["1", "nobody", "1", "ada", "wrong", "3"]);
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("ERROR: Username or email not found."));
        assert!(transcript.contains("ERROR: Incorrect password."));
        assert!(!transcript.contains("MAIN MENU"));
    }

    #[test]
    fn sign_up_retries_until_valid() {
        let mut shop = shop(&[
            "2", "ada", "bob", "ada@example.com", "bob@example.com", "1", "short", STRONG, "3",
        ]);
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("Username ada already exists."));
        assert!(transcript.contains("Email ada@example.com already registered."));
        assert!(transcript.contains("Password does not meet requirements"));
        assert!(shop.accounts().get("bob").is_some());
        assert!(shop.store.saved().unwrap().iter().any(|a| a.username == "bob"));
    }

    #[test]
    fn sign_up_with_generated_password() {
        let mut shop = shop(&["2", "cy", "cy@example.com", "2", "3"]);
        shop.run().unwrap();
        let cy = shop.accounts().get("cy").unwrap();
        assert!(password::validate(&cy.password).is_ok());
        assert!(shop
            .prompt()
            .transcript()
            .contains(&format!("Generated password: {}", cy.password)));
    }

    #[test]
    fn running_out_of_input_is_reported() {
        let mut shop = shop(&["1"]);
        let err = shop.run().unwrap_err();
        assert!(err.is::<InputClosed>());
    }
}
