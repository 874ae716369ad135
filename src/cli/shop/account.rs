use anyhow::Result;
use console::style;

use super::{Prompt, Shop};
use crate::{accounts::AccountStore, cart, money::Money};

/// What the session does after the account menu closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    /// Still signed in, possibly under a new username.
    Stay(String),
    LoggedOut,
}

impl<S: AccountStore, P: Prompt> Shop<S, P> {
    pub(super) fn fund_wallet(&mut self, username: &str) -> Result<()> {
        self.prompt.say("\n--- FUND WALLET ---")?;
        let amounts = self.settings.funding_amounts();
        let mut options: Vec<String> = amounts.iter().map(Money::to_string).collect();
        options.push("Back to Main Menu".to_owned());
        let options: Vec<&str> = options.iter().map(String::as_str).collect();

        loop {
            self.prompt.say("\nFunding Options:")?;
            let choice = self.choose(&options)?;
            let Some(&amount) = amounts.get(choice - 1) else {
                return Ok(());
            };
            let balance = cart::fund(self.account_mut(username)?, amount);
            self.persist()?;
            self.prompt.say(&format!("Funded {}", style(amount).green()))?;
            self.prompt
                .say(&format!("New balance: {}", style(balance).bold()))?;
        }
    }

    pub(super) fn manage_account(&mut self, username: &str) -> Result<AccountOutcome> {
        let mut username = username.to_owned();
        loop {
            self.banner("MANAGE ACCOUNT")?;
            match self.choose(&[
                "Change Username",
                "Change Email",
                "Change Password",
                "View Account Details",
                "Reset Balance",
                "Delete Account",
                "Logout",
                "Exit Manage Account",
            ])? {
                1 => username = self.change_username(&username)?,
                2 => self.change_email(&username)?,
                3 => self.change_password(&username)?,
                4 => self.view_account_details(&username)?,
                5 => self.reset_balance(&username)?,
                6 => {
                    if self.delete_account(&username)? {
                        return Ok(AccountOutcome::LoggedOut);
                    }
                }
                7 => {
                    log::info!("{} logged out", username);
                    return Ok(AccountOutcome::LoggedOut);
                }
                _ => return Ok(AccountOutcome::Stay(username)),
            }
        }
    }

    fn change_username(&mut self, username: &str) -> Result<String> {
        self.prompt.say("\n--- CHANGE USERNAME ---")?;
        if !self.verify_password(username)? {
            return Ok(username.to_owned());
        }
        loop {
            let new_username = self.prompt.ask("Enter new username: ")?;
            match self.accounts.rename(username, &new_username) {
                Ok(()) => {
                    self.persist()?;
                    self.prompt
                        .say(&format!("Username changed to {}", new_username))?;
                    return Ok(new_username);
                }
                Err(err) => self.prompt.say(&err.to_string())?,
            }
        }
    }

    fn change_email(&mut self, username: &str) -> Result<()> {
        self.prompt.say("\n--- CHANGE EMAIL ---")?;
        if !self.verify_password(username)? {
            return Ok(());
        }
        loop {
            let email = self.prompt.ask("Enter new email: ")?;
            match self.accounts.change_email(username, &email) {
                Ok(()) => {
                    self.persist()?;
                    return self.prompt.say(&format!("Email changed to {}", email));
                }
                Err(err) => self.prompt.say(&err.to_string())?,
            }
        }
    }

    fn change_password(&mut self, username: &str) -> Result<()> {
        self.prompt.say("\n--- CHANGE PASSWORD ---")?;
        let current = self.prompt.ask_secret("Enter current password: ")?;
        if !self.account(username)?.check_password(&current) {
            return self.error("Incorrect password.");
        }
        let new_password = self.ask_new_password("Enter new password")?;
        self.accounts
            .change_password(username, &current, &new_password)?;
        self.persist()?;
        self.prompt.say("Password changed successfully.")
    }

    fn view_account_details(&mut self, username: &str) -> Result<()> {
        self.prompt.say("\n--- ACCOUNT DETAILS ---")?;
        if !self.verify_password(username)? {
            return Ok(());
        }
        let account = self.account(username)?;
        let details = format!(
            "Username: {}\nEmail: {}\nBalance: {}",
            account.username, account.email, account.balance
        );
        self.prompt.say(&details)
    }

    fn reset_balance(&mut self, username: &str) -> Result<()> {
        self.prompt.say("\n--- RESET BALANCE ---")?;
        if !self.verify_password(username)? {
            return Ok(());
        }
        if self.confirm("Are you sure you want to reset your balance to zero?")? {
            self.account_mut(username)?.balance = Money::ZERO;
            self.persist()?;
            self.prompt.say("Balance reset to zero.")?;
        }
        Ok(())
    }

    fn delete_account(&mut self, username: &str) -> Result<bool> {
        self.prompt.say("\n--- DELETE ACCOUNT ---")?;
        if !self.verify_password(username)? {
            return Ok(false);
        }
        if self.confirm(
            "Are you sure you want to delete your account? This cannot be undone.",
        )? {
            self.accounts.remove(username);
            self.persist()?;
            self.prompt.say("Account deleted successfully.")?;
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{shop, STRONG};
    use crate::money::Money;

    #[test]
    fn fund_wallet_adds_and_saves() {
        // sign in, fund 20 000 twice, back, exit, exit
        let mut shop = shop(&["1", "ada", STRONG, "1", "2", "2", "5", "4", "3"]);
        shop.run().unwrap();
        let ada = shop.accounts().get("ada").unwrap();
        assert_eq!(ada.balance, Money::from_naira(90000));
        assert!(shop.prompt().transcript().contains("New balance: NGN 90,000.00"));
        let saved = shop.store.saved().unwrap();
        assert_eq!(saved[0].balance, Money::from_naira(90000));
    }

    #[test]
    fn rename_keeps_session_under_new_name() {
        let mut shop = shop(&[
            "1", "ada", STRONG, "3", "1", STRONG, "", "lovelace", "8", "4", "3",
        ]);
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("Username cannot be empty."));
        assert!(transcript.contains("MAIN MENU - lovelace"));
        assert!(shop.accounts().get("ada").is_none());
        assert!(shop.accounts().get("lovelace").is_some());
    }

    #[test]
    fn sensitive_actions_need_password() {
        let mut shop = shop(&["1", "ada", STRONG, "3", "4", "wrong", "5", "wrong", "8", "4", "3"]);
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert_eq!(transcript.matches("ERROR: Incorrect password.").count(), 2);
        assert!(!transcript.contains("Email: ada@example.com"));
        assert_eq!(
            shop.accounts().get("ada").unwrap().balance,
            Money::from_naira(50000)
        );
    }

    #[test]
    fn view_details_and_reset_balance() {
        let mut shop = shop(&[
            "1", "ada", STRONG, "3", "4", STRONG, "5", STRONG, "yes", "8", "4", "3",
        ]);
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("Email: ada@example.com\nBalance: NGN 50,000.00"));
        assert!(transcript.contains("Balance reset to zero."));
        assert_eq!(shop.accounts().get("ada").unwrap().balance, Money::ZERO);
    }

    #[test]
    fn change_password_then_sign_in_again() {
        let new = "Fresh-Password-77-Now";
        let mut shop = shop(&[
            "1", "ada", STRONG, "3", "3", STRONG, new, "7", "1", "ada", new, "4", "3",
        ]);
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("Password changed successfully."));
        assert_eq!(transcript.matches("Welcome back, ada!").count(), 2);
    }

    #[test]
    fn delete_account_logs_out() {
        let mut shop = shop(&["1", "ada", STRONG, "3", "6", STRONG, "yes", "1", "ada", "3"]);
        shop.run().unwrap();
        let transcript = shop.prompt().transcript();
        assert!(transcript.contains("Account deleted successfully."));
        assert!(transcript.contains("Username or email not found."));
        assert!(shop.accounts().is_empty());
    }
}
