use anyhow::{Context, Result};
use std::{
    fmt::{Display, Formatter},
    fs, io,
};
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::{NamedTempFile, PersistError};

use crate::money::Money;
use crate::password::{self, PasswordError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub email: String,
    pub password: String,
    pub balance: Money,
}

impl Account {
    pub fn check_password(&self, password: &str) -> bool {
        self.password == password
    }

    fn to_line(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.username,
            self.email,
            self.password,
            self.balance.to_plain()
        )
    }

    /// `username, email, password, balance`. The password sits between the
    /// second and the last comma, so it may contain commas itself.
    fn from_line(line: &str) -> Option<Account> {
        let (username, rest) = line.split_once(',')?;
        let (email, rest) = rest.split_once(',')?;
        let (password, balance) = rest.rsplit_once(',')?;
        let (username, email, password) = (username.trim(), email.trim(), password.trim());
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return None;
        }
        Some(Account {
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            balance: balance.parse().ok()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    EmptyUsername,
    EmptyEmail,
    InvalidCharacter(&'static str),
    UsernameTaken(String),
    EmailTaken(String),
    UnknownLogin(String),
    WrongPassword,
    WeakPassword(PasswordError),
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountError::EmptyUsername => write!(f, "Username cannot be empty."),
            AccountError::EmptyEmail => write!(f, "Email cannot be empty."),
            AccountError::InvalidCharacter(field) => {
                write!(f, "The {} cannot contain commas or line breaks.", field)
            }
            AccountError::UsernameTaken(name) => write!(f, "Username {} already exists.", name),
            AccountError::EmailTaken(email) => write!(f, "Email {} already registered.", email),
            AccountError::UnknownLogin(login) => {
                write!(f, "Username or email {} not found.", login)
            }
            AccountError::WrongPassword => write!(f, "Incorrect password."),
            AccountError::WeakPassword(err) => write!(f, "Password {}.", err),
        }
    }
}

impl std::error::Error for AccountError {}

impl From<PasswordError> for AccountError {
    fn from(err: PasswordError) -> Self {
        AccountError::WeakPassword(err)
    }
}

/// All registered accounts, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Accounts {
    accounts: Vec<Account>,
    modified: bool,
}

impl Accounts {
    pub fn from_accounts(accounts: Vec<Account>) -> Accounts {
        Accounts {
            accounts,
            modified: false,
        }
    }

    pub fn parse(content: &str) -> Accounts {
        let accounts = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| {
                let account = Account::from_line(line);
                if account.is_none() {
                    log::warn!("Skipping malformed account line");
                }
                account
            })
            .collect();
        Accounts::from_accounts(accounts)
    }

    pub fn serialize(&self) -> String {
        self.accounts
            .iter()
            .map(|a| format!("{}\n", a.to_line()))
            .collect()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn get(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    /// Mutable access marks the accounts as modified.
    pub fn get_mut(&mut self, username: &str) -> Option<&mut Account> {
        let account = self.accounts.iter_mut().find(|a| a.username == username);
        if account.is_some() {
            self.modified = true;
        }
        account
    }

    pub fn find_by_login(&self, login: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.username == login || a.email == login)
    }

    pub fn username_taken(&self, username: &str) -> bool {
        self.get(username).is_some()
    }

    /// Whether an account other than `except` uses `email`.
    pub fn email_taken(&self, email: &str, except: Option<&str>) -> bool {
        self.accounts
            .iter()
            .any(|a| a.email == email && Some(a.username.as_str()) != except)
    }

    pub fn check_username(&self, username: &str) -> Result<(), AccountError> {
        if username.is_empty() {
            return Err(AccountError::EmptyUsername);
        }
        if has_separator(username) {
            return Err(AccountError::InvalidCharacter("username"));
        }
        if self.username_taken(username) {
            return Err(AccountError::UsernameTaken(username.to_owned()));
        }
        Ok(())
    }

    pub fn check_email(&self, email: &str, except: Option<&str>) -> Result<(), AccountError> {
        if email.is_empty() {
            return Err(AccountError::EmptyEmail);
        }
        if has_separator(email) {
            return Err(AccountError::InvalidCharacter("email"));
        }
        if self.email_taken(email, except) {
            return Err(AccountError::EmailTaken(email.to_owned()));
        }
        Ok(())
    }

    pub fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<&Account, AccountError> {
        self.check_username(username)?;
        self.check_email(email, None)?;
        password::validate(password)?;
        if password.contains(['\n', '\r']) {
            return Err(AccountError::InvalidCharacter("password"));
        }
        self.accounts.push(Account {
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            balance: Money::ZERO,
        });
        self.modified = true;
        log::info!("Registered account {}", username);
        Ok(&self.accounts[self.accounts.len() - 1])
    }

    /// Looks up `login` by username or email and checks the password.
    pub fn authenticate(&self, login: &str, password: &str) -> Result<&Account, AccountError> {
        let account = self
            .find_by_login(login)
            .ok_or_else(|| AccountError::UnknownLogin(login.to_owned()))?;
        if account.check_password(password) {
            Ok(account)
        } else {
            log::warn!("Failed sign in for {}", account.username);
            Err(AccountError::WrongPassword)
        }
    }

    pub fn rename(&mut self, username: &str, new_username: &str) -> Result<(), AccountError> {
        self.check_username(new_username)?;
        let account = self
            .get_mut(username)
            .ok_or_else(|| AccountError::UnknownLogin(username.to_owned()))?;
        account.username = new_username.to_owned();
        log::info!("Renamed account {} to {}", username, new_username);
        Ok(())
    }

    pub fn change_email(&mut self, username: &str, email: &str) -> Result<(), AccountError> {
        self.check_email(email, Some(username))?;
        let account = self
            .get_mut(username)
            .ok_or_else(|| AccountError::UnknownLogin(username.to_owned()))?;
        account.email = email.to_owned();
        Ok(())
    }

    pub fn change_password(
        &mut self,
        username: &str,
        current: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let account = self
            .get(username)
            .ok_or_else(|| AccountError::UnknownLogin(username.to_owned()))?;
        if !account.check_password(current) {
            return Err(AccountError::WrongPassword);
        }
        password::validate(new_password)?;
        if let Some(account) = self.get_mut(username) {
            account.password = new_password.to_owned();
        }
        Ok(())
    }

    pub fn remove(&mut self, username: &str) -> Option<Account> {
        let idx = self.accounts.iter().position(|a| a.username == username)?;
        self.modified = true;
        log::info!("Deleted account {}", username);
        Some(self.accounts.remove(idx))
    }

    fn mark_saved(&mut self) {
        self.modified = false;
    }
}

fn has_separator(field: &str) -> bool {
    field.contains([',', '\n', '\r'])
}

/// Where accounts live between runs.
pub trait AccountStore {
    fn load(&self) -> Result<Accounts>;

    /// Writes `accounts` if they changed since the last load or save.
    fn save(&self, accounts: &mut Accounts) -> Result<()>;
}

/// `accounts.txt` in the data directory, one account per line.
#[derive(Debug, Clone)]
pub struct FlatFileStore {
    data_dir: PathBuf,
}

impl FlatFileStore {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> FlatFileStore {
        FlatFileStore {
            data_dir: data_dir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        Self::get_path(&self.data_dir)
    }

    fn get_path<P: AsRef<Path>>(data_dir: P) -> PathBuf {
        data_dir.as_ref().join("accounts.txt")
    }
}

impl AccountStore for FlatFileStore {
    fn load(&self) -> Result<Accounts> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.data_dir).with_context(|| {
                    format!("unable to create data directory: {}", self.data_dir.display())
                })?;
                fs::File::create(&path)
                    .with_context(|| format!("could not create accounts: {}", path.display()))?;
                return Ok(Accounts::default());
            }
            Err(e) => {
                Err(e).with_context(|| format!("could not read accounts: {}", path.display()))?
            }
        };

        let accounts = Accounts::parse(&content);
        log::info!("Loaded {} accounts from {}", accounts.len(), path.display());
        Ok(accounts)
    }

    fn save(&self, accounts: &mut Accounts) -> Result<()> {
        if !accounts.is_modified() {
            return Ok(());
        }

        let mut file = NamedTempFile::new_in(&self.data_dir).with_context(|| {
            format!(
                "could not create temporary accounts file in: {}",
                self.data_dir.display()
            )
        })?;
        file.write_all(accounts.serialize().as_bytes())
            .with_context(|| {
                format!(
                    "could not write to temporary accounts file: {}",
                    file.path().display()
                )
            })?;

        let path = self.path();
        persist(file, &path)
            .with_context(|| format!("could not replace accounts: {}", path.display()))?;

        log::info!("Saved {} accounts", accounts.len());
        accounts.mark_saved();
        Ok(())
    }
}

fn persist<P: AsRef<Path>>(file: NamedTempFile, path: P) -> Result<(), PersistError> {
    file.persist(&path)?;
    Ok(())
}

/// Keeps accounts in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    initial: Vec<Account>,
    saved: std::cell::RefCell<Option<Vec<Account>>>,
}

impl MemoryStore {
    pub fn new(initial: Vec<Account>) -> MemoryStore {
        MemoryStore {
            initial,
            saved: Default::default(),
        }
    }

    /// The accounts as of the last save, if any.
    pub fn saved(&self) -> Option<Vec<Account>> {
        self.saved.borrow().clone()
    }
}

impl AccountStore for MemoryStore {
    fn load(&self) -> Result<Accounts> {
        Ok(Accounts::from_accounts(
            self.saved().unwrap_or_else(|| self.initial.clone()),
        ))
    }

    fn save(&self, accounts: &mut Accounts) -> Result<()> {
        if accounts.is_modified() {
            *self.saved.borrow_mut() = Some(accounts.iter().cloned().collect());
            accounts.mark_saved();
        }
        Ok(())
    }
}
