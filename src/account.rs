use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::expense::{Expense, Ledger};
use crate::password;

pub struct AccountDirectory {
    accounts: HashMap<String, Account>,
}

impl AccountDirectory {
    pub fn new() -> AccountDirectory {
        AccountDirectory {
            accounts: Default::default(),
        }
    }

    pub fn register(&mut self, username: &str, password: &str) -> Result<()> {
        if self.accounts.contains_key(username) {
            log::info!("rejected registration of existing username {:?}", username);
            return Err(Error::DuplicateUsername(username.to_string()));
        }
        let password_hash = password::hash_password(password)?;
        self.accounts.insert(
            username.to_string(),
            Account::new(username.to_string(), password_hash),
        );
        log::info!("registered {:?}", username);
        Ok(())
    }

    /// Unknown users, wrong passwords and unusable stored hashes fail identically.
    pub fn login(&self, username: &str, password: &str) -> Result<&Account> {
        if let Some(account) = self.accounts.get(username) {
            match account.check_password(password) {
                Ok(true) => return Ok(account),
                Ok(false) => {}
                Err(err) => log::warn!("cannot verify password of {:?}: {}", username, err),
            }
        }
        log::info!("failed login for {:?}", username);
        Err(Error::InvalidCredentials)
    }

    pub fn get(&self, username: &str) -> Option<&Account> {
        self.accounts.get(username)
    }

    pub fn get_mut(&mut self, username: &str) -> Option<&mut Account> {
        self.accounts.get_mut(username)
    }

    /// Inserts an already built account, refusing to replace an existing one.
    pub fn insert(&mut self, account: Account) -> Result<()> {
        if self.accounts.contains_key(account.username()) {
            return Err(Error::DuplicateUsername(account.username().to_string()));
        }
        self.accounts.insert(account.username().to_string(), account);
        Ok(())
    }

    /// Accounts ordered by username.
    pub fn accounts(&self) -> Vec<&Account> {
        let mut sorted: Vec<&Account> = self.accounts.values().collect();
        sorted.sort_by(|a, b| a.username().cmp(b.username()));
        sorted
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for AccountDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    username: String,
    password_hash: String,
    ledger: Ledger,
}

impl Account {
    pub fn new(username: String, password_hash: String) -> Account {
        Account::with_ledger(username, password_hash, Ledger::new())
    }

    pub fn with_ledger(username: String, password_hash: String, ledger: Ledger) -> Account {
        Account {
            username,
            password_hash,
            ledger,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn check_password(&self, password: &str) -> Result<bool> {
        password::verify_password(password, &self.password_hash)
    }

    pub fn add_expense(&mut self, expense: Expense) {
        self.ledger.append(expense);
    }

    pub fn expenses(&self) -> &[Expense] {
        self.ledger.expenses()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
