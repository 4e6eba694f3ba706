use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::account::{Account, AccountDirectory};
use crate::aggregate;
use crate::error::{Error, Result};
use crate::expense::Expense;
use crate::parser::{self, Parser};
use crate::snapshot;

/// Proof of a successful login, naming the account it unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountHandle {
    username: String,
}

impl AccountHandle {
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Owns the account directory and the snapshot it is persisted to.
pub struct ExpenseTracker {
    directory: Mutex<AccountDirectory>,
    snapshot_path: PathBuf,
}

impl ExpenseTracker {
    pub fn new(directory: AccountDirectory, snapshot_path: impl Into<PathBuf>) -> ExpenseTracker {
        ExpenseTracker {
            directory: Mutex::new(directory),
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Starts from the snapshot at `snapshot_path`, or empty if there is none usable.
    pub fn open(snapshot_path: impl Into<PathBuf>) -> ExpenseTracker {
        let snapshot_path = snapshot_path.into();
        let directory = snapshot::load_or_default(&snapshot_path);
        ExpenseTracker::new(directory, snapshot_path)
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    fn with_directory<F, T>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut AccountDirectory) -> Result<T>,
    {
        let mut guard = self.directory.lock().map_err(|_| Error::LockPoisoned)?;
        op(&mut *guard)
    }

    fn with_account<F, T>(&self, handle: &AccountHandle, op: F) -> Result<T>
    where
        F: FnOnce(&mut Account) -> Result<T>,
    {
        self.with_directory(|directory| match directory.get_mut(handle.username()) {
            Some(account) => op(account),
            None => Err(Error::InvalidCredentials),
        })
    }

    pub fn register(&self, username: &str, password: &str) -> Result<()> {
        self.with_directory(|directory| directory.register(username, password))
    }

    pub fn login(&self, username: &str, password: &str) -> Result<AccountHandle> {
        self.with_directory(|directory| {
            let account = directory.login(username, password)?;
            Ok(AccountHandle {
                username: account.username().to_string(),
            })
        })
    }

    pub fn add_expense(
        &self,
        handle: &AccountHandle,
        date: NaiveDate,
        category: &str,
        amount: f64,
    ) -> Result<()> {
        let amount = parser::check_finite(amount)?;
        self.with_account(handle, |account| {
            account.add_expense(Expense::new(date, category, amount));
            log::debug!("{} recorded {} {} on {}", account.username(), amount, category, date);
            Ok(())
        })
    }

    pub fn list_expenses(&self, handle: &AccountHandle) -> Result<Vec<Expense>> {
        self.with_account(handle, |account| Ok(account.expenses().to_vec()))
    }

    pub fn totals_by_category(&self, handle: &AccountHandle) -> Result<HashMap<String, f64>> {
        self.with_account(handle, |account| {
            Ok(aggregate::totals_by_category(account.expenses()))
        })
    }

    pub fn save(&self) -> Result<()> {
        self.with_directory(|directory| {
            snapshot::save(directory, &self.snapshot_path)?;
            Ok(())
        })
    }

    /// Replaces the in-memory state with the snapshot on disk.
    pub fn load(&self) -> Result<()> {
        let loaded = snapshot::load(&self.snapshot_path)?;
        self.with_directory(|directory| {
            *directory = loaded;
            Ok(())
        })
    }

    pub fn export_expenses(&self, handle: &AccountHandle, path: &Path) -> Result<usize> {
        let expenses = self.list_expenses(handle)?;
        parser::write_expenses_file(&expenses, path)?;
        log::info!(
            "exported {} expense(s) of {} to {}",
            expenses.len(),
            handle.username(),
            path.display()
        );
        Ok(expenses.len())
    }

    /// Appends the expenses read from a CSV file and returns how many were added.
    pub fn import_expenses(&self, handle: &AccountHandle, path: &Path) -> Result<usize> {
        let expenses = Parser::parse_file(path)?;
        let count = expenses.len();
        self.with_account(handle, |account| {
            for expense in expenses {
                account.add_expense(expense);
            }
            Ok(())
        })?;
        log::info!(
            "imported {} expense(s) for {} from {}",
            count,
            handle.username(),
            path.display()
        );
        Ok(count)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    fn date(s: &str) -> NaiveDate {
        parser::parse_date(s).unwrap()
    }

    fn tracker_in(dir: &Path) -> ExpenseTracker {
        ExpenseTracker::new(AccountDirectory::new(), dir.join("expenses.json"))
    }

    #[test]
    fn register_and_login() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(dir.path());
        tracker.register("alice", "pw1").unwrap();

        let handle = tracker.login("alice", "pw1").unwrap();
        assert_eq!(handle.username(), "alice");
        assert!(matches!(
            tracker.register("alice", "pw2"),
            Err(Error::DuplicateUsername(_))
        ));
        assert!(matches!(
            tracker.login("alice", "pw2"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn expenses_listed_in_order() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(dir.path());
        tracker.register("alice", "pw1").unwrap();
        let handle = tracker.login("alice", "pw1").unwrap();

        tracker
            .add_expense(&handle, date("2024-01-03"), "Transport", 3.0)
            .unwrap();
        tracker
            .add_expense(&handle, date("2024-01-01"), "Food", 10.0)
            .unwrap();
        tracker
            .add_expense(&handle, date("2024-01-02"), "Food", 5.5)
            .unwrap();

        let listed = tracker.list_expenses(&handle).unwrap();
        assert_eq!(
            listed,
            vec![
                Expense::new(date("2024-01-03"), "Transport", 3.0),
                Expense::new(date("2024-01-01"), "Food", 10.0),
                Expense::new(date("2024-01-02"), "Food", 5.5),
            ]
        );

        let totals = tracker.totals_by_category(&handle).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Food"], 15.5);
        assert_eq!(totals["Transport"], 3.0);
    }

    #[test]
    fn non_finite_amount_rejected() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(dir.path());
        tracker.register("alice", "pw1").unwrap();
        let handle = tracker.login("alice", "pw1").unwrap();

        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                tracker.add_expense(&handle, date("2024-01-01"), "Food", amount),
                Err(Error::MalformedInput(_))
            ));
        }
        assert!(tracker.list_expenses(&handle).unwrap().is_empty());

        tracker.save().unwrap();
        let reopened = ExpenseTracker::open(dir.path().join("expenses.json"));
        assert!(reopened.login("alice", "pw1").is_ok());
    }

    #[test]
    fn accounts_are_isolated() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(dir.path());
        tracker.register("alice", "pw1").unwrap();
        tracker.register("bob", "pw2").unwrap();
        let alice = tracker.login("alice", "pw1").unwrap();
        let bob = tracker.login("bob", "pw2").unwrap();

        tracker
            .add_expense(&alice, date("2024-01-01"), "Food", 1.0)
            .unwrap();
        assert_eq!(tracker.list_expenses(&alice).unwrap().len(), 1);
        assert!(tracker.list_expenses(&bob).unwrap().is_empty());
        assert!(tracker.totals_by_category(&bob).unwrap().is_empty());
    }

    #[test]
    fn save_then_open() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(dir.path());
        tracker.register("alice", "pw1").unwrap();
        let handle = tracker.login("alice", "pw1").unwrap();
        tracker
            .add_expense(&handle, date("2024-03-01"), "Rent", 1200.0)
            .unwrap();
        tracker.save().unwrap();

        let reopened = ExpenseTracker::open(dir.path().join("expenses.json"));
        let handle = reopened.login("alice", "pw1").unwrap();
        assert_eq!(
            reopened.list_expenses(&handle).unwrap(),
            vec![Expense::new(date("2024-03-01"), "Rent", 1200.0)]
        );
    }

    #[test]
    fn load_replaces_state() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(dir.path());
        tracker.register("alice", "pw1").unwrap();
        tracker.save().unwrap();
        tracker.register("bob", "pw2").unwrap();

        tracker.load().unwrap();
        assert!(tracker.login("alice", "pw1").is_ok());
        assert!(matches!(
            tracker.login("bob", "pw2"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn load_missing_snapshot_is_reported() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(dir.path());
        assert!(matches!(
            tracker.load(),
            Err(Error::Snapshot(crate::error::SnapshotError::NotFound(_)))
        ));
    }

    #[test]
    fn export_and_import() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(dir.path());
        tracker.register("alice", "pw1").unwrap();
        tracker.register("bob", "pw2").unwrap();
        let alice = tracker.login("alice", "pw1").unwrap();
        let bob = tracker.login("bob", "pw2").unwrap();
        tracker
            .add_expense(&alice, date("2024-03-01"), "Rent", 1200.0)
            .unwrap();
        tracker
            .add_expense(&alice, date("2024-03-02"), "Food", 8.25)
            .unwrap();

        let csv_path = dir.path().join("alice_expenses.csv");
        assert_eq!(tracker.export_expenses(&alice, &csv_path).unwrap(), 2);
        assert_eq!(tracker.import_expenses(&bob, &csv_path).unwrap(), 2);
        assert_eq!(
            tracker.list_expenses(&bob).unwrap(),
            tracker.list_expenses(&alice).unwrap()
        );
    }

    #[test]
    fn import_missing_file() {
        let dir = tempdir().unwrap();
        let tracker = tracker_in(dir.path());
        tracker.register("alice", "pw1").unwrap();
        let alice = tracker.login("alice", "pw1").unwrap();
        let result = tracker.import_expenses(&alice, &dir.path().join("nope.csv"));
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(tracker.list_expenses(&alice).unwrap().is_empty());
    }
}
