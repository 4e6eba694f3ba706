//! Line-oriented text menu over an [`ExpenseTracker`].
//!
//! Reads choices and field values one line at a time, so it can be driven by
//! a terminal or by a scripted buffer. End of input behaves like choosing
//! "Exit": the data is saved and the menu returns.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::aggregate;
use crate::error::{Error, Result};
use crate::parser;
use crate::snapshot;
use crate::tracker::{AccountHandle, ExpenseTracker};

enum Flow {
    Continue,
    Logout,
    Quit,
}

pub struct Menu<'a, R, W> {
    tracker: &'a ExpenseTracker,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(tracker: &'a ExpenseTracker, input: R, output: W) -> Menu<'a, R, W> {
        Menu {
            tracker,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "\n1. Register\n2. Login\n3. Save\n4. Exit")?;
            let choice = match self.prompt_choice()? {
                Some(choice) => choice,
                None => break,
            };
            let flow = match choice {
                1 => self.register()?,
                2 => self.login()?,
                3 => {
                    self.save()?;
                    Flow::Continue
                }
                4 => Flow::Quit,
                _ => {
                    writeln!(self.output, "Invalid choice.")?;
                    Flow::Continue
                }
            };
            if let Flow::Quit = flow {
                break;
            }
        }
        self.save()?;
        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    fn account_menu(&mut self, handle: &AccountHandle) -> Result<Flow> {
        loop {
            writeln!(
                self.output,
                "\n[{}]\n1. Add Expense\n2. List Expenses\n3. Total by Category\n4. Export CSV\n5. Import CSV\n6. Logout",
                handle.username()
            )?;
            let choice = match self.prompt_choice()? {
                Some(choice) => choice,
                None => return Ok(Flow::Quit),
            };
            let flow = match choice {
                1 => self.add_expense(handle)?,
                2 => self.list_expenses(handle)?,
                3 => self.totals(handle)?,
                4 => self.export(handle)?,
                5 => self.import(handle)?,
                6 => Flow::Logout,
                _ => {
                    writeln!(self.output, "Invalid choice.")?;
                    Flow::Continue
                }
            };
            match flow {
                Flow::Continue => continue,
                Flow::Logout => {
                    writeln!(self.output, "Logged out.")?;
                    return Ok(Flow::Continue);
                }
                Flow::Quit => return Ok(Flow::Quit),
            }
        }
    }

    /// Returns `None` at end of input. Trailing line endings are stripped.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt_choice(&mut self) -> Result<Option<u32>> {
        loop {
            let line = match self.prompt("Enter your choice: ")? {
                Some(line) => line,
                None => return Ok(None),
            };
            match line.trim().parse::<u32>() {
                Ok(choice) => return Ok(Some(choice)),
                Err(_) => writeln!(self.output, "Please enter a number.")?,
            }
        }
    }

    fn prompt_credentials(&mut self) -> Result<Option<(String, String)>> {
        let username = match self.prompt("Enter username: ")? {
            Some(username) => username,
            None => return Ok(None),
        };
        let password = match self.prompt("Enter password: ")? {
            Some(password) => password,
            None => return Ok(None),
        };
        Ok(Some((username, password)))
    }

    fn register(&mut self) -> Result<Flow> {
        let (username, password) = match self.prompt_credentials()? {
            Some(credentials) => credentials,
            None => return Ok(Flow::Quit),
        };
        if username.trim().is_empty() {
            writeln!(self.output, "Username must not be empty.")?;
            return Ok(Flow::Continue);
        }
        match self.tracker.register(&username, &password) {
            Ok(()) => writeln!(self.output, "User registered successfully.")?,
            Err(Error::DuplicateUsername(_)) => writeln!(self.output, "Username already exists.")?,
            Err(err) => {
                log::error!("could not register {:?}: {}", username, err);
                writeln!(self.output, "Registration failed.")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn login(&mut self) -> Result<Flow> {
        let (username, password) = match self.prompt_credentials()? {
            Some(credentials) => credentials,
            None => return Ok(Flow::Quit),
        };
        match self.tracker.login(&username, &password) {
            Ok(handle) => self.account_menu(&handle),
            Err(Error::InvalidCredentials) => {
                writeln!(self.output, "Invalid username or password.")?;
                Ok(Flow::Continue)
            }
            Err(err) => {
                log::error!("could not log in {:?}: {}", username, err);
                writeln!(self.output, "Login failed.")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Save failures are reported and logged; the session goes on.
    fn save(&mut self) -> Result<()> {
        match self.tracker.save() {
            Ok(()) => writeln!(self.output, "Data saved successfully.")?,
            Err(err) => {
                log::error!("could not save data: {}", err);
                writeln!(self.output, "Error saving data.")?;
            }
        }
        Ok(())
    }

    fn add_expense(&mut self, handle: &AccountHandle) -> Result<Flow> {
        let date = match self.prompt("Enter date (YYYY-MM-DD, empty for today): ")? {
            Some(line) if line.trim().is_empty() => chrono::Local::now().date_naive(),
            Some(line) => match parser::parse_date(&line) {
                Ok(date) => date,
                Err(err) => {
                    writeln!(self.output, "Invalid input: {}", err)?;
                    return Ok(Flow::Continue);
                }
            },
            None => return Ok(Flow::Quit),
        };
        let category = match self.prompt("Enter category: ")? {
            Some(category) => category.trim().to_string(),
            None => return Ok(Flow::Quit),
        };
        let amount = match self.prompt("Enter amount: ")? {
            Some(line) => match parser::parse_amount(&line) {
                Ok(amount) => amount,
                Err(err) => {
                    writeln!(self.output, "Invalid input: {}", err)?;
                    return Ok(Flow::Continue);
                }
            },
            None => return Ok(Flow::Quit),
        };
        self.tracker.add_expense(handle, date, &category, amount)?;
        writeln!(self.output, "Expense added successfully.")?;
        Ok(Flow::Continue)
    }

    fn list_expenses(&mut self, handle: &AccountHandle) -> Result<Flow> {
        let expenses = self.tracker.list_expenses(handle)?;
        writeln!(self.output, "Expenses for {}:", handle.username())?;
        if expenses.is_empty() {
            writeln!(self.output, "(none)")?;
        }
        for expense in &expenses {
            writeln!(
                self.output,
                "Date: {}, Category: {}, Amount: ${:.2}",
                expense.date(),
                expense.category(),
                expense.amount()
            )?;
        }
        Ok(Flow::Continue)
    }

    fn totals(&mut self, handle: &AccountHandle) -> Result<Flow> {
        let totals = self.tracker.totals_by_category(handle)?;
        writeln!(self.output, "Total Expenses by Category:")?;
        for row in aggregate::sorted_totals(&totals) {
            writeln!(self.output, "{}: ${:.2}", row.category, row.total)?;
        }
        let grand_total: f64 = totals.values().sum();
        writeln!(self.output, "Total: ${:.2}", grand_total)?;
        Ok(Flow::Continue)
    }

    fn export(&mut self, handle: &AccountHandle) -> Result<Flow> {
        let default = snapshot::export_path(self.tracker.snapshot_path(), handle.username());
        let label = format!("Export path (empty for {}): ", default.display());
        let path = match self.prompt(&label)? {
            Some(line) if line.trim().is_empty() => default,
            Some(line) => PathBuf::from(line.trim()),
            None => return Ok(Flow::Quit),
        };
        match self.tracker.export_expenses(handle, &path) {
            Ok(count) => writeln!(
                self.output,
                "Exported {} expense(s) to {}.",
                count,
                path.display()
            )?,
            Err(err) => {
                log::warn!("export to {} failed: {}", path.display(), err);
                writeln!(self.output, "Error exporting expenses: {}", err)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn import(&mut self, handle: &AccountHandle) -> Result<Flow> {
        let path = match self.prompt("Import path: ")? {
            Some(line) => PathBuf::from(line.trim()),
            None => return Ok(Flow::Quit),
        };
        match self.tracker.import_expenses(handle, &path) {
            Ok(count) => writeln!(
                self.output,
                "Imported {} expense(s) from {}.",
                count,
                path.display()
            )?,
            Err(err) => {
                log::warn!("import from {} failed: {}", path.display(), err);
                writeln!(self.output, "Error importing expenses: {}", err)?;
            }
        }
        Ok(Flow::Continue)
    }
}
