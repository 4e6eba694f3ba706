use std::path::PathBuf;

pub const DEFAULT_SNAPSHOT: &str = "expenses.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub snapshot_path: PathBuf,
}

impl Config {
    /// The first argument after the program name, if any, is the snapshot path.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Config {
        let mut args = args.into_iter();
        let _prog_name = args.next();
        let snapshot_path = args
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT));
        Config { snapshot_path }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_snapshot() {
        assert_eq!(Config::from_args(args(&["expense-ledger"])), Config::default());
        assert_eq!(Config::from_args(args(&[])), Config::default());
    }

    #[test]
    fn snapshot_from_first_arg() {
        let config = Config::from_args(args(&["expense-ledger", "/tmp/mine.json", "extra"]));
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/mine.json"));
    }
}
