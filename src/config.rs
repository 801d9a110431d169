//! Configuration file handling for the expense tracker.
//!
//! The configuration file is stored at `$EXPENSE_HOME/config.json` and contains the location of
//! the expenses snapshot, the categories offered when adding an expense, and backup settings.

use crate::backup::Backup;
use crate::model::Category;
use crate::store::{ExpenseStore, FileSnapshot};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "expense";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const EXPENSES_JSON: &str = "expenses.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSE_HOME` and from there it loads `$EXPENSE_HOME/config.json`. It provides
/// the paths of the snapshot and backups, and the settings the commands need.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its backups subdirectory, and an initial `config.json` with
    /// default settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/expenses`
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    /// - Returns an error if a config file already exists in `dir`.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expense home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `expense_home` exists and that the config file exists
    /// - load and validate the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(expense_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = expense_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Expense home is missing, run 'expense init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The categories offered when adding an expense, in display order. Never empty.
    pub fn categories(&self) -> &[Category] {
        &self.config_file.categories
    }

    /// The category a new expense gets when none is given: the first configured category.
    pub fn default_category(&self) -> Category {
        self.categories().first().cloned().unwrap_or_default()
    }

    /// Returns the stored `snapshot_file` if it is absolute, otherwise resolves it against the
    /// expense home.
    pub fn snapshot_path(&self) -> PathBuf {
        let p = self.config_file.snapshot_file();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(&self.backups, self.backup_copies())
    }

    /// Opens the expense store on the configured snapshot file.
    pub fn open_store(&self) -> ExpenseStore {
        let path = self.snapshot_path();
        debug!("Opening the expense store at {}", path.display());
        ExpenseStore::load(FileSnapshot::new(path).with_backup(self.backup()))
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expense",
///   "config_version": 1,
///   "backup_copies": 5,
///   "categories": ["Business", "Personal"],
///   "snapshot_file": "expenses.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expense"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep
    backup_copies: u32,

    /// Categories offered by `add`, the first one being the default
    #[serde(default = "Category::defaults")]
    categories: Vec<Category>,

    /// Path to the expenses snapshot (optional, relative to config.json or absolute)
    /// Defaults to $EXPENSE_HOME/expenses.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot_file: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            categories: Category::defaults(),
            snapshot_file: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or holds invalid settings
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            !config.categories.is_empty(),
            "The config file at {} must list at least one category",
            path.display()
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the snapshot path. If None, defaults to `expenses.json`.
    pub fn snapshot_file(&self) -> PathBuf {
        self.snapshot_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(EXPENSES_JSON))
    }
}
