//! These structs provide the CLI interface for the expense CLI.

use crate::model::{Amount, Category, ExpenseId, DEFAULT_NAME};
use crate::store::{Query, SortKey};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expense: A command-line tool for tracking personal and business expenses.
///
/// Expenses are kept in a JSON snapshot inside the expense home directory. Add an expense with a
/// name, a category and an amount, list them grouped by category, and remove the ones you no
/// longer want.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the expense home directory and its configuration file.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/expenses; pass --expense-home or set EXPENSE_HOME to put it somewhere else.
    Init,
    /// Add an expense.
    Add(AddArgs),
    /// List expenses in sections, one per category.
    List(ListArgs),
    /// Count the expenses in a category.
    Count(CountArgs),
    /// Remove expenses by id, or by their position in a list.
    Remove(RemoveArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where expenses and configuration are held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSE_HOME", default_value_t = default_expense_home())]
    expense_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expense_home: PathBuf) -> Self {
        Self {
            log_level,
            expense_home: expense_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expense_home(&self) -> &DisplayPath {
        &self.expense_home
    }
}

/// Args for the `expense add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The name of the expense.
    #[arg(long, default_value = DEFAULT_NAME)]
    name: String,

    /// The category of the expense. Defaults to the first category in the config file.
    #[arg(long)]
    category: Option<Category>,

    /// The amount, e.g. 4.50, $4.50 or -$1,000.00. Defaults to zero.
    #[arg(long, default_value_t = Amount::ZERO, allow_hyphen_values = true)]
    amount: Amount,
}

impl AddArgs {
    pub fn new(name: impl Into<String>, category: Option<Category>, amount: Amount) -> Self {
        Self {
            name: name.into(),
            category,
            amount,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// The filter and sort options shared by `list` and `remove`.
#[derive(Debug, Parser, Clone, Default)]
pub struct ViewArgs {
    /// Only include this category. Repeat to include several. Defaults to every category in the
    /// config file.
    #[arg(long = "category")]
    categories: Vec<Category>,

    /// The field to sort by.
    #[arg(long, value_enum, default_value_t = SortKey::Name)]
    sort: SortKey,

    /// Sort from largest to smallest instead.
    #[arg(long)]
    descending: bool,
}

impl ViewArgs {
    pub fn new(categories: Vec<Category>, sort: SortKey, descending: bool) -> Self {
        Self {
            categories,
            sort,
            descending,
        }
    }

    /// The categories to show, in section order: `defaults` when none were requested, otherwise
    /// the requested ones that appear in `defaults` in that order, followed by the rest in the
    /// order requested. Duplicates are dropped.
    pub fn categories_or(&self, defaults: &[Category]) -> Vec<Category> {
        if self.categories.is_empty() {
            return defaults.to_vec();
        }
        let configured = defaults.iter().filter(|c| self.categories.contains(c));
        let others = self.categories.iter().filter(|c| !defaults.contains(c));
        let mut categories: Vec<Category> = Vec::new();
        for category in configured.chain(others) {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        categories
    }

    /// Builds the store query for a single category section.
    pub fn query_for(&self, category: &Category) -> Query {
        Query::new([category.clone()], self.sort, !self.descending)
    }
}

/// How `expense list` writes its output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    /// One table per category section.
    #[default]
    Table,
    /// A JSON array of sections.
    Json,
    /// CSV rows with a category column.
    Csv,
}

serde_plain::derive_display_from_serialize!(ListFormat);
serde_plain::derive_fromstr_from_deserialize!(ListFormat);

/// Args for the `expense list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[clap(flatten)]
    view: ViewArgs,

    /// The output format.
    #[arg(long, value_enum, default_value_t = ListFormat::Table)]
    format: ListFormat,
}

impl ListArgs {
    pub fn new(view: ViewArgs, format: ListFormat) -> Self {
        Self { view, format }
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }

    pub fn format(&self) -> ListFormat {
        self.format
    }
}

/// Args for the `expense count` command.
#[derive(Debug, Parser, Clone)]
pub struct CountArgs {
    /// The category to count.
    category: Category,
}

impl CountArgs {
    pub fn new(category: Category) -> Self {
        Self { category }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }
}

/// Args for the `expense remove` command.
///
/// Offsets refer to the rows of a category section exactly as `expense list` shows them with the
/// same --sort and --descending options, counting from zero.
#[derive(Debug, Parser, Clone)]
pub struct RemoveArgs {
    /// The ids of the expenses to remove.
    ids: Vec<ExpenseId>,

    /// A row number, counting from zero, within the section of --category. Repeat to remove
    /// several rows. Requires exactly one --category.
    #[arg(long = "offset")]
    offsets: Vec<usize>,

    #[clap(flatten)]
    view: ViewArgs,
}

impl RemoveArgs {
    pub fn new(ids: Vec<ExpenseId>, offsets: Vec<usize>, view: ViewArgs) -> Self {
        Self { ids, offsets, view }
    }

    pub fn ids(&self) -> &[ExpenseId] {
        &self.ids
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn view(&self) -> &ViewArgs {
        &self.view
    }
}

fn default_expense_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expense-home or EXPENSE_HOME instead of relying on the \
                default expense home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_defaults() {
        let args = Args::try_parse_from(["expense", "--expense-home", "/tmp/x", "add"]).unwrap();
        match args.command() {
            Command::Add(add) => {
                assert_eq!(add.name(), "Expense Name");
                assert!(add.category().is_none());
                assert!(add.amount().is_zero());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(args.common().expense_home().path(), Path::new("/tmp/x"));
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_parse_add_negative_amount() {
        let args = Args::try_parse_from([
            "expense", "add", "--name", "Refund", "--category", "Personal", "--amount", "-$12.50",
        ])
        .unwrap();
        let Command::Add(add) = args.command() else {
            panic!("expected add")
        };
        assert_eq!(add.category(), Some(&Category::personal()));
        assert_eq!(add.amount(), "-12.5".parse::<Amount>().unwrap());
    }

    #[test]
    fn test_parse_list() {
        let args = Args::try_parse_from([
            "expense",
            "list",
            "--category",
            "Travel",
            "--category",
            "Personal",
            "--category",
            "Business",
            "--category",
            "Personal",
            "--sort",
            "amount",
            "--descending",
            "--format",
            "csv",
        ])
        .unwrap();
        let Command::List(list) = args.command() else {
            panic!("expected list")
        };
        assert_eq!(list.format(), ListFormat::Csv);
        assert_eq!(
            list.view().categories_or(&Category::defaults()),
            vec![
                Category::business(),
                Category::personal(),
                Category::new("Travel")
            ]
        );
        let query = list.view().query_for(&Category::personal());
        assert_eq!(query.sort(), SortKey::Amount);
        assert!(!query.ascending());
    }

    #[test]
    fn test_view_defaults_to_configured_categories() {
        let view = ViewArgs::default();
        assert_eq!(view.categories_or(&Category::defaults()), Category::defaults());
    }

    #[test]
    fn test_parse_remove() {
        let id = ExpenseId::generate();
        let id_string = id.to_string();
        let args = Args::try_parse_from([
            "expense",
            "remove",
            id_string.as_str(),
            "--offset",
            "2",
            "--category",
            "Business",
        ])
        .unwrap();
        let Command::Remove(remove) = args.command() else {
            panic!("expected remove")
        };
        assert_eq!(remove.ids(), &[id]);
        assert_eq!(remove.offsets(), &[2]);
    }

    #[test]
    fn test_parse_remove_bad_id() {
        assert!(Args::try_parse_from(["expense", "remove", "not-a-uuid"]).is_err());
    }
}
