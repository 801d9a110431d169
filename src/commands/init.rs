use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its backups subdirectory, and an initial `config.json` file with
/// default settings.
///
/// # Arguments
/// - `expense_home` - The directory that will be the root of data directory, e.g. `$HOME/expenses`
///
/// # Errors
/// - Returns an error if any file operations fail, or if the directory is already set up.
pub async fn init(expense_home: &Path) -> Result<Out<()>> {
    let config = Config::create(expense_home)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the expense directory at {}",
        config.root().display()
    )
    .into())
}
