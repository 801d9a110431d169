use crate::args::AddArgs;
use crate::commands::{open_store, Out};
use crate::model::ExpenseRecord;
use crate::{Config, Result};

/// Adds an expense and saves the snapshot.
///
/// When no category is given the first configured category is used. The new record, including
/// its generated id, is returned as the structured output.
pub fn add(config: &Config, args: AddArgs) -> Result<Out<ExpenseRecord>> {
    let category = args
        .category()
        .cloned()
        .unwrap_or_else(|| config.default_category());
    let record = ExpenseRecord::new(args.name(), category, args.amount());

    let mut store = open_store(config);
    let id = store.add(record.clone());

    let message = format!(
        "Added '{}' ({}, {}) with ID: {id}",
        record.name(),
        record.category(),
        record.amount()
    );
    Ok(Out::new(message, record))
}
