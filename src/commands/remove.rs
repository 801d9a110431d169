use crate::args::RemoveArgs;
use crate::commands::{open_store, plural, Out};
use crate::model::ExpenseRecord;
use crate::{Config, Result};
use anyhow::bail;

/// Removes expenses by id and by row offset, in one batch.
///
/// Offsets are resolved against the section `expense list` would show for the single requested
/// category with the same sort options. Ids and offsets that match nothing are ignored. The
/// removed records are returned as the structured output.
pub fn remove(config: &Config, args: RemoveArgs) -> Result<Out<Vec<ExpenseRecord>>> {
    let mut store = open_store(config);

    let mut ids = args.ids().to_vec();
    if !args.offsets().is_empty() {
        let categories = args.view().categories_or(&[]);
        let [category] = categories.as_slice() else {
            bail!("Removing by --offset requires exactly one --category")
        };
        let query = args.view().query_for(category);
        ids.extend(store.query(&query).ids_at(args.offsets().iter().copied()));
    }

    let removed = store.remove(&ids);
    Ok(Out::new(format!("Removed {}", plural(removed.len())), removed))
}
