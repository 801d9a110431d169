use crate::args::CountArgs;
use crate::commands::{open_store, plural, Out};
use crate::{Config, Result};

/// Counts the expenses in one category.
pub fn count(config: &Config, args: CountArgs) -> Result<Out<usize>> {
    let store = open_store(config);
    let count = store.count_by_category(args.category().as_str());
    Ok(Out::new(
        format!("{} in {}", plural(count), args.category()),
        count,
    ))
}
