use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The label used for grouping, filtering and counting expenses.
///
/// The set of categories is open: the store accepts any label. `Business` and `Personal` are the
/// labels offered by the add form out of the box.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

pub(crate) const BUSINESS_STR: &str = "Business";
pub(crate) const PERSONAL_STR: &str = "Personal";

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn business() -> Self {
        Self::new(BUSINESS_STR)
    }

    pub fn personal() -> Self {
        Self::new(PERSONAL_STR)
    }

    /// The categories offered when nothing else has been configured, in display order.
    pub fn defaults() -> Vec<Category> {
        vec![Self::business(), Self::personal()]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The header used when a list of expenses is grouped into sections, e.g. `Business expenses`.
    pub fn section_title(&self) -> String {
        format!("{} expenses", self.0)
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::business()
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Category {
    fn borrow(&self) -> &str {
        &self.0
    }
}
