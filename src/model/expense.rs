use crate::model::{Amount, Category};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// The name given to a new expense when the add form is submitted without changing it.
pub const DEFAULT_NAME: &str = "Expense Name";

/// Opaque identifier of an expense. Generated once when the record is created and never reused.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ExpenseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for ExpenseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A single expense entry.
///
/// Records are immutable once created. Neither `name` nor `amount` is validated: an empty name
/// and zero or negative amounts are all accepted.
///
/// In the snapshot the category is written under the key `type`:
/// ```json
/// { "id": "0d5c7f0e-8a55-4c4b-9f5e-0b8f3c1a2d4e", "name": "Coffee", "type": "Personal", "amount": 4.5 }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ExpenseRecord {
    id: ExpenseId,
    name: String,
    #[serde(rename = "type")]
    category: Category,
    amount: Amount,
}

impl ExpenseRecord {
    /// Creates a record with a freshly generated id.
    pub fn new(name: impl Into<String>, category: impl Into<Category>, amount: Amount) -> Self {
        Self {
            id: ExpenseId::generate(),
            name: name.into(),
            category: category.into(),
            amount,
        }
    }

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

impl Default for ExpenseRecord {
    /// What the add form holds before the user touches it.
    fn default() -> Self {
        Self::new(DEFAULT_NAME, Category::default(), Amount::ZERO)
    }
}
