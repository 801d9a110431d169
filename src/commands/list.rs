//! The list command: expenses grouped into one section per category.

use crate::args::{ListArgs, ListFormat, ViewArgs};
use crate::commands::{open_store, plural, Out};
use crate::model::{Amount, Category, ExpenseId, ExpenseRecord};
use crate::store::ExpenseStore;
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Write;

/// The expenses of one category, in the requested order.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    category: Category,
    title: String,
    expenses: Vec<ExpenseRecord>,
}

impl Section {
    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn expenses(&self) -> &[ExpenseRecord] {
        &self.expenses
    }
}

/// Lists expenses in sections, one per requested category. Configured categories come first in
/// their configured order, then any others in the order requested. Categories without expenses
/// get no section.
pub fn list(config: &Config, args: ListArgs) -> Result<Out<Vec<Section>>> {
    let store = open_store(config);
    let sections = sections(&store, args.view(), config.categories());
    let message = match args.format() {
        ListFormat::Table => render_table(&sections),
        ListFormat::Json => {
            serde_json::to_string_pretty(&sections).context("Unable to serialize expenses")?
        }
        ListFormat::Csv => render_csv(&sections)?,
    };
    Ok(Out::new(message, sections))
}

fn sections(store: &ExpenseStore, view: &ViewArgs, defaults: &[Category]) -> Vec<Section> {
    view.categories_or(defaults)
        .into_iter()
        .filter(|category| store.count_by_category(category.as_str()) > 0)
        .map(|category| Section {
            title: category.section_title(),
            expenses: store.query(&view.query_for(&category)).to_vec(),
            category,
        })
        .collect()
}

fn render_table(sections: &[Section]) -> String {
    if sections.is_empty() {
        return String::from("No expenses");
    }
    let mut s = String::new();
    for section in sections {
        // Writing to a String cannot fail
        let _ = writeln!(s, "\n## {} ({})\n", section.title, plural(section.expenses.len()));
        let _ = writeln!(s, "| # | Name | Amount | ID |");
        let _ = writeln!(s, "|---|------|--------|----|");
        for (offset, expense) in section.expenses.iter().enumerate() {
            let _ = writeln!(
                s,
                "| {offset} | {} | {} | {} |",
                expense.name().replace('|', "\\|"),
                expense.amount(),
                expense.id()
            );
        }
    }
    s
}

#[derive(Serialize)]
struct CsvRow<'a> {
    category: &'a str,
    id: ExpenseId,
    name: &'a str,
    amount: Amount,
}

fn render_csv(sections: &[Section]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for section in sections {
        for expense in &section.expenses {
            wtr.serialize(CsvRow {
                category: section.category.as_str(),
                id: expense.id(),
                name: expense.name(),
                amount: expense.amount(),
            })
            .context("Unable to write CSV row")?;
        }
    }
    if sections.is_empty() {
        wtr.write_record(["category", "id", "name", "amount"])
            .context("Unable to write CSV header")?;
    }
    let bytes = wtr.into_inner().context("Unable to finish writing CSV")?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}
