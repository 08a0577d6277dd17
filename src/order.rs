use regex::Regex;

use std::{
    collections::HashSet,
    fmt::{self, Display},
    sync::LazyLock,
};

use crate::{
    sales::{Column, ItemNumber, LineItem},
    usd::Usd,
};

/// Label placed in the ITEM PRICE column of the summary row.
pub const GRAND_TOTAL_LABEL: &str = "GRAND TOTAL:";

/// Excel rejects worksheet names longer than this.
const MAX_SHEET_NAME: usize = 31;

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

/// A single value in an order sheet.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Blank,
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Converts a raw CSV field, keeping numbers numeric.
    #[must_use]
    pub fn from_field(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() {
            return Self::Blank;
        }
        if let Ok(n) = field.parse() {
            return Self::Integer(n);
        }
        match field.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(field.to_string()),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.pad(""),
            Self::Integer(n) => f.pad(&n.to_string()),
            Self::Number(n) => f.pad(&n.to_string()),
            Self::Text(s) => f.pad(s),
        }
    }
}

/// All the line items for one order, sorted by item number, with the grand
/// total.
///
/// To get a printable version of the report, use its [`Display`]
/// implementation. To write it as a spreadsheet, use
/// [`crate::xlsx::write_report`].
#[derive(Debug, Clone)]
pub struct OrderReport {
    order_id: String,
    stem: String,
    columns: Vec<Column>,
    items: Vec<LineItem>,
    grand_total: Usd,
}

impl OrderReport {
    /// Builds the report for `order_id`.
    ///
    /// `items` are sorted by item number; the sort is stable, so items with
    /// the same number keep their relative order. The grand total is summed
    /// from the items' exact totals; if it is too large to hold, this
    /// returns `None`.
    #[must_use]
    pub fn new(order_id: String, columns: Vec<Column>, mut items: Vec<LineItem>) -> Option<Self> {
        items.sort_by(|a, b| a.item_number.cmp(&b.item_number));
        let grand_total = Usd::checked_sum(items.iter().map(|item| item.total))?;
        let stem = format!("Order_{}", UNSAFE_NAME_CHARS.replace_all(&order_id, "_"));
        Some(Self {
            order_id,
            stem,
            columns,
            items,
            grand_total,
        })
    }

    #[must_use]
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn grand_total(&self) -> Usd {
        self.grand_total
    }

    /// Returns the file name for this order's spreadsheet, for example
    /// `Order_1001.xlsx`.
    ///
    /// Runs of characters other than ASCII letters, digits, `.`, `_` and `-`
    /// in the order ID are replaced with `_`, so the name is always a single
    /// path component. Different IDs can therefore share a name; use
    /// [`OrderReport::claim_file_name`] to keep them apart.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.xlsx", self.stem)
    }

    /// Returns the worksheet name, which is the file stem cut to Excel's
    /// 31-character limit.
    #[must_use]
    pub fn sheet_name(&self) -> String {
        self.stem.chars().take(MAX_SHEET_NAME).collect()
    }

    /// Makes this report's file name distinct from every name in `taken`,
    /// then adds it to `taken`.
    ///
    /// A clashing name gets the first free suffix `_2`, `_3` and so on.
    /// Names are compared ignoring ASCII case, since `Order_A.xlsx` and
    /// `Order_a.xlsx` are the same file on some filesystems.
    pub fn claim_file_name(&mut self, taken: &mut HashSet<String>) {
        let base = self.stem.clone();
        let mut n = 1;
        while !taken.insert(self.stem.to_ascii_lowercase()) {
            n += 1;
            self.stem = format!("{base}_{n}");
        }
    }

    /// Returns the body of the sheet: one row per line item followed by the
    /// grand total row, each with one cell per column.
    ///
    /// Prices are formatted as currency text.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        let mut rows: Vec<Vec<Cell>> = self
            .items
            .iter()
            .map(|item| self.columns.iter().map(|c| item_cell(item, c)).collect())
            .collect();
        rows.push(
            self.columns
                .iter()
                .map(|column| match column {
                    Column::ItemPrice => Cell::Text(GRAND_TOTAL_LABEL.to_string()),
                    Column::TotalPrice => Cell::Text(self.grand_total.to_string()),
                    _ => Cell::Blank,
                })
                .collect(),
        );
        rows
    }
}

fn item_cell(item: &LineItem, column: &Column) -> Cell {
    match column {
        Column::ItemNumber => match &item.item_number {
            ItemNumber::Number(n) => Cell::Integer(*n),
            ItemNumber::Text(s) => Cell::Text(s.clone()),
        },
        Column::ItemQuantity => Cell::Integer(item.qty),
        Column::ItemPrice => Cell::Text(item.price.to_string()),
        Column::TotalPrice => Cell::Text(item.total.to_string()),
        Column::Extra { index, .. } => item
            .extra
            .get(*index)
            .map_or(Cell::Blank, |field| Cell::from_field(field)),
    }
}

impl Display for OrderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<String>> = self
            .rows()
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                rows.iter()
                    .map(|row| row[i].len())
                    .chain([column.name().len()])
                    .max()
                    .unwrap_or_default()
            })
            .collect();
        writeln!(f, "Order {}", self.order_id)?;
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| format!("{:width$}", column.name()))
            .collect();
        writeln!(f, "{}", header.join("  ").trim_end())?;
        let length = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        writeln!(f, "{:-<length$}", "")?;
        for row in &rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:>width$}"))
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())?;
        }
        Ok(())
    }
}
