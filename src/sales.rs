use serde::Deserialize;
use serde_with::DeserializeFromStr;
use tracing::{debug, warn};

use std::{
    collections::BTreeMap,
    convert::Infallible,
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{order::OrderReport, usd::Usd, Config, Error, Result};

pub const ORDER_ID: &str = "ORDER ID";
pub const ITEM_NUMBER: &str = "ITEM NUMBER";
pub const ITEM_QUANTITY: &str = "ITEM QUANTITY";
pub const ITEM_PRICE: &str = "ITEM PRICE";
pub const TOTAL_PRICE: &str = "TOTAL PRICE";

const REQUIRED: [&str; 4] = [ORDER_ID, ITEM_NUMBER, ITEM_QUANTITY, ITEM_PRICE];

/// An identifier read from the sales table, such as an order ID or item
/// number.
///
/// Values that parse as integers are stored as numbers, so `01` and `1` are
/// the same key. Numbers compare numerically, and sort before any values
/// that aren't numbers, which compare as text.
#[derive(Clone, Debug, DeserializeFromStr, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Key {
    Number(i64),
    Text(String),
}

/// Identifies a product within an order.
pub type ItemNumber = Key;

/// Identifies the order a line item belongs to.
pub type OrderId = Key;

impl FromStr for Key {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse().map_or_else(|_| Self::Text(s.to_string()), Self::Number))
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => Display::fmt(n, f),
            Self::Text(s) => f.pad(s),
        }
    }
}

/// One column of an order sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Column {
    ItemNumber,
    ItemQuantity,
    ItemPrice,
    TotalPrice,
    /// An input column copied through unchanged. `index` is its position in
    /// [`LineItem::extra`].
    Extra { name: String, index: usize },
}

impl Column {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ItemNumber => ITEM_NUMBER,
            Self::ItemQuantity => ITEM_QUANTITY,
            Self::ItemPrice => ITEM_PRICE,
            Self::TotalPrice => TOTAL_PRICE,
            Self::Extra { name, .. } => name,
        }
    }
}

/// One product entry within an order, with its computed total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItem {
    pub item_number: ItemNumber,
    pub qty: i64,
    pub price: Usd,
    pub total: Usd,
    /// Values of the pass-through columns, in sheet order.
    pub extra: Vec<String>,
}

impl LineItem {
    /// Creates a line item with TOTAL PRICE `qty * price`, or returns `None`
    /// if that total is too large to hold.
    #[must_use]
    pub fn new(item_number: ItemNumber, qty: i64, price: Usd) -> Option<Self> {
        Some(Self {
            item_number,
            qty,
            price,
            total: price.checked_mul(qty)?,
            extra: Vec::new(),
        })
    }
}

/// Defines the CSV fields every sales table must have.
#[derive(Debug, Deserialize)]
struct Record {
    #[serde(rename = "ORDER ID")]
    order_id: OrderId,
    #[serde(rename = "ITEM NUMBER")]
    item_number: ItemNumber,
    #[serde(rename = "ITEM QUANTITY")]
    qty: i64,
    #[serde(rename = "ITEM PRICE")]
    price: Usd,
}

#[derive(Debug)]
struct SalesRow {
    order_id: OrderId,
    item: LineItem,
}

/// Holds a sales table after the TOTAL PRICE column has been computed and
/// unwanted columns dropped.
///
/// To load one, use [`SalesTable::read_csv`]. To split it into orders, use
/// [`SalesTable::into_orders`].
#[derive(Debug)]
pub struct SalesTable {
    path: PathBuf,
    columns: Vec<Column>,
    rows: Vec<SalesRow>,
}

impl SalesTable {
    /// Reads sales data from the CSV file at `path`.
    ///
    /// Headers and fields are trimmed of surrounding whitespace. Columns
    /// named in `config`'s drop list are left out; the four required columns
    /// and TOTAL PRICE are always kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if a required column is missing,
    /// [`Error::Csv`] if the file cannot be read or a field cannot be parsed,
    /// and [`Error::Overflow`] if a TOTAL PRICE is too large.
    pub fn read_csv(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let csv_err = |source| Error::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_err)?;
        let headers = rdr.headers().map_err(csv_err)?.clone();
        let missing: Vec<String> = REQUIRED
            .iter()
            .filter(|name| !headers.iter().any(|h| h == **name))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(Error::Schema {
                path: path.to_path_buf(),
                missing,
            });
        }
        let (columns, sources) = layout(&headers, config);
        debug!(
            columns = ?columns.iter().map(Column::name).collect::<Vec<_>>(),
            "sheet layout"
        );
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(csv_err)?;
            let parsed: Record = record.deserialize(Some(&headers)).map_err(csv_err)?;
            let mut item = LineItem::new(parsed.item_number, parsed.qty, parsed.price)
                .ok_or_else(|| Error::Overflow {
                    path: path.to_path_buf(),
                    what: format!(
                        "TOTAL PRICE on line {}",
                        record.position().map_or(0, csv::Position::line)
                    ),
                })?;
            item.extra = sources
                .iter()
                .map(|&i| record.get(i).unwrap_or_default().to_string())
                .collect();
            rows.push(SalesRow {
                order_id: parsed.order_id,
                item,
            });
        }
        debug!(rows = rows.len(), path = %path.display(), "read sales data");
        Ok(Self {
            path: path.to_path_buf(),
            columns,
            rows,
        })
    }

    /// Returns the columns of every order sheet, in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the number of line items in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Splits the table into one report per distinct ORDER ID, in ascending
    /// order of ID (see [`Key`] for how IDs compare).
    ///
    /// Every line item ends up in exactly one report. Each report owns its
    /// items; nothing is shared between them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Overflow`] if an order's grand total is too large.
    pub fn into_orders(self) -> Result<Vec<OrderReport>> {
        let mut groups: BTreeMap<OrderId, Vec<LineItem>> = BTreeMap::new();
        for row in self.rows {
            groups.entry(row.order_id).or_default().push(row.item);
        }
        groups
            .into_iter()
            .map(|(order_id, items)| {
                let order_id = order_id.to_string();
                OrderReport::new(order_id.clone(), self.columns.clone(), items).ok_or_else(|| {
                    Error::Overflow {
                        path: self.path.clone(),
                        what: format!("GRAND TOTAL of order {order_id}"),
                    }
                })
            })
            .collect()
    }
}

/// Works out the sheet columns from the CSV headers, along with the CSV
/// index of each pass-through column.
fn layout(headers: &csv::StringRecord, config: &Config) -> (Vec<Column>, Vec<usize>) {
    let mut columns = Vec::new();
    let mut sources = Vec::new();
    let mut has_total = false;
    for (i, name) in headers.iter().enumerate() {
        let fixed = match name {
            ORDER_ID => continue,
            ITEM_NUMBER => Some(Column::ItemNumber),
            ITEM_QUANTITY => Some(Column::ItemQuantity),
            ITEM_PRICE => Some(Column::ItemPrice),
            TOTAL_PRICE => Some(Column::TotalPrice),
            _ => None,
        };
        match fixed {
            Some(column) => {
                if config.drops(name) {
                    warn!(column = name, "required column can't be dropped");
                }
                has_total |= column == Column::TotalPrice;
                columns.push(column);
            }
            None if config.drops(name) => {}
            None => {
                columns.push(Column::Extra {
                    name: name.to_string(),
                    index: sources.len(),
                });
                sources.push(i);
            }
        }
    }
    if !has_total {
        columns.push(Column::TotalPrice);
    }
    (columns, sources)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn config() -> Config {
        Config::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    fn names(columns: &[Column]) -> Vec<&str> {
        columns.iter().map(Column::name).collect()
    }

    #[test]
    fn item_number_fn_orders_numbers_before_text() {
        let mut items: Vec<ItemNumber> = ["10", "B2", "2", "A1", " 1 "]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        items.sort();
        let shown: Vec<String> = items.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["1", "2", "10", "A1", "B2"]);
    }

    #[test]
    fn read_csv_fn_computes_totals_and_drops_address_columns() {
        let table = SalesTable::read_csv("testdata/sales.csv", &config()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            names(table.columns()),
            vec![
                "ITEM NUMBER",
                "PRODUCT LINE",
                "ITEM QUANTITY",
                "ITEM PRICE",
                "CUSTOMER NAME",
                "TOTAL PRICE",
            ]
        );
        let totals: Vec<String> = table.rows.iter().map(|r| r.item.total.to_string()).collect();
        assert_eq!(totals, vec!["$3.50", "$9.00", "$10.00"]);
        assert_eq!(
            table.rows[1].item.extra,
            vec!["Motorcycles", "Reims Collectables"]
        );
    }

    #[test]
    fn read_csv_fn_tolerates_absent_optional_columns() {
        let table = SalesTable::read_csv("testdata/minimal.csv", &config()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(
            names(table.columns()),
            vec!["ITEM NUMBER", "ITEM QUANTITY", "ITEM PRICE", "TOTAL PRICE"]
        );
    }

    #[test]
    fn read_csv_fn_keeps_every_column_with_empty_drop_list() {
        let config = config().with_drop_columns(Vec::<String>::new());
        let table = SalesTable::read_csv("testdata/sales.csv", &config).unwrap();
        assert_eq!(table.columns().len(), 11);
        assert_eq!(table.columns().last(), Some(&Column::TotalPrice));
    }

    #[test]
    fn read_csv_fn_never_drops_required_columns() {
        let config = config().with_drop_columns(["ITEM PRICE", "CUSTOMER NAME"]);
        let table = SalesTable::read_csv("testdata/sales.csv", &config).unwrap();
        let columns = names(table.columns());
        assert!(columns.contains(&"ITEM PRICE"));
        assert!(!columns.contains(&"CUSTOMER NAME"));
    }

    #[test]
    fn read_csv_fn_replaces_existing_total_price_in_place() {
        let table = SalesTable::read_csv("testdata/with_total.csv", &config()).unwrap();
        assert_eq!(
            names(table.columns()),
            vec!["ITEM NUMBER", "ITEM QUANTITY", "ITEM PRICE", "TOTAL PRICE", "NOTE"]
        );
        assert_eq!(table.rows[0].item.total, Usd::from_cents(1000));
    }

    #[test]
    fn read_csv_fn_reports_every_missing_required_column() {
        let err = SalesTable::read_csv("testdata/no_price.csv", &config()).unwrap_err();
        match err {
            Error::Schema { missing, .. } => assert_eq!(missing, vec!["ITEM PRICE"]),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn read_csv_fn_checks_schema_of_empty_tables() {
        let table = SalesTable::read_csv("testdata/empty.csv", &config()).unwrap();
        assert!(table.is_empty());
        assert!(table.into_orders().unwrap().is_empty());
        let err = SalesTable::read_csv("testdata/empty_no_qty.csv", &config()).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn read_csv_fn_returns_error_for_bad_price() {
        let err = SalesTable::read_csv("testdata/bad_price.csv", &config()).unwrap_err();
        assert!(matches!(err, Error::Csv { .. }), "{err}");
    }

    #[test]
    fn into_orders_fn_puts_every_row_in_exactly_one_order() {
        let table = SalesTable::read_csv("testdata/ties.csv", &config()).unwrap();
        let total_rows = table.len();
        let orders = table.into_orders().unwrap();
        let ids: Vec<&str> = orders.iter().map(OrderReport::order_id).collect();
        assert_eq!(ids, vec!["A-7", "B/8", "C 9"]);
        let grouped: usize = orders.iter().map(|o| o.items().len()).sum();
        assert_eq!(grouped, total_rows);
    }

    #[test]
    fn into_orders_fn_merges_order_ids_with_same_number() {
        let table = SalesTable::read_csv("testdata/padded_ids.csv", &config()).unwrap();
        let orders = table.into_orders().unwrap();
        let ids: Vec<&str> = orders.iter().map(OrderReport::order_id).collect();
        assert_eq!(ids, vec!["2", "10", "X1"]);
        assert_eq!(orders[0].items().len(), 2);
        assert_eq!(orders[0].grand_total(), Usd::from_cents(700));
    }

    #[test]
    fn read_csv_fn_returns_error_when_line_total_overflows() {
        let err = SalesTable::read_csv("testdata/huge_qty.csv", &config()).unwrap_err();
        match err {
            Error::Overflow { what, .. } => assert_eq!(what, "TOTAL PRICE on line 2"),
            other => panic!("expected overflow error, got {other:?}"),
        }
    }

    #[test]
    fn into_orders_fn_returns_error_when_grand_total_overflows() {
        let table = SalesTable::read_csv("testdata/huge_total.csv", &config()).unwrap();
        let err = table.into_orders().unwrap_err();
        match err {
            Error::Overflow { what, .. } => assert_eq!(what, "GRAND TOTAL of order 1"),
            other => panic!("expected overflow error, got {other:?}"),
        }
    }
}
