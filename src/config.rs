use chrono::NaiveDate;

/// Columns removed from every order sheet unless configured otherwise.
pub const DEFAULT_DROP_COLUMNS: [&str; 5] = ["ADDRESS", "CITY", "STATE", "POSTAL CODE", "COUNTRY"];

/// Settings for one run of the pipeline.
///
/// The run date is always supplied by the caller, so that output directory
/// names and workbook metadata never depend on the system clock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Input columns to leave out of the order sheets. Names that do not
    /// appear in the input are ignored.
    pub drop_columns: Vec<String>,
    /// The date stamped on the output directory and on each workbook.
    pub run_date: NaiveDate,
}

impl Config {
    /// Creates a configuration that drops [`DEFAULT_DROP_COLUMNS`].
    #[must_use]
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            drop_columns: DEFAULT_DROP_COLUMNS.map(String::from).to_vec(),
            run_date,
        }
    }

    /// Replaces the drop list.
    #[must_use]
    pub fn with_drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn drops(&self, column: &str) -> bool {
        self.drop_columns.iter().any(|c| c.trim() == column)
    }
}
