use chrono::NaiveDate;
use tracing::debug;

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Error, Result};

/// Checks that the command-line argument names an existing regular file.
///
/// # Errors
///
/// Returns [`Error::Usage`] if no argument was given, or
/// [`Error::NotFound`] if it is not the path of a regular file.
pub fn sales_csv(arg: Option<PathBuf>) -> Result<PathBuf> {
    let Some(path) = arg else {
        return Err(Error::Usage);
    };
    if !path.is_file() {
        return Err(Error::NotFound(path));
    }
    Ok(path)
}

/// Creates (if necessary) the directory that holds the order sheets.
///
/// The directory is named `Orders_<YYYY-MM-DD>` after `run_date`, and lives
/// beside the real location of `sales_csv`. Running again on the same day
/// reuses it.
///
/// # Errors
///
/// Returns [`Error::Io`] if `sales_csv` cannot be resolved or the directory
/// cannot be created.
pub fn create_orders_dir(sales_csv: &Path, run_date: NaiveDate) -> Result<PathBuf> {
    let real = fs::canonicalize(sales_csv).map_err(|source| Error::Io {
        path: sales_csv.to_path_buf(),
        source,
    })?;
    let parent = real.parent().unwrap_or(Path::new("/"));
    let orders_dir = parent.join(format!("Orders_{}", run_date.format("%Y-%m-%d")));
    if !orders_dir.is_dir() {
        debug!(dir = %orders_dir.display(), "creating orders directory");
        fs::create_dir_all(&orders_dir).map_err(|source| Error::Io {
            path: orders_dir.clone(),
            source,
        })?;
    }
    Ok(orders_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn sales_csv_fn_requires_an_argument() {
        assert!(matches!(sales_csv(None), Err(Error::Usage)));
    }

    #[test]
    fn sales_csv_fn_rejects_missing_files_and_directories() {
        let result = sales_csv(Some("testdata/bogus.csv".into()));
        assert!(matches!(result, Err(Error::NotFound(_))));
        let result = sales_csv(Some("testdata".into()));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn sales_csv_fn_accepts_existing_file() {
        let path = sales_csv(Some("testdata/sales.csv".into())).unwrap();
        assert_eq!(path, PathBuf::from("testdata/sales.csv"));
    }

    #[test]
    fn create_orders_dir_fn_creates_dated_sibling_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join("sales.csv");
        fs::write(&csv, "ORDER ID\n").unwrap();
        let dir = create_orders_dir(&csv, date()).unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir.file_name().unwrap(), "Orders_2024-03-01");
        assert_eq!(
            dir.parent().unwrap(),
            fs::canonicalize(tmp.path()).unwrap()
        );
    }

    #[test]
    fn create_orders_dir_fn_reuses_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join("sales.csv");
        fs::write(&csv, "ORDER ID\n").unwrap();
        let first = create_orders_dir(&csv, date()).unwrap();
        fs::write(first.join("Order_1.xlsx"), "old").unwrap();
        let second = create_orders_dir(&csv, date()).unwrap();
        assert_eq!(first, second);
        assert!(second.join("Order_1.xlsx").exists());
    }
}
