//! # Catalog Import
//!
//! Reads products pasted into the import box as `name,stock,price` rows.
//!
//! Import is permissive: a bad row never aborts the batch. Rows with fewer
//! than three fields, an empty name, or a stock or price that fails form
//! validation are skipped and counted. Blank lines are ignored. Extra fields
//! after the price are ignored too.
//!
//! ```text
//! Coffee Beans, 12, 18.90     ──► imported
//! Tea,3                       ──► skipped (2 fields)
//! Mug, lots, 9.00             ──► skipped (stock)
//! Name,Stock,Price            ──► skipped (a header row is just a bad row)
//! ```

use serde::Serialize;
use tracing::debug;

use crate::types::Product;
use crate::validation::ProductInput;

/// What came out of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// New products, each with a fresh id, in input order.
    pub products: Vec<Product>,
    pub imported: usize,
    pub skipped: usize,
}

/// Parses delimited text into new products.
///
/// ## Example
/// ```rust
/// use tillbook_core::import::import_products;
///
/// let report = import_products("Coffee,10,4.50\nbroken row\nTea,5,2");
/// assert_eq!(report.imported, 2);
/// assert_eq!(report.skipped, 1);
/// assert_eq!(report.products[1].name, "Tea");
/// ```
pub fn import_products(text: &str) -> ImportReport {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut report = ImportReport::default();

    for (row, record) in reader.records().enumerate() {
        let product = record
            .ok()
            .filter(|r| r.len() >= 3)
            .and_then(|r| ProductInput::parse(&r[0], &r[1], &r[2]).ok())
            .map(|input| Product::new(input.name, input.stock, input.price));

        match product {
            Some(product) => report.products.push(product),
            None => {
                debug!(row = row + 1, "Skipping malformed import row");
                report.skipped += 1;
            }
        }
    }

    report.imported = report.products.len();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_import_valid_rows() {
        let report = import_products("Coffee Beans, 12, 18.90\nMug,0,9\n");

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.products[0].name, "Coffee Beans");
        assert_eq!(report.products[0].stock, 12);
        assert_eq!(report.products[0].price, Money::from_cents(1890));
        assert_ne!(report.products[0].id, report.products[1].id);
    }

    #[test]
    fn test_import_skips_malformed_rows() {
        let text = "\
Name,Stock,Price
Tea,3
Mug,lots,9.00
Cup,-1,2.00
Plate,2,-3
,4,1.00

Spoon,7,0.50,extra";

        let report = import_products(text);

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 6);
        assert_eq!(report.products[0].name, "Spoon");
    }

    #[test]
    fn test_import_quoted_names() {
        let report = import_products("\"Beans, dark roast\",4,12.00");
        assert_eq!(report.imported, 1);
        assert_eq!(report.products[0].name, "Beans, dark roast");
    }

    #[test]
    fn test_import_empty_text() {
        assert_eq!(import_products(""), ImportReport::default());
        assert_eq!(import_products("   \n\n").imported, 0);
    }
}
