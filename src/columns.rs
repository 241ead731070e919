use crate::error::AppError;
use std::collections::HashMap;

pub const DATE: &str = "Date";
pub const STORE: &str = "Store";
pub const CHANNEL: &str = "Channel";
pub const REGION: &str = "Region";
pub const SKU: &str = "SKU";
pub const CATEGORY: &str = "Category";
pub const QUANTITY: &str = "Quantity";
pub const SALES: &str = "Sales";
pub const DISCOUNT: &str = "Discount";
pub const ORDER_ID: &str = "OrderID";
pub const DEPT: &str = "Dept";
pub const RETURN_AMOUNT: &str = "ReturnAmount";
pub const TARGET_SALES: &str = "TargetSales";

/// Columns the sales export must contain. Extra columns are ignored.
pub const REQUIRED: &[&str] = &[
    DATE,
    STORE,
    CHANNEL,
    REGION,
    SKU,
    CATEGORY,
    QUANTITY,
    SALES,
    DISCOUNT,
    ORDER_ID,
    DEPT,
    RETURN_AMOUNT,
    TARGET_SALES,
];

/// Maps column names to their index in a row.
pub struct ColumnMap {
    indices: HashMap<String, usize>,
}

impl ColumnMap {
    /// Header fields are trimmed of surrounding whitespace. If a name repeats,
    /// the first occurrence wins.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut indices = HashMap::new();
        for (i, field) in headers.iter().enumerate() {
            indices.entry(field.trim().to_string()).or_insert(i);
        }
        ColumnMap { indices }
    }

    /// Value of a named column, `None` if the column or the cell is absent.
    pub fn get<'a>(&self, row: &'a [String], col: &str) -> Option<&'a str> {
        self.indices
            .get(col)
            .and_then(|&i| row.get(i))
            .map(String::as_str)
    }

    pub fn has(&self, col: &str) -> bool {
        self.indices.contains_key(col)
    }
}

/// Check that every required column is present.
pub fn validate_columns(col_map: &ColumnMap) -> Result<(), AppError> {
    let missing: Vec<String> = REQUIRED
        .iter()
        .filter(|&&c| !col_map.has(c))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::MissingColumns {
        required: REQUIRED.iter().map(|c| c.to_string()).collect(),
        missing,
    })
}
