use crate::columns::{self, validate_columns, ColumnMap};
use crate::config::{CleaningPolicy, DateErrorPolicy};
use crate::error::AppError;
use crate::period::PeriodKey;
use crate::types::{RawTable, SalesRecord};
use crate::util::{non_blank, parse_date_safe, parse_f64_safe};
use calamine::{open_workbook_auto, Data, Reader};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub date_errors: usize,
    pub quality_drops: usize,
}

/// Read, validate and clean the sales export at `path`.
pub fn load_and_clean(
    path: &Path,
    policy: &CleaningPolicy,
) -> Result<(Vec<SalesRecord>, LoadReport), AppError> {
    let table = read_table(path)?;
    info!(
        path = %path.display(),
        rows = table.rows.len(),
        columns = table.headers.len(),
        "read input table"
    );
    normalize(&table, policy)
}

/// Pick a reader from the file extension.
pub fn read_table(path: &Path) -> Result<RawTable, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => read_csv_table(std::fs::File::open(path)?),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook_table(path),
        _ => Err(AppError::UnsupportedFormat(path.display().to_string())),
    }
}

/// CSV with a header row. Fields are decoded as UTF-8; invalid bytes (for
/// example a Latin-1 export) become U+FFFD instead of failing the load.
pub fn read_csv_table<R: Read>(reader: R) -> Result<RawTable, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr.byte_headers()?.iter().map(lossy_field).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::EmptyFile);
    }
    let mut rows = Vec::new();
    let mut lossy_rows = 0usize;
    for result in rdr.byte_records() {
        let record = result?;
        if std::str::from_utf8(record.as_slice()).is_err() {
            lossy_rows += 1;
        }
        rows.push(record.iter().map(lossy_field).collect());
    }
    if lossy_rows > 0 {
        warn!(rows = lossy_rows, "replaced invalid UTF-8 bytes in csv rows");
    }
    Ok(RawTable { headers, rows })
}

fn lossy_field(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// First worksheet of an Excel/ODS workbook; the first row is the header.
pub fn read_workbook_table(path: &Path) -> Result<RawTable, AppError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();
    let Some(first) = sheet_names.first() else {
        return Err(AppError::EmptyFile);
    };
    debug!(sheet = %first, sheets = sheet_names.len(), "reading worksheet");
    let range = workbook.worksheet_range(first)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(cell_to_string).collect(),
        None => return Err(AppError::EmptyFile),
    };
    let rows = rows
        .map(|r| r.iter().map(cell_to_string).collect::<Vec<String>>())
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
        .collect();
    Ok(RawTable { headers, rows })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        // Integral floats print without ".0" so ids like 1001.0 stay "1001".
        Data::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => match v.as_datetime() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => v.to_string(),
        },
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// Validate the schema, coerce types and apply the cleaning policy.
///
/// Rows with an unparseable date are dropped or abort the load depending on
/// `policy.date_errors`. With `drop_non_positive`, rows whose Sales or
/// Quantity is absent or `<= 0` are dropped; otherwise absent values become 0.
pub fn normalize(
    table: &RawTable,
    policy: &CleaningPolicy,
) -> Result<(Vec<SalesRecord>, LoadReport), AppError> {
    if table.headers.is_empty() {
        return Err(AppError::EmptyFile);
    }
    let col_map = ColumnMap::from_headers(&table.headers);
    validate_columns(&col_map)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut date_errors = 0usize;
    let mut quality_drops = 0usize;

    for (idx, row) in table.rows.iter().enumerate() {
        let text = |col: &str| col_map.get(row, col).map(str::trim).unwrap_or("").to_string();
        let number = |col: &str| parse_f64_safe(col_map.get(row, col));

        let raw_date = col_map.get(row, columns::DATE);
        let date = match parse_date_safe(raw_date) {
            Some(d) => d,
            None => match policy.date_errors {
                DateErrorPolicy::Abort => {
                    return Err(AppError::UnparseableDate {
                        line: idx + 2, // +1 for the header row
                        value: raw_date.unwrap_or("").to_string(),
                    });
                }
                DateErrorPolicy::Drop => {
                    date_errors += 1;
                    continue;
                }
            },
        };

        let quantity = number(columns::QUANTITY);
        let sales = number(columns::SALES);
        let (quantity, sales) = if policy.drop_non_positive {
            match (quantity, sales) {
                (Some(q), Some(s)) if q > 0.0 && s > 0.0 => (q, s),
                _ => {
                    quality_drops += 1;
                    continue;
                }
            }
        } else {
            (quantity.unwrap_or(0.0), sales.unwrap_or(0.0))
        };

        records.push(SalesRecord {
            date,
            period: PeriodKey::from_date(date),
            store: text(columns::STORE),
            channel: text(columns::CHANNEL),
            region: text(columns::REGION),
            sku: text(columns::SKU),
            category: text(columns::CATEGORY),
            quantity,
            sales,
            discount: number(columns::DISCOUNT).unwrap_or(0.0),
            order_id: non_blank(col_map.get(row, columns::ORDER_ID)).map(str::to_string),
            dept: text(columns::DEPT),
            return_amount: number(columns::RETURN_AMOUNT).unwrap_or(0.0),
            target_sales: number(columns::TARGET_SALES).unwrap_or(0.0),
        });
    }

    if date_errors > 0 {
        warn!(rows = date_errors, "dropped rows with unparseable dates");
    }
    if quality_drops > 0 {
        warn!(rows = quality_drops, "dropped rows with non-positive sales or quantity");
    }
    let report = LoadReport {
        total_rows: table.rows.len(),
        kept_rows: records.len(),
        date_errors,
        quality_drops,
    };
    info!(kept = report.kept_rows, total = report.total_rows, "cleaned sales records");
    Ok((records, report))
}
