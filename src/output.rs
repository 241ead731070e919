use crate::error::AppError;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    info!(path = %path.display(), "wrote json");
    Ok(())
}

/// Markdown rendering of at most `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", render_table(rows, max_rows));
    if rows.len() > max_rows {
        println!("... {} more rows", rows.len() - max_rows);
    }
    println!();
}

/// The last `max_rows` rows, for tables ordered oldest to newest.
pub fn latest_rows<T>(rows: &[T], max_rows: usize) -> &[T] {
    &rows[rows.len().saturating_sub(max_rows)..]
}

/// Like `preview_table_rows`, but keeps the newest rows of a chronological
/// table and notes how many earlier rows were left out.
pub fn preview_latest_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let shown = latest_rows(rows, max_rows);
    if rows.len() > shown.len() {
        println!("... {} earlier rows", rows.len() - shown.len());
    }
    println!("{}", render_table(shown, max_rows));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StoreRankingDisplayRow;

    fn rows() -> Vec<StoreRankingDisplayRow> {
        vec![
            StoreRankingDisplayRow {
                rank: 1,
                store: "S1".to_string(),
                sales: "1,000.00".to_string(),
            },
            StoreRankingDisplayRow {
                rank: 2,
                store: "S2".to_string(),
                sales: "500.00".to_string(),
            },
        ]
    }

    #[test]
    fn test_render_table_limits_rows() {
        let out = render_table(&rows(), 1);
        assert!(out.contains("Rank"));
        assert!(out.contains("S1"));
        assert!(!out.contains("S2"));
    }

    #[test]
    fn test_latest_rows_keeps_the_tail() {
        let all = rows();
        let tail = latest_rows(&all, 1);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].store, "S2");
        assert_eq!(latest_rows(&all, 12).len(), 2);
        let out = render_table(latest_rows(&all, 1), 1);
        assert!(out.contains("S2"));
        assert!(!out.contains("S1"));
    }

    #[test]
    fn test_render_empty() {
        let empty: Vec<StoreRankingDisplayRow> = Vec::new();
        assert_eq!(render_table(&empty, 5), "(no rows)");
    }

    #[test]
    fn test_write_csv_uses_renamed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top_stores.csv");
        write_csv(&path, &rows()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Rank,Store,Sales"));
        assert_eq!(lines.next(), Some("1,S1,\"1,000.00\""));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &rows()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v[1]["Store"], "S2");
    }
}
