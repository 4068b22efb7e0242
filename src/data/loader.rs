use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Cell, Column, Table};
use crate::config::InputConfig;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the measurement table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – spreadsheet, first sheet unless named
/// * `.csv`     – plain rows, cell types guessed per field
/// * `.parquet` – flat scalar columns, names taken from the schema
pub fn load_table(path: &Path, input: &InputConfig) -> Result<Table> {
    if !path.exists() {
        bail!("input file {} was not found", path.display());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path, input),
        "csv" => load_csv(path, input),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("unsupported file extension: .{other}"),
    }
    .with_context(|| format!("reading {}", path.display()))?;

    log::info!(
        "loaded {} rows x {} columns from {}",
        table.height(),
        table.width(),
        path.display()
    );
    log::debug!("columns: {:?}", table.column_names().collect::<Vec<_>>());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Row layout shared by the spreadsheet and CSV loaders
// ---------------------------------------------------------------------------

/// Skip the leading rows, split off the header row and build the table.
fn table_from_raw_rows(mut rows: Vec<Vec<Cell>>, input: &InputConfig) -> Table {
    while rows
        .last()
        .is_some_and(|r| r.iter().all(Cell::is_missing))
    {
        rows.pop();
    }

    let mut rows = rows.into_iter().skip(input.skip_rows);
    let names = if input.header_row {
        rows.next()
            .map(|header| {
                header
                    .iter()
                    .map(|c| if c.is_missing() { String::new() } else { c.to_string() })
                    .collect()
            })
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    Table::from_rows(names, rows.collect())
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Workbook layout: the first `skip_rows` sheet rows are metadata, the next
/// row holds column names, then one measurement per row.
///
/// calamine trims the used range to the first non-empty cell; the offset is
/// restored so row and column positions match the sheet.
fn load_spreadsheet(path: &Path, input: &InputConfig) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;

    let range = match &input.sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .with_context(|| format!("reading sheet '{name}'"))?,
        None => workbook
            .worksheet_range_at(0)
            .context("workbook has no sheets")?
            .context("reading first sheet")?,
    };

    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(cell_from_sheet));
        rows.push(cells);
    }

    Ok(table_from_raw_rows(rows, input))
}

fn cell_from_sheet(data: &Data) -> Cell {
    match data {
        Data::Float(v) => Cell::Float(*v),
        Data::Int(i) => Cell::Integer(*i),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(d) => Cell::Float(d.as_f64()),
        Data::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout mirrors the workbook one. Rows may differ in length.
fn load_csv(path: &Path, input: &InputConfig) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(Cell::parse).collect());
    }

    Ok(table_from_raw_rows(rows, input))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per table column.
///
/// Parquet carries its own schema, so `skip_rows` and `header_row` are not
/// applied here.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let mut columns: Vec<Column> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Column {
            name: f.name().clone(),
            cells: Vec::new(),
        })
        .collect();

    let reader = builder.build().context("building parquet reader")?;
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (idx, column) in columns.iter_mut().enumerate() {
            let array = batch.column(idx);
            for row in 0..batch.num_rows() {
                column.cells.push(
                    cell_from_arrow(array, row)
                        .with_context(|| format!("column '{}', row {row}", column.name))?,
                );
            }
        }
    }

    Ok(Table::from_columns(columns))
}

// -- Parquet / Arrow helpers --

fn downcast<'a, T: 'static>(col: &'a Arc<dyn Array>) -> Result<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| anyhow!("unexpected array type {:?}", col.data_type()))
}

/// Extract a single cell from an Arrow column at a given row.
fn cell_from_arrow(col: &Arc<dyn Array>, row: usize) -> Result<Cell> {
    if col.is_null(row) {
        return Ok(Cell::Empty);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::Text(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Cell::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => Cell::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => Cell::Float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => Cell::Float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => Cell::Bool(downcast::<BooleanArray>(col)?.value(row)),
        other => Cell::Text(format!("{other:?}")),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_skips_metadata_rows_and_reads_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "data.csv",
            "Ellipsometer run 241127,,\n\
             ,,\n\
             x,y,n\n\
             0.0,1.0,1.45\n\
             0.5,1.0,abc\n\
             1.0,1.0\n",
        );

        let table = load_table(&path, &InputConfig::default()).unwrap();
        assert_eq!(table.width(), 3);
        assert_eq!(table.height(), 3);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["x", "y", "n"]);
        assert_eq!(table.column(2).unwrap().cells[1], Cell::Text("abc".into()));
        assert_eq!(table.column(2).unwrap().cells[2], Cell::Empty);
    }

    #[test]
    fn csv_without_header_row_keeps_all_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.csv", "1,2,3\n4,5,6\n\n");
        let input = InputConfig {
            skip_rows: 0,
            header_row: false,
            ..InputConfig::default()
        };

        let table = load_table(&path, &input).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.column(0).unwrap().name, "Unnamed: 0");
        assert_eq!(table.column(1).unwrap().cells, vec![Cell::Integer(2), Cell::Integer(5)]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("nope.xlsx"), &InputConfig::default()).unwrap_err();
        assert!(err.to_string().contains("was not found"));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.txt", "1,2,3\n");
        let err = load_table(&path, &InputConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported file extension: .txt"));
    }

    #[test]
    fn parquet_columns_become_table_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("x", DataType::Float64, true),
            Field::new("y", DataType::Int64, false),
            Field::new("z", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![Some(0.0), None])),
                Arc::new(Int64Array::from(vec![2, 2])),
                Arc::new(StringArray::from(vec!["1.5", "n/a"])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_table(&path, &InputConfig::default()).unwrap();
        assert_eq!(table.width(), 3);
        assert_eq!(table.height(), 2);
        assert_eq!(table.column(0).unwrap().cells, vec![Cell::Float(0.0), Cell::Empty]);
        assert_eq!(table.column(1).unwrap().cells[0], Cell::Integer(2));
        assert_eq!(table.column(2).unwrap().cells[0], Cell::Text("1.5".into()));
    }
}
