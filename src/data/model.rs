use std::cmp::Ordering;
use std::fmt;

// ---------------------------------------------------------------------------
// Cell – a single value of the loaded sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed spreadsheet cell.
#[derive(Debug, Clone)]
pub enum Cell {
    Float(f64),
    Integer(i64),
    Text(String),
    Bool(bool),
    Empty,
}

impl Cell {
    /// Whether the cell holds no value. A NaN float counts as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Coerce the cell to a number. Unparsable cells become `None`, never an error.
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Cell::Float(v) => *v,
            Cell::Integer(i) => *i as f64,
            Cell::Bool(b) => f64::from(u8::from(*b)),
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty => return None,
        };
        (!value.is_nan()).then_some(value)
    }

    /// Guess the type of a raw text field (CSV input).
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Cell::Float(f);
        }
        match trimmed {
            "true" | "TRUE" | "True" => Cell::Bool(true),
            "false" | "FALSE" | "False" => Cell::Bool(false),
            _ => Cell::Text(s.to_string()),
        }
    }
}

// -- Manual Eq/Ord so cells can be counted in a BTreeSet.
// Integers and floats share one numeric class: `5` and `5.0` are the same value,
// and so are `-0.0` and `0.0`. Equality is defined through `cmp` so both agree.

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        use Cell::*;
        fn class(c: &Cell) -> u8 {
            match c {
                Empty => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                Text(_) => 3,
            }
        }
        let ca = class(self);
        let cb = class(other);
        if ca != cb {
            return ca.cmp(&cb);
        }
        // Adding 0.0 turns -0.0 into 0.0 and leaves every other value alone.
        fn num(v: f64) -> f64 {
            v + 0.0
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Integer(a), Float(b)) => (*a as f64).total_cmp(&num(*b)),
            (Float(a), Integer(b)) => num(*a).total_cmp(&(*b as f64)),
            (Float(a), Float(b)) => num(*a).total_cmp(&num(*b)),
            (Text(a), Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Float(v) if v.is_nan() => write!(f, "nan"),
            // Integral values keep one decimal so `1.0` does not read as an integer.
            Cell::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Empty => write!(f, "nan"),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the rectangular grid handed to the extractor
// ---------------------------------------------------------------------------

/// One named column of the table.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// A rectangular, column-major table. Columns are addressed by position.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    height: usize,
}

impl Table {
    /// Build a table from row-major data, padding short rows with [`Cell::Empty`].
    ///
    /// The width is the longest of the header and every row. Header cells
    /// that are missing or blank are named `Unnamed: <index>`.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(names.len()))
            .max()
            .unwrap_or(0);
        let height = rows.len();

        let mut columns: Vec<Column> = (0..width)
            .map(|i| Column {
                name: names
                    .get(i)
                    .filter(|n| !n.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("Unnamed: {i}")),
                cells: Vec::with_capacity(height),
            })
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in &mut columns {
                column.cells.push(cells.next().unwrap_or(Cell::Empty));
            }
        }

        Table { columns, height }
    }

    /// Build a table directly from columns. All columns must have equal length.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let height = columns.iter().map(|c| c.cells.len()).max().unwrap_or(0);
        let columns = columns
            .into_iter()
            .map(|mut c| {
                c.cells.resize(height, Cell::Empty);
                c
            })
            .collect();
        Table { columns, height }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
