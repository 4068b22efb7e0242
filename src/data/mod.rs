/// Data layer: table model, loading, and group extraction.
///
/// Architecture:
/// ```text
///  .xlsx / .ods / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  skip metadata rows, read header → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  positional columns of Cells
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  extract  │  (x, y, z) column groups → Series + warnings
///   └──────────┘
/// ```

pub mod extract;
pub mod loader;
pub mod model;
