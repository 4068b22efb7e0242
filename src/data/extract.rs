use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{Cell, Table};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How column groups are laid out across the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Number of groups to attempt, independent of the table width.
    pub num_groups: usize,
    /// Column distance between the first columns of consecutive groups.
    pub stride: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            num_groups: 10,
            stride: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One plotted line: z against x for a single constant y.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Zero-based group index in the table.
    pub group: usize,
    pub x: Vec<Option<f64>>,
    pub z: Vec<Option<f64>>,
    /// First cell of the group's y column.
    pub y_label: Cell,
}

impl Series {
    /// Legend text for this series, e.g. `y = 1.0`.
    pub fn label(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.y_label)
    }

    /// Contiguous runs of rows where both x and z are present and finite.
    ///
    /// A missing value on either axis ends the current run, so the line is
    /// drawn with a gap there.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (x, z) in self.x.iter().zip(&self.z) {
            match (x, z) {
                (Some(x), Some(z)) if x.is_finite() && z.is_finite() => current.push((*x, *z)),
                _ => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    /// All finite (x, z) points, ignoring gaps.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.z)
            .filter_map(|(x, z)| Some(((*x)?, (*z)?)))
            .filter(|(x, z)| x.is_finite() && z.is_finite())
    }
}

/// A per-group anomaly. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractWarning {
    #[error(
        "dataset {} does not have enough columns ({col_start}..={} of {width}), skipping",
        .group + 1,
        .col_start.saturating_add(2)
    )]
    InsufficientColumns {
        group: usize,
        col_start: usize,
        width: usize,
    },
    #[error("y-values in dataset {} are not constant ({distinct} distinct values)", .group + 1)]
    NonConstantY { group: usize, distinct: usize },
}

impl ExtractWarning {
    /// Zero-based index of the group the warning refers to.
    pub fn group(&self) -> usize {
        match self {
            ExtractWarning::InsufficientColumns { group, .. }
            | ExtractWarning::NonConstantY { group, .. } => *group,
        }
    }
}

/// Result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Emitted series in ascending group order.
    pub series: Vec<Series>,
    pub warnings: Vec<ExtractWarning>,
}

// ---------------------------------------------------------------------------
// Extraction pass
// ---------------------------------------------------------------------------

/// Slice the table into (x, y, z) column groups.
///
/// Groups that would reach past the last column are skipped with a warning.
/// A y column holding more than one distinct value is reported but still
/// emitted, labelled by its first cell.
pub fn extract(table: &Table, options: &ExtractOptions) -> Extraction {
    let width = table.width();
    let mut out = Extraction::default();

    for group in 0..options.num_groups {
        // A start past `usize::MAX` is past the last column as well.
        let col_start = group.checked_mul(options.stride).unwrap_or(usize::MAX);

        let columns = (
            table.column(col_start),
            col_start.checked_add(1).and_then(|i| table.column(i)),
            col_start.checked_add(2).and_then(|i| table.column(i)),
        );
        let (Some(x), Some(y), Some(z)) = columns else {
            out.warnings.push(ExtractWarning::InsufficientColumns {
                group,
                col_start,
                width,
            });
            continue;
        };

        let distinct = distinct_values(&y.cells);
        if distinct != 1 {
            out.warnings.push(ExtractWarning::NonConstantY { group, distinct });
        }

        out.series.push(Series {
            group,
            x: x.cells.iter().map(Cell::to_f64).collect(),
            z: z.cells.iter().map(Cell::to_f64).collect(),
            y_label: y.cells.first().cloned().unwrap_or(Cell::Empty),
        });
    }

    out
}

/// Number of distinct non-missing values in a column.
fn distinct_values(cells: &[Cell]) -> usize {
    cells
        .iter()
        .filter(|c| !c.is_missing())
        .collect::<BTreeSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(v: f64) -> Cell {
        Cell::Float(v)
    }

    fn opts(num_groups: usize) -> ExtractOptions {
        ExtractOptions {
            num_groups,
            stride: 3,
        }
    }

    /// Table whose group `g` has y = g + 1 and `rows` rows.
    fn grid(width: usize, rows: usize) -> Table {
        let data = (0..rows)
            .map(|r| {
                (0..width)
                    .map(|c| match c % 3 {
                        0 => f(r as f64),
                        1 => f((c / 3 + 1) as f64),
                        _ => f(r as f64 * 10.0 + c as f64),
                    })
                    .collect()
            })
            .collect();
        Table::from_rows(Vec::new(), data)
    }

    #[test]
    fn emits_one_series_per_complete_group() {
        let out = extract(&grid(27, 4), &ExtractOptions::default());
        assert_eq!(out.series.len(), 9);
        assert_eq!(
            out.warnings,
            vec![ExtractWarning::InsufficientColumns {
                group: 9,
                col_start: 27,
                width: 27
            }]
        );
    }

    #[test]
    fn emitted_count_is_min_of_groups_and_width_over_three() {
        for width in 0..40 {
            for num_groups in [0, 1, 5, 10] {
                let out = extract(&grid(width, 2), &opts(num_groups));
                assert_eq!(out.series.len(), num_groups.min(width / 3), "w={width}");
                assert_eq!(out.series.len() + out.warnings.len(), num_groups);
            }
        }
    }

    #[test]
    fn constant_y_has_no_warning() {
        let table = Table::from_rows(
            Vec::new(),
            (0..4).map(|r| vec![f(r as f64), f(5.0), f(1.0)]).collect(),
        );
        let out = extract(&table, &opts(1));
        assert!(out.warnings.is_empty());
        assert_eq!(out.series[0].y_label, f(5.0));
        assert_eq!(out.series[0].label("y = "), "y = 5.0");
    }

    #[test]
    fn non_constant_y_warns_and_keeps_first_value() {
        let table = Table::from_rows(
            Vec::new(),
            [5.0, 6.0, 5.0, 5.0]
                .iter()
                .map(|&y| vec![f(0.0), f(y), f(1.0)])
                .collect(),
        );
        let out = extract(&table, &opts(1));
        assert_eq!(out.series.len(), 1);
        assert_eq!(out.series[0].y_label, f(5.0));
        assert_eq!(
            out.warnings,
            vec![ExtractWarning::NonConstantY {
                group: 0,
                distinct: 2
            }]
        );
    }

    #[test]
    fn empty_y_cells_are_ignored_for_constancy() {
        let table = Table::from_rows(
            Vec::new(),
            vec![
                vec![f(0.0), Cell::Integer(5), f(1.0)],
                vec![f(1.0), Cell::Empty, f(2.0)],
                vec![f(2.0), f(5.0), f(3.0)],
            ],
        );
        let out = extract(&table, &opts(1));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn skips_do_not_renumber_later_groups() {
        let table = grid(9, 3);
        let spaced = ExtractOptions {
            num_groups: 2,
            stride: 6,
        };
        let out = extract(&table, &spaced);
        // group 1 starts at column 6 and fits exactly.
        assert_eq!(out.series.iter().map(|s| s.group).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(out.series[1].y_label, f(3.0));

        let wide = ExtractOptions {
            num_groups: 3,
            stride: 4,
        };
        let out = extract(&grid(10, 2), &wide);
        assert_eq!(out.series.iter().map(|s| s.group).collect::<Vec<_>>(), vec![0, 1]);
        assert!(out.warnings.contains(&ExtractWarning::InsufficientColumns {
            group: 2,
            col_start: 8,
            width: 10
        }));
    }

    #[test]
    fn oversized_stride_skips_instead_of_overflowing() {
        let table = Table::from_rows(Vec::new(), vec![vec![f(0.0), f(1.0), f(2.0)]]);
        let huge = ExtractOptions {
            num_groups: 3,
            stride: usize::MAX / 2 + 1,
        };
        let out = extract(&table, &huge);
        assert_eq!(out.series.len(), 1);
        assert_eq!(out.warnings.iter().map(|w| w.group()).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(
            out.warnings[1],
            ExtractWarning::InsufficientColumns {
                group: 2,
                col_start: usize::MAX,
                width: 3
            }
        );
        // The message saturates instead of overflowing.
        assert!(out.warnings[1].to_string().starts_with("dataset 3 "));
    }

    #[test]
    fn unparsable_cells_become_missing_in_place() {
        let table = Table::from_rows(
            Vec::new(),
            vec![
                vec![f(0.0), f(1.0), f(10.0)],
                vec![Cell::Text("abc".into()), f(1.0), f(11.0)],
                vec![f(2.0), f(1.0), Cell::Text("abc".into())],
                vec![Cell::Text("3".into()), f(1.0), f(13.0)],
            ],
        );
        let out = extract(&table, &opts(1));
        let s = &out.series[0];
        assert_eq!(s.x, vec![Some(0.0), None, Some(2.0), Some(3.0)]);
        assert_eq!(s.z, vec![Some(10.0), Some(11.0), None, Some(13.0)]);
        assert_eq!(s.segments(), vec![vec![(0.0, 10.0)], vec![(3.0, 13.0)]]);
        assert_eq!(s.points().count(), 2);
    }

    #[test]
    fn end_to_end_two_groups_and_a_skip() {
        // 6 rows x 8 columns: groups at 0 and 3 fit, group 2 (columns 6..=8) does not.
        let rows = (0..6)
            .map(|r| {
                let r = r as f64;
                vec![r, 1.0, r * 2.0, r, 2.0, r * 3.0, r, 3.0]
                    .into_iter()
                    .map(Cell::Float)
                    .collect()
            })
            .collect();
        let table = Table::from_rows(Vec::new(), rows);
        let out = extract(&table, &opts(3));

        let labels: Vec<String> = out.series.iter().map(|s| s.y_label.to_string()).collect();
        assert_eq!(labels, vec!["1.0", "2.0"]);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].group(), 2);
        assert_eq!(
            out.warnings[0].to_string(),
            "dataset 3 does not have enough columns (6..=8 of 8), skipping"
        );
        assert_eq!(out.series[1].z[5], Some(15.0));
    }

    #[test]
    fn empty_table_labels_with_missing_value() {
        let table = Table::from_rows(vec!["x".into(), "y".into(), "z".into()], Vec::new());
        let out = extract(&table, &opts(1));
        assert_eq!(out.series[0].y_label, Cell::Empty);
        assert!(out.series[0].x.is_empty());
        assert_eq!(
            out.warnings,
            vec![ExtractWarning::NonConstantY {
                group: 0,
                distinct: 0
            }]
        );
    }
}
