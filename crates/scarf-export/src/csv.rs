//! CSV point files.
//!
//! The format is the one sand-table and CAM tooling around this project
//! already consumes: a header row (`X,Y`, or `X,Y,Z` for a flat 3-D
//! toolpath) followed by one comma-separated row per point.
//!
//! Values are written with Rust's default `f64` formatting, which is the
//! shortest representation that parses back to the same value, so a file
//! written with stride 1 reads back bit-for-bit.
//!
//! Files whose header names a third `Z` column read back as 3-D points,
//! so toolpaths with varying height keep it.
//!
//! The writers take any [`io::Write`] and the reader any [`io::BufRead`];
//! opening files is left to the caller.

use std::io::{self, BufRead, Write};

use scarf_spiral::analysis::segment_lengths;
use scarf_spiral::{Point, Point3};

/// Errors from reading or writing point CSV files.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input had no header row.
    #[error("missing header row")]
    MissingHeader,

    /// A data row could not be parsed. `line` is 1-based and counts the
    /// header.
    #[error("line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    /// A stride of zero was requested.
    #[error("stride must be at least 1")]
    InvalidStride,
}

/// Column layout of a written file.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CsvLayout {
    /// `X,Y`.
    #[default]
    Xy,
    /// `X,Y,Z` with the same `z` on every row.
    Xyz {
        /// Height written for every point.
        z: f64,
    },
}

/// Options for [`write_csv`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvOptions {
    /// Column layout.
    pub layout: CsvLayout,
    /// Keep every `stride`-th point, starting with the first. Must be at
    /// least 1.
    pub stride: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            layout: CsvLayout::Xy,
            stride: 1,
        }
    }
}

/// Write `points` as CSV and return the number of data rows written.
///
/// # Errors
///
/// Returns [`CsvError::InvalidStride`] if `options.stride` is zero, or
/// [`CsvError::Io`] if writing fails.
pub fn write_csv<W: Write>(
    mut out: W,
    points: &[Point],
    options: &CsvOptions,
) -> Result<usize, CsvError> {
    if options.stride == 0 {
        return Err(CsvError::InvalidStride);
    }

    match options.layout {
        CsvLayout::Xy => writeln!(out, "X,Y")?,
        CsvLayout::Xyz { .. } => writeln!(out, "X,Y,Z")?,
    }

    let mut rows = 0;
    for p in points.iter().step_by(options.stride) {
        match options.layout {
            CsvLayout::Xy => writeln!(out, "{},{}", p.x, p.y)?,
            CsvLayout::Xyz { z } => writeln!(out, "{},{},{z}", p.x, p.y)?,
        }
        rows += 1;
    }
    out.flush()?;
    Ok(rows)
}

/// [`write_csv`] into a `String`.
///
/// # Errors
///
/// Returns [`CsvError::InvalidStride`] if `options.stride` is zero.
///
/// # Examples
///
/// ```
/// use scarf_export::csv::{CsvOptions, to_csv_string};
/// use scarf_spiral::Point;
///
/// let csv = to_csv_string(
///     &[Point::new(1.5, -2.0), Point::new(0.0, 3.25)],
///     &CsvOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(csv, "X,Y\n1.5,-2\n0,3.25\n");
/// ```
pub fn to_csv_string(points: &[Point], options: &CsvOptions) -> Result<String, CsvError> {
    let mut buf = Vec::new();
    write_csv(&mut buf, points, options)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write each point with the distance to the next one.
///
/// Header `X,Y,Distance`; the last point's distance is `0`.
///
/// # Errors
///
/// Returns [`CsvError::Io`] if writing fails.
pub fn write_distances_csv<W: Write>(mut out: W, points: &[Point]) -> Result<(), CsvError> {
    writeln!(out, "X,Y,Distance")?;
    for (p, d) in points.iter().zip(segment_lengths(points)) {
        writeln!(out, "{},{},{d}", p.x, p.y)?;
    }
    out.flush()?;
    Ok(())
}

/// [`write_distances_csv`] for 3-D points.
///
/// Header `X,Y,Z,Distance`; distances include the change in height.
///
/// # Errors
///
/// Returns [`CsvError::Io`] if writing fails.
pub fn write_distances_csv_3d<W: Write>(mut out: W, points: &[Point3]) -> Result<(), CsvError> {
    writeln!(out, "X,Y,Z,Distance")?;
    for (p, d) in points.iter().zip(segment_lengths(points)) {
        writeln!(out, "{},{},{},{d}", p.x, p.y, p.z)?;
    }
    out.flush()?;
    Ok(())
}

/// Points read from a CSV file, planar or with heights.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvTable {
    /// The header had no `Z` column.
    Xy(Vec<Point>),
    /// The header's third column was `Z`; every row carries a height.
    Xyz(Vec<Point3>),
}

impl CsvTable {
    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Xy(points) => points.len(),
            Self::Xyz(points) => points.len(),
        }
    }

    /// Whether there are no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The points projected onto the XY plane.
    #[must_use]
    pub fn into_planar(self) -> Vec<Point> {
        match self {
            Self::Xy(points) => points,
            Self::Xyz(points) => points.into_iter().map(Point3::planar).collect(),
        }
    }
}

/// Read points from CSV, keeping heights when the header has a `Z`
/// column.
///
/// The first non-blank line is the header. If its third field is `Z`
/// (any case) the result is [`CsvTable::Xyz`] and every row must have
/// three numeric fields; otherwise rows need two and the result is
/// [`CsvTable::Xy`]. Columns past the ones read are ignored. Values must
/// be finite.
///
/// # Errors
///
/// - [`CsvError::MissingHeader`] if the input has no non-blank line.
/// - [`CsvError::MalformedInput`] for the first row that does not parse.
/// - [`CsvError::Io`] if reading fails.
///
/// # Examples
///
/// ```
/// use scarf_export::csv::{CsvTable, parse_csv_table};
/// use scarf_spiral::Point3;
///
/// let table = parse_csv_table("X,Y,Z\n0,0,0\n0,0,5\n").unwrap();
/// assert_eq!(
///     table,
///     CsvTable::Xyz(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 5.0)])
/// );
/// ```
pub fn read_csv_table<R: BufRead>(input: R) -> Result<CsvTable, CsvError> {
    let mut lines = input.lines().enumerate();
    let mut has_z = None;

    for (_, line) in lines.by_ref() {
        let line = line?;
        let header = line.trim();
        if !header.is_empty() {
            has_z = Some(
                header
                    .split(',')
                    .nth(2)
                    .is_some_and(|f| f.trim().eq_ignore_ascii_case("z")),
            );
            break;
        }
    }
    let Some(has_z) = has_z else {
        return Err(CsvError::MissingHeader);
    };

    let mut planar = Vec::new();
    let mut spatial = Vec::new();
    for (index, line) in lines {
        let line = line?;
        let row = line.trim();
        if row.is_empty() {
            continue;
        }
        let mut fields = row.split(',').map(str::trim);
        let x = parse_field(fields.next(), "X", index + 1)?;
        let y = parse_field(fields.next(), "Y", index + 1)?;
        if has_z {
            let z = parse_field(fields.next(), "Z", index + 1)?;
            spatial.push(Point3::new(x, y, z));
        } else {
            planar.push(Point::new(x, y));
        }
    }

    Ok(if has_z {
        CsvTable::Xyz(spatial)
    } else {
        CsvTable::Xy(planar)
    })
}

/// [`read_csv_table`] over an in-memory string.
///
/// # Errors
///
/// See [`read_csv_table`].
pub fn parse_csv_table(text: &str) -> Result<CsvTable, CsvError> {
    read_csv_table(text.as_bytes())
}

/// Read points from CSV as planar points.
///
/// Same rules as [`read_csv_table`]; a `Z` column is read, validated and
/// then dropped.
///
/// # Errors
///
/// See [`read_csv_table`].
pub fn read_csv<R: BufRead>(input: R) -> Result<Vec<Point>, CsvError> {
    read_csv_table(input).map(CsvTable::into_planar)
}

/// [`read_csv`] over an in-memory string.
///
/// # Errors
///
/// See [`read_csv_table`].
pub fn parse_csv(text: &str) -> Result<Vec<Point>, CsvError> {
    read_csv(text.as_bytes())
}

fn parse_field(field: Option<&str>, column: &str, line: usize) -> Result<f64, CsvError> {
    let field = field
        .filter(|f| !f.is_empty())
        .ok_or_else(|| CsvError::MalformedInput {
            line,
            message: format!("missing {column} value"),
        })?;
    let value: f64 = field.parse().map_err(|_| CsvError::MalformedInput {
        line,
        message: format!("invalid {column} value {field:?}"),
    })?;
    if !value.is_finite() {
        return Err(CsvError::MalformedInput {
            line,
            message: format!("non-finite {column} value {field:?}"),
        });
    }
    Ok(value)
}
