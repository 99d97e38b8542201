//! scarf-export: Pure format serializers for spiral paths.
//!
//! Converts point sequences into CSV (and reads them back) and renders
//! them as SVG. The SVG writer returns a `String`; the CSV functions
//! work over caller-supplied readers and writers.

pub mod csv;
pub mod svg;

pub use csv::{
    CsvError, CsvLayout, CsvOptions, CsvTable, parse_csv, parse_csv_table, read_csv,
    read_csv_table, to_csv_string, write_csv, write_distances_csv, write_distances_csv_3d,
};
pub use svg::{SvgMetadata, to_svg};
