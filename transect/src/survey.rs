//! Survey input parsing and geometry derivation.
//!
//! A survey is an ordered sequence of scan records in a plain text format:
//!
//! - lines starting with `#` are comments;
//! - the special comment `# Grid_size: COLSxROWS` announces the scan's
//!   expected column and row counts before any data line;
//! - data lines are whitespace-separated `x y z column [row]`, where the
//!   trailing row index is absent in simpler input variants.
//!
//! Reading is strict: the first malformed data line aborts the pass with the
//! offending line number, so no partially-populated survey escapes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::error::{ExtractError, Result};
use crate::point::{Bounds, Point3, SurveyRecord};

/// Prefix of the comment line carrying the scan dimensions.
const GRID_SIZE_PREFIX: &str = "# Grid_size:";

/// A fully-read survey: all records plus the extent computed while reading.
#[derive(Debug, Clone)]
pub struct Survey {
    records: Vec<SurveyRecord>,
    grid_cols: Option<u32>,
    grid_rows: Option<u32>,
    bounds: Bounds,
}

impl Survey {
    /// Read a survey from any buffered reader.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MalformedRecord`] for the first data line with
    /// missing or non-numeric fields, or [`ExtractError::Io`] if reading
    /// fails.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut records = Vec::new();
        let mut grid_cols = None;
        let mut grid_rows = None;
        let mut bounds = Bounds::empty();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let number = idx + 1;

            if let Some(dims) = line.strip_prefix(GRID_SIZE_PREFIX) {
                let (cols, rows) = parse_grid_size(dims, number)?;
                grid_cols = Some(cols);
                grid_rows = Some(rows);
                continue;
            }
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let record = parse_record(&line, number)?;
            bounds.expand(record.point());
            records.push(record);
        }

        debug!(
            "read {} records, grid size {:?}x{:?}",
            records.len(),
            grid_cols,
            grid_rows
        );
        if !records.is_empty() {
            debug!(
                "bounds: x [{}, {}], y [{}, {}], z [{}, {}]",
                bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y, bounds.min_z, bounds.max_z
            );
        }

        Ok(Self {
            records,
            grid_cols,
            grid_rows,
            bounds,
        })
    }

    /// Read a survey from a file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// All records in input order.
    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    /// All record locations, without scan indices.
    pub fn points(&self) -> impl Iterator<Item = Point3> + '_ {
        self.records.iter().map(SurveyRecord::point)
    }

    /// Number of records read.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the survey holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The extent computed during the read pass.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Scan column count from the `# Grid_size` header, if one was present.
    pub fn grid_cols(&self) -> Option<u32> {
        self.grid_cols
    }

    /// Scan row count from the `# Grid_size` header, if one was present.
    pub fn grid_rows(&self) -> Option<u32> {
        self.grid_rows
    }

    /// Derive the survey's step vectors and totals from its anchor records.
    ///
    /// Anchors are the first point of column 1 (the walk origin), the first
    /// point of the survey's last column (closing the column span of scan
    /// line 1), the last point of column 1 (closing the row span), and the
    /// first two points of row 1 (the observed along-scan step).
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MissingAnchors`] when the records cannot
    /// supply those anchors, e.g. a survey without row indices, a single
    /// scan line, or coincident anchor points.
    pub fn geometry(&self) -> Result<SurveyGeometry> {
        let last_column = match self.grid_cols {
            Some(cols) => cols,
            None => self
                .records
                .iter()
                .map(|r| r.column)
                .max()
                .ok_or(ExtractError::MissingAnchors("survey holds no records"))?,
        };

        let starts: Vec<Point3> = self
            .records
            .iter()
            .filter(|r| r.column == 1)
            .map(SurveyRecord::point)
            .collect();
        let first_row: Vec<Point3> = self
            .records
            .iter()
            .filter(|r| r.row == Some(1))
            .map(SurveyRecord::point)
            .collect();
        let end = self
            .records
            .iter()
            .find(|r| r.column == last_column)
            .map(SurveyRecord::point);

        if starts.len() < 2 {
            return Err(ExtractError::MissingAnchors(
                "need at least two scan lines starting at column 1",
            ));
        }
        if first_row.len() < 2 {
            return Err(ExtractError::MissingAnchors(
                "need at least two points on scan row 1",
            ));
        }
        let end = end.ok_or(ExtractError::MissingAnchors(
            "no record on the survey's last column",
        ))?;

        let origin = starts[0];
        let last_start = starts[starts.len() - 1];

        let total_column = (end.x - origin.x, end.y - origin.y);
        let total_column_length = total_column.0.hypot(total_column.1);
        let total_row = (last_start.x - origin.x, last_start.y - origin.y);
        let total_row_length = total_row.0.hypot(total_row.1);

        let column_delta = (first_row[1].x - first_row[0].x, first_row[1].y - first_row[0].y);
        let column_step = column_delta.0.hypot(column_delta.1);
        let row_delta = (starts[1].x - origin.x, starts[1].y - origin.y);

        if total_column_length == 0.0 || column_step == 0.0 {
            return Err(ExtractError::MissingAnchors(
                "column anchor points are coincident",
            ));
        }
        if total_row_length == 0.0 {
            return Err(ExtractError::MissingAnchors(
                "row anchor points are coincident",
            ));
        }

        // Heading of the row displacement, in compass-friendly degrees.
        // Mirrors the sign convention of the survey acquisition software:
        // y grows against the heading, hence the negated dy.
        let mut angle = (-total_row.1 / total_row_length).asin().to_degrees();
        if total_row.0 < 0.0 {
            angle = 180.0 - angle;
        } else if angle < 0.0 {
            angle += 360.0;
        }

        let geometry = SurveyGeometry {
            origin,
            column_delta,
            column_step,
            row_delta,
            total_column,
            total_column_length,
            total_row,
            total_row_length,
            natural_angle: angle,
            scan_lines: starts.len(),
        };

        debug!(
            "total column d=({}, {}) len={}",
            total_column.0, total_column.1, total_column_length
        );
        debug!(
            "total row d=({}, {}) len={}, natural angle {:.3} deg",
            total_row.0, total_row.1, total_row_length, geometry.natural_angle
        );

        Ok(geometry)
    }
}

/// Direction vectors and spans derived from a survey's anchor records.
#[derive(Debug, Clone, Copy)]
pub struct SurveyGeometry {
    /// First point of column 1; the lattice walk starts here.
    pub origin: Point3,
    /// Spacing between consecutive points along scan row 1.
    pub column_delta: (f64, f64),
    /// Length of `column_delta`: the observed along-scan step.
    pub column_step: f64,
    /// Spacing between the starts of consecutive scan lines.
    pub row_delta: (f64, f64),
    /// Displacement from the first to the last column of scan row 1.
    pub total_column: (f64, f64),
    pub total_column_length: f64,
    /// Displacement from the first to the last scan line at column 1.
    pub total_row: (f64, f64),
    pub total_row_length: f64,
    /// Heading of the row displacement in degrees `[0, 360)`.
    pub natural_angle: f64,
    /// Number of observed scan lines (column-1 records).
    pub scan_lines: usize,
}

fn parse_grid_size(dims: &str, line: usize) -> Result<(u32, u32)> {
    let malformed = |reason: String| ExtractError::MalformedRecord { line, reason };

    let (cols, rows) = dims
        .trim()
        .split_once('x')
        .ok_or_else(|| malformed(format!("grid size '{}' is not COLSxROWS", dims.trim())))?;
    let cols = cols
        .trim()
        .parse::<u32>()
        .map_err(|e| malformed(format!("invalid grid column count '{}': {}", cols.trim(), e)))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|e| malformed(format!("invalid grid row count '{}': {}", rows.trim(), e)))?;
    Ok((cols, rows))
}

fn parse_record(line: &str, number: usize) -> Result<SurveyRecord> {
    let malformed = |reason: String| ExtractError::MalformedRecord {
        line: number,
        reason,
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(malformed(format!(
            "expected at least 4 fields, found {}",
            fields.len()
        )));
    }

    let coord = |idx: usize, name: &str| -> Result<f64> {
        fields[idx]
            .parse::<f64>()
            .map_err(|e| malformed(format!("invalid {} '{}': {}", name, fields[idx], e)))
    };

    let x = coord(0, "x")?;
    let y = coord(1, "y")?;
    let z = coord(2, "z")?;
    let column = fields[3]
        .parse::<u32>()
        .map_err(|e| malformed(format!("invalid column '{}': {}", fields[3], e)))?;
    let row = match fields.get(4) {
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|e| malformed(format!("invalid row '{}': {}", raw, e)))?,
        ),
        None => None,
    };

    Ok(SurveyRecord { x, y, z, column, row })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# Survey pass 7
# Grid_size: 3x2
0.0 0.0 10.0 1 1
1.0 0.0 11.0 2 1
2.0 0.0 12.0 3 1
0.0 5.0 20.0 1 2
1.0 5.0 21.0 2 2
2.0 5.0 22.0 3 2
";

    #[test]
    fn test_parse_sample() {
        let survey = Survey::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(survey.len(), 6);
        assert_eq!(survey.grid_cols(), Some(3));
        assert_eq!(survey.grid_rows(), Some(2));
        assert_eq!(survey.records()[0].column, 1);
        assert_eq!(survey.records()[3].row, Some(2));

        let b = survey.bounds();
        assert_eq!((b.min_x, b.max_x), (0.0, 2.0));
        assert_eq!((b.min_y, b.max_y), (0.0, 5.0));
        assert_eq!((b.min_z, b.max_z), (10.0, 22.0));
    }

    #[test]
    fn test_parse_without_row_field() {
        let survey = Survey::from_reader("1.5 2.5 3.5 4\n".as_bytes()).unwrap();
        assert_eq!(survey.len(), 1);
        assert_eq!(survey.records()[0].row, None);
    }

    #[test]
    fn test_malformed_missing_field() {
        let err = Survey::from_reader("1.0 2.0 3.0\n".as_bytes()).unwrap_err();
        match err {
            ExtractError::MalformedRecord { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("4 fields"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_bad_number_reports_line() {
        let input = "# header\n0 0 1 1 1\n0 five 1 1 1\n";
        let err = Survey::from_reader(input.as_bytes()).unwrap_err();
        match err {
            ExtractError::MalformedRecord { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("five"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_grid_size() {
        let err = Survey::from_reader("# Grid_size: 3by2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let survey = Survey::from_path(file.path()).unwrap();
        assert_eq!(survey.len(), 6);
    }

    #[test]
    fn test_geometry_axis_aligned() {
        let survey = Survey::from_reader(SAMPLE.as_bytes()).unwrap();
        let g = survey.geometry().unwrap();

        assert_eq!(g.origin, Point3::new(0.0, 0.0, 10.0));
        assert_eq!(g.column_delta, (1.0, 0.0));
        assert_eq!(g.column_step, 1.0);
        assert_eq!(g.row_delta, (0.0, 5.0));
        assert_eq!(g.total_column, (2.0, 0.0));
        assert_eq!(g.total_column_length, 2.0);
        assert_eq!(g.total_row, (0.0, 5.0));
        assert_eq!(g.total_row_length, 5.0);
        assert_eq!(g.scan_lines, 2);
        // Rows head toward +y, so the derived heading points 90 deg below +x.
        assert!((g.natural_angle - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_geometry_requires_row_indices() {
        let survey = Survey::from_reader("0 0 1 1\n1 0 1 2\n".as_bytes()).unwrap();
        assert!(matches!(
            survey.geometry(),
            Err(ExtractError::MissingAnchors(_))
        ));
    }

    #[test]
    fn test_geometry_requires_two_scan_lines() {
        let input = "# Grid_size: 2x1\n0 0 1 1 1\n1 0 1 2 1\n";
        let survey = Survey::from_reader(input.as_bytes()).unwrap();
        assert!(matches!(
            survey.geometry(),
            Err(ExtractError::MissingAnchors(_))
        ));
    }

    #[test]
    fn test_geometry_empty_survey() {
        let survey = Survey::from_reader("# nothing\n".as_bytes()).unwrap();
        assert!(survey.is_empty());
        assert!(matches!(
            survey.geometry(),
            Err(ExtractError::MissingAnchors(_))
        ));
    }
}
