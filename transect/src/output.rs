//! Plain-text writers for extraction results.
//!
//! Both formats are headerless, comma-space separated, one record per line,
//! matching what downstream plotting tools ingest.

use std::io::{self, Write};

use crate::point::{ExtractedPoint, RoughnessSample};

/// Write extracted points as `x, y, z` lines.
pub fn write_points<'a, W, I>(writer: &mut W, points: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ExtractedPoint>,
{
    for p in points {
        writeln!(writer, "{}, {}, {}", p.x, p.y, p.z)?;
    }
    Ok(())
}

/// Write roughness samples as `column, x, y, roughness` lines.
pub fn write_roughness<'a, W, I>(writer: &mut W, samples: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a RoughnessSample>,
{
    for s in samples {
        writeln!(writer, "{}, {}, {}, {}", s.column, s.x, s.y, s.roughness)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_points_format() {
        let points = vec![
            ExtractedPoint {
                x: 1.0,
                y: 2.5,
                z: -3.25,
            },
            ExtractedPoint {
                x: 0.0,
                y: 0.0,
                z: 10.0,
            },
        ];

        let mut out = Vec::new();
        write_points(&mut out, &points).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1, 2.5, -3.25\n0, 0, 10\n"
        );
    }

    #[test]
    fn test_write_roughness_format() {
        let samples = vec![RoughnessSample {
            column: 3,
            x: 12.0,
            y: 8.5,
            roughness: 0.25,
        }];

        let mut out = Vec::new();
        write_roughness(&mut out, &samples).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3, 12, 8.5, 0.25\n");
    }
}
