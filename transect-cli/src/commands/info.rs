use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use transect::Survey;

#[derive(Serialize)]
struct SurveyInfo {
    records: usize,
    grid_cols: Option<u32>,
    grid_rows: Option<u32>,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    min_z: f64,
    max_z: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<GeometryInfo>,
}

#[derive(Serialize)]
struct GeometryInfo {
    observed_step: f64,
    total_column_length: f64,
    total_row_length: f64,
    natural_angle: f64,
    scan_lines: usize,
}

pub fn run(input: PathBuf, json: bool) -> Result<()> {
    let survey = Survey::from_path(&input)
        .with_context(|| format!("failed to read survey from {}", input.display()))?;
    let bounds = survey.bounds();

    // A survey without usable anchors still has printable statistics.
    let geometry = survey.geometry().ok();

    if json {
        let info = SurveyInfo {
            records: survey.len(),
            grid_cols: survey.grid_cols(),
            grid_rows: survey.grid_rows(),
            min_x: bounds.min_x,
            max_x: bounds.max_x,
            min_y: bounds.min_y,
            max_y: bounds.max_y,
            min_z: bounds.min_z,
            max_z: bounds.max_z,
            geometry: geometry.map(|g| GeometryInfo {
                observed_step: g.column_step,
                total_column_length: g.total_column_length,
                total_row_length: g.total_row_length,
                natural_angle: g.natural_angle,
                scan_lines: g.scan_lines,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Survey: {}", input.display());
    println!("Records: {}", survey.len());
    match (survey.grid_cols(), survey.grid_rows()) {
        (Some(cols), Some(rows)) => println!("Grid size: {cols}x{rows}"),
        _ => println!("Grid size: not declared"),
    }
    println!();
    println!("X range: {} .. {}", bounds.min_x, bounds.max_x);
    println!("Y range: {} .. {}", bounds.min_y, bounds.max_y);
    println!("Z range: {} .. {}", bounds.min_z, bounds.max_z);

    match geometry {
        Some(g) => {
            println!();
            println!("Observed along-scan step: {:.3}", g.column_step);
            println!("Total column length: {:.3}", g.total_column_length);
            println!("Total row length: {:.3}", g.total_row_length);
            println!("Natural heading angle: {:.3} deg", g.natural_angle);
            println!("Scan lines: {}", g.scan_lines);
        }
        None => {
            println!();
            println!("Geometry: not derivable (missing anchor records)");
        }
    }

    Ok(())
}
