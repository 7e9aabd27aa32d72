use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use transect::{output, ExtractionConfig, GridExtractor, Survey};

#[derive(Serialize)]
struct ExtractSummary {
    input_records: usize,
    lattice_columns: usize,
    extracted_points: usize,
    step: f64,
    angle: f64,
}

pub fn run(
    input: PathBuf,
    output_path: Option<PathBuf>,
    config: ExtractionConfig,
    json: bool,
) -> Result<()> {
    let survey = Survey::from_path(&input)
        .with_context(|| format!("failed to read survey from {}", input.display()))?;

    let extractor =
        GridExtractor::new(&survey, config).context("failed to build the extraction engine")?;
    let extraction = extractor.extract().context("extraction failed")?;

    let summary = ExtractSummary {
        input_records: survey.len(),
        lattice_columns: extraction.lines().len(),
        extracted_points: extraction.len(),
        step: extractor.config().step,
        angle: extractor.config().angle,
    };

    match output_path {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);

            let pb = ProgressBar::new(extraction.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} points")?
                    .progress_chars("#>-"),
            );
            for p in extraction.points() {
                writeln!(writer, "{}, {}, {}", p.x, p.y, p.z)?;
                pb.inc(1);
            }
            writer.flush()?;
            pb.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string(&summary)?);
            } else {
                println!(
                    "Extracted {} points over {} lattice columns -> {}",
                    summary.extracted_points,
                    summary.lattice_columns,
                    path.display()
                );
            }
        }
        None => {
            // Points go to stdout; keep it clean of any summary.
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            output::write_points(&mut writer, extraction.points())?;
            writer.flush()?;
        }
    }

    Ok(())
}
