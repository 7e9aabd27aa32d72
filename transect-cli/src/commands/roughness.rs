use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use transect::{output, ExtractionConfig, GridExtractor, Survey};

pub fn run(
    input: PathBuf,
    output_path: Option<PathBuf>,
    window: usize,
    config: ExtractionConfig,
) -> Result<()> {
    let survey = Survey::from_path(&input)
        .with_context(|| format!("failed to read survey from {}", input.display()))?;

    let extractor =
        GridExtractor::new(&survey, config).context("failed to build the extraction engine")?;
    let extraction = extractor.extract().context("extraction failed")?;
    let report = extraction.roughness(window);

    match output_path {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            output::write_roughness(&mut writer, &report.samples)?;
            writer.flush()?;

            println!(
                "Wrote {} roughness samples -> {}",
                report.samples.len(),
                path.display()
            );
            if let (Some(min), Some(max)) = (report.min, report.max) {
                println!(
                    "Min roughness: {:.6} at ({}, {})",
                    min.roughness, min.x, min.y
                );
                println!(
                    "Max roughness: {:.6} at ({}, {})",
                    max.roughness, max.x, max.y
                );
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            output::write_roughness(&mut writer, &report.samples)?;
            writer.flush()?;
        }
    }

    Ok(())
}
