use crate::batch::TrialResult;
use anyhow::{Context, Result};
use epidemic_common::Snapshot;
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Serialization format for recorded snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Bincode,
    MessagePack,
}

impl OutputFormat {
    /// Parses the `[output] format` value. Unknown formats fall back to JSON.
    pub fn from_config(format: Option<&str>) -> Self {
        match format.unwrap_or("json") {
            "json" => OutputFormat::Json,
            "bincode" => OutputFormat::Bincode,
            "messagepack" | "msgpack" => OutputFormat::MessagePack,
            other => {
                error!("Unknown output format: {}. Using JSON instead.", other);
                OutputFormat::Json
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Bincode => "bin",
            OutputFormat::MessagePack => "msgpack",
        }
    }
}

/// Writes all snapshots to `<base>_snapshots.<ext>` and returns the path.
pub fn save_snapshots(base_filename: &str, format: OutputFormat, snapshots: &[Snapshot]) -> Result<PathBuf> {
    let filename = PathBuf::from(format!("{}_snapshots.{}", base_filename, format.extension()));
    let file = File::create(&filename)
        .with_context(|| format!("Error creating snapshot file '{}'", filename.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::Json => {
            // No pretty formatting; the per-agent positions make these files large
            serde_json::to_writer(&mut writer, snapshots).context("Error serializing snapshots to JSON")?;
        }
        OutputFormat::Bincode => {
            bincode::serialize_into(&mut writer, snapshots).context("Error serializing snapshots to bincode")?;
        }
        OutputFormat::MessagePack => {
            rmp_serde::encode::write(&mut writer, snapshots).context("Error serializing snapshots to MessagePack")?;
        }
    }
    writer.flush()?;

    info!("All snapshots saved to {} ({:?} format)", filename.display(), format);
    Ok(filename)
}

/// Writes the `time,infected,immune` trajectory as CSV.
pub fn save_time_series_csv<P: AsRef<Path>>(path: P, snapshots: &[Snapshot]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Error creating CSV file '{}'", path.display()))?;
    writer.write_record(["time", "infected", "immune"])?;
    for s in snapshots {
        writer.write_record(&[s.time.to_string(), s.infected.to_string(), s.immune.to_string()])?;
    }
    writer.flush()?;
    info!("Time series saved to {}", path.display());
    Ok(())
}

/// Writes one `trial,seed,final_infected,final_immune` row per trial.
pub fn save_batch_csv<P: AsRef<Path>>(path: P, results: &[TrialResult]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Error creating CSV file '{}'", path.display()))?;
    writer.write_record(["trial", "seed", "final_infected", "final_immune"])?;
    for result in results {
        let (infected, immune) = result
            .final_snapshot()
            .map(|s| (s.infected, s.immune))
            .unwrap_or_default();
        writer.write_record(&[
            result.trial.to_string(),
            result.seed.to_string(),
            infected.to_string(),
            immune.to_string(),
        ])?;
    }
    writer.flush()?;
    info!("Batch results saved to {}", path.display());
    Ok(())
}
