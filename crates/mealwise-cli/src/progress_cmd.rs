//! `mealwise progress` commands: record weigh-ins and show the history.

use std::path::PathBuf;

use anyhow::Result;

use mealwise_core::progress::{
    ChartView, CompressionSettings, NewEntry, PhotoSet, ProgressEntry, ProgressLog, compress_file,
};

use crate::ProgressCommands;

/// Source files for the three photo slots.
#[derive(Debug, Clone, Default)]
pub struct PhotoPaths {
    pub front: Option<PathBuf>,
    pub back: Option<PathBuf>,
    pub side: Option<PathBuf>,
}

/// Compress every provided photo off the async runtime.
///
/// A photo that fails only drops its own slot; the failures are returned as
/// user-facing messages.
pub async fn compress_photos(
    paths: PhotoPaths,
    settings: CompressionSettings,
) -> (PhotoSet, Vec<String>) {
    let mut photos = PhotoSet::default();
    let mut failures = Vec::new();

    let slots = [
        ("front", paths.front, &mut photos.front),
        ("back", paths.back, &mut photos.back),
        ("side", paths.side, &mut photos.side),
    ];
    for (slot, path, target) in slots {
        let Some(path) = path else { continue };
        let result =
            tokio::task::spawn_blocking(move || compress_file(&path, &settings)).await;
        match result {
            Ok(Ok(photo)) => {
                tracing::debug!(slot, width = photo.width, height = photo.height, "photo compressed");
                *target = Some(photo.data_url);
            }
            Ok(Err(e)) => {
                tracing::warn!(slot, error = %e, "photo rejected");
                failures.push(format!("{slot} photo skipped: {e}"));
            }
            Err(e) => {
                tracing::error!(slot, error = %e, "photo compression task failed");
                failures.push(format!("{slot} photo skipped: compression did not finish"));
            }
        }
    }

    (photos, failures)
}

/// Dispatch a progress subcommand.
pub async fn run_progress_command(command: ProgressCommands, log: &mut ProgressLog) -> Result<()> {
    match command {
        ProgressCommands::Add {
            weight,
            notes,
            front,
            back,
            side,
        } => {
            let paths = PhotoPaths { front, back, side };
            run_add(log, weight, notes, paths).await
        }
        ProgressCommands::Show => {
            print!("{}", render_history(log));
            Ok(())
        }
    }
}

async fn run_add(
    log: &mut ProgressLog,
    weight: f64,
    notes: Option<String>,
    paths: PhotoPaths,
) -> Result<()> {
    let (photos, failures) = compress_photos(paths, CompressionSettings::default()).await;
    for failure in &failures {
        eprintln!("warning: {failure}");
    }

    let outcome = log.record(NewEntry {
        weight,
        notes,
        photos,
    })?;
    println!(
        "Recorded {:.1} kg on {}{}",
        outcome.entry.weight,
        outcome.entry.date,
        photo_suffix(&outcome.entry)
    );
    if let Some(warning) = outcome.warning {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn photo_suffix(entry: &ProgressEntry) -> String {
    match &entry.photos {
        Some(photos) => format!(" with {} photo(s)", photos.attached().join(", ")),
        None => String::new(),
    }
}

/// Text rendering of the history (newest first) and the trend.
pub fn render_history(log: &ProgressLog) -> String {
    if log.is_empty() {
        return "No progress entries yet.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>8}  {:<18} {}\n",
        "DATE", "WEIGHT", "PHOTOS", "NOTES"
    ));
    out.push_str(&format!("{}\n", "-".repeat(60)));
    for entry in log.history() {
        let photos = entry
            .photos
            .as_ref()
            .map(|p| p.attached().join(","))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<10} {:>8.1}  {:<18} {}\n",
            entry.date,
            entry.weight,
            photos,
            entry.notes.as_deref().unwrap_or("")
        ));
    }
    out.push('\n');

    match log.chart() {
        ChartView::Empty { message } => {
            out.push_str(message);
            out.push('\n');
        }
        ChartView::Series {
            points,
            y_min,
            y_max,
        } => {
            let span = (y_max - y_min).max(f64::EPSILON);
            for point in &points {
                let width = (((point.weight - y_min) / span) * 40.0).round() as usize;
                out.push_str(&format!(
                    "{:<10} {:>6.1} |{}\n",
                    point.label,
                    point.weight,
                    "#".repeat(width)
                ));
            }
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                out.push_str(&format!(
                    "Change since first entry: {:+.1} kg\n",
                    last.weight - first.weight
                ));
            }
        }
    }
    out
}
