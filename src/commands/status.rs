use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::ReportRunManifest;
use crate::util::read_json_file;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.output_root.join("manifests");

    info!(output_root = %args.output_root.display(), "status requested");

    match latest_manifest_path(&manifest_dir)? {
        Some(path) => {
            let manifest: ReportRunManifest = read_json_file(&path)?;
            info!(
                path = %path.display(),
                run_id = %manifest.run_id,
                status = %manifest.status,
                started_at = %manifest.started_at,
                completed_at = %manifest.completed_at,
                phrase_sort = %manifest.phrase_sort,
                document_rows = manifest.counts.document_rows_total,
                rows_skipped = manifest.counts.document_rows_skipped,
                qualifying_rows = manifest.counts.qualifying_rows,
                phrases = manifest.counts.phrase_count,
                orphan_phrases = manifest.counts.orphan_phrase_count,
                candidates = manifest.counts.candidate_rows,
                warnings = manifest.warnings.len(),
                "loaded report run manifest"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no report run manifest found"),
    }

    let reports = [
        ("augmented", "documents_augmented.csv"),
        ("maintenance", "phrase_maintenance.csv"),
        ("building", "phrase_building.csv"),
    ];

    for (report, filename) in reports {
        let path = args.output_root.join(filename);

        if path.exists() {
            let rows = count_data_rows(&path)?;
            info!(report, path = %path.display(), rows, "report present");
        } else {
            warn!(report, path = %path.display(), "report missing");
        }
    }

    Ok(())
}

fn latest_manifest_path(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    let mut manifest_paths = Vec::new();

    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let name = entry.file_name().to_string_lossy().to_string();

        if name.starts_with("report_run_") && name.ends_with(".json") {
            manifest_paths.push(entry.path());
        }
    }

    // Run ids embed a compact UTC timestamp, so lexical order is
    // chronological order.
    manifest_paths.sort();

    Ok(manifest_paths.pop())
}

fn count_data_rows(path: &Path) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut rows = 0_usize;
    for result in reader.records() {
        result.with_context(|| format!("failed to read row in {}", path.display()))?;
        rows += 1;
    }

    Ok(rows)
}
