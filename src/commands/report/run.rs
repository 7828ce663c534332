use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::ReportArgs;
use crate::model::{ReportCounts, ReportPaths, ReportRunManifest, TableSource};
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
};

use super::aggregate::aggregate_phrases;
use super::candidates::{FrequencyIndex, build_candidates};
use super::classify::{classify_documents, flag_pattern};
use super::tables::{
    load_documents, load_phrases, write_augmented, write_building, write_maintenance,
};
use super::types::LOOKUP_MISS;

pub fn run(args: ReportArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("report-{}", utc_compact_string(started_ts));

    info!(
        documents = %args.documents_path.display(),
        phrases = %args.phrases_path.display(),
        run_id = %run_id,
        "starting report"
    );

    let documents_sha256 = sha256_file(&args.documents_path)?;
    let phrases_sha256 = sha256_file(&args.phrases_path)?;

    let documents = load_documents(&args.documents_path)?;
    let phrases = load_phrases(&args.phrases_path)?;

    let pattern = flag_pattern()?;
    let classified = classify_documents(&documents, &phrases, &pattern);
    let frequencies = FrequencyIndex::build(&documents.records, &pattern);
    let aggregated = aggregate_phrases(&phrases, &classified, args.phrase_sort);
    let (candidates, candidate_rows_before_dedup) =
        build_candidates(&documents.records, &frequencies);

    let mut warnings = Vec::new();

    if documents.skipped_rows > 0 {
        warn!(
            skipped = documents.skipped_rows,
            "document rows shorter than the required schema were skipped"
        );
        warnings.push(format!(
            "skipped {} document rows shorter than the required schema",
            documents.skipped_rows
        ));
    }

    for (phrase_id, row_count) in &aggregated.orphans {
        warn!(
            phrase_id = %phrase_id,
            rows = row_count,
            "qualifying documents reference a phrase missing from the reference table"
        );
        warnings.push(format!(
            "phrase {phrase_id} has {row_count} qualifying documents but no reference entry"
        ));
    }

    let lookup_miss_count = classified
        .iter()
        .filter(|record| record.matches.review_default == LOOKUP_MISS)
        .count() as u64;

    let counts = ReportCounts {
        document_rows_total: documents.records.len() + documents.skipped_rows,
        document_rows_classified: classified.len(),
        document_rows_skipped: documents.skipped_rows,
        phrase_count: phrases.entries.len(),
        qualifying_rows: aggregated.qualifying_rows,
        orphan_phrase_count: aggregated.orphans.len(),
        orphan_rows: aggregated.orphans.iter().map(|(_, rows)| rows).sum(),
        lookup_miss_count,
        zero_hit_phrase_count: aggregated
            .aggregates
            .iter()
            .filter(|aggregate| aggregate.total_hits == 0)
            .count(),
        candidate_rows_before_dedup,
        candidate_rows: candidates.len(),
    };

    if args.dry_run {
        info!(
            document_rows = counts.document_rows_classified,
            qualifying_rows = counts.qualifying_rows,
            phrases = counts.phrase_count,
            candidates = counts.candidate_rows,
            "report dry-run complete"
        );
        return Ok(());
    }

    let output_root = args.output_root.clone();
    let manifest_dir = output_root.join("manifests");
    ensure_directory(&output_root)?;
    ensure_directory(&manifest_dir)?;

    let augmented_path = output_root.join("documents_augmented.csv");
    let maintenance_path = output_root.join("phrase_maintenance.csv");
    let building_path = output_root.join("phrase_building.csv");
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!("report_run_{}.json", utc_compact_string(started_ts)))
    });

    write_augmented(&augmented_path, &documents, &classified, &frequencies)?;
    write_maintenance(&maintenance_path, &phrases, &aggregated.aggregates)?;
    write_building(&building_path, &candidates)?;

    let manifest = ReportRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        status: "completed".to_string(),
        started_at,
        completed_at: now_utc_string(),
        command: render_report_command(&args),
        phrase_sort: args.phrase_sort.as_str().to_string(),
        paths: ReportPaths {
            output_root: output_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            augmented_path: augmented_path.display().to_string(),
            maintenance_path: maintenance_path.display().to_string(),
            building_path: building_path.display().to_string(),
        },
        counts,
        sources: vec![
            TableSource {
                path: args.documents_path.display().to_string(),
                sha256: documents_sha256,
                data_rows: documents.records.len() + documents.skipped_rows,
            },
            TableSource {
                path: args.phrases_path.display().to_string(),
                sha256: phrases_sha256,
                data_rows: phrases.entries.len(),
            },
        ],
        warnings,
        notes: vec![
            "Phrase maintenance criteria: phrase is not 0, status is Manually Indexed, indexer review is Yes.".to_string(),
            "Phrase building criteria: phrase is 0, status is Manually Indexed.".to_string(),
        ],
    };

    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote report run manifest");
    info!(
        augmented_rows = manifest.counts.document_rows_classified,
        maintenance_rows = manifest.counts.phrase_count,
        building_rows = manifest.counts.candidate_rows,
        "report completed"
    );

    Ok(())
}

fn render_report_command(args: &ReportArgs) -> String {
    let mut command = format!(
        "phraseaudit report --documents-path {} --phrases-path {} --output-root {} --phrase-sort {}",
        args.documents_path.display(),
        args.phrases_path.display(),
        args.output_root.display(),
        args.phrase_sort.as_str()
    );

    if let Some(manifest_path) = &args.manifest_path {
        command.push_str(&format!(" --manifest-path {}", manifest_path.display()));
    }
    if args.dry_run {
        command.push_str(" --dry-run");
    }

    command
}
