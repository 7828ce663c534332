use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSource {
    pub path: String,
    pub sha256: String,
    pub data_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPaths {
    pub output_root: String,
    pub manifest_dir: String,
    pub augmented_path: String,
    pub maintenance_path: String,
    pub building_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportCounts {
    pub document_rows_total: usize,
    pub document_rows_classified: usize,
    pub document_rows_skipped: usize,
    pub phrase_count: usize,
    pub qualifying_rows: u64,
    pub orphan_phrase_count: usize,
    pub orphan_rows: u64,
    pub lookup_miss_count: u64,
    pub zero_hit_phrase_count: usize,
    pub candidate_rows_before_dedup: usize,
    pub candidate_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub engine_version: String,
    pub status: String,
    pub started_at: String,
    pub completed_at: String,
    pub command: String,
    pub phrase_sort: String,
    pub paths: ReportPaths,
    pub counts: ReportCounts,
    pub sources: Vec<TableSource>,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}
