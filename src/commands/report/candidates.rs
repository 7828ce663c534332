use std::collections::{HashMap, HashSet};

use regex::Regex;

use super::types::{CandidateEntry, DocumentRecord, MANUALLY_INDEXED, is_no_phrase};

/// Per-(document type, summary line) occurrence counts over the documents
/// that qualify for phrase building. Computed once, then attached both to
/// every augmented row sharing the key and to the candidate list.
#[derive(Debug, Default)]
pub struct FrequencyIndex {
    no_phrase: HashMap<(String, String), u64>,
    no_patient: HashMap<(String, String), u64>,
}

impl FrequencyIndex {
    pub fn build(records: &[DocumentRecord], flag_pattern: &Regex) -> Self {
        let mut index = Self::default();

        for record in records {
            if !eligible_for_building(record) {
                continue;
            }

            let key = (record.document_type.clone(), record.summary_line.clone());
            *index.no_phrase.entry(key.clone()).or_insert(0) += 1;

            if flag_pattern.is_match(&record.patient_flag_text) {
                *index.no_patient.entry(key).or_insert(0) += 1;
            }
        }

        index
    }

    pub fn no_phrase_count(&self, document_type: &str, summary_line: &str) -> u64 {
        self.no_phrase
            .get(&(document_type.to_string(), summary_line.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn no_patient_count(&self, document_type: &str, summary_line: &str) -> u64 {
        self.no_patient
            .get(&(document_type.to_string(), summary_line.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

pub fn eligible_for_building(record: &DocumentRecord) -> bool {
    is_no_phrase(&record.phrase_id) && record.indexing_status == MANUALLY_INDEXED
}

/// Deduplicated candidate list, sorted by the no-phrase count then the
/// no-patient count, both descending. The trailing key columns make the
/// order total so ties come out deterministic.
pub fn build_candidates(
    records: &[DocumentRecord],
    frequencies: &FrequencyIndex,
) -> (Vec<CandidateEntry>, usize) {
    let mut eligible_rows = 0_usize;
    let mut unique: HashSet<CandidateEntry> = HashSet::new();

    for record in records {
        if !eligible_for_building(record) {
            continue;
        }

        eligible_rows += 1;
        unique.insert(CandidateEntry {
            document_type: record.document_type.clone(),
            summary_line: record.summary_line.clone(),
            no_phrase_count: frequencies
                .no_phrase_count(&record.document_type, &record.summary_line),
            no_patient_count: frequencies
                .no_patient_count(&record.document_type, &record.summary_line),
        });
    }

    let mut candidates: Vec<CandidateEntry> = unique.into_iter().collect();
    candidates.sort_by(|left, right| {
        right
            .no_phrase_count
            .cmp(&left.no_phrase_count)
            .then_with(|| right.no_patient_count.cmp(&left.no_patient_count))
            .then_with(|| left.document_type.cmp(&right.document_type))
            .then_with(|| left.summary_line.cmp(&right.summary_line))
    });

    (candidates, eligible_rows)
}
