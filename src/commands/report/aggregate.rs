use std::collections::HashMap;

use crate::cli::PhraseSort;

use super::types::{
    ClassifiedRecord, DocumentRecord, MANUALLY_INDEXED, MatchOutcome, PhraseAggregate, PhraseTable,
    REVIEW_CONFIRMED, is_no_phrase,
};

#[derive(Debug)]
pub struct AggregateOutcome {
    pub aggregates: Vec<PhraseAggregate>,
    pub qualifying_rows: u64,
    /// Phrase ids seen on qualifying documents but absent from the reference
    /// table, with the number of documents affected. Sorted by phrase id.
    pub orphans: Vec<(String, u64)>,
}

pub fn qualifies_for_maintenance(record: &DocumentRecord) -> bool {
    !is_no_phrase(&record.phrase_id)
        && record.indexing_status == MANUALLY_INDEXED
        && record.indexer_review_flag == REVIEW_CONFIRMED
}

/// One aggregate per reference-table phrase, zero-filled for phrases with no
/// qualifying documents. Qualifying documents whose phrase id has no
/// reference entry land in `orphans` instead of a counter bucket.
pub fn aggregate_phrases(
    phrases: &PhraseTable,
    classified: &[ClassifiedRecord],
    sort: PhraseSort,
) -> AggregateOutcome {
    let mut aggregates: Vec<PhraseAggregate> = phrases
        .entries
        .iter()
        .map(|entry| PhraseAggregate::new(entry.phrase_id.clone()))
        .collect();

    let positions: HashMap<&str, usize> = phrases
        .entries
        .iter()
        .enumerate()
        .map(|(position, entry)| (entry.phrase_id.as_str(), position))
        .collect();

    let mut qualifying_rows = 0_u64;
    let mut orphan_counts: HashMap<String, u64> = HashMap::new();

    for classified_record in classified {
        let record = &classified_record.record;
        if !qualifies_for_maintenance(record) {
            continue;
        }

        qualifying_rows += 1;

        let Some(position) = positions.get(record.phrase_id.as_str()) else {
            *orphan_counts.entry(record.phrase_id.clone()).or_insert(0) += 1;
            continue;
        };

        let aggregate = &mut aggregates[*position];
        let matches = &classified_record.matches;

        aggregate.total_hits += 1;

        if matches.member == MatchOutcome::NeedsReview {
            aggregate.member_changed += 1;
        }
        if matches.summary == MatchOutcome::NeedsReview {
            aggregate.summary_changed += 1;
        }
        if matches.dos == MatchOutcome::NeedsReview {
            aggregate.dos_changed += 1;
        }
        if matches.signature == MatchOutcome::NeedsReview {
            aggregate.signature_changed += 1;
        }
        if matches.patient == MatchOutcome::NeedsReview {
            aggregate.patient_changed += 1;
        }
        if matches.patient != MatchOutcome::NotFound
            && matches.provider == MatchOutcome::NeedsReview
        {
            aggregate.provider_changed_patient_found += 1;
        }
    }

    if sort == PhraseSort::Hits {
        // Stable sort keeps reference-table order for equal hit counts.
        aggregates.sort_by(|left, right| right.total_hits.cmp(&left.total_hits));
    }

    let mut orphans: Vec<(String, u64)> = orphan_counts.into_iter().collect();
    orphans.sort_by(|left, right| left.0.cmp(&right.0));

    AggregateOutcome {
        aggregates,
        qualifying_rows,
        orphans,
    }
}
