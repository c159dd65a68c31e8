//! Properties of the call sequence.

use proptest::prelude::*;

use sitesearch::coalescer::CallSequence;

proptest! {
    #[test]
    fn length_never_exceeds_capacity(
        queries in prop::collection::vec("[a-z]{1,6}", 0..80),
        capacity in 0usize..16,
    ) {
        let mut sequence = CallSequence::<String>::new(capacity);
        for query in &queries {
            sequence.append(query.clone());
            prop_assert!(sequence.len() <= sequence.capacity());
        }
        prop_assert_eq!(sequence.len(), queries.len().min(capacity.max(1)));
    }

    #[test]
    fn sequence_numbers_strictly_increase(
        batches in prop::collection::vec(prop::collection::vec("[a-z]{1,4}", 1..8), 1..6),
    ) {
        let mut sequence = CallSequence::<String>::new(64);
        let mut last_seq = None;
        for batch in batches {
            for query in batch {
                let seq = sequence.append(query);
                prop_assert!(last_seq.is_none_or(|last| seq > last));
                last_seq = Some(seq);
            }
            sequence.clear();
        }
    }

    #[test]
    fn latest_is_last_appended_and_evicted_cannot_resolve(
        queries in prop::collection::vec("[a-z]{1,6}", 1..50),
        capacity in 1usize..10,
    ) {
        let mut sequence = CallSequence::<String>::new(capacity);
        let seqs: Vec<u64> = queries.iter().map(|q| sequence.append(q.clone())).collect();

        let latest = sequence.latest().unwrap();
        prop_assert_eq!(&latest.query, queries.last().unwrap());
        prop_assert!(!latest.is_resolved());

        let evicted = seqs.len().saturating_sub(capacity);
        for (index, seq) in seqs.iter().enumerate() {
            let kept = index >= evicted;
            prop_assert_eq!(sequence.resolve(*seq, format!("r{seq}")), kept);
            prop_assert_eq!(sequence.get(*seq).is_some(), kept);
        }
        prop_assert!(sequence.records().all(|record| record.is_resolved()));
    }
}
