// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Posting-list laws: append order is iteration order, skip-forward lands
//! exactly, and both list families agree.

use std::collections::BTreeSet;

use proptest::prelude::*;

use skipjack::postings::{
    OffsetPair, Posting, PostingCursor, PostingListDelta, PostingListVec, PositionsCursor,
};

fn doc_ids() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::btree_set(0u32..5000, 1..400).prop_map(|s: BTreeSet<u32>| {
        s.into_iter().collect()
    })
}

fn posting_for(doc_id: u32) -> Posting {
    // term frequency varies with the doc id so streams have uneven widths
    let tf = (doc_id % 4 + 1) as u32;
    let offsets = (0..tf)
        .map(|i| OffsetPair::new(doc_id % 7 + i * 9, doc_id % 7 + i * 9 + 3))
        .collect();
    let positions = (0..tf).map(|i| doc_id % 5 + i * 2).collect();
    Posting::new(doc_id, offsets, positions)
}

fn build_delta(docs: &[u32]) -> PostingListDelta {
    let mut list = PostingListDelta::new("t");
    for &d in docs {
        list.add_posting(&posting_for(d), None);
    }
    list
}

proptest! {
    #[test]
    fn iteration_yields_appended_postings(docs in doc_ids()) {
        let list = build_delta(&docs);
        prop_assert_eq!(list.size(), docs.len());

        let mut cursor = list.begin().unwrap();
        for &doc in &docs {
            prop_assert!(!cursor.is_end());
            let want = posting_for(doc);
            prop_assert_eq!(cursor.doc_id(), doc);
            prop_assert_eq!(cursor.term_freq(), want.term_freq());
            let offsets = cursor.offset_pairs().collect_remaining().unwrap();
            prop_assert_eq!(offsets, want.offsets);

            let mut positions = PositionsCursor::empty();
            cursor.assign_positions(&mut positions);
            for &p in &want.positions {
                prop_assert_eq!(positions.pop().unwrap(), p);
            }
            prop_assert!(positions.is_end());

            cursor.advance().unwrap();
        }
        prop_assert!(cursor.is_end());
    }

    #[test]
    fn skip_forward_positions_exactly(docs in doc_ids(), targets in prop::collection::vec(0u32..5200, 1..20)) {
        let list = build_delta(&docs);
        for &target in &targets {
            let mut cursor = list.begin().unwrap();
            cursor.skip_forward(target).unwrap();
            match docs.iter().copied().find(|&d| d >= target) {
                Some(want) => {
                    prop_assert!(!cursor.is_end());
                    prop_assert_eq!(cursor.doc_id(), want);
                    // the posting under the cursor is intact after the skip
                    prop_assert_eq!(cursor.term_freq(), posting_for(want).term_freq());
                    prop_assert_eq!(
                        cursor.offset_pairs().collect_remaining().unwrap(),
                        posting_for(want).offsets
                    );
                }
                None => prop_assert!(cursor.is_end()),
            }
        }
    }

    #[test]
    fn skip_forward_is_monotone_within_one_cursor(docs in doc_ids()) {
        let list = build_delta(&docs);
        let mut cursor = list.begin().unwrap();
        let mut last = None;
        for &target in docs.iter().step_by(3) {
            cursor.skip_forward(target).unwrap();
            prop_assert!(!cursor.is_end());
            prop_assert!(cursor.doc_id() >= target);
            if let Some(prev) = last {
                prop_assert!(cursor.doc_id() >= prev);
            }
            last = Some(cursor.doc_id());
        }
    }

    #[test]
    fn both_families_agree(docs in doc_ids()) {
        let delta = build_delta(&docs);
        let mut vec_list = PostingListVec::new("t");
        for &d in &docs {
            vec_list.add_posting(posting_for(d), None);
        }

        let mut a = delta.begin().unwrap();
        let mut b = vec_list.begin();
        while !a.is_end() && !b.is_end() {
            prop_assert_eq!(a.doc_id(), b.doc_id());
            prop_assert_eq!(a.term_freq(), b.term_freq());
            prop_assert_eq!(
                a.offset_pairs().collect_remaining().unwrap(),
                b.offset_pairs().collect_remaining().unwrap()
            );
            a.advance().unwrap();
            b.advance().unwrap();
        }
        prop_assert!(a.is_end() && b.is_end());
    }
}
