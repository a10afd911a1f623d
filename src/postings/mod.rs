// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Posting lists and their iterator families.

pub mod bloom;
pub mod cursor;
pub mod delta;
pub mod posting;
pub mod vec;

pub use bloom::{BloomSidecar, Presence, TermBloom};
pub use cursor::{OffsetPairsCursor, PositionsCursor, PostingCursor};
pub use delta::{DeltaCursor, PostingListDelta, BLOCK_CAP};
pub use posting::{DocId, OffsetPair, Position, Posting};
pub use vec::{PostingListVec, VecCursor};
