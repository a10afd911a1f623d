// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Integer stream codecs backing the posting-list format.

pub mod packed;
pub mod varint;

pub use packed::{PackedBlock, PackedWriter, PACK_ITEM_COUNT};
pub use varint::{VarintBuffer, VarintReader};
