// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Round-trip laws for the var-int and packed-int codecs.

use proptest::prelude::*;

use skipjack::codec::packed::{self, PackedBlock, PACK_ITEM_COUNT};
use skipjack::codec::varint::{self, VarintBuffer, VarintReader};
use skipjack::doc_length::{byte315_to_float, float_to_byte315};

proptest! {
    #[test]
    fn varint_round_trips_any_u32(value in any::<u32>()) {
        let mut buf = Vec::new();
        varint::write_u32(value, &mut buf);
        let (decoded, used) = varint::read_u32(&buf).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(used, buf.len());
        prop_assert!(buf.len() <= varint::MAX_VARINT_BYTES);
    }

    #[test]
    fn varint_streams_round_trip(values in prop::collection::vec(any::<u32>(), 0..200)) {
        let mut buf = VarintBuffer::new();
        for &v in &values {
            buf.append(v);
        }
        let mut reader = VarintReader::new(buf.as_slice());
        for &v in &values {
            prop_assert_eq!(reader.next().unwrap(), v);
        }
        prop_assert!(reader.is_exhausted());
    }

    #[test]
    fn truncated_varint_is_corrupt(value in 128u32..) {
        let mut buf = Vec::new();
        varint::write_u32(value, &mut buf);
        // every strict prefix must fail, never mis-decode
        for cut in 0..buf.len() {
            prop_assert!(varint::read_u32(&buf[..cut]).is_err());
        }
    }

    #[test]
    fn packed_round_trips_128_values(
        values in prop::collection::vec(any::<u32>(), PACK_ITEM_COUNT)
    ) {
        let mut buf = Vec::new();
        packed::encode(&values, &mut buf);
        let block = PackedBlock::decode(&buf).unwrap();
        prop_assert_eq!(block.values(), &values[..]);
        prop_assert_eq!(block.encoded_len(), buf.len());
    }

    #[test]
    fn packed_width_is_minimal(
        values in prop::collection::vec(any::<u32>(), PACK_ITEM_COUNT)
    ) {
        let mut buf = Vec::new();
        packed::encode(&values, &mut buf);
        let block = PackedBlock::decode(&buf).unwrap();
        let max = values.iter().copied().max().unwrap_or(0);
        let want = if max == 0 { 1 } else { 32 - max.leading_zeros() as u8 };
        prop_assert_eq!(block.num_bits(), want);
        // payload is exactly ceil(128 * b / 8) bytes behind the 2-byte header
        prop_assert_eq!(buf.len(), 2 + (PACK_ITEM_COUNT * want as usize + 7) / 8);
    }

    #[test]
    fn doc_length_quantisation_error_is_bounded(length in 1u32..1_000_000) {
        let decoded = byte315_to_float(float_to_byte315(length as f32));
        let rel = (length as f32 - decoded).abs() / length as f32;
        prop_assert!(rel <= 0.125);
    }
}
