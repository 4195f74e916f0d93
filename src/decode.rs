use crate::catalog::Encoding;

/// Raw words that cannot be interpreted under the claimed encoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("{encoding:?} takes {expected} words, got {actual}")]
    WordCountMismatch { encoding: Encoding, expected: usize, actual: usize },
}

/// Interpret raw register words and apply the scale factor.
///
/// The 32-bit variants arrive low word first — a vendor quirk, not network
/// byte order. Unit handling stays with the caller.
pub fn decode(words: &[u16], encoding: Encoding, factor: f64) -> Result<f64, DecodeError> {
    let expected = usize::from(encoding.word_count());
    if words.len() != expected {
        return Err(DecodeError::WordCountMismatch { encoding, expected, actual: words.len() });
    }
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let raw = match encoding {
        Encoding::U16 => i64::from(words[0]),
        Encoding::I16 => i64::from(words[0] as i16),
        Encoding::U32SwappedWords => i64::from(u32::from(words[1]) << 16 | u32::from(words[0])),
        Encoding::I32SwappedWords => {
            i64::from((u32::from(words[1]) << 16 | u32::from(words[0])) as i32)
        }
        Encoding::I8 => i64::from((words[0] & 0xFF) as u8 as i8),
    };
    #[expect(clippy::cast_precision_loss)]
    let value = raw as f64 * factor;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn u16_is_identity() {
        assert_abs_diff_eq!(decode(&[0x0000], Encoding::U16, 1.0).unwrap(), 0.0);
        assert_abs_diff_eq!(decode(&[0x8000], Encoding::U16, 1.0).unwrap(), 32768.0);
        assert_abs_diff_eq!(decode(&[0xFFFF], Encoding::U16, 1.0).unwrap(), 65535.0);
    }

    #[test]
    fn i16_sign_correction() {
        assert_abs_diff_eq!(decode(&[0x7FFF], Encoding::I16, 1.0).unwrap(), 32767.0);
        assert_abs_diff_eq!(decode(&[0x8000], Encoding::I16, 1.0).unwrap(), -32768.0);
        assert_abs_diff_eq!(decode(&[0xFFF6], Encoding::I16, 1.0).unwrap(), -10.0);
    }

    #[test]
    fn u32_swapped_assembles_low_word_first() {
        assert_abs_diff_eq!(
            decode(&[0x5678, 0x1234], Encoding::U32SwappedWords, 1.0).unwrap(),
            f64::from(0x1234_5678_u32),
        );
        assert_abs_diff_eq!(
            decode(&[0xFFFF, 0xFFFF], Encoding::U32SwappedWords, 1.0).unwrap(),
            4_294_967_295.0,
        );
    }

    #[test]
    fn i32_swapped_sign_boundary() {
        assert_abs_diff_eq!(
            decode(&[0xFFFF, 0x7FFF], Encoding::I32SwappedWords, 1.0).unwrap(),
            2_147_483_647.0,
        );
        assert_abs_diff_eq!(
            decode(&[0x0000, 0x8000], Encoding::I32SwappedWords, 1.0).unwrap(),
            -2_147_483_648.0,
        );
        assert_abs_diff_eq!(
            decode(&[0xFFFF, 0xFFFF], Encoding::I32SwappedWords, 1.0).unwrap(),
            -1.0,
        );
    }

    #[test]
    fn i8_masks_high_byte_and_signs() {
        assert_abs_diff_eq!(decode(&[0x007F], Encoding::I8, 1.0).unwrap(), 127.0);
        assert_abs_diff_eq!(decode(&[0x0080], Encoding::I8, 1.0).unwrap(), -128.0);
        assert_abs_diff_eq!(decode(&[0x00FF], Encoding::I8, 1.0).unwrap(), -1.0);
        // The high byte must not leak into the value.
        assert_abs_diff_eq!(decode(&[0xAB05], Encoding::I8, 1.0).unwrap(), 5.0);
    }

    #[test]
    fn factor_scales_after_sign_correction() {
        assert_abs_diff_eq!(decode(&[0xFFF6], Encoding::I16, 0.1).unwrap(), -1.0);
        assert_abs_diff_eq!(decode(&[123], Encoding::U16, 10.0).unwrap(), 1230.0);
    }

    #[test]
    fn word_count_mismatch() {
        assert!(matches!(
            decode(&[1, 2], Encoding::U16, 1.0),
            Err(DecodeError::WordCountMismatch { expected: 1, actual: 2, .. }),
        ));
        assert!(matches!(
            decode(&[1], Encoding::I32SwappedWords, 1.0),
            Err(DecodeError::WordCountMismatch { expected: 2, actual: 1, .. }),
        ));
        assert!(matches!(
            decode(&[], Encoding::I8, 1.0),
            Err(DecodeError::WordCountMismatch { expected: 1, actual: 0, .. }),
        ));
    }
}
