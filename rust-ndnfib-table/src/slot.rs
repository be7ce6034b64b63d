//! Slot codec.
//!
//! A slot is one `u64`: the high 16 bits hold the tag, the low 48 bits the
//! log offset of the record. Offset zero marks an empty slot, which is why
//! the log never hands out offset zero.

/// Bit position of the tag field.
pub const TAG_SHIFT: u32 = 48;

/// Mask of the offset field.
pub const OFFSET_MASK: u64 = (1 << TAG_SHIFT) - 1;

/// The empty slot.
pub const EMPTY: u64 = 0;

/// Packs a tag and a log offset into a slot word.
#[inline]
pub fn encode(tag: u16, offset: u64) -> u64 {
    debug_assert!(offset <= OFFSET_MASK, "offset {offset:#x} exceeds 48 bits");
    ((tag as u64) << TAG_SHIFT) | offset
}

/// Log offset of a slot word.
#[inline]
pub fn offset_of(slot: u64) -> u64 {
    slot & OFFSET_MASK
}

/// Tag of a slot word.
#[inline]
pub fn tag_of(slot: u64) -> u16 {
    (slot >> TAG_SHIFT) as u16
}

/// Whether a slot word is empty.
#[inline]
pub fn is_empty(slot: u64) -> bool {
    offset_of(slot) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_split() {
        let slot = encode(0x2F62, 0x0000_1234_5678_9ABC);
        assert_eq!(slot, 0x2F62_1234_5678_9ABC);
        assert_eq!(tag_of(slot), 0x2F62);
        assert_eq!(offset_of(slot), 0x1234_5678_9ABC);
        assert!(!is_empty(slot));
    }

    #[test]
    fn test_extremes() {
        let slot = encode(u16::MAX, OFFSET_MASK);
        assert_eq!(slot, u64::MAX);
        assert_eq!(tag_of(slot), u16::MAX);
        assert_eq!(offset_of(slot), OFFSET_MASK);
    }

    #[test]
    fn test_empty_is_offset_zero() {
        assert!(is_empty(EMPTY));
        // A tag alone does not make a slot live.
        assert!(is_empty(encode(b'a' as u16, 0)));
        assert!(!is_empty(encode(0, 1)));
    }
}
