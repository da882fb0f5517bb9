//! Format variants and their layout constants.
//!
//! A PFF container comes in three variants: the legacy 32-bit layout,
//! the 64-bit layout, and the 64-bit layout with 4096-byte pages used by
//! newer OST files. Every field offset and integer width that differs
//! between them lives in a [`FormatProfile`], selected once while the
//! header is parsed and held by reference for the life of a reader.

use super::*;

/// `wVer` discriminator from the file header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FormatKind {
    /// 32-bit (ANSI) format, version 14 or 15.
    Ansi,
    /// 64-bit (Unicode) format, version 21 or 23.
    Unicode,
    /// 64-bit format with 4096-byte pages, version 36.
    Unicode4k,
}

impl TryFrom<u16> for FormatKind {
    type Error = PffError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            14..=15 => Ok(FormatKind::Ansi),
            21 | 23 => Ok(FormatKind::Unicode),
            36 => Ok(FormatKind::Unicode4k),
            _ => Err(PffError::UnknownFormatType(value)),
        }
    }
}

impl FormatKind {
    pub fn profile(self) -> &'static FormatProfile {
        match self {
            FormatKind::Ansi => &ANSI_PROFILE,
            FormatKind::Unicode => &UNICODE_PROFILE,
            FormatKind::Unicode4k => &UNICODE_4K_PROFILE,
        }
    }
}

/// Layout constants for one format variant.
///
/// Page footer offsets are relative to the page base. The entries area
/// occupies `[0, btree_entries_size)`; the page checksum covers
/// `[0, page_type_offset)`.
#[derive(Debug)]
pub struct FormatProfile {
    pub kind: FormatKind,
    pub page_size: usize,
    pub btree_entries_size: usize,
    pub entry_count_offset: usize,
    pub entry_count_width: usize,
    pub max_entries_offset: usize,
    pub max_entries_width: usize,
    pub entry_size_offset: usize,
    pub level_offset: usize,
    pub page_type_offset: usize,
    pub identifier_width: usize,
    pub offset_width: usize,
    pub branch_entry_size: usize,
    pub nbt_leaf_entry_size: usize,
    pub bbt_leaf_entry_size: usize,
    pub block_trailer_size: usize,
    pub block_alignment: usize,
    pub max_block_footprint: u32,
    pub nbt_root_offset: u64,
    pub bbt_root_offset: u64,
    pub crypt_method_offset: u64,
    pub local_descriptors_header_size: usize,
}

pub(crate) const ANSI_PROFILE: FormatProfile = FormatProfile {
    kind: FormatKind::Ansi,
    page_size: 512,
    btree_entries_size: 496,
    entry_count_offset: 496,
    entry_count_width: 1,
    max_entries_offset: 497,
    max_entries_width: 1,
    entry_size_offset: 498,
    level_offset: 499,
    page_type_offset: 500,
    identifier_width: 4,
    offset_width: 4,
    branch_entry_size: 12,
    nbt_leaf_entry_size: 16,
    bbt_leaf_entry_size: 12,
    block_trailer_size: 12,
    block_alignment: 64,
    max_block_footprint: 8192,
    nbt_root_offset: 188,
    bbt_root_offset: 196,
    crypt_method_offset: 461,
    local_descriptors_header_size: 4,
};

pub(crate) const UNICODE_PROFILE: FormatProfile = FormatProfile {
    kind: FormatKind::Unicode,
    page_size: 512,
    btree_entries_size: 488,
    entry_count_offset: 488,
    entry_count_width: 1,
    max_entries_offset: 489,
    max_entries_width: 1,
    entry_size_offset: 490,
    level_offset: 491,
    page_type_offset: 496,
    identifier_width: 8,
    offset_width: 8,
    branch_entry_size: 24,
    nbt_leaf_entry_size: 32,
    bbt_leaf_entry_size: 24,
    block_trailer_size: 16,
    block_alignment: 64,
    max_block_footprint: 8192,
    nbt_root_offset: 224,
    bbt_root_offset: 240,
    crypt_method_offset: 513,
    local_descriptors_header_size: 8,
};

pub(crate) const UNICODE_4K_PROFILE: FormatProfile = FormatProfile {
    kind: FormatKind::Unicode4k,
    page_size: 4096,
    btree_entries_size: 4056,
    entry_count_offset: 4056,
    entry_count_width: 2,
    max_entries_offset: 4058,
    max_entries_width: 2,
    entry_size_offset: 4060,
    level_offset: 4061,
    page_type_offset: 4072,
    identifier_width: 8,
    offset_width: 8,
    branch_entry_size: 24,
    nbt_leaf_entry_size: 32,
    bbt_leaf_entry_size: 24,
    block_trailer_size: 72,
    block_alignment: 512,
    max_block_footprint: 65536,
    nbt_root_offset: 224,
    bbt_root_offset: 240,
    crypt_method_offset: 513,
    local_descriptors_header_size: 8,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_kind_codes() {
        assert_eq!(FormatKind::try_from(14).unwrap(), FormatKind::Ansi);
        assert_eq!(FormatKind::try_from(15).unwrap(), FormatKind::Ansi);
        assert_eq!(FormatKind::try_from(21).unwrap(), FormatKind::Unicode);
        assert_eq!(FormatKind::try_from(23).unwrap(), FormatKind::Unicode);
        assert_eq!(FormatKind::try_from(36).unwrap(), FormatKind::Unicode4k);

        for code in [0, 13, 16, 20, 22, 24, 35, 37, u16::MAX] {
            let Err(PffError::UnknownFormatType(value)) = FormatKind::try_from(code) else {
                panic!("format code {code} should be rejected");
            };
            assert_eq!(value, code);
        }
    }

    #[test]
    fn test_profile_footers_fit_in_page() {
        for kind in [FormatKind::Ansi, FormatKind::Unicode, FormatKind::Unicode4k] {
            let profile = kind.profile();
            assert!(profile.btree_entries_size <= profile.entry_count_offset);
            assert!(profile.page_type_offset < profile.page_size);
            assert!(profile.branch_entry_size <= profile.bbt_leaf_entry_size.max(profile.nbt_leaf_entry_size));
        }
    }

    #[test]
    fn test_root_offsets() {
        assert_eq!(ANSI_PROFILE.nbt_root_offset, 188);
        assert_eq!(ANSI_PROFILE.bbt_root_offset, 196);
        assert_eq!(UNICODE_PROFILE.nbt_root_offset, 224);
        assert_eq!(UNICODE_PROFILE.bbt_root_offset, 240);
        assert_eq!(UNICODE_4K_PROFILE.nbt_root_offset, 224);
        assert_eq!(UNICODE_4K_PROFILE.bbt_root_offset, 240);
    }
}
