//! Identifier lookup over the node and block b-trees.
//!
//! Both trees share the same page shape and the same descent rule: at a
//! branch, follow the last entry whose key is less than or equal to the
//! target; at a leaf, the target either matches exactly or is absent.
//! Branch keys are strictly increasing, so the rule selects the unique
//! child whose subtree can contain the key.

use std::io::{self, Read, Seek};

use super::{format::*, page::*, *};
use crate::source::ByteSource;

/// A leaf entry type of one of the two b-trees.
pub(crate) trait BTreeLeafEntry: Copy {
    const PAGE_TYPE: PageType;

    fn entry_size(profile: &FormatProfile) -> usize;
    fn read(profile: &FormatProfile, f: &mut dyn Read) -> io::Result<Self>;
    fn key(&self) -> u64;
}

impl BTreeLeafEntry for NodeEntry {
    const PAGE_TYPE: PageType = PageType::NodeBTree;

    fn entry_size(profile: &FormatProfile) -> usize {
        profile.nbt_leaf_entry_size
    }

    fn read(profile: &FormatProfile, f: &mut dyn Read) -> io::Result<Self> {
        NodeEntry::read(profile, f)
    }

    fn key(&self) -> u64 {
        self.node().search_key()
    }
}

impl BTreeLeafEntry for BlockEntry {
    const PAGE_TYPE: PageType = PageType::BlockBTree;

    fn entry_size(profile: &FormatProfile) -> usize {
        profile.bbt_leaf_entry_size
    }

    fn read(profile: &FormatProfile, f: &mut dyn Read) -> io::Result<Self> {
        BlockEntry::read(profile, f)
    }

    fn key(&self) -> u64 {
        self.block().search_key()
    }
}

/// Walk the tree rooted at `root` looking for `key`.
///
/// Every visited page must carry the page type of the tree being walked,
/// and branch levels must strictly decrease on the way down; either
/// violation is corruption and fails the lookup. A key absent from the
/// tree is `Ok(None)`.
pub(crate) fn find_entry<R, E>(
    source: &ByteSource<R>,
    profile: &FormatProfile,
    root: u64,
    key: u64,
) -> io::Result<Option<E>>
where
    R: Read + Seek,
    E: BTreeLeafEntry,
{
    let mut offset = root;
    let mut parent_level = None;
    let mut expected_block_id = None;

    loop {
        let page = BTreePage::read(source, profile, offset)?;
        if page.page_type() != E::PAGE_TYPE {
            return Err(PffError::UnexpectedPageType(page.page_type()).into());
        }
        if let Some(parent_level) = parent_level {
            if page.level() + 1 != parent_level {
                return Err(PffError::InvalidBTreePageLevel(page.level()).into());
            }
        }
        if let Some(expected) = expected_block_id {
            if page.trailer().block_id() != expected {
                return Err(PffError::InvalidPageBlockId(page.trailer().block_id()).into());
            }
        }

        if page.level() == 0 {
            if page.entry_size() < E::entry_size(profile) {
                return Err(PffError::InvalidBTreeEntrySize(page.entry_size()).into());
            }

            for mut slice in page.entry_slices() {
                let entry = E::read(profile, &mut slice)?;
                if entry.key() == key {
                    return Ok(Some(entry));
                }
                if entry.key() > key {
                    break;
                }
            }
            return Ok(None);
        }

        let entries = page.read_branch_entries(profile)?;
        let Some(child) = entries.iter().take_while(|entry| entry.key() <= key).last() else {
            // The key sorts before the whole subtree.
            return Ok(None);
        };

        parent_level = Some(page.level());
        expected_block_id = Some(child.block());
        offset = child.file_offset();
    }
}
