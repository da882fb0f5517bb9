//! Per-node local descriptors.
//!
//! A node may carry a secondary index that maps sub-node identifiers
//! (attachments, recipient tables and the like) to their own data
//! blocks. The index is a small b-tree stored in internal blocks: a
//! one-byte signature, a level, an entry count, then packed entries.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

use super::{block_id::*, format::*, node_id::*, page::read_identifier, *};

const LOCAL_DESCRIPTORS_SIGNATURE: u8 = 0x02;

/// Leaf entry: a sub-node scoped to one parent node.
#[derive(Copy, Clone, Debug)]
pub struct LocalDescriptorEntry {
    node: NodeId,
    data: BlockId,
    sub_descriptors: Option<BlockId>,
}

impl LocalDescriptorEntry {
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Block holding the sub-node's data, possibly a data tree root.
    pub fn data(&self) -> BlockId {
        self.data
    }

    /// Nested local-descriptor tree of the sub-node, if any.
    pub fn sub_descriptors(&self) -> Option<BlockId> {
        self.sub_descriptors
    }

    fn read(profile: &FormatProfile, f: &mut dyn Read) -> io::Result<Self> {
        let node = read_identifier(profile, f)?;
        let Ok(node) = u32::try_from(node) else {
            return Err(PffError::InvalidNodeId(node).into());
        };
        let node = NodeId::from(node);

        let data = BlockId::from(read_identifier(profile, f)?);

        let sub_descriptors = BlockId::from(read_identifier(profile, f)?);
        let sub_descriptors = if u64::from(sub_descriptors) == 0 {
            None
        } else {
            Some(sub_descriptors)
        };

        Ok(Self {
            node,
            data,
            sub_descriptors,
        })
    }
}

/// Branch entry pointing at a child local-descriptor block.
#[derive(Copy, Clone, Debug)]
pub(crate) struct LocalDescriptorBranchEntry {
    key: u64,
    block: BlockId,
}

impl LocalDescriptorBranchEntry {
    pub(crate) fn block(&self) -> BlockId {
        self.block
    }

    fn read(profile: &FormatProfile, f: &mut dyn Read) -> io::Result<Self> {
        let key = read_identifier(profile, f)?;
        let block = BlockId::from(read_identifier(profile, f)?);
        Ok(Self { key, block })
    }
}

/// One parsed block of the local-descriptor tree.
#[derive(Debug)]
pub(crate) enum LocalDescriptorsBlock {
    Branch {
        level: u8,
        entries: Vec<LocalDescriptorBranchEntry>,
    },
    Leaf(Vec<LocalDescriptorEntry>),
}

pub(crate) fn read_local_descriptors_block(
    profile: &FormatProfile,
    payload: &[u8],
) -> io::Result<LocalDescriptorsBlock> {
    let mut cursor = payload;

    let signature = cursor.read_u8()?;
    if signature != LOCAL_DESCRIPTORS_SIGNATURE {
        return Err(PffError::InvalidLocalDescriptorsSignature(signature).into());
    }

    let level = cursor.read_u8()?;
    if level > 8 {
        return Err(PffError::InvalidLocalDescriptorsLevel(level).into());
    }

    let entry_count = cursor.read_u16::<LittleEndian>()?;

    let entry_size = if level == 0 {
        3 * profile.identifier_width
    } else {
        2 * profile.identifier_width
    };
    let entries_size = usize::from(entry_count) * entry_size;
    if profile.local_descriptors_header_size + entries_size > payload.len() {
        return Err(PffError::InvalidLocalDescriptorsEntryCount(entry_count).into());
    }

    let mut cursor = &payload[profile.local_descriptors_header_size..];

    if level == 0 {
        let entries = (0..entry_count)
            .map(|_| LocalDescriptorEntry::read(profile, &mut cursor))
            .collect::<io::Result<Vec<_>>>()?;
        Ok(LocalDescriptorsBlock::Leaf(entries))
    } else {
        let entries = (0..entry_count)
            .map(|_| LocalDescriptorBranchEntry::read(profile, &mut cursor))
            .collect::<io::Result<Vec<_>>>()?;
        Ok(LocalDescriptorsBlock::Branch { level, entries })
    }
}

/// The fully parsed secondary index of one node.
#[derive(Default, Debug)]
pub struct LocalDescriptors {
    entries: Vec<LocalDescriptorEntry>,
}

impl LocalDescriptors {
    pub(crate) fn from_entries(mut entries: Vec<LocalDescriptorEntry>) -> Self {
        entries.sort_by_key(|entry| u32::from(entry.node()));
        Self { entries }
    }

    pub fn entries(&self) -> &[LocalDescriptorEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn find(&self, node: NodeId) -> Option<&LocalDescriptorEntry> {
        self.entries
            .binary_search_by_key(&u32::from(node), |entry| u32::from(entry.node()))
            .ok()
            .map(|index| &self.entries[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_block_unicode() {
        let profile = FormatKind::Unicode.profile();
        let mut payload = vec![0x02, 0, 2, 0, 0, 0, 0, 0];
        for (node, data, sub) in [(0x8025_u64, 0x84_u64, 0_u64), (0x8045, 0x92, 0x89)] {
            payload.extend_from_slice(&node.to_le_bytes());
            payload.extend_from_slice(&data.to_le_bytes());
            payload.extend_from_slice(&sub.to_le_bytes());
        }

        let LocalDescriptorsBlock::Leaf(entries) =
            read_local_descriptors_block(profile, &payload).unwrap()
        else {
            panic!("expected a leaf block");
        };

        assert_eq!(entries.len(), 2);
        assert_eq!(u32::from(entries[0].node()), 0x8025);
        assert_eq!(u64::from(entries[0].data()), 0x84);
        assert!(entries[0].sub_descriptors().is_none());
        assert_eq!(u64::from(entries[1].sub_descriptors().unwrap()), 0x89);
    }

    #[test]
    fn test_branch_block_ansi() {
        let profile = FormatKind::Ansi.profile();
        let mut payload = vec![0x02, 1, 1, 0];
        payload.extend_from_slice(&0x8025_u32.to_le_bytes());
        payload.extend_from_slice(&0x91_u32.to_le_bytes());

        let LocalDescriptorsBlock::Branch { level, entries } =
            read_local_descriptors_block(profile, &payload).unwrap()
        else {
            panic!("expected a branch block");
        };

        assert_eq!(level, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(u64::from(entries[0].block()), 0x91);
    }

    #[test]
    fn test_rejects_bad_signature() {
        let profile = FormatKind::Unicode.profile();
        let payload = vec![0x01, 0, 0, 0, 0, 0, 0, 0];

        let err = read_local_descriptors_block(profile, &payload).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_rejects_overflowing_entry_count() {
        let profile = FormatKind::Unicode.profile();
        let payload = vec![0x02, 0, 0xFF, 0xFF, 0, 0, 0, 0];

        let err = read_local_descriptors_block(profile, &payload).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_find() {
        let entries = vec![
            LocalDescriptorEntry {
                node: NodeId::from(0x8045),
                data: BlockId::from(0x92),
                sub_descriptors: None,
            },
            LocalDescriptorEntry {
                node: NodeId::from(0x8025),
                data: BlockId::from(0x84),
                sub_descriptors: None,
            },
        ];
        let index = LocalDescriptors::from_entries(entries);

        assert_eq!(index.len(), 2);
        let found = index.find(NodeId::from(0x8045)).unwrap();
        assert_eq!(u64::from(found.data()), 0x92);
        assert!(index.find(NodeId::from(0x8026)).is_none());
    }
}
