#![doc = include_str!("../README.md")]

use std::{
    fs::File,
    io::{self, Read, Seek},
    path::Path,
};

pub mod crc;
pub mod encode;
pub mod ndb;

mod source;

use ndb::{
    block::{read_block_payload, read_data_tree},
    btree::find_entry,
    format::FormatProfile,
    header::Header,
    local_descriptors::{read_local_descriptors_block, LocalDescriptorsBlock},
};

pub use ndb::{
    block_id::BlockId,
    format::FormatKind,
    header::{ContentType, CryptMethod},
    local_descriptors::{LocalDescriptorEntry, LocalDescriptors},
    node_id::{NodeId, NodeIdType},
    page::{BlockEntry, NodeEntry},
    PffError, PffResult,
};
pub use source::ByteSource;

/// Immutable per-file state derived from the header.
#[derive(Debug)]
pub struct Context {
    content_type: ContentType,
    profile: &'static FormatProfile,
    crypt_method: CryptMethod,
    node_btree: u64,
    block_btree: u64,
}

impl Context {
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn format(&self) -> FormatKind {
        self.profile.kind
    }

    pub fn crypt_method(&self) -> CryptMethod {
        self.crypt_method
    }

    /// File offset of the node b-tree root page.
    pub fn node_btree(&self) -> u64 {
        self.node_btree
    }

    /// File offset of the block b-tree root page.
    pub fn block_btree(&self) -> u64 {
        self.block_btree
    }
}

/// A node's decrypted payload and parsed local-descriptor index.
#[derive(Debug)]
pub struct Node {
    payload: Vec<u8>,
    local_descriptors: LocalDescriptors,
}

impl Node {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn local_descriptors(&self) -> &LocalDescriptors {
        &self.local_descriptors
    }
}

/// Reader over one PFF container.
///
/// Lookups and node reads are pure functions of the file contents, so
/// repeated calls yield byte-equal results and a shared reference can be
/// used from several threads. The backing file closes when the reader is
/// dropped.
#[derive(Debug)]
pub struct PffReader<R = File> {
    source: ByteSource<R>,
    context: Context,
}

impl PffReader<File> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::with_source(File::open(path)?)
    }
}

impl<R> PffReader<R>
where
    R: Read + Seek,
{
    /// Build a reader over any seekable byte stream.
    pub fn with_source(inner: R) -> io::Result<Self> {
        let source = ByteSource::new(inner);
        let header = Header::read(&source)?;
        let context = Context {
            content_type: header.content_type,
            profile: header.profile,
            crypt_method: header.crypt_method,
            node_btree: header.node_btree,
            block_btree: header.block_btree,
        };

        Ok(Self { source, context })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Look `node` up in the node b-tree.
    pub fn lookup_node(&self, node: NodeId) -> io::Result<Option<NodeEntry>> {
        find_entry(
            &self.source,
            self.context.profile,
            self.context.node_btree,
            node.search_key(),
        )
    }

    /// Look `block` up in the block b-tree. The internal bit does not
    /// participate in the search.
    pub fn lookup_block(&self, block: BlockId) -> io::Result<Option<BlockEntry>> {
        find_entry(
            &self.source,
            self.context.profile,
            self.context.block_btree,
            block.search_key(),
        )
    }

    /// Read a block's logical payload: decrypted for external blocks,
    /// reassembled from the whole tree when `block` roots a data tree.
    pub fn read_block(&self, block: BlockId) -> io::Result<Option<Vec<u8>>> {
        let Some(entry) = self.lookup_block(block)? else {
            return Ok(None);
        };

        let payload = read_block_payload(
            &self.source,
            self.context.profile,
            self.context.crypt_method,
            &entry,
        )?;

        if entry.block().is_internal() && payload.first() == Some(&0x01) {
            return Ok(Some(self.assemble_data_tree(&payload)?));
        }

        Ok(Some(payload))
    }

    /// Read a node: its contiguous decrypted payload and its parsed
    /// local-descriptor index. An identifier absent from the node b-tree
    /// is `Ok(None)`.
    pub fn read_node(&self, node: NodeId) -> io::Result<Option<Node>> {
        let Some(entry) = self.lookup_node(node)? else {
            return Ok(None);
        };

        let payload = self.read_node_data(entry.data())?;
        let local_descriptors = match entry.sub_node() {
            Some(root) => self.read_local_descriptors(root)?,
            None => LocalDescriptors::default(),
        };

        Ok(Some(Node {
            payload,
            local_descriptors,
        }))
    }

    fn resolve_block(&self, block: BlockId) -> io::Result<BlockEntry> {
        self.lookup_block(block)?
            .ok_or_else(|| PffError::BlockNotFound(u64::from(block)).into())
    }

    fn read_single_block(&self, entry: &BlockEntry) -> io::Result<Vec<u8>> {
        read_block_payload(
            &self.source,
            self.context.profile,
            self.context.crypt_method,
            entry,
        )
    }

    fn read_node_data(&self, block: BlockId) -> io::Result<Vec<u8>> {
        let entry = self.resolve_block(block)?;
        let payload = self.read_single_block(&entry)?;

        if !block.is_internal() {
            return Ok(payload);
        }

        self.assemble_data_tree(&payload)
    }

    /// Concatenate the external blocks referenced by a data tree, in
    /// listed order, and truncate to the declared total size.
    fn assemble_data_tree(&self, root_payload: &[u8]) -> io::Result<Vec<u8>> {
        let profile = self.context.profile;
        let (header, children) = read_data_tree(profile, root_payload)?;

        let mut data = Vec::with_capacity(header.total_size() as usize);
        match header.level() {
            1 => {
                for child in children {
                    data.extend(self.read_leaf_data_block(child)?);
                }
            }
            _ => {
                for child in children {
                    let entry = self.resolve_block(child)?;
                    let payload = self.read_single_block(&entry)?;
                    let (child_header, grandchildren) = read_data_tree(profile, &payload)?;
                    if child_header.level() != 1 {
                        return Err(PffError::InvalidDataTreeLevel(child_header.level()).into());
                    }

                    for grandchild in grandchildren {
                        data.extend(self.read_leaf_data_block(grandchild)?);
                    }
                }
            }
        }

        let total = header.total_size() as usize;
        if data.len() < total {
            return Err(PffError::InvalidDataTreeTotalSize(header.total_size()).into());
        }
        data.truncate(total);

        Ok(data)
    }

    fn read_leaf_data_block(&self, block: BlockId) -> io::Result<Vec<u8>> {
        if block.is_internal() {
            return Err(PffError::InvalidDataTreeBlockId(u64::from(block)).into());
        }

        let entry = self.resolve_block(block)?;
        self.read_single_block(&entry)
    }

    /// Collect the local-descriptor tree rooted at `root` into a sorted
    /// index.
    fn read_local_descriptors(&self, root: BlockId) -> io::Result<LocalDescriptors> {
        if !root.is_internal() {
            return Err(PffError::InvalidLocalDescriptorsBlockId(u64::from(root)).into());
        }

        let mut entries = Vec::new();
        self.walk_local_descriptors(root, None, &mut entries)?;
        Ok(LocalDescriptors::from_entries(entries))
    }

    fn walk_local_descriptors(
        &self,
        block: BlockId,
        expected_level: Option<u8>,
        out: &mut Vec<LocalDescriptorEntry>,
    ) -> io::Result<()> {
        let entry = self.resolve_block(block)?;
        let payload = self.read_single_block(&entry)?;

        match read_local_descriptors_block(self.context.profile, &payload)? {
            LocalDescriptorsBlock::Leaf(leaf_entries) => {
                if matches!(expected_level, Some(level) if level != 0) {
                    return Err(PffError::InvalidLocalDescriptorsLevel(0).into());
                }
                out.extend(leaf_entries);
            }
            LocalDescriptorsBlock::Branch {
                level,
                entries: branch_entries,
            } => {
                if matches!(expected_level, Some(expected) if expected != level) {
                    return Err(PffError::InvalidLocalDescriptorsLevel(level).into());
                }

                for branch in branch_entries {
                    self.walk_local_descriptors(branch.block(), Some(level - 1), out)?;
                }
            }
        }

        Ok(())
    }
}
