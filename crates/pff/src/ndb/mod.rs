//! ## Node database layer
//!
//! The on-disk index structures of a PFF container: the file header, the
//! node and block b-trees, block trailers, data trees and per-node local
//! descriptors.

use std::io;
use thiserror::Error;

pub mod block;
pub mod block_id;
pub mod btree;
pub mod format;
pub mod header;
pub mod local_descriptors;
pub mod node_id;
pub mod page;

use page::PageType;

#[derive(Error, Debug)]
pub enum PffError {
    #[error("Invalid header signature: 0x{0:08X}")]
    InvalidSignature(u32),
    #[error("Unknown content type: 0x{0:04X}")]
    UnknownContentType(u16),
    #[error("Unknown format type: 0x{0:04X}")]
    UnknownFormatType(u16),
    #[error("Unknown encryption type: 0x{0:02X}")]
    UnknownCryptMethod(u8),
    #[error("Invalid node type: 0x{0:02X}")]
    InvalidNodeIdType(u8),
    #[error("Invalid node index: 0x{0:08X}")]
    InvalidNodeIndex(u32),
    #[error("Node identifier out of range: 0x{0:X}")]
    InvalidNodeId(u64),
    #[error("Block index out of range: 0x{0:X}")]
    InvalidBlockIndex(u64),
    #[error("Mismatch between page type and its repeated byte: (0x{0:02X}, 0x{1:02X})")]
    MismatchPageTypeRepeat(u8, u8),
    #[error("Invalid page type: 0x{0:02X}")]
    InvalidPageType(u8),
    #[error("Unexpected page type: {0:?}")]
    UnexpectedPageType(PageType),
    #[error("Invalid page checksum: 0x{0:08X}")]
    InvalidPageCrc(u32),
    #[error("Page identifier does not match its branch entry: 0x{0:X}")]
    InvalidPageBlockId(u64),
    #[error("Invalid b-tree page level: {0}")]
    InvalidBTreePageLevel(u8),
    #[error("Invalid b-tree page entry count: {0}")]
    InvalidBTreeEntryCount(usize),
    #[error("Invalid b-tree page entry size: {0}")]
    InvalidBTreeEntrySize(usize),
    #[error("Invalid block size: 0x{0:X}")]
    InvalidBlockSize(u16),
    #[error("Invalid block checksum: 0x{0:08X}")]
    InvalidBlockCrc(u32),
    #[error("Block trailer identifier mismatch: 0x{0:X}")]
    InvalidBlockTrailerId(u64),
    #[error("Block not found in block b-tree: 0x{0:X}")]
    BlockNotFound(u64),
    #[error("Invalid data tree block type: 0x{0:02X}")]
    InvalidDataTreeBlockType(u8),
    #[error("Invalid data tree level: {0}")]
    InvalidDataTreeLevel(u8),
    #[error("Invalid data tree entry count: {0}")]
    InvalidDataTreeEntryCount(u16),
    #[error("Data tree entry is not an external block: 0x{0:X}")]
    InvalidDataTreeBlockId(u64),
    #[error("Data tree is shorter than its declared size: 0x{0:X}")]
    InvalidDataTreeTotalSize(u32),
    #[error("Invalid local descriptors signature: 0x{0:02X}")]
    InvalidLocalDescriptorsSignature(u8),
    #[error("Invalid local descriptors level: {0}")]
    InvalidLocalDescriptorsLevel(u8),
    #[error("Invalid local descriptors entry count: {0}")]
    InvalidLocalDescriptorsEntryCount(u16),
    #[error("Local descriptors root is not an internal block: 0x{0:X}")]
    InvalidLocalDescriptorsBlockId(u64),
    #[error("Failed to lock byte source")]
    FailedToLockFile,
}

impl From<PffError> for io::Error {
    fn from(err: PffError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

pub type PffResult<T> = Result<T, PffError>;
