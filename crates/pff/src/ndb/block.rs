//! Blocks and block trailers.
//!
//! Every allocated block ends with a fixed-width trailer echoing its
//! identifier and payload size next to a checksum of the stored bytes.
//! Blocks are allocated on the profile's alignment, so the trailer sits
//! at the end of the aligned footprint with padding between it and the
//! payload.
//!
//! A node's data may span several blocks through a data tree: an
//! internal block listing external data blocks (level 1) or further
//! level-1 blocks (level 2).

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read, Seek};

use super::{block_id::*, format::*, header::CryptMethod, page::*, *};
use crate::{
    crc::compute_crc,
    encode::{cyclic, permute},
    source::ByteSource,
};

/// Allocated size of a block with a `size`-byte payload, trailer and
/// alignment padding included.
pub(crate) fn block_footprint(profile: &FormatProfile, size: u16) -> u32 {
    let total = u32::from(size) + profile.block_trailer_size as u32;
    let alignment = profile.block_alignment as u32;

    if total >= profile.max_block_footprint {
        profile.max_block_footprint
    } else {
        let tail = total % alignment;
        if tail == 0 {
            total
        } else {
            total - tail + alignment
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct BlockTrailer {
    size: u16,
    signature: u16,
    crc: u32,
    block_id: u64,
}

impl BlockTrailer {
    pub(crate) fn read(profile: &FormatProfile, f: &mut dyn Read) -> io::Result<Self> {
        let size = f.read_u16::<LittleEndian>()?;
        let signature = f.read_u16::<LittleEndian>()?;

        // The 32-bit layout stores the block identifier before the
        // checksum; the 64-bit layouts store it after. The 4k layout
        // pads the trailer out to 72 bytes past these fields.
        let (crc, block_id) = match profile.kind {
            FormatKind::Ansi => {
                let block_id = u64::from(f.read_u32::<LittleEndian>()?);
                (f.read_u32::<LittleEndian>()?, block_id)
            }
            _ => {
                let crc = f.read_u32::<LittleEndian>()?;
                (crc, f.read_u64::<LittleEndian>()?)
            }
        };

        Ok(Self {
            size,
            signature,
            crc,
            block_id,
        })
    }

    pub(crate) fn signature(&self) -> u16 {
        self.signature
    }

    /// Check the trailer against the b-tree entry that led here and the
    /// stored payload bytes.
    pub(crate) fn verify(&self, entry: &BlockEntry, stored: &[u8]) -> PffResult<()> {
        if self.size != entry.size() {
            return Err(PffError::InvalidBlockSize(self.size));
        }
        if self.block_id != u64::from(entry.block()) {
            return Err(PffError::InvalidBlockTrailerId(self.block_id));
        }
        let crc = compute_crc(0, stored);
        if crc != self.crc {
            return Err(PffError::InvalidBlockCrc(crc));
        }
        Ok(())
    }
}

/// Read one block's payload, validate its trailer and undo the stream
/// transform for external blocks.
pub(crate) fn read_block_payload<R>(
    source: &ByteSource<R>,
    profile: &FormatProfile,
    crypt_method: CryptMethod,
    entry: &BlockEntry,
) -> io::Result<Vec<u8>>
where
    R: Read + Seek,
{
    let footprint = block_footprint(profile, entry.size());
    let trailer_size = profile.block_trailer_size as u32;
    if footprint < u32::from(entry.size()) + trailer_size {
        return Err(PffError::InvalidBlockSize(entry.size()).into());
    }

    let mut data = source.read_vec_at(entry.file_offset(), usize::from(entry.size()))?;

    let trailer_offset = entry.file_offset() + u64::from(footprint - trailer_size);
    let trailer_buf = source.read_vec_at(trailer_offset, profile.block_trailer_size)?;
    let trailer = BlockTrailer::read(profile, &mut trailer_buf.as_slice())?;
    trailer.verify(entry, &data)?;

    if !entry.block().is_internal() {
        match crypt_method {
            CryptMethod::Permute => permute::decode_block(&mut data),
            CryptMethod::Cyclic => {
                cyclic::encode_decode_block(&mut data, entry.block().cyclic_key())
            }
            CryptMethod::None => {}
        }
    }

    Ok(data)
}

/// Header of a data tree block.
#[derive(Copy, Clone, Debug)]
pub(crate) struct DataTreeHeader {
    level: u8,
    entry_count: u16,
    total_size: u32,
}

impl DataTreeHeader {
    pub(crate) const SIZE: usize = 8;

    pub(crate) fn read(f: &mut dyn Read) -> io::Result<Self> {
        let block_type = f.read_u8()?;
        if block_type != 0x01 {
            return Err(PffError::InvalidDataTreeBlockType(block_type).into());
        }

        let level = f.read_u8()?;
        if !(1..=2).contains(&level) {
            return Err(PffError::InvalidDataTreeLevel(level).into());
        }

        let entry_count = f.read_u16::<LittleEndian>()?;
        let total_size = f.read_u32::<LittleEndian>()?;

        Ok(Self {
            level,
            entry_count,
            total_size,
        })
    }

    pub(crate) fn level(&self) -> u8 {
        self.level
    }

    pub(crate) fn total_size(&self) -> u32 {
        self.total_size
    }
}

/// Parse a data tree block payload into its header and child block ids.
pub(crate) fn read_data_tree(
    profile: &FormatProfile,
    payload: &[u8],
) -> io::Result<(DataTreeHeader, Vec<BlockId>)> {
    let mut cursor = payload;
    let header = DataTreeHeader::read(&mut cursor)?;

    let entries_size = usize::from(header.entry_count) * profile.identifier_width;
    if DataTreeHeader::SIZE + entries_size > payload.len() {
        return Err(PffError::InvalidDataTreeEntryCount(header.entry_count).into());
    }

    let entries = (0..header.entry_count)
        .map(|_| read_identifier(profile, &mut cursor).map(BlockId::from))
        .collect::<io::Result<Vec<_>>>()?;

    Ok((header, entries))
}
