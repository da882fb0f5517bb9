//! File header.
//!
//! The first 24 bytes identify the container: a four-byte signature, a
//! two-byte content type tag and a two-byte format version. The rest of
//! the header layout depends on the format variant, so the encryption
//! byte and the two b-tree root offsets are read through the selected
//! [`FormatProfile`].

use byteorder::{ByteOrder, LittleEndian};
use std::io::{self, Read, Seek};

use super::{format::*, *};
use crate::source::ByteSource;

/// On-disk signature `!BDN`, read as a little-endian dword.
const HEADER_SIGNATURE: u32 = u32::from_be_bytes(*b"NDB!");

/// Content type tag `SM`, read as a little-endian word.
const CONTENT_TYPE_PST: u16 = u16::from_be_bytes(*b"MS");
/// Content type tag `SO`, read as a little-endian word.
const CONTENT_TYPE_OST: u16 = u16::from_be_bytes(*b"OS");
/// Content type tag `AB`, read as a little-endian word.
const CONTENT_TYPE_PAB: u16 = u16::from_be_bytes(*b"BA");

/// Content flavor of a PFF container.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ContentType {
    /// Personal Storage Table (`.pst`)
    Pst,
    /// Offline Storage Table (`.ost`)
    Ost,
    /// Personal Address Book (`.pab`)
    Pab,
}

impl TryFrom<u16> for ContentType {
    type Error = PffError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            CONTENT_TYPE_PST => Ok(ContentType::Pst),
            CONTENT_TYPE_OST => Ok(ContentType::Ost),
            CONTENT_TYPE_PAB => Ok(ContentType::Pab),
            _ => Err(PffError::UnknownContentType(value)),
        }
    }
}

/// Encryption applied to external data blocks.
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum CryptMethod {
    /// Data blocks are stored as-is
    #[default]
    None = 0x00,
    /// Permutative transform
    Permute = 0x01,
    /// Cyclic transform keyed by block identifier
    Cyclic = 0x02,
}

impl TryFrom<u8> for CryptMethod {
    type Error = PffError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(CryptMethod::None),
            0x01 => Ok(CryptMethod::Permute),
            0x02 => Ok(CryptMethod::Cyclic),
            _ => Err(PffError::UnknownCryptMethod(value)),
        }
    }
}

/// Parsed header fields a reader holds on to.
#[derive(Debug)]
pub(crate) struct Header {
    pub(crate) content_type: ContentType,
    pub(crate) profile: &'static FormatProfile,
    pub(crate) crypt_method: CryptMethod,
    pub(crate) node_btree: u64,
    pub(crate) block_btree: u64,
}

impl Header {
    pub(crate) fn read<R>(source: &ByteSource<R>) -> io::Result<Self>
    where
        R: Read + Seek,
    {
        let mut fixed = [0_u8; 24];
        source.read_at(0, &mut fixed)?;

        let signature = LittleEndian::read_u32(&fixed[0..4]);
        if signature != HEADER_SIGNATURE {
            return Err(PffError::InvalidSignature(signature).into());
        }

        let content_type = ContentType::try_from(LittleEndian::read_u16(&fixed[8..10]))?;
        let kind = FormatKind::try_from(LittleEndian::read_u16(&fixed[10..12]))?;
        let profile = kind.profile();

        let mut crypt = [0_u8; 1];
        source.read_at(profile.crypt_method_offset, &mut crypt)?;
        let crypt_method = CryptMethod::try_from(crypt[0])?;

        let node_btree = read_root_offset(source, profile, profile.nbt_root_offset)?;
        let block_btree = read_root_offset(source, profile, profile.bbt_root_offset)?;

        Ok(Self {
            content_type,
            profile,
            crypt_method,
            node_btree,
            block_btree,
        })
    }
}

fn read_root_offset<R>(
    source: &ByteSource<R>,
    profile: &FormatProfile,
    offset: u64,
) -> io::Result<u64>
where
    R: Read + Seek,
{
    let mut buf = [0_u8; 8];
    source.read_at(offset, &mut buf[..profile.offset_width])?;
    Ok(LittleEndian::read_u64(&buf))
}
