//! Host-side module image container.
//!
//! The VM core takes raw bytes plus three region ranges; this is the
//! framing a host uses to ship those in one file. Layout, all scalars
//! big-endian:
//!
//! ```text
//! magic "VSPX" | version u8 | data_len u32 | strtab_len u32 | code_len u32
//! | data region | strtab region | code region
//! ```

use std::ops::Range;

use thiserror::Error;

use crate::runtime::module::Module;

const MAGIC: [u8; 4] = *b"VSPX";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 4 + 1 + 4 * 3;

/// Image decoding failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("bad magic")]
    BadMagic,
    #[error("unsupported image version {0}")]
    UnsupportedVersion(u8),
    #[error("image too short: region lengths exceed payload")]
    TooShort,
}

/// A decoded module image: the raw bytes and the three region ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleImage {
    bytes: Vec<u8>,
    data: Range<usize>,
    strtab: Range<usize>,
    code: Range<usize>,
}

impl ModuleImage {
    /// Parse an image from its serialized form.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, ImageError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ImageError::TooShort);
        }
        if bytes[..4] != MAGIC {
            return Err(ImageError::BadMagic);
        }
        if bytes[4] != VERSION {
            return Err(ImageError::UnsupportedVersion(bytes[4]));
        }

        let read_u32 = |offset: usize| {
            u32::from_be_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ]) as usize
        };
        let data_len = read_u32(5);
        let strtab_len = read_u32(9);
        let code_len = read_u32(13);

        let data_start = HEADER_SIZE;
        let strtab_start = data_start.checked_add(data_len).ok_or(ImageError::TooShort)?;
        let code_start = strtab_start.checked_add(strtab_len).ok_or(ImageError::TooShort)?;
        let end = code_start.checked_add(code_len).ok_or(ImageError::TooShort)?;
        if end > bytes.len() {
            return Err(ImageError::TooShort);
        }

        Ok(Self {
            bytes,
            data: data_start..strtab_start,
            strtab: strtab_start..code_start,
            code: code_start..end,
        })
    }

    /// Serialize the three regions into image form.
    pub fn encode(data: &[u8], strtab: &[u8], code: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + data.len() + strtab.len() + code.len());
        out.extend_from_slice(&MAGIC);
        out.push(VERSION);
        out.extend((data.len() as u32).to_be_bytes());
        out.extend((strtab.len() as u32).to_be_bytes());
        out.extend((code.len() as u32).to_be_bytes());
        out.extend_from_slice(data);
        out.extend_from_slice(strtab);
        out.extend_from_slice(code);
        out
    }

    /// Consume the image into a loadable module.
    pub fn into_module(self) -> Module {
        Module::from_regions(self.bytes, self.data, self.strtab, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let encoded = ModuleImage::encode(&[1, 2, 3], &[4, 5], &[6, 7, 8, 9]);
        let image = ModuleImage::decode(encoded).unwrap();
        assert_eq!(image.data.len(), 3);
        assert_eq!(image.strtab.len(), 2);
        assert_eq!(image.code.len(), 4);
        assert_eq!(&image.bytes[image.code.clone()], &[6, 7, 8, 9]);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut encoded = ModuleImage::encode(&[], &[], &[0x00]);
        encoded[0] = b'X';
        assert_eq!(ModuleImage::decode(encoded), Err(ImageError::BadMagic));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut encoded = ModuleImage::encode(&[], &[], &[]);
        encoded[4] = 9;
        assert_eq!(
            ModuleImage::decode(encoded),
            Err(ImageError::UnsupportedVersion(9))
        );
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let mut encoded = ModuleImage::encode(&[1, 2, 3, 4], &[], &[]);
        encoded.truncate(encoded.len() - 2);
        assert_eq!(ModuleImage::decode(encoded), Err(ImageError::TooShort));
    }
}
