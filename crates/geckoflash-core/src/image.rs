//! Firmware image handling
//!
//! A firmware image is a flat sequence of little-endian 32-bit words with no
//! header, loaded in full before programming begins. The program algorithm
//! consumes the words strictly in order.

use alloc::vec::Vec;

/// An ordered, immutable sequence of 32-bit words to be programmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    words: Vec<u32>,
}

impl FirmwareImage {
    /// Parse an image from raw little-endian bytes
    ///
    /// A trailing partial word is padded with 0xFF, the erased-flash fill,
    /// so the last bytes of an unaligned file still reach the device.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut words = Vec::with_capacity(bytes.len().div_ceil(4));
        for chunk in bytes.chunks(4) {
            let mut word = [0xFFu8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            words.push(u32::from_le_bytes(word));
        }
        FirmwareImage { words }
    }

    /// The words, in programming order
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of words in the image
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the image holds no words
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Image size in bytes as it will occupy flash
    pub fn byte_len(&self) -> u32 {
        self.words.len() as u32 * 4
    }
}

impl From<Vec<u32>> for FirmwareImage {
    fn from(words: Vec<u32>) -> Self {
        FirmwareImage { words }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_little_endian_order() {
        let img = FirmwareImage::from_bytes(&[0x78, 0x56, 0x34, 0x12, 0x01, 0x00, 0x00, 0xA0]);
        assert_eq!(img.words(), &[0x1234_5678, 0xA000_0001]);
        assert_eq!(img.byte_len(), 8);
    }

    #[test]
    fn test_trailing_bytes_padded_with_erased_fill() {
        let img = FirmwareImage::from_bytes(&[0xAA, 0xBB]);
        assert_eq!(img.words(), &[0xFFFF_BBAA]);
    }

    #[test]
    fn test_empty_image() {
        let img = FirmwareImage::from_bytes(&[]);
        assert!(img.is_empty());
        assert_eq!(img.len(), 0);
        assert_eq!(img.byte_len(), 0);
    }

    #[test]
    fn test_from_words() {
        let img = FirmwareImage::from(vec![1, 2, 3]);
        assert_eq!(img.len(), 3);
    }
}
