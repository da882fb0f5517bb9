//! Permutative transform.
//!
//! Every byte maps through a fixed substitution table, independent of
//! its position or the owning block.

use super::*;

/// Encode a data block in place.
pub fn encode_block(data: &mut [u8]) {
    permute(data, key_data_r());
}

/// Decode a data block in place.
pub fn decode_block(data: &mut [u8]) {
    permute(data, key_data_i());
}

fn permute(data: &mut [u8], table: &[u8; 256]) {
    for b in data.iter_mut() {
        *b = table[*b as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"Hello, World!";

    #[test]
    fn test_encode_block() {
        let mut data = SAMPLE.to_vec();
        encode_block(&mut data);
        assert_ne!(SAMPLE, &data);
    }

    #[test]
    fn test_decode_block() {
        let mut data = SAMPLE.to_vec();
        encode_block(&mut data);
        decode_block(&mut data);
        assert_eq!(SAMPLE, &data);
    }

    #[test]
    fn test_decode_zero_bytes() {
        let mut data = vec![0_u8; 32];
        decode_block(&mut data);
        assert!(data.iter().all(|&b| b == data[0]));
        assert_eq!(data[0], key_data_i()[0]);
    }
}
