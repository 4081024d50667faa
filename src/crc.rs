//! Sensirion CRC-8 (polynomial 0x31, init 0xFF) over 16-bit data words.

const CRC8_POLYNOMIAL: u8 = 0x31;
const CRC8_INIT: u8 = 0xFF;

#[inline]
pub fn sensirion_crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = CRC8_INIT;

    for &b in data {
        crc ^= b;
        for _ in 0..8 {
            crc = if (crc & 0x80) != 0 {
                (crc << 1) ^ CRC8_POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }

    crc
}

/// Encodes a word as it goes on the wire: big-endian bytes followed by the CRC.
pub fn encode_word(word: u16) -> [u8; 3] {
    let [msb, lsb] = word.to_be_bytes();
    [msb, lsb, sensirion_crc8(&[msb, lsb])]
}

/// Splits `buf` into 3-byte chunks and checks every CRC.
///
/// Returns `None` on the first mismatch. `words.len()` must be `buf.len() / 3`.
pub fn decode_words(buf: &[u8], words: &mut [u16]) -> Option<()> {
    for (chunk, word) in buf.chunks_exact(3).zip(words.iter_mut()) {
        if sensirion_crc8(&chunk[..2]) != chunk[2] {
            return None;
        }
        *word = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datasheet_example() {
        // 0xBEEF -> 0x92
        assert_eq!(sensirion_crc8(&[0xBE, 0xEF]), 0x92);
    }

    #[test]
    fn test_encode_word() {
        assert_eq!(encode_word(0xBEEF), [0xBE, 0xEF, 0x92]);
        assert_eq!(encode_word(0x0000), [0x00, 0x00, 0x81]);
    }

    #[test]
    fn test_decode_words() {
        let buf = [0xBE, 0xEF, 0x92, 0x00, 0x00, 0x81];
        let mut words = [0u16; 2];
        assert!(decode_words(&buf, &mut words).is_some());
        assert_eq!(words, [0xBEEF, 0x0000]);
    }

    #[test]
    fn test_decode_words_bad_crc() {
        let buf = [0xBE, 0xEF, 0x92, 0x00, 0x00, 0x80];
        let mut words = [0u16; 2];
        assert!(decode_words(&buf, &mut words).is_none());
    }
}
