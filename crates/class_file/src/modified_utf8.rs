//! Decoding for the modified UTF-8 encoding used by `CONSTANT_Utf8_info`
//! entries (§4.4.7): NUL is written as `C0 80` and supplementary characters
//! as two 3-byte encoded surrogates.

/// Decodes `bytes`, returning the offset of the first malformed byte on
/// failure. Unpaired surrogates decode to U+FFFD.
pub(crate) fn decode(bytes: &[u8]) -> Result<String, usize> {
    if bytes.iter().all(|b| *b != 0 && *b < 0x80) {
        return Ok(bytes.iter().map(|b| *b as char).collect());
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let a = bytes[i] as u16;
        match a >> 4 {
            0..=7 => {
                units.push(a);
                i += 1;
            }
            12 | 13 => {
                let b = continuation(bytes, i + 1)?;
                units.push(((a & 0x1F) << 6) | b);
                i += 2;
            }
            14 => {
                let b = continuation(bytes, i + 1)?;
                let c = continuation(bytes, i + 2)?;
                units.push(((a & 0x0F) << 12) | (b << 6) | c);
                i += 3;
            }
            _ => return Err(i),
        }
    }

    Ok(String::from_utf16_lossy(&units))
}

fn continuation(bytes: &[u8], i: usize) -> Result<u16, usize> {
    match bytes.get(i) {
        Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
        _ => Err(i),
    }
}
