//! BOCU-1: Binary Ordered Compression for Unicode, PDIC variant.
//!
//! BOCU-1 encodes each code point as the difference from a running "previous"
//! anchor. Byte-wise comparison of encoded strings matches code point order, and
//! text drawn from one small script compresses to roughly one byte per character.
//!
//! # Byte layout
//! ```text
//! 0x00..=0x20   C0 controls and space, encoded literally
//! 0x21          lead of a 4-byte negative difference
//! 0x22..=0x24   lead of a 3-byte negative difference
//! 0x25..=0x4F   lead of a 2-byte negative difference
//! 0x50..=0xCF   single-byte difference, centred on 0x90
//! 0xD0..=0xFA   lead of a 2-byte positive difference
//! 0xFB..=0xFD   lead of a 3-byte positive difference
//! 0xFE          lead of a 4-byte positive difference
//! 0xFF          state reset
//! ```
//!
//! Trail bytes use 243 values: 0x21..=0xFF plus 20 C0 control bytes that are never
//! needed literally inside a multi-byte sequence.
//!
//! The differencing state lives in a [`Bocu1State`] value that every public
//! function creates fresh, so no state ever leaks between fields.

use thiserror::Error;

/// Initial value for "prev": the middle of the ASCII range.
const ASCII_PREV: i32 = 0x40;

const MIN: i32 = 0x21;
const MIDDLE: i32 = 0x90;
const MAX_TRAIL: i32 = 0xff;
const RESET: u8 = 0xff;

/// C0 control byte values that double as trail bytes.
const TRAIL_CONTROLS_COUNT: i32 = 20;
const TRAIL_BYTE_OFFSET: i32 = MIN - TRAIL_CONTROLS_COUNT;

/// Radix of the trail byte digits.
const TRAIL_COUNT: i32 = (MAX_TRAIL - MIN + 1) + TRAIL_CONTROLS_COUNT;

/// Positive and negative single-byte codes (0 counts as positive).
const SINGLE: i32 = 64;

/// Lead byte counts for each direction of 2/3-byte sequences.
const LEAD_2: i32 = 43;
const LEAD_3: i32 = 3;

const REACH_POS_1: i32 = SINGLE - 1;
const REACH_NEG_1: i32 = -SINGLE;

const REACH_POS_2: i32 = REACH_POS_1 + LEAD_2 * TRAIL_COUNT;
const REACH_NEG_2: i32 = REACH_NEG_1 - LEAD_2 * TRAIL_COUNT;

const REACH_POS_3: i32 = REACH_POS_2 + LEAD_3 * TRAIL_COUNT * TRAIL_COUNT;
const REACH_NEG_3: i32 = REACH_NEG_2 - LEAD_3 * TRAIL_COUNT * TRAIL_COUNT;

const START_POS_2: i32 = MIDDLE + REACH_POS_1 + 1;
const START_POS_3: i32 = START_POS_2 + LEAD_2;
const START_POS_4: i32 = START_POS_3 + LEAD_3;

const START_NEG_2: i32 = MIDDLE + REACH_NEG_1;
const START_NEG_3: i32 = START_NEG_2 - LEAD_2;

const MAX_CODE_POINT: i32 = 0x10ffff;

/// Trail values 0..20 to the C0 control byte that carries them.
const TRAIL_TO_BYTE: [u8; TRAIL_CONTROLS_COUNT as usize] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x10, 0x11, //
    0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, //
    0x1c, 0x1d, 0x1e, 0x1f,
];

/// Bytes 0x00..=0x20 to trail values. `None` marks controls that only ever
/// encode themselves (NUL, BEL..SI, SUB, ESC, space).
const BYTE_TO_TRAIL: [Option<u8>; 0x21] = [
    None, Some(0x00), Some(0x01), Some(0x02), Some(0x03), Some(0x04), Some(0x05), None,
    None, None, None, None, None, None, None, None,
    Some(0x06), Some(0x07), Some(0x08), Some(0x09), Some(0x0a), Some(0x0b), Some(0x0c), Some(0x0d),
    Some(0x0e), Some(0x0f), None, None, Some(0x10), Some(0x11), Some(0x12), Some(0x13),
    None,
];

/// Failure to decode a BOCU-1 byte sequence.
///
/// Offsets are byte positions within the decoded input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Bocu1Error {
    #[error("illegal trail byte {byte:#04x} at offset {offset}")]
    IllegalTrailByte { byte: u8, offset: usize },

    #[error("sequence starting at offset {offset} is missing {missing} trail byte(s)")]
    TruncatedSequence { offset: usize, missing: usize },

    #[error("sequence at offset {offset} decodes to {value:#x}, outside the code point range")]
    CodePointOutOfRange { value: i64, offset: usize },

    #[error("decoded text contains an unpaired surrogate")]
    UnpairedSurrogate,
}

/// The differencing state shared by the encoder and decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bocu1State {
    prev: i32,
}

impl Default for Bocu1State {
    fn default() -> Self {
        Self::new()
    }
}

impl Bocu1State {
    pub fn new() -> Self {
        Self { prev: ASCII_PREV }
    }

    pub fn reset(&mut self) {
        self.prev = ASCII_PREV;
    }

    /// Current "previous" anchor.
    pub fn prev(&self) -> i32 {
        self.prev
    }

    /// Appends the encoding of one code point and advances the state.
    pub fn encode_code_point(&mut self, c: u32, out: &mut Vec<u8>) {
        let c = c as i32;
        if c <= 0x20 {
            // Literal; controls reset the state, space keeps it.
            if c != 0x20 {
                self.reset();
            }
            out.push(c as u8);
            return;
        }

        let mut diff = c - self.prev;
        self.prev = anchor(c);

        let (lead, count) = if diff >= REACH_NEG_1 {
            if diff <= REACH_POS_1 {
                out.push((MIDDLE + diff) as u8);
                return;
            } else if diff <= REACH_POS_2 {
                diff -= REACH_POS_1 + 1;
                (START_POS_2, 1)
            } else if diff <= REACH_POS_3 {
                diff -= REACH_POS_2 + 1;
                (START_POS_3, 2)
            } else {
                diff -= REACH_POS_3 + 1;
                (START_POS_4, 3)
            }
        } else if diff >= REACH_NEG_2 {
            diff -= REACH_NEG_1;
            (START_NEG_2, 1)
        } else if diff >= REACH_NEG_3 {
            diff -= REACH_NEG_2;
            (START_NEG_3, 2)
        } else {
            diff -= REACH_NEG_3;
            (START_NEG_3 - LEAD_3, 3)
        };

        // Digits in base TRAIL_COUNT, most significant first. Floor division keeps
        // negative differences in range; the quotient left over lands in the lead.
        let mut trail = [0u8; 3];
        for slot in trail[..count].iter_mut().rev() {
            let m = diff.rem_euclid(TRAIL_COUNT);
            diff = diff.div_euclid(TRAIL_COUNT);
            *slot = trail_to_byte(m);
        }
        out.push((lead + diff) as u8);
        out.extend_from_slice(&trail[..count]);
    }
}

/// Chooses the next anchor so the following difference stays small.
fn anchor(c: i32) -> i32 {
    match c {
        // Hiragana is not 128-aligned
        0x3040..=0x309f => 0x3070,
        // CJK Unihan
        0x4e00..=0x9fa5 => 0x4e00 - REACH_NEG_2,
        // Hangul
        0xac00..=0xd7a3 => (0xd7a3 + 0xac00) / 2,
        _ => (c & !0x7f) + ASCII_PREV,
    }
}

fn trail_to_byte(t: i32) -> u8 {
    if t >= TRAIL_CONTROLS_COUNT {
        (t + TRAIL_BYTE_OFFSET) as u8
    } else {
        TRAIL_TO_BYTE[t as usize]
    }
}

fn byte_to_trail(b: u8, offset: usize) -> Result<i32, Bocu1Error> {
    if b <= 0x20 {
        BYTE_TO_TRAIL[b as usize]
            .map(i32::from)
            .ok_or(Bocu1Error::IllegalTrailByte { byte: b, offset })
    } else {
        Ok(i32::from(b) - TRAIL_BYTE_OFFSET)
    }
}

/// Encodes a string.
pub fn encode(text: &str) -> Vec<u8> {
    let mut state = Bocu1State::new();
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        state.encode_code_point(c as u32, &mut out);
    }
    out
}

/// Encodes UTF-16 code units.
///
/// Valid surrogate pairs are combined into one code point. An unpaired surrogate
/// is encoded as its own value.
pub fn encode_utf16(units: &[u16]) -> Vec<u8> {
    let mut state = Bocu1State::new();
    let mut out = Vec::with_capacity(units.len() * 2);
    let mut iter = units.iter().copied().peekable();
    while let Some(unit) = iter.next() {
        let mut c = u32::from(unit);
        if (0xd800..=0xdbff).contains(&unit)
            && let Some(&low) = iter.peek()
            && (0xdc00..=0xdfff).contains(&low)
        {
            iter.next();
            c = (((c - 0xd800) << 10) | (u32::from(low) - 0xdc00)) + 0x10000;
        }
        state.encode_code_point(c, &mut out);
    }
    out
}

/// Decodes into UTF-16 code units.
///
/// Code points above U+FFFF come back as surrogate pairs. Decoded values that
/// fall in the surrogate range are passed through unchanged.
pub fn decode_utf16(bytes: &[u8]) -> Result<Vec<u16>, Bocu1Error> {
    let mut out = Vec::with_capacity(bytes.len());
    decode_code_points(bytes, |c| {
        if c <= 0xffff {
            out.push(c as u16);
        } else {
            out.push((((c - 0x10000) >> 10) + 0xd800) as u16);
            out.push(((c & 0x3ff) + 0xdc00) as u16);
        }
    })?;
    Ok(out)
}

/// Decodes into a string.
///
/// Fails with [`Bocu1Error::UnpairedSurrogate`] when the byte stream carries a
/// surrogate value that does not form a pair with its neighbour.
pub fn decode(bytes: &[u8]) -> Result<String, Bocu1Error> {
    let units = decode_utf16(bytes)?;
    String::from_utf16(&units).map_err(|_| Bocu1Error::UnpairedSurrogate)
}

/// Walks the byte stream, handing each decoded code point to `emit`.
fn decode_code_points(bytes: &[u8], mut emit: impl FnMut(u32)) -> Result<(), Bocu1Error> {
    let mut state = Bocu1State::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let b = bytes[pos];
        pos += 1;

        if b <= 0x20 {
            if b != 0x20 {
                state.reset();
            }
            emit(u32::from(b));
            continue;
        }
        if b == RESET {
            state.reset();
            continue;
        }

        let lead = i32::from(b);
        let value = if (START_NEG_2..START_POS_2).contains(&lead) {
            state.prev + (lead - MIDDLE)
        } else {
            let (mut diff, count) = if lead >= START_POS_2 {
                if lead < START_POS_3 {
                    ((lead - START_POS_2) * TRAIL_COUNT + REACH_POS_1 + 1, 1)
                } else if lead < START_POS_4 {
                    ((lead - START_POS_3) * TRAIL_COUNT * TRAIL_COUNT + REACH_POS_2 + 1, 2)
                } else {
                    (REACH_POS_3 + 1, 3)
                }
            } else if lead >= START_NEG_3 {
                ((lead - START_NEG_2) * TRAIL_COUNT + REACH_NEG_1, 1)
            } else if lead > MIN {
                ((lead - START_NEG_3) * TRAIL_COUNT * TRAIL_COUNT + REACH_NEG_2, 2)
            } else {
                (-TRAIL_COUNT * TRAIL_COUNT * TRAIL_COUNT + REACH_NEG_3, 3)
            };

            let available = bytes.len() - pos;
            if available < count {
                return Err(Bocu1Error::TruncatedSequence {
                    offset: start,
                    missing: count - available,
                });
            }
            let mut weight = TRAIL_COUNT.pow(count as u32 - 1);
            for _ in 0..count {
                let t = byte_to_trail(bytes[pos], pos)?;
                pos += 1;
                diff += t * weight;
                weight /= TRAIL_COUNT;
            }
            state.prev + diff
        };

        if !(0..=MAX_CODE_POINT).contains(&value) {
            return Err(Bocu1Error::CodePointOutOfRange {
                value: i64::from(value),
                offset: start,
            });
        }
        state.prev = anchor(value);
        emit(value as u32);
    }

    Ok(())
}
