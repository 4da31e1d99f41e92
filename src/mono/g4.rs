// CCITT Group 4 (ITU-T T.6) codec for packed 1-bit bitmaps.
//
// Pure two-dimensional (MMR) coding, K = -1. The produced stream embeds
// directly into a PDF CCITTFaxDecode filter with `K -1`, `Columns`, `Rows`
// and `EndOfBlock false`; no EOL or EOFB codes are emitted. Bit value 0 is
// black, matching the filter's default `BlackIs1 false`.

use crate::error::PdfMonoError;
use crate::mono::Bitmap;

// ------------------------------------------------------------
// Code tables (ITU-T T.4 / T.6)
// ------------------------------------------------------------

const PASS: (u16, u8) = (0b0001, 4);
const HORIZONTAL: (u16, u8) = (0b001, 3);

/// Vertical mode codes indexed by `a1 - b1 + 3` (VL3 .. VR3).
const VERTICAL: [(u16, u8); 7] = [
    (0b0000010, 7),
    (0b000010, 6),
    (0b010, 3),
    (0b1, 1),
    (0b011, 3),
    (0b000011, 6),
    (0b0000011, 7),
];

/// White terminating codes, indexed by run length 0-63.
const WHITE_TERMINATING: [(u16, u8); 64] = [
    (0b00110101, 8),
    (0b000111, 6),
    (0b0111, 4),
    (0b1000, 4),
    (0b1011, 4),
    (0b1100, 4),
    (0b1110, 4),
    (0b1111, 4),
    (0b10011, 5),
    (0b10100, 5),
    (0b00111, 5),
    (0b01000, 5),
    (0b001000, 6),
    (0b000011, 6),
    (0b110100, 6),
    (0b110101, 6),
    (0b101010, 6),
    (0b101011, 6),
    (0b0100111, 7),
    (0b0001100, 7),
    (0b0001000, 7),
    (0b0010111, 7),
    (0b0000011, 7),
    (0b0000100, 7),
    (0b0101000, 7),
    (0b0101011, 7),
    (0b0010011, 7),
    (0b0100100, 7),
    (0b0011000, 7),
    (0b00000010, 8),
    (0b00000011, 8),
    (0b00011010, 8),
    (0b00011011, 8),
    (0b00010010, 8),
    (0b00010011, 8),
    (0b00010100, 8),
    (0b00010101, 8),
    (0b00010110, 8),
    (0b00010111, 8),
    (0b00101000, 8),
    (0b00101001, 8),
    (0b00101010, 8),
    (0b00101011, 8),
    (0b00101100, 8),
    (0b00101101, 8),
    (0b00000100, 8),
    (0b00000101, 8),
    (0b00001010, 8),
    (0b00001011, 8),
    (0b01010010, 8),
    (0b01010011, 8),
    (0b01010100, 8),
    (0b01010101, 8),
    (0b00100100, 8),
    (0b00100101, 8),
    (0b01011000, 8),
    (0b01011001, 8),
    (0b01011010, 8),
    (0b01011011, 8),
    (0b01001010, 8),
    (0b01001011, 8),
    (0b00110010, 8),
    (0b00110011, 8),
    (0b00110100, 8),
];

/// Black terminating codes, indexed by run length 0-63.
const BLACK_TERMINATING: [(u16, u8); 64] = [
    (0b0000110111, 10),
    (0b010, 3),
    (0b11, 2),
    (0b10, 2),
    (0b011, 3),
    (0b0011, 4),
    (0b0010, 4),
    (0b00011, 5),
    (0b000101, 6),
    (0b000100, 6),
    (0b0000100, 7),
    (0b0000101, 7),
    (0b0000111, 7),
    (0b00000100, 8),
    (0b00000111, 8),
    (0b000011000, 9),
    (0b0000010111, 10),
    (0b0000011000, 10),
    (0b0000001000, 10),
    (0b00001100111, 11),
    (0b00001101000, 11),
    (0b00001101100, 11),
    (0b00000110111, 11),
    (0b00000101000, 11),
    (0b00000010111, 11),
    (0b00000011000, 11),
    (0b000011001010, 12),
    (0b000011001011, 12),
    (0b000011001100, 12),
    (0b000011001101, 12),
    (0b000001101000, 12),
    (0b000001101001, 12),
    (0b000001101010, 12),
    (0b000001101011, 12),
    (0b000011010010, 12),
    (0b000011010011, 12),
    (0b000011010100, 12),
    (0b000011010101, 12),
    (0b000011010110, 12),
    (0b000011010111, 12),
    (0b000001101100, 12),
    (0b000001101101, 12),
    (0b000011011010, 12),
    (0b000011011011, 12),
    (0b000001010100, 12),
    (0b000001010101, 12),
    (0b000001010110, 12),
    (0b000001010111, 12),
    (0b000001100100, 12),
    (0b000001100101, 12),
    (0b000001010010, 12),
    (0b000001010011, 12),
    (0b000000100100, 12),
    (0b000000110111, 12),
    (0b000000111000, 12),
    (0b000000100111, 12),
    (0b000000101000, 12),
    (0b000001011000, 12),
    (0b000001011001, 12),
    (0b000000101011, 12),
    (0b000000101100, 12),
    (0b000001011010, 12),
    (0b000001100110, 12),
    (0b000001100111, 12),
];

/// White make-up codes for runs 64, 128, .. 1728.
const WHITE_MAKEUP: [(u16, u8); 27] = [
    (0b11011, 5),
    (0b10010, 5),
    (0b010111, 6),
    (0b0110111, 7),
    (0b00110110, 8),
    (0b00110111, 8),
    (0b01100100, 8),
    (0b01100101, 8),
    (0b01101000, 8),
    (0b01100111, 8),
    (0b011001100, 9),
    (0b011001101, 9),
    (0b011010010, 9),
    (0b011010011, 9),
    (0b011010100, 9),
    (0b011010101, 9),
    (0b011010110, 9),
    (0b011010111, 9),
    (0b011011000, 9),
    (0b011011001, 9),
    (0b011011010, 9),
    (0b011011011, 9),
    (0b010011000, 9),
    (0b010011001, 9),
    (0b010011010, 9),
    (0b011000, 6),
    (0b010011011, 9),
];

/// Black make-up codes for runs 64, 128, .. 1728.
const BLACK_MAKEUP: [(u16, u8); 27] = [
    (0b0000001111, 10),
    (0b000011001000, 12),
    (0b000011001001, 12),
    (0b000001011011, 12),
    (0b000000110011, 12),
    (0b000000110100, 12),
    (0b000000110101, 12),
    (0b0000001101100, 13),
    (0b0000001101101, 13),
    (0b0000001001010, 13),
    (0b0000001001011, 13),
    (0b0000001001100, 13),
    (0b0000001001101, 13),
    (0b0000001110010, 13),
    (0b0000001110011, 13),
    (0b0000001110100, 13),
    (0b0000001110101, 13),
    (0b0000001110110, 13),
    (0b0000001110111, 13),
    (0b0000001010010, 13),
    (0b0000001010011, 13),
    (0b0000001010100, 13),
    (0b0000001010101, 13),
    (0b0000001011010, 13),
    (0b0000001011011, 13),
    (0b0000001100100, 13),
    (0b0000001100101, 13),
];

/// Extended make-up codes (shared by both colours) for runs 1792, .. 2560.
const EXTENDED_MAKEUP: [(u16, u8); 13] = [
    (0b00000001000, 11),
    (0b00000001100, 11),
    (0b00000001101, 11),
    (0b000000010010, 12),
    (0b000000010011, 12),
    (0b000000010100, 12),
    (0b000000010101, 12),
    (0b000000010110, 12),
    (0b000000010111, 12),
    (0b000000011100, 12),
    (0b000000011101, 12),
    (0b000000011110, 12),
    (0b000000011111, 12),
];

// ------------------------------------------------------------
// Bit I/O
// ------------------------------------------------------------

struct BitWriter {
    bytes: Vec<u8>,
    acc: u32,
    nbits: u8,
}

impl BitWriter {
    fn new() -> Self {
        BitWriter {
            bytes: Vec::new(),
            acc: 0,
            nbits: 0,
        }
    }

    fn put(&mut self, code: u16, len: u8) {
        self.acc = (self.acc << len) | u32::from(code);
        self.nbits += len;
        while self.nbits >= 8 {
            self.nbits -= 8;
            self.bytes.push((self.acc >> self.nbits) as u8);
        }
        self.acc &= (1u32 << self.nbits) - 1;
    }

    /// Pad the final partial byte with zero bits.
    fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.bytes.push((self.acc << (8 - self.nbits)) as u8);
        }
        self.bytes
    }
}

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        BitReader { data, pos: 0 }
    }

    fn read_bit(&mut self) -> crate::error::Result<u8> {
        let byte = self
            .data
            .get(self.pos / 8)
            .copied()
            .ok_or_else(|| decode_err("unexpected end of data"))?;
        let bit = (byte >> (7 - (self.pos % 8))) & 1;
        self.pos += 1;
        Ok(bit)
    }
}

fn decode_err(msg: &str) -> PdfMonoError {
    PdfMonoError::encode(format!("G4 stream: {msg}"))
}

// ------------------------------------------------------------
// Changing elements
//
// A changing element is a pixel whose colour differs from the previous
// pixel on the same line; the pixel before the line start is white by
// definition. Positions are collected in ascending order, so the element
// at even index flips to black and at odd index back to white.
// ------------------------------------------------------------

fn row_changes(bitmap: &Bitmap, y: u32) -> Vec<u32> {
    let mut changes = Vec::new();
    let mut prev_white = true;
    for x in 0..bitmap.width() {
        let white = bitmap.is_white(x, y);
        if white != prev_white {
            changes.push(x);
            prev_white = white;
        }
    }
    changes
}

/// First changing element strictly right of `pos`, or `width` if none.
fn next_change(changes: &[u32], pos: i64, width: u32) -> u32 {
    let idx = changes.partition_point(|&c| i64::from(c) <= pos);
    changes.get(idx).copied().unwrap_or(width)
}

/// First changing element on the reference line strictly right of `a0`
/// whose colour is opposite to the colour of `a0`. Returns the position
/// (or `width`) and the index it was found at.
fn ref_b1(reference: &[u32], a0: i64, a0_white: bool, width: u32) -> (u32, usize) {
    let mut idx = reference.partition_point(|&c| i64::from(c) <= a0);
    // even index flips to black; b1 must flip to the opposite of a0's colour
    if (idx % 2 == 0) != a0_white {
        idx += 1;
    }
    match reference.get(idx) {
        Some(&pos) => (pos, idx),
        None => (width, idx),
    }
}

// ------------------------------------------------------------
// Encoder
// ------------------------------------------------------------

/// Encode a bitmap as a CCITT G4 stream.
pub fn encode(bitmap: &Bitmap) -> Vec<u8> {
    let width = bitmap.width();
    let mut writer = BitWriter::new();
    let mut reference: Vec<u32> = Vec::new();

    for y in 0..bitmap.height() {
        let cur = row_changes(bitmap, y);
        encode_row(&mut writer, &cur, &reference, width);
        reference = cur;
    }

    writer.finish()
}

fn encode_row(writer: &mut BitWriter, cur: &[u32], reference: &[u32], width: u32) {
    let mut a0: i64 = -1;
    let mut a0_white = true;

    loop {
        let a1 = next_change(cur, a0, width);
        let (b1, b1_idx) = ref_b1(reference, a0, a0_white, width);
        let b2 = reference.get(b1_idx + 1).copied().unwrap_or(width);

        if i64::from(b2) < i64::from(a1) {
            let (code, len) = PASS;
            writer.put(code, len);
            a0 = i64::from(b2);
        } else {
            let delta = i64::from(a1) - i64::from(b1);
            if (-3..=3).contains(&delta) {
                let (code, len) = VERTICAL[(delta + 3) as usize];
                writer.put(code, len);
                a0 = i64::from(a1);
                a0_white = !a0_white;
            } else {
                let a2 = next_change(cur, i64::from(a1), width);
                let run1 = (i64::from(a1) - a0.max(0)) as u32;
                let run2 = a2 - a1;
                let (code, len) = HORIZONTAL;
                writer.put(code, len);
                put_run(writer, run1, a0_white);
                put_run(writer, run2, !a0_white);
                a0 = i64::from(a2);
            }
        }

        if a0 >= i64::from(width) {
            break;
        }
    }
}

/// Emit make-up and terminating codes for one run of the given colour.
fn put_run(writer: &mut BitWriter, mut run: u32, white: bool) {
    let (terminating, makeup) = if white {
        (&WHITE_TERMINATING, &WHITE_MAKEUP)
    } else {
        (&BLACK_TERMINATING, &BLACK_MAKEUP)
    };

    // Runs beyond the largest make-up code repeat the 2560 code.
    while run >= 2624 {
        let (code, len) = EXTENDED_MAKEUP[12];
        writer.put(code, len);
        run -= 2560;
    }
    if run >= 64 {
        let m = run / 64 * 64;
        let (code, len) = if m >= 1792 {
            EXTENDED_MAKEUP[((m - 1792) / 64) as usize]
        } else {
            makeup[(m / 64 - 1) as usize]
        };
        writer.put(code, len);
        run -= m;
    }
    let (code, len) = terminating[run as usize];
    writer.put(code, len);
}

// ------------------------------------------------------------
// Decoder
// ------------------------------------------------------------

enum Mode {
    Pass,
    Horizontal,
    Vertical(i8),
}

fn read_mode(reader: &mut BitReader<'_>) -> crate::error::Result<Mode> {
    if reader.read_bit()? == 1 {
        return Ok(Mode::Vertical(0));
    }
    if reader.read_bit()? == 1 {
        return Ok(if reader.read_bit()? == 1 {
            Mode::Vertical(1)
        } else {
            Mode::Vertical(-1)
        });
    }
    if reader.read_bit()? == 1 {
        return Ok(Mode::Horizontal);
    }
    if reader.read_bit()? == 1 {
        return Ok(Mode::Pass);
    }
    if reader.read_bit()? == 1 {
        return Ok(if reader.read_bit()? == 1 {
            Mode::Vertical(2)
        } else {
            Mode::Vertical(-2)
        });
    }
    if reader.read_bit()? == 1 {
        return Ok(if reader.read_bit()? == 1 {
            Mode::Vertical(3)
        } else {
            Mode::Vertical(-3)
        });
    }
    Err(decode_err("unsupported mode code"))
}

fn lookup_run(code: u16, len: u8, white: bool) -> Option<u32> {
    let (terminating, makeup) = if white {
        (&WHITE_TERMINATING, &WHITE_MAKEUP)
    } else {
        (&BLACK_TERMINATING, &BLACK_MAKEUP)
    };
    for (run, &(c, l)) in terminating.iter().enumerate() {
        if l == len && c == code {
            return Some(run as u32);
        }
    }
    for (i, &(c, l)) in makeup.iter().enumerate() {
        if l == len && c == code {
            return Some(64 * (i as u32 + 1));
        }
    }
    for (i, &(c, l)) in EXTENDED_MAKEUP.iter().enumerate() {
        if l == len && c == code {
            return Some(1792 + 64 * i as u32);
        }
    }
    None
}

/// Read one run-length code. Returns the run and whether it was terminating.
fn read_run_code(reader: &mut BitReader<'_>, white: bool) -> crate::error::Result<(u32, bool)> {
    let mut code: u16 = 0;
    let mut len: u8 = 0;
    loop {
        code = (code << 1) | u16::from(reader.read_bit()?);
        len += 1;
        if len > 14 {
            return Err(decode_err("invalid run-length code"));
        }
        if let Some(run) = lookup_run(code, len, white) {
            return Ok((run, run < 64));
        }
    }
}

/// Read make-up codes plus the final terminating code of one run.
fn read_total_run(reader: &mut BitReader<'_>, white: bool) -> crate::error::Result<u32> {
    let mut total: u32 = 0;
    loop {
        let (run, terminating) = read_run_code(reader, white)?;
        total += run;
        if terminating {
            return Ok(total);
        }
    }
}

/// Fill pixels `[from, to)` of row `y`; only white pixels need setting.
fn fill_run(bitmap: &mut Bitmap, y: u32, from: i64, to: i64, white: bool) {
    if white {
        for x in from.max(0)..to {
            bitmap.set_white(x as u32, y);
        }
    }
}

/// Decode a CCITT G4 stream produced by [`encode`].
///
/// Trailing padding bits are ignored; the stream must describe exactly
/// `width` x `height` pixels.
pub fn decode(data: &[u8], width: u32, height: u32) -> crate::error::Result<Bitmap> {
    let mut bitmap = Bitmap::new(width, height);
    let mut reader = BitReader::new(data);
    let mut reference: Vec<u32> = Vec::new();

    for y in 0..height {
        let mut cur: Vec<u32> = Vec::new();
        let mut a0: i64 = -1;
        let mut a0_white = true;

        while a0 < i64::from(width) {
            let mode = read_mode(&mut reader)?;
            let (b1, b1_idx) = ref_b1(&reference, a0, a0_white, width);
            let b2 = reference.get(b1_idx + 1).copied().unwrap_or(width);

            match mode {
                Mode::Pass => {
                    fill_run(&mut bitmap, y, a0, i64::from(b2), a0_white);
                    a0 = i64::from(b2);
                }
                Mode::Vertical(delta) => {
                    let a1 = i64::from(b1) + i64::from(delta);
                    if a1 <= a0 || a1 > i64::from(width) {
                        return Err(decode_err("vertical mode position out of bounds"));
                    }
                    fill_run(&mut bitmap, y, a0, a1, a0_white);
                    if a1 < i64::from(width) {
                        cur.push(a1 as u32);
                    }
                    a0 = a1;
                    a0_white = !a0_white;
                }
                Mode::Horizontal => {
                    let run1 = read_total_run(&mut reader, a0_white)?;
                    let run2 = read_total_run(&mut reader, !a0_white)?;
                    if a0 >= 0 && run1 == 0 {
                        return Err(decode_err("zero-length run inside a line"));
                    }
                    let a1 = a0.max(0) + i64::from(run1);
                    let a2 = a1 + i64::from(run2);
                    if a2 > i64::from(width) || (run2 == 0 && a1 < i64::from(width)) {
                        return Err(decode_err("horizontal runs exceed line width"));
                    }
                    fill_run(&mut bitmap, y, a0, a1, a0_white);
                    fill_run(&mut bitmap, y, a1, a2, !a0_white);
                    if a1 < i64::from(width) {
                        cur.push(a1 as u32);
                    }
                    if a2 < i64::from(width) {
                        cur.push(a2 as u32);
                    }
                    a0 = a2;
                }
            }
        }

        reference = cur;
    }

    Ok(bitmap)
}

// ============================================================
// Tests
// ============================================================
