//! Scanline-locked video decoder.
//!
//! The beam position is driven by the scheduler: `display_segment` catches
//! the current line up to the CPU (one 8-pixel segment per CPU cycle after
//! cycle 10 of the line), `next_line` closes the line. Each Thomson line is
//! drawn on two output rows, with a 16-pixel border segment at both ends
//! and 8 border lines above and below the 200 active lines.

/// Output frame width: 40 active segments plus two border segments, 16 px each.
pub const FRAME_WIDTH: usize = 672;
/// Output frame height: 216 displayed lines, each doubled.
pub const FRAME_HEIGHT: usize = 432;

const SEGMENT_WIDTH: usize = 16;
const LAST_SEGMENT: i32 = 42;

/// First and last active (non-border) lines.
const FIRST_ACTIVE_LINE: i32 = 56;
const LAST_ACTIVE_LINE: i32 = 255;
/// Line whose end closes the frame.
const LAST_DISPLAYED_LINE: i32 = 263;

/// Gamma-corrected output level of each 4-bit palette component
/// (EF9369 palette chip followed by the TEA5114 encoder).
pub const INTENSITY: [u8; 16] = [
    0, 100, 127, 147, 163, 179, 191, 203, 215, 223, 231, 239, 243, 247, 251, 255,
];

/// Power-on palette as 4-bit (red, green, blue) components: the eight
/// saturated colours followed by the eight pastel ones.
pub const DEFAULT_PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (15, 0, 0),
    (0, 15, 0),
    (15, 15, 0),
    (0, 0, 15),
    (15, 0, 15),
    (0, 15, 15),
    (15, 15, 15),
    (7, 7, 7),
    (10, 3, 3),
    (3, 10, 3),
    (10, 10, 3),
    (3, 3, 10),
    (10, 3, 10),
    (7, 14, 14),
    (11, 7, 0),
];

/// Video byte encodings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VideoMode {
    /// 320x200, two colours per 8 pixels, TO colour byte.
    #[default]
    To320x16,
    /// 320x200, four colours, one bit plane per page.
    Bitmap4,
    /// 320x200, four colours, two bits per pixel across both pages.
    Bitmap4Special,
    /// 160x200, sixteen colours, one nibble per pixel.
    Bitmap16,
    /// 640x200, two colours.
    Col80,
    /// 320x200, two colours per 8 pixels, MO colour byte.
    Mo320x16,
}

impl VideoMode {
    const ALL: [VideoMode; 6] = [
        VideoMode::To320x16,
        VideoMode::Bitmap4,
        VideoMode::Bitmap4Special,
        VideoMode::Bitmap16,
        VideoMode::Col80,
        VideoMode::Mo320x16,
    ];

    pub fn index(self) -> i32 {
        Self::ALL.iter().position(|&m| m == self).unwrap_or(0) as i32
    }

    pub fn from_index(index: i32) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }
}

/// What the decoder needs from the rest of the machine for one call.
#[derive(Clone, Copy)]
pub struct Beam {
    pub line: i32,
    pub line_cycle: i32,
    pub border: u8,
    /// Offset of the displayed page in RAM.
    pub page: usize,
}

pub struct VideoDecoder {
    frame: Vec<u8>,
    palette: [[u8; 3]; 16],
    mode: VideoMode,
    /// Index of the next byte in the displayed page.
    video_mem: usize,
    /// Segment of the current line decoded next (0-41).
    segment: usize,
    /// Next pixel column of the current row.
    pixel: usize,
    /// Output row being drawn.
    row: usize,
}

/// Size of the serialized decoder state.
pub const SERIAL_SIZE: usize = 16 * 4 + 5 * 4;

impl Default for VideoDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoDecoder {
    pub fn new() -> Self {
        let mut decoder = Self {
            frame: vec![0; FRAME_WIDTH * FRAME_HEIGHT * 3],
            palette: [[0; 3]; 16],
            mode: VideoMode::default(),
            video_mem: 0,
            segment: 0,
            pixel: 0,
            row: 0,
        };
        for (i, &(r, g, b)) in DEFAULT_PALETTE.iter().enumerate() {
            decoder.set_palette(i, r, g, b);
        }
        decoder
    }

    /// Set palette entry `index` from 4-bit components.
    pub fn set_palette(&mut self, index: usize, r: u8, g: u8, b: u8) {
        if let Some(entry) = self.palette.get_mut(index) {
            *entry = [
                INTENSITY[(r & 0x0F) as usize],
                INTENSITY[(g & 0x0F) as usize],
                INTENSITY[(b & 0x0F) as usize],
            ];
        }
    }

    pub fn palette_rgb(&self, index: usize) -> [u8; 3] {
        self.palette[index & 0x0F]
    }

    pub fn mode(&self) -> VideoMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: VideoMode) {
        self.mode = mode;
    }

    /// Current RGB24 frame, `FRAME_WIDTH * FRAME_HEIGHT * 3` bytes.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Move the beam to the top of the frame and paint it with colour 0.
    pub fn reset_position(&mut self) {
        self.video_mem = 0;
        self.segment = 0;
        self.pixel = 0;
        self.row = 0;
        let background = self.palette[0];
        for px in self.frame.chunks_exact_mut(3) {
            px.copy_from_slice(&background);
        }
    }

    /// Decode every segment the beam has reached on the current line.
    pub fn display_segment(&mut self, ram: &[u8], beam: Beam) {
        let segment_max = (beam.line_cycle - 10).min(LAST_SEGMENT);
        while (self.segment as i32) < segment_max {
            let border_line = beam.line < FIRST_ACTIVE_LINE || beam.line > LAST_ACTIVE_LINE;
            if border_line || self.segment == 0 || self.segment == 41 {
                let color = self.palette[(beam.border & 0x0F) as usize];
                self.fill_to((self.segment + 1) * SEGMENT_WIDTH, color);
            } else {
                self.decode(ram, beam.page);
            }
            self.segment += 1;
        }
    }

    /// Close line `line`: duplicate the row down to where the next line
    /// starts, wrapping to the top after the last displayed line.
    pub fn next_line(&mut self, line: i32) {
        let target = if line == LAST_DISPLAYED_LINE {
            FRAME_HEIGHT
        } else {
            usize::try_from((line - 47) * 2).unwrap_or(0).min(FRAME_HEIGHT)
        };
        let source = self.row.min(FRAME_HEIGHT - 1);
        let row_bytes = FRAME_WIDTH * 3;
        self.row += 1;
        while self.row < target {
            let src = source * row_bytes;
            self.frame.copy_within(src..src + row_bytes, self.row * row_bytes);
            self.row += 1;
        }
        if self.row >= FRAME_HEIGHT {
            self.row = 0;
            self.video_mem = 0;
        }
        self.pixel = 0;
        self.segment = 0;
    }

    fn fill_to(&mut self, end: usize, color: [u8; 3]) {
        let end = end.min(FRAME_WIDTH);
        let base = self.row.min(FRAME_HEIGHT - 1) * FRAME_WIDTH;
        while self.pixel < end {
            let offset = (base + self.pixel) * 3;
            self.frame[offset..offset + 3].copy_from_slice(&color);
            self.pixel += 1;
        }
    }

    /// Decode one byte pair (shape page and colour page) into 16 pixels.
    fn decode(&mut self, ram: &[u8], page: usize) {
        let byte = |offset: usize| ram.get(page + offset).copied().unwrap_or(0);
        let shape = byte(self.video_mem | 0x2000);
        let color = byte(self.video_mem);
        self.video_mem += 1;

        let mut end = self.segment * SEGMENT_WIDTH;
        let mut emit = |decoder: &mut Self, width: usize, index: u8| {
            end += width;
            let rgb = decoder.palette[(index & 0x0F) as usize];
            decoder.fill_to(end, rgb);
        };

        match self.mode {
            VideoMode::To320x16 | VideoMode::Mo320x16 => {
                let (background, foreground) = if self.mode == VideoMode::To320x16 {
                    (
                        (color & 0x07) | ((!color & 0x80) >> 4),
                        ((color >> 3) & 0x07) | ((!color & 0x40) >> 3),
                    )
                } else {
                    (color & 0x0F, color >> 4)
                };
                for i in (0..8).rev() {
                    let index = if (shape >> i) & 1 != 0 { foreground } else { background };
                    emit(self, 2, index);
                }
            }
            VideoMode::Bitmap4 => {
                for i in (0..8).rev() {
                    let index = (((shape as u32) << 1) >> i & 2) as u8 | ((color >> i) & 1);
                    emit(self, 2, index);
                }
            }
            VideoMode::Bitmap4Special => {
                let word = u16::from_be_bytes([shape, color]);
                for i in (0..8).rev() {
                    emit(self, 2, (word >> (i * 2) & 0x03) as u8);
                }
            }
            VideoMode::Bitmap16 => {
                let word = u16::from_be_bytes([shape, color]);
                for i in (0..4).rev() {
                    emit(self, 4, (word >> (i * 4) & 0x0F) as u8);
                }
            }
            VideoMode::Col80 => {
                let word = u16::from_be_bytes([shape, color]);
                for i in (0..16).rev() {
                    emit(self, 1, (word >> i & 1) as u8);
                }
            }
        }
    }

    /// Palette (RGBA), video memory index, segment, pixel offset, row
    /// offset, mode index.
    pub fn serialize(&self, out: &mut Vec<u8>) {
        for rgb in &self.palette {
            out.extend_from_slice(rgb);
            out.push(0xFF);
        }
        let pixel_offset = self.row * FRAME_WIDTH + self.pixel;
        let row_offset = self.row * FRAME_WIDTH;
        for value in [
            self.video_mem as i32,
            self.segment as i32,
            pixel_offset as i32,
            row_offset as i32,
            self.mode.index(),
        ] {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }

    /// Restore from a `SERIAL_SIZE` slice produced by `serialize`.
    pub fn deserialize(&mut self, data: &[u8]) {
        for (entry, chunk) in self.palette.iter_mut().zip(data.chunks_exact(4)) {
            entry.copy_from_slice(&chunk[..3]);
        }
        let word = |i: usize| {
            let at = 64 + i * 4;
            data.get(at..at + 4)
                .and_then(|b| b.try_into().ok())
                .map(i32::from_le_bytes)
                .unwrap_or(0)
        };
        let to_usize = |v: i32| usize::try_from(v).unwrap_or(0);
        self.video_mem = to_usize(word(0));
        self.segment = to_usize(word(1));
        let pixel_offset = to_usize(word(2));
        self.row = (to_usize(word(3)) / FRAME_WIDTH).min(FRAME_HEIGHT - 1);
        self.pixel = pixel_offset.saturating_sub(self.row * FRAME_WIDTH).min(FRAME_WIDTH);
        self.mode = VideoMode::from_index(word(4));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_at(decoder: &VideoDecoder, x: usize, y: usize) -> [u8; 3] {
        let offset = (y * FRAME_WIDTH + x) * 3;
        decoder.frame()[offset..offset + 3].try_into().unwrap()
    }

    fn active_beam(line_cycle: i32) -> Beam {
        Beam {
            line: 100,
            line_cycle,
            border: 4,
            page: 0,
        }
    }

    #[test]
    fn palette_uses_gamma_table() {
        let mut decoder = VideoDecoder::new();
        decoder.set_palette(3, 1, 2, 15);
        assert_eq!(decoder.palette_rgb(3), [100, 127, 255]);
        assert_eq!(decoder.palette_rgb(7), [255, 255, 255]);
    }

    #[test]
    fn first_segment_is_border() {
        let mut decoder = VideoDecoder::new();
        let ram = vec![0u8; 0x4000];
        decoder.display_segment(&ram, active_beam(11));
        assert_eq!(rgb_at(&decoder, 0, 0), decoder.palette_rgb(4));
        assert_eq!(rgb_at(&decoder, 15, 0), decoder.palette_rgb(4));
        assert_eq!(decoder.segment, 1);
    }

    #[test]
    fn to_colour_byte_selects_foreground_and_background() {
        let mut decoder = VideoDecoder::new();
        let mut ram = vec![0u8; 0x4000];
        // Shape 0xF0: four foreground pixels then four background ones.
        ram[0x2000] = 0xF0;
        // Foreground 1 (red), background 2 (green), both saturated.
        ram[0] = 0xC0 | (1 << 3) | 2;
        decoder.display_segment(&ram, active_beam(12));
        assert_eq!(rgb_at(&decoder, 16, 0), decoder.palette_rgb(1));
        assert_eq!(rgb_at(&decoder, 23, 0), decoder.palette_rgb(1));
        assert_eq!(rgb_at(&decoder, 24, 0), decoder.palette_rgb(2));
        assert_eq!(rgb_at(&decoder, 31, 0), decoder.palette_rgb(2));
    }

    #[test]
    fn cleared_pastel_bits_select_upper_palette() {
        let mut decoder = VideoDecoder::new();
        let ram = vec![0u8; 0x4000];
        // Colour byte 0: both colours 0 with the pastel bit (inverted) set.
        decoder.display_segment(&ram, active_beam(12));
        assert_eq!(rgb_at(&decoder, 16, 0), decoder.palette_rgb(8));
    }

    #[test]
    fn mo_colour_byte_uses_nibbles() {
        let mut decoder = VideoDecoder::new();
        decoder.set_mode(VideoMode::Mo320x16);
        let mut ram = vec![0u8; 0x4000];
        ram[0x2000] = 0x80;
        ram[0] = 0x3C;
        decoder.display_segment(&ram, active_beam(12));
        assert_eq!(rgb_at(&decoder, 16, 0), decoder.palette_rgb(3));
        assert_eq!(rgb_at(&decoder, 18, 0), decoder.palette_rgb(12));
    }

    #[test]
    fn bitmap16_draws_four_wide_pixels() {
        let mut decoder = VideoDecoder::new();
        decoder.set_mode(VideoMode::Bitmap16);
        let mut ram = vec![0u8; 0x4000];
        ram[0x2000] = 0x12;
        ram[0] = 0x34;
        decoder.display_segment(&ram, active_beam(12));
        for (n, index) in [1, 2, 3, 4].into_iter().enumerate() {
            assert_eq!(rgb_at(&decoder, 16 + n * 4, 0), decoder.palette_rgb(index));
            assert_eq!(rgb_at(&decoder, 19 + n * 4, 0), decoder.palette_rgb(index));
        }
    }

    #[test]
    fn col80_uses_colours_zero_and_one() {
        let mut decoder = VideoDecoder::new();
        decoder.set_mode(VideoMode::Col80);
        let mut ram = vec![0u8; 0x4000];
        ram[0x2000] = 0x80;
        decoder.display_segment(&ram, active_beam(12));
        assert_eq!(rgb_at(&decoder, 16, 0), decoder.palette_rgb(1));
        assert_eq!(rgb_at(&decoder, 17, 0), decoder.palette_rgb(0));
    }

    #[test]
    fn next_line_doubles_rows() {
        let mut decoder = VideoDecoder::new();
        let ram = vec![0u8; 0x4000];
        let beam = Beam {
            line: 48,
            line_cycle: 64,
            border: 1,
            page: 0,
        };
        decoder.display_segment(&ram, beam);
        decoder.next_line(48);
        assert_eq!(decoder.row, 2);
        assert_eq!(rgb_at(&decoder, 300, 1), decoder.palette_rgb(1));
        assert_eq!(decoder.pixel, 0);
        assert_eq!(decoder.segment, 0);
    }

    #[test]
    fn last_line_wraps_to_top() {
        let mut decoder = VideoDecoder::new();
        decoder.row = FRAME_HEIGHT - 2;
        decoder.video_mem = 8000;
        decoder.next_line(LAST_DISPLAYED_LINE);
        assert_eq!(decoder.row, 0);
        assert_eq!(decoder.video_mem, 0);
    }

    #[test]
    fn serialized_state_restores_position_and_mode() {
        let mut decoder = VideoDecoder::new();
        decoder.set_mode(VideoMode::Bitmap4Special);
        decoder.set_palette(2, 5, 6, 7);
        decoder.row = 40;
        decoder.pixel = 96;
        decoder.segment = 6;
        decoder.video_mem = 123;
        let mut blob = Vec::new();
        decoder.serialize(&mut blob);
        assert_eq!(blob.len(), SERIAL_SIZE);

        let mut restored = VideoDecoder::new();
        restored.deserialize(&blob);
        assert_eq!(restored.mode(), VideoMode::Bitmap4Special);
        assert_eq!(restored.palette_rgb(2), decoder.palette_rgb(2));
        assert_eq!((restored.row, restored.pixel), (40, 96));
        assert_eq!((restored.segment, restored.video_mem), (6, 123));
    }
}
