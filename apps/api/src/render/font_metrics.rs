//! Static glyph-width tables for the two standard Type1 fonts the notice uses.
//!
//! Widths come from the Adobe core-14 AFM files and are stored in em units
//! (AFM width / 1000). Text is measured after WinAnsi encoding, so the widths
//! always describe the glyph the viewer actually draws.
//! ASCII tables cover 0x20..=0x7E; index = byte - 32.

// ────────────────────────────────────────────────────────────────────────────
// Fonts
// ────────────────────────────────────────────────────────────────────────────

/// The two faces used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Times-Roman, body text.
    Regular,
    /// Times-Bold, title and section headings.
    Bold,
}

impl Font {
    /// PostScript base font name for the `/BaseFont` entry.
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Times-Roman",
            Font::Bold => "Times-Bold",
        }
    }

    /// Resource name used in content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    pub fn metrics(&self) -> &'static FontMetricTable {
        match self {
            Font::Regular => &TIMES_ROMAN_TABLE,
            Font::Bold => &TIMES_BOLD_TABLE,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Metric tables
// ────────────────────────────────────────────────────────────────────────────

/// Character-width table for one font, in em units.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Widths of the WinAnsi punctuation the encoder produces above 0x7F.
    punctuation: Punctuation,
    /// Fallback for the remaining high bytes (accented Latin-1 letters and symbols).
    pub average_char_width: f32,
}

struct Punctuation {
    ellipsis: f32,
    quote_single: f32,
    quote_double: f32,
    bullet: f32,
    en_dash: f32,
    em_dash: f32,
    euro: f32,
}

impl FontMetricTable {
    /// Width in em units of WinAnsi-encoded bytes.
    pub fn measure_bytes(&self, bytes: &[u8]) -> f32 {
        bytes.iter().map(|&b| self.byte_width(b)).sum()
    }

    /// Width in points of WinAnsi-encoded bytes at `size_pt`.
    pub fn width_pt(&self, bytes: &[u8], size_pt: f32) -> f32 {
        self.measure_bytes(bytes) * size_pt
    }

    fn byte_width(&self, b: u8) -> f32 {
        let p = &self.punctuation;
        match b {
            0x20..=0x7E => self.widths[(b - 0x20) as usize],
            0x80 => p.euro,
            0x85 => p.ellipsis,
            0x91 | 0x92 => p.quote_single,
            0x93 | 0x94 => p.quote_double,
            0x95 => p.bullet,
            0x96 => p.en_dash,
            0x97 => p.em_dash,
            0xA0 => self.widths[0],
            _ => self.average_char_width,
        }
    }
}

static TIMES_ROMAN_TABLE: FontMetricTable = FontMetricTable {
    widths: [
        // sp    !      "      #      $      %      &      '
        0.250, 0.333, 0.408, 0.500, 0.500, 0.833, 0.778, 0.180,
        // (     )      *      +      ,      -      .      /
        0.333, 0.333, 0.500, 0.564, 0.250, 0.333, 0.250, 0.278,
        // 0-9
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
        // :     ;      <      =      >      ?      @
        0.278, 0.278, 0.564, 0.564, 0.564, 0.444, 0.921,
        // A     B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.667, 0.667, 0.722, 0.611, 0.556, 0.722, 0.722, 0.333, 0.389, 0.722, 0.611, 0.889,
        // N     O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.722, 0.556, 0.722, 0.667, 0.556, 0.611, 0.722, 0.722, 0.944, 0.722, 0.722, 0.611,
        // [     \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.469, 0.500, 0.333,
        // a     b      c      d      e      f      g      h      i      j      k      l      m
        0.444, 0.500, 0.444, 0.500, 0.444, 0.333, 0.500, 0.500, 0.278, 0.278, 0.500, 0.278, 0.778,
        // n     o      p      q      r      s      t      u      v      w      x      y      z
        0.500, 0.500, 0.500, 0.500, 0.333, 0.389, 0.278, 0.500, 0.500, 0.722, 0.500, 0.500, 0.444,
        // {     |      }      ~
        0.480, 0.200, 0.480, 0.541,
    ],
    punctuation: Punctuation {
        ellipsis: 1.000,
        quote_single: 0.333,
        quote_double: 0.444,
        bullet: 0.350,
        en_dash: 0.500,
        em_dash: 1.000,
        euro: 0.500,
    },
    average_char_width: 0.500,
};

static TIMES_BOLD_TABLE: FontMetricTable = FontMetricTable {
    widths: [
        // sp    !      "      #      $      %      &      '
        0.250, 0.333, 0.555, 0.500, 0.500, 1.000, 0.833, 0.278,
        // (     )      *      +      ,      -      .      /
        0.333, 0.333, 0.500, 0.570, 0.250, 0.333, 0.250, 0.278,
        // 0-9
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
        // :     ;      <      =      >      ?      @
        0.333, 0.333, 0.570, 0.570, 0.570, 0.500, 0.930,
        // A     B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.778, 0.389, 0.500, 0.778, 0.667, 0.944,
        // N     O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.611, 0.778, 0.722, 0.556, 0.667, 0.722, 0.722, 1.000, 0.722, 0.722, 0.667,
        // [     \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.581, 0.500, 0.333,
        // a     b      c      d      e      f      g      h      i      j      k      l      m
        0.500, 0.556, 0.444, 0.556, 0.444, 0.333, 0.500, 0.556, 0.278, 0.333, 0.556, 0.278, 0.833,
        // n     o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.500, 0.556, 0.556, 0.444, 0.389, 0.333, 0.556, 0.500, 0.722, 0.500, 0.500, 0.444,
        // {     |      }      ~
        0.394, 0.220, 0.394, 0.520,
    ],
    punctuation: Punctuation {
        ellipsis: 1.000,
        quote_single: 0.333,
        quote_double: 0.500,
        bullet: 0.350,
        en_dash: 0.500,
        em_dash: 1.000,
        euro: 0.500,
    },
    average_char_width: 0.540,
};

// ────────────────────────────────────────────────────────────────────────────
// WinAnsi encoding
// ────────────────────────────────────────────────────────────────────────────

/// Encodes `s` for a WinAnsiEncoding simple font.
///
/// ASCII and Latin-1 map to themselves; the CP1252 punctuation block maps to
/// its 0x80..0x9F slots; box-drawing rules fold to `-`; anything else becomes `?`.
/// Control characters other than tab are dropped; tab becomes a space.
pub fn encode_win_ansi(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        let byte = match c {
            '\t' => b' ',
            c if c.is_control() => continue,
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\u{2500}'..='\u{257F}' => b'-',
            _ => b'?',
        };
        out.push(byte);
    }
    out
}
