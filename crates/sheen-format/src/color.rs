#![forbid(unsafe_code)]

//! Colors, terminal color profiles, and downgrade math.
//!
//! Themes are authored in whatever fidelity suits them (24-bit for
//! `monokai`, the 16 ANSI colors for `default`). The terminal formatter
//! downgrades each color to the profile of the output before writing SGR
//! parameters; [`ColorProfile::Mono`] drops colors entirely.

use std::fmt;
use std::str::FromStr;

/// How many colors the output can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorProfile {
    /// No colors; attributes such as bold are still written.
    Mono,
    /// The 16 ANSI colors.
    #[default]
    Ansi16,
    /// The xterm 256-color palette.
    Ansi256,
    /// 24-bit RGB.
    TrueColor,
}

impl ColorProfile {
    /// Profile for what the environment reports. An explicit `no_color`
    /// request beats any capability.
    #[must_use]
    pub const fn from_capabilities(no_color: bool, true_color: bool, colors_256: bool) -> Self {
        match (no_color, true_color, colors_256) {
            (true, _, _) => Self::Mono,
            (false, true, _) => Self::TrueColor,
            (false, false, true) => Self::Ansi256,
            (false, false, false) => Self::Ansi16,
        }
    }

    /// Name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mono => "none",
            Self::Ansi16 => "16",
            Self::Ansi256 => "256",
            Self::TrueColor => "truecolor",
        }
    }
}

impl fmt::Display for ColorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from parsing a [`ColorProfile`] or an [`Rgb`] hex string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError {
    input: String,
    expected: &'static str,
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color {:?}: expected {}", self.input, self.expected)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for ColorProfile {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "mono" | "0" | "off" => Ok(Self::Mono),
            "16" | "ansi" | "ansi16" => Ok(Self::Ansi16),
            "256" | "ansi256" => Ok(Self::Ansi256),
            "truecolor" | "24bit" | "rgb" => Ok(Self::TrueColor),
            _ => Err(ParseColorError {
                input: s.to_owned(),
                expected: "one of none, 16, 256, truecolor",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Rgb
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_u32(hex: u32) -> Self {
        let [_, r, g, b] = hex.to_be_bytes();
        Self::new(r, g, b)
    }

    /// Parse `#rrggbb`, `rrggbb` or the short `#rgb` form.
    pub fn from_hex(s: &str) -> Result<Self, ParseColorError> {
        let err = || ParseColorError {
            input: s.to_owned(),
            expected: "#rrggbb or #rgb",
        };
        let digits = s.strip_prefix('#').unwrap_or(s);
        let nibbles: Vec<u8> = digits
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(err)?;
        match nibbles[..] {
            [r1, r0, g1, g0, b1, b0] => Ok(Self::new(r1 << 4 | r0, g1 << 4 | g0, b1 << 4 | b0)),
            [r, g, b] => Ok(Self::new(r * 0x11, g * 0x11, b * 0x11)),
            _ => Err(err()),
        }
    }

    /// Lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        self.to_string()
    }

    /// Squared distance weighted by the BT.709 luma coefficients, so greens
    /// count more than blues.
    fn distance(self, other: Self) -> u64 {
        let sq = |x: u8, y: u8| u64::from(x.abs_diff(y)).pow(2);
        2126 * sq(self.r, other.r) + 7152 * sq(self.g, other.g) + 722 * sq(self.b, other.b)
    }

    /// Closest entry of the 256-color palette outside the first 16 slots.
    ///
    /// Compares the nearest 6×6×6 cube color with the nearest step of the
    /// gray ramp and keeps the closer one, the cube on a tie.
    #[must_use]
    pub fn nearest_ansi256(self) -> u8 {
        let level = |v: u8| {
            CUBE_LEVELS
                .iter()
                .enumerate()
                .min_by_key(|&(_, &l)| l.abs_diff(v))
                .map_or(0, |(i, _)| i as u8)
        };
        let cube = 16 + 36 * level(self.r) + 6 * level(self.g) + level(self.b);

        let mean = (u16::from(self.r) + u16::from(self.g) + u16::from(self.b)) / 3;
        let step = (mean.saturating_sub(3) / 10).min(23) as u8;
        let gray = 232 + step;

        if palette_256(gray).distance(self) < palette_256(cube).distance(self) {
            gray
        } else {
            cube
        }
    }

    /// Closest of the 16 ANSI colors; the lowest index wins a tie.
    #[must_use]
    pub fn nearest_ansi16(self) -> Ansi16 {
        Ansi16::ALL
            .into_iter()
            .min_by_key(|color| color.rgb().distance(self))
            .unwrap_or(Ansi16::Black)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ---------------------------------------------------------------------------
// Ansi16
// ---------------------------------------------------------------------------

/// The 16 ANSI colors in palette order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ansi16 {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Ansi16 {
    pub const ALL: [Self; 16] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
        Self::BrightBlack,
        Self::BrightRed,
        Self::BrightGreen,
        Self::BrightYellow,
        Self::BrightBlue,
        Self::BrightMagenta,
        Self::BrightCyan,
        Self::BrightWhite,
    ];

    /// Palette slot, 0 to 15.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// xterm's default rendering of the color.
    #[must_use]
    pub const fn rgb(self) -> Rgb {
        let (r, g, b) = match self {
            Self::Black => (0, 0, 0),
            Self::Red => (205, 0, 0),
            Self::Green => (0, 205, 0),
            Self::Yellow => (205, 205, 0),
            Self::Blue => (0, 0, 238),
            Self::Magenta => (205, 0, 205),
            Self::Cyan => (0, 205, 205),
            Self::White => (229, 229, 229),
            Self::BrightBlack => (127, 127, 127),
            Self::BrightRed => (255, 0, 0),
            Self::BrightGreen => (0, 255, 0),
            Self::BrightYellow => (255, 255, 0),
            Self::BrightBlue => (92, 92, 255),
            Self::BrightMagenta => (255, 0, 255),
            Self::BrightCyan => (0, 255, 255),
            Self::BrightWhite => (255, 255, 255),
        };
        Rgb::new(r, g, b)
    }

    /// SGR parameter selecting this color: 30–37/90–97, or 40–47/100–107
    /// for the background.
    #[must_use]
    pub const fn sgr_code(self, background: bool) -> u8 {
        let index = self.index();
        let base = if index < 8 { 30 + index } else { 90 + index - 8 };
        if background { base + 10 } else { base }
    }
}

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// RGB value of a 256-color palette entry.
fn palette_256(index: u8) -> Rgb {
    match index {
        0..=15 => Ansi16::ALL[usize::from(index)].rgb(),
        16..=231 => {
            let i = usize::from(index - 16);
            Rgb::new(CUBE_LEVELS[i / 36], CUBE_LEVELS[i / 6 % 6], CUBE_LEVELS[i % 6])
        }
        _ => {
            let v = 8 + 10 * (index - 232);
            Rgb::new(v, v, v)
        }
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A color as a theme states it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Rgb(Rgb),
    /// Index into the 256-color palette.
    Ansi256(u8),
    Ansi16(Ansi16),
}

impl Color {
    /// True-color value from a packed `0xRRGGBB`.
    #[must_use]
    pub const fn hex(value: u32) -> Self {
        Self::Rgb(Rgb::from_u32(value))
    }

    #[must_use]
    pub fn to_rgb(self) -> Rgb {
        match self {
            Self::Rgb(rgb) => rgb,
            Self::Ansi256(index) => palette_256(index),
            Self::Ansi16(color) => color.rgb(),
        }
    }

    /// The color as `profile` can show it, or `None` under
    /// [`ColorProfile::Mono`]. Never raises fidelity.
    #[must_use]
    pub fn downgrade(self, profile: ColorProfile) -> Option<Self> {
        match (profile, self) {
            (ColorProfile::Mono, _) => None,
            (ColorProfile::Ansi256, Self::Rgb(rgb)) => Some(Self::Ansi256(rgb.nearest_ansi256())),
            (ColorProfile::Ansi16, Self::Rgb(_) | Self::Ansi256(_)) => {
                Some(Self::Ansi16(self.to_rgb().nearest_ansi16()))
            }
            _ => Some(self),
        }
    }

    /// SGR parameters selecting this color as-is (no downgrade).
    #[must_use]
    pub fn sgr_params(self, background: bool) -> String {
        let lead = if background { 48 } else { 38 };
        match self {
            Self::Ansi16(color) => color.sgr_code(background).to_string(),
            Self::Ansi256(index) => format!("{lead};5;{index}"),
            Self::Rgb(Rgb { r, g, b }) => format!("{lead};2;{r};{g};{b}"),
        }
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb)
    }
}

impl From<Ansi16> for Color {
    fn from(color: Ansi16) -> Self {
        Self::Ansi16(color)
    }
}
