//! Color: Terminal color values and color-spec parsing.
//!
//! Color specs arrive as strings from the component tree (`"red"`,
//! `"#ff8800"`, `"rgb(10, 20, 30)"`, `"ansi256(208)"`). Parsing never fails
//! the pass: a spec that does not match any form resolves to `None`, which
//! the resolver treats as "no color applied".

use crate::terminal::sgr;

/// True-color RGB representation.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create from a 24-bit hex color (e.g., 0xFF5500).
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A terminal color.
///
/// `Indexed` covers both the 16 named colors (0-15) and the 256-color
/// palette; the escape emitter picks the shortest SGR form for each.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub enum Color {
    /// The terminal's default color (SGR 39 / 49).
    #[default]
    Default,
    /// Palette color.
    Indexed(u8),
    /// 24-bit color.
    Rgb(Rgb),
}

/// Which side of a cell a color applies to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ColorTarget {
    /// Glyph color.
    Foreground,
    /// Cell background.
    Background,
}

/// Named colors in palette order, with their bright aliases.
const NAMED: &[(&str, u8)] = &[
    ("black", 0),
    ("red", 1),
    ("green", 2),
    ("yellow", 3),
    ("blue", 4),
    ("magenta", 5),
    ("cyan", 6),
    ("white", 7),
    ("gray", 8),
    ("grey", 8),
    ("blackBright", 8),
    ("redBright", 9),
    ("greenBright", 10),
    ("yellowBright", 11),
    ("blueBright", 12),
    ("magentaBright", 13),
    ("cyanBright", 14),
    ("whiteBright", 15),
];

impl Color {
    /// Parse a color spec.
    ///
    /// Accepts named colors, `#rgb`, `#rrggbb`, `rgb(r, g, b)` and
    /// `ansi256(n)`. Returns `None` for anything else.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if let Some(&(_, idx)) = NAMED.iter().find(|(name, _)| *name == spec) {
            return Some(Self::Indexed(idx));
        }
        if let Some(hex) = spec.strip_prefix('#') {
            return parse_hex(hex).map(Self::Rgb);
        }
        if let Some(args) = call_args(spec, "rgb") {
            let mut parts = args.split(',').map(|p| p.trim().parse::<u8>());
            let (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return None;
            };
            return Some(Self::Rgb(Rgb::new(r, g, b)));
        }
        if let Some(args) = call_args(spec, "ansi256") {
            return args.trim().parse::<u8>().ok().map(Self::Indexed);
        }
        None
    }

    /// Parse a spec, logging and discarding it when malformed.
    pub(crate) fn parse_or_warn(spec: &str) -> Option<Self> {
        let color = Self::parse(spec);
        if color.is_none() {
            tracing::warn!(spec, "unrecognized color spec, ignoring");
        }
        color
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb)
    }
}

/// Extract the argument list of `name(...)`.
fn call_args<'a>(spec: &'a str, name: &str) -> Option<&'a str> {
    spec.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => u32::from_str_radix(hex, 16).ok().map(Rgb::from_u32),
        3 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            // #abc expands to #aabbcc
            let expand = |n: u32| ((n & 0xF) * 0x11) as u8;
            Some(Rgb::new(expand(v >> 8), expand(v >> 4), expand(v)))
        }
        _ => None,
    }
}

/// Wrap `text` in the SGR codes for a color spec.
///
/// Returns the text unchanged when the spec does not parse. This is a pure
/// function usable from transform callbacks.
pub fn colorize(text: &str, spec: &str, target: ColorTarget) -> String {
    let Some(color) = Color::parse(spec) else {
        return text.to_owned();
    };
    let mut out = String::with_capacity(text.len() + 24);
    match target {
        ColorTarget::Foreground => {
            sgr::push_fg(&mut out, color);
            out.push_str(text);
            out.push_str("\x1b[39m");
        }
        ColorTarget::Background => {
            sgr::push_bg(&mut out, color);
            out.push_str(text);
            out.push_str("\x1b[49m");
        }
    }
    out
}
