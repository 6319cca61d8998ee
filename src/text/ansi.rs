//! ANSI escape handling for text content.
//!
//! Text arriving from the tree may carry escape sequences produced by color
//! helpers. Measurement ignores all of them. Painting interprets SGR
//! (`ESC [ ... m`) and drops everything else:
//! - CSI sequences: `ESC [` ... final byte (0x40-0x7E)
//! - OSC sequences: `ESC ]` ... BEL (0x07) or ST (ESC \)
//! - DCS/PM/APC sequences: `ESC P`/`ESC ^`/`ESC _` ... ST
//! - Two-character sequences: `ESC` + single char

use crate::buffer::Modifiers;
use crate::style::{Color, PaintSpec, Rgb};
use crate::terminal::sgr::SgrState;
use std::borrow::Cow;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ESC: u8 = 0x1B;

/// Strip ANSI escape sequences from a string.
///
/// Returns `Cow::Borrowed` when no escape sequences are present.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.as_bytes().contains(&ESC) {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len());
    for token in Tokens::new(s) {
        if let Token::Text(text) = token {
            result.push_str(text);
        }
    }
    Cow::Owned(result)
}

/// Display width of a grapheme cluster. Control characters take no cells.
#[inline]
pub fn grapheme_width(grapheme: &str) -> usize {
    match grapheme.chars().next() {
        Some(c) if c.is_control() => 0,
        Some(_) => UnicodeWidthStr::width(grapheme).min(2),
        None => 0,
    }
}

/// Display width of a single line, ignoring escape sequences.
pub fn line_width(line: &str) -> usize {
    strip_ansi(line).graphemes(true).map(grapheme_width).sum()
}

/// A lexical piece of styled text.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Token<'a> {
    /// Visible text with no escapes.
    Text(&'a str),
    /// SGR parameters (the part between `ESC [` and `m`).
    Sgr(&'a str),
    /// Any other escape sequence, dropped.
    Control,
}

/// Iterator splitting a string into [`Token`]s.
pub struct Tokens<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    /// Tokenize `s`.
    pub const fn new(s: &'a str) -> Self {
        Self { s, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let bytes = self.s.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }
        if bytes[start] != ESC {
            // ESC is ASCII, so splitting at it never breaks a UTF-8 sequence.
            let end = bytes[start..]
                .iter()
                .position(|&b| b == ESC)
                .map_or(bytes.len(), |off| start + off);
            self.pos = end;
            return Some(Token::Text(&self.s[start..end]));
        }
        let (end, token) = match bytes.get(start + 1).copied() {
            Some(b'[') => {
                let end = skip_csi(bytes, start + 2);
                if end > start + 2 && bytes[end - 1] == b'm' {
                    (end, Token::Sgr(&self.s[start + 2..end - 1]))
                } else {
                    (end, Token::Control)
                }
            }
            Some(b']' | b'P' | b'^' | b'_') => (skip_string_terminated(bytes, start + 2), Token::Control),
            Some(_) => (start + 2, Token::Control),
            None => (bytes.len(), Token::Control),
        };
        // Never land inside a multi-byte character after a malformed escape.
        let mut end = end.min(bytes.len());
        while !self.s.is_char_boundary(end) {
            end += 1;
        }
        self.pos = end;
        Some(token)
    }
}

/// Skip a CSI sequence. `pos` is the byte after `[`.
fn skip_csi(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos;
    while i < bytes.len() {
        let b = bytes[i];
        if (0x40..=0x7E).contains(&b) {
            return i + 1;
        }
        if !(0x20..=0x7E).contains(&b) {
            return i;
        }
        i += 1;
    }
    bytes.len()
}

/// Skip a string-terminated sequence (OSC, DCS, PM, APC).
fn skip_string_terminated(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos;
    while i < bytes.len() {
        match bytes[i] {
            0x07 => return i + 1,
            ESC if bytes.get(i + 1) == Some(&b'\\') => return i + 2,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// One grapheme with the paint in effect where it appears.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StyledGrapheme<'a> {
    /// The grapheme cluster.
    pub grapheme: &'a str,
    /// Cells it occupies (0, 1 or 2).
    pub width: usize,
    /// Paint after applying preceding SGR sequences.
    pub paint: PaintSpec,
}

/// Split a line into graphemes, interpreting SGR sequences on top of `base`.
///
/// "Default" colors and resets return to `base`, not to terminal defaults,
/// so embedded codes layer over the owning node's paint.
pub fn styled_graphemes(line: &str, base: PaintSpec) -> Vec<StyledGrapheme<'_>> {
    let mut out = Vec::with_capacity(line.len());
    let mut paint = base;
    for token in Tokens::new(line) {
        match token {
            Token::Text(text) => {
                out.extend(text.graphemes(true).map(|grapheme| StyledGrapheme {
                    grapheme,
                    width: grapheme_width(grapheme),
                    paint,
                }));
            }
            Token::Sgr(params) => apply_sgr(&mut paint, params, base),
            Token::Control => {}
        }
    }
    out
}

/// Split styled graphemes into lines at newline graphemes.
///
/// Paint carries across the break, so a span opened on one line still
/// styles the next.
pub fn split_lines<'s, 'a>(
    graphemes: &'s [StyledGrapheme<'a>],
) -> impl Iterator<Item = &'s [StyledGrapheme<'a>]> {
    graphemes.split(|g| matches!(g.grapheme, "\n" | "\r\n"))
}

/// Serialize graphemes back into a self-contained string.
///
/// Paints are emitted relative to terminal defaults and closed with a reset.
pub fn render_graphemes(graphemes: &[StyledGrapheme<'_>]) -> String {
    let mut out = String::with_capacity(graphemes.len() * 2);
    let mut state = SgrState::new();
    for g in graphemes {
        state.transition(&mut out, g.paint);
        out.push_str(g.grapheme);
    }
    state.finish(&mut out);
    out
}

/// Apply one SGR parameter list to `paint`.
fn apply_sgr(paint: &mut PaintSpec, params: &str, base: PaintSpec) {
    let mut codes = params
        .split([';', ':'])
        .map(|p| if p.is_empty() { Some(0) } else { p.parse::<u16>().ok() });

    let restore = |paint: &mut PaintSpec, flags: Modifiers| {
        paint.modifiers = (paint.modifiers - flags) | (base.modifiers & flags);
    };

    while let Some(code) = codes.next() {
        let Some(code) = code else {
            // Unparseable parameter: ignore the rest of the sequence.
            return;
        };
        match code {
            0 => *paint = base,
            1 => paint.modifiers |= Modifiers::BOLD,
            2 => paint.modifiers |= Modifiers::DIM,
            3 => paint.modifiers |= Modifiers::ITALIC,
            4 | 21 => paint.modifiers |= Modifiers::UNDERLINE,
            5 | 6 => paint.modifiers |= Modifiers::BLINK,
            7 => paint.modifiers |= Modifiers::REVERSED,
            8 => paint.modifiers |= Modifiers::HIDDEN,
            9 => paint.modifiers |= Modifiers::STRIKETHROUGH,
            22 => restore(paint, Modifiers::BOLD | Modifiers::DIM),
            23 => restore(paint, Modifiers::ITALIC),
            24 => restore(paint, Modifiers::UNDERLINE),
            25 => restore(paint, Modifiers::BLINK),
            27 => restore(paint, Modifiers::REVERSED),
            28 => restore(paint, Modifiers::HIDDEN),
            29 => restore(paint, Modifiers::STRIKETHROUGH),
            30..=37 => paint.fg = Color::Indexed((code - 30) as u8),
            90..=97 => paint.fg = Color::Indexed((code - 90 + 8) as u8),
            39 => paint.fg = base.fg,
            40..=47 => paint.bg = Color::Indexed((code - 40) as u8),
            100..=107 => paint.bg = Color::Indexed((code - 100 + 8) as u8),
            49 => paint.bg = base.bg,
            38 | 48 => {
                let Some(color) = extended_color(&mut codes) else {
                    return;
                };
                if code == 38 {
                    paint.fg = color;
                } else {
                    paint.bg = color;
                }
            }
            _ => {}
        }
    }
}

/// Parse the tail of a `38;...` / `48;...` sequence.
fn extended_color(codes: &mut impl Iterator<Item = Option<u16>>) -> Option<Color> {
    let mut next_u8 = || codes.next().flatten().and_then(|v| u8::try_from(v).ok());
    match next_u8()? {
        5 => next_u8().map(Color::Indexed),
        2 => Some(Color::Rgb(Rgb::new(next_u8()?, next_u8()?, next_u8()?))),
        _ => None,
    }
}
