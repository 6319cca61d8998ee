//! Border glyph table.

/// Glyphs for one border style.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BorderChars {
    /// Top-left corner.
    pub top_left: char,
    /// Top edge.
    pub top: char,
    /// Top-right corner.
    pub top_right: char,
    /// Right edge.
    pub right: char,
    /// Bottom-right corner.
    pub bottom_right: char,
    /// Bottom edge.
    pub bottom: char,
    /// Bottom-left corner.
    pub bottom_left: char,
    /// Left edge.
    pub left: char,
}

impl BorderChars {
    const fn new(corners: [char; 4], horizontal: [char; 2], vertical: [char; 2]) -> Self {
        let [top_left, top_right, bottom_right, bottom_left] = corners;
        let [top, bottom] = horizontal;
        let [left, right] = vertical;
        Self { top_left, top, top_right, right, bottom_right, bottom, bottom_left, left }
    }
}

/// Named border styles, plus caller-supplied glyph sets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BorderStyle {
    /// ┌─┐│└┘
    Single,
    /// ╔═╗║╚╝
    Double,
    /// ╭─╮│╰╯
    Round,
    /// ┏━┓┃┗┛
    Bold,
    /// ╓─╖║╙╜ (single horizontal, double vertical)
    SingleDouble,
    /// ╒═╕│╘╛ (double horizontal, single vertical)
    DoubleSingle,
    /// +-+|++
    Classic,
    /// Arrows pointing inward.
    Arrow,
    /// Custom glyphs.
    Custom(BorderChars),
}

impl BorderStyle {
    /// Look a style up by name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "single" => Self::Single,
            "double" => Self::Double,
            "round" => Self::Round,
            "bold" => Self::Bold,
            "singleDouble" => Self::SingleDouble,
            "doubleSingle" => Self::DoubleSingle,
            "classic" => Self::Classic,
            "arrow" => Self::Arrow,
            _ => return None,
        })
    }

    /// Glyphs for this style.
    pub const fn chars(&self) -> BorderChars {
        match self {
            Self::Single => BorderChars::new(['┌', '┐', '┘', '└'], ['─', '─'], ['│', '│']),
            Self::Double => BorderChars::new(['╔', '╗', '╝', '╚'], ['═', '═'], ['║', '║']),
            Self::Round => BorderChars::new(['╭', '╮', '╯', '╰'], ['─', '─'], ['│', '│']),
            Self::Bold => BorderChars::new(['┏', '┓', '┛', '┗'], ['━', '━'], ['┃', '┃']),
            Self::SingleDouble => BorderChars::new(['╓', '╖', '╜', '╙'], ['─', '─'], ['║', '║']),
            Self::DoubleSingle => BorderChars::new(['╒', '╕', '╛', '╘'], ['═', '═'], ['│', '│']),
            Self::Classic => BorderChars::new(['+', '+', '+', '+'], ['-', '-'], ['|', '|']),
            Self::Arrow => BorderChars::new(['↘', '↙', '↖', '↗'], ['↓', '↑'], ['→', '←']),
            Self::Custom(chars) => *chars,
        }
    }
}
