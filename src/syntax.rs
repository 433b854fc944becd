#![warn(clippy::all, clippy::pedantic)]
//! Syntax profiles and the per-row classifier.
//!
//! To add a language, append a [`Syntax`] stanza to [`HLDB`]. File name
//! patterns starting with a dot only match as a suffix (".c"); any other
//! pattern matches anywhere in the name ("Makefile"). A keyword carrying a
//! trailing `|` is secondary and gets its own color.
use bitflags::bitflags;
use crossterm::style::Color;

/// One tag per rendered byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Highlight {
    #[default]
    Normal,
    NonPrint,
    Comment,
    MultilineComment,
    Keyword1,
    Keyword2,
    String,
    Number,
    Match,
}

impl Highlight {
    /// Takes itself.
    /// Returns the foreground color used to draw the tag, or `None`
    /// for the terminal's default color.
    #[must_use]
    pub fn color(self) -> Option<Color> {
        match self {
            Highlight::Comment | Highlight::MultilineComment => Some(Color::DarkCyan),
            Highlight::Keyword1 => Some(Color::DarkYellow),
            Highlight::Keyword2 => Some(Color::DarkGreen),
            Highlight::String => Some(Color::DarkMagenta),
            Highlight::Number => Some(Color::DarkRed),
            Highlight::Match => Some(Color::DarkBlue),
            Highlight::Normal | Highlight::NonPrint => None,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SyntaxFlags: u8 {
        const HIGHLIGHT_STRINGS = 1;
        const HIGHLIGHT_NUMBERS = 1 << 1;
    }
}

#[derive(Debug)]
pub struct Syntax {
    pub name: &'static str,
    pub filematch: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub singleline_comment_start: &'static str,
    pub multiline_comment_start: &'static str,
    pub multiline_comment_end: &'static str,
    pub flags: SyntaxFlags,
}

const C_HL_EXTENSIONS: &[&str] = &[".c", ".h", ".cpp", ".hpp", ".cc"];
const C_HL_KEYWORDS: &[&str] = &[
    // C
    "auto", "break", "case", "continue", "default", "do", "else", "enum", "extern", "for",
    "goto", "if", "register", "return", "sizeof", "static", "struct", "switch", "typedef",
    "union", "volatile", "while", "NULL",
    // C++
    "alignas", "alignof", "and", "and_eq", "asm", "bitand", "bitor", "class", "compl",
    "constexpr", "const_cast", "decltype", "delete", "dynamic_cast", "explicit", "export",
    "false", "friend", "inline", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public",
    "reinterpret_cast", "static_assert", "static_cast", "template", "this", "thread_local",
    "throw", "true", "try", "typeid", "typename", "virtual", "xor", "xor_eq",
    // types
    "int|", "long|", "double|", "float|", "char|", "unsigned|", "signed|", "void|", "short|",
    "auto|", "const|", "bool|",
];

const RUST_HL_EXTENSIONS: &[&str] = &[".rs"];
const RUST_HL_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn",
    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while", "async", "await", "dyn",
    // primitive and prelude types
    "i8|", "i16|", "i32|", "i64|", "i128|", "isize|", "u8|", "u16|", "u32|", "u64|", "u128|",
    "usize|", "f32|", "f64|", "bool|", "char|", "str|", "String|", "Vec|", "Option|",
    "Result|", "Box|",
];

/// The highlight database, scanned in order when picking a profile.
pub static HLDB: &[Syntax] = &[
    Syntax {
        name: "c",
        filematch: C_HL_EXTENSIONS,
        keywords: C_HL_KEYWORDS,
        singleline_comment_start: "//",
        multiline_comment_start: "/*",
        multiline_comment_end: "*/",
        flags: SyntaxFlags::HIGHLIGHT_STRINGS.union(SyntaxFlags::HIGHLIGHT_NUMBERS),
    },
    Syntax {
        name: "rust",
        filematch: RUST_HL_EXTENSIONS,
        keywords: RUST_HL_KEYWORDS,
        singleline_comment_start: "//",
        multiline_comment_start: "/*",
        multiline_comment_end: "*/",
        flags: SyntaxFlags::HIGHLIGHT_STRINGS.union(SyntaxFlags::HIGHLIGHT_NUMBERS),
    },
];

impl Syntax {
    /// Takes itself and a file name.
    /// Returns whether any of the profile's patterns match the name.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.filematch.iter().any(|pattern| {
            if pattern.starts_with('.') {
                file_name.ends_with(pattern)
            } else {
                file_name.contains(pattern)
            }
        })
    }
}

/// Takes a file name.
/// Returns the first profile in [`HLDB`] matching the name, if any.
#[must_use]
pub fn select(file_name: &str) -> Option<&'static Syntax> {
    HLDB.iter().find(|syntax| syntax.matches(file_name))
}

#[must_use]
pub fn is_separator(c: u8) -> bool {
    matches!(c, b'\0' | b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
        || b",.()+-/*=~%[];".contains(&c)
}

fn is_printable(c: u8) -> bool {
    c == b' ' || c.is_ascii_graphic()
}

/// Takes the remainder of a row and a keyword list.
/// Returns the length of the longest keyword the row starts with
/// (followed by a separator or the end of the row) and whether it is
/// a secondary keyword.
fn match_keyword(rest: &[u8], keywords: &[&str]) -> Option<(usize, bool)> {
    let mut best: Option<(usize, bool)> = None;
    for keyword in keywords {
        let (word, secondary) = match keyword.strip_suffix('|') {
            Some(word) => (word.as_bytes(), true),
            None => (keyword.as_bytes(), false),
        };
        if word.is_empty() || !rest.starts_with(word) {
            continue;
        }
        if !rest.get(word.len()).map_or(true, |&next| is_separator(next)) {
            continue;
        }
        if best.map_or(true, |(len, _)| word.len() > len) {
            best = Some((word.len(), secondary));
        }
    }
    best
}

/// Takes a rendered row, the active profile and whether the row starts
/// inside a block comment.
/// Returns one tag per rendered byte and whether the row ends inside an
/// unterminated block comment.
#[must_use]
pub fn highlight(
    render: &[u8],
    syntax: Option<&Syntax>,
    starts_in_comment: bool,
) -> (Vec<Highlight>, bool) {
    let mut hl = vec![Highlight::Normal; render.len()];
    let Some(syntax) = syntax else {
        return (hl, false);
    };

    let scs = syntax.singleline_comment_start.as_bytes();
    let mcs = syntax.multiline_comment_start.as_bytes();
    let mce = syntax.multiline_comment_end.as_bytes();
    let block_comments = !mcs.is_empty() && !mce.is_empty();
    let strings = syntax.flags.contains(SyntaxFlags::HIGHLIGHT_STRINGS);
    let numbers = syntax.flags.contains(SyntaxFlags::HIGHLIGHT_NUMBERS);

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut in_comment = block_comments && starts_in_comment;
    let mut i = 0;

    while i < render.len() {
        let c = render[i];
        let rest = &render[i..];

        if prev_sep && !scs.is_empty() && rest.starts_with(scs) {
            hl[i..].fill(Highlight::Comment);
            return (hl, false);
        }

        if in_comment {
            if rest.starts_with(mce) {
                hl[i..i + mce.len()].fill(Highlight::MultilineComment);
                i += mce.len();
                in_comment = false;
                prev_sep = true;
            } else {
                hl[i] = Highlight::MultilineComment;
                i += 1;
                prev_sep = false;
            }
            continue;
        } else if block_comments && rest.starts_with(mcs) {
            hl[i..i + mcs.len()].fill(Highlight::MultilineComment);
            i += mcs.len();
            in_comment = true;
            prev_sep = false;
            continue;
        }

        if let Some(quote) = in_string {
            hl[i] = Highlight::String;
            if c == b'\\' && i + 1 < render.len() {
                hl[i + 1] = Highlight::String;
                i += 2;
                prev_sep = false;
                continue;
            }
            if c == quote {
                in_string = None;
            }
            i += 1;
            continue;
        } else if strings && (c == b'"' || c == b'\'') {
            in_string = Some(c);
            hl[i] = Highlight::String;
            i += 1;
            prev_sep = false;
            continue;
        }

        if !is_printable(c) {
            hl[i] = Highlight::NonPrint;
            i += 1;
            prev_sep = false;
            continue;
        }

        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };
        if numbers
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            if let Some((len, secondary)) = match_keyword(rest, syntax.keywords) {
                let tag = if secondary {
                    Highlight::Keyword2
                } else {
                    Highlight::Keyword1
                };
                hl[i..i + len].fill(tag);
                i += len;
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    (hl, in_comment)
}
