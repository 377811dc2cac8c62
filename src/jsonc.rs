//! JSON document helpers shared by the preferences mirror and the settings
//! bridge: JSONC comment stripping for reads, and the 4-space pretty printer
//! used for every write.

use serde::Serialize;

/// Strip `//` and `/* */` comments from JSONC (JSON with comments) content.
///
/// Editor-managed JSON files frequently carry comments, which `serde_json`
/// rejects. Comment bytes are replaced rather than removed where needed to
/// keep newlines, so parse error positions stay meaningful. String literals
/// are left untouched, including escaped quotes.
pub fn strip_comments(content: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Normal,
        InString,
        InStringEscape,
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(content.len());
    let mut state = State::Normal;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match c {
                '"' => {
                    state = State::InString;
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                _ => out.push(c),
            },
            State::InString => {
                out.push(c);
                match c {
                    '\\' => state = State::InStringEscape,
                    '"' => state = State::Normal,
                    _ => {}
                }
            }
            State::InStringEscape => {
                out.push(c);
                state = State::InString;
            }
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Normal;
                } else if c == '\n' {
                    out.push('\n');
                }
            }
        }
    }

    out
}

/// Serialize `value` as pretty-printed JSON with a 4-space indent, the
/// on-disk format of `wpilib_preferences.json` and of editor settings files.
pub fn to_pretty_string<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(out).expect("serde_json produces valid UTF-8"))
}
