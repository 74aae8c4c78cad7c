//! Text VDF parser for `steamapps/libraryfolders.vdf`.
//!
//! The file is a brace-nested list of quoted key/value pairs:
//!
//! ```text
//! "libraryfolders"
//! {
//!     "0"
//!     {
//!         "path"  "D:\\SteamLibrary"
//!         "apps"  { "698780" "1234567" }
//!     }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::SteamError;

/// A parsed VDF value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VdfValue {
    String(String),
    Object(Vec<(String, VdfValue)>),
}

impl VdfValue {
    /// Looks up a child by key, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&VdfValue> {
        match self {
            VdfValue::Object(entries) => entries
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v),
            VdfValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VdfValue::String(s) => Some(s),
            VdfValue::Object(_) => None,
        }
    }
}

/// A Steam library folder and the app ids installed in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub path: PathBuf,
    pub app_ids: Vec<String>,
}

impl Library {
    /// Returns true if any of `ids` is installed in this library.
    pub fn has_any_app(&self, ids: &[String]) -> bool {
        self.app_ids.iter().any(|id| ids.contains(id))
    }
}

/// Parsed form of `libraryfolders.vdf`, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryDescriptor {
    pub libraries: Vec<Library>,
}

impl LibraryDescriptor {
    /// Reads and parses a descriptor from disk.
    pub fn load(path: &Path) -> Result<Self, SteamError> {
        let text = fs::read_to_string(path).map_err(|e| {
            SteamError::Io(format!("failed to read {}: {e}", path.display()))
        })?;
        parse_library_folders(&text)
    }

    /// Keeps only the libraries holding at least one of `ids`.
    pub fn retain_apps(&mut self, ids: &[String]) {
        self.libraries.retain(|lib| lib.has_any_app(ids));
    }
}

/// Parses the text of a `libraryfolders.vdf` file.
pub fn parse_library_folders(text: &str) -> Result<LibraryDescriptor, SteamError> {
    let doc = parse_vdf(text)?;

    let root = match &doc {
        VdfValue::Object(entries) => entries
            .iter()
            .find(|(k, v)| k.eq_ignore_ascii_case("libraryfolders") && matches!(v, VdfValue::Object(_)))
            .or_else(|| entries.iter().find(|(_, v)| matches!(v, VdfValue::Object(_))))
            .map(|(_, v)| v),
        VdfValue::String(_) => None,
    }
    .ok_or_else(|| SteamError::Vdf("missing 'libraryfolders' root object".into()))?;

    let VdfValue::Object(entries) = root else {
        return Err(SteamError::Vdf("root is not an object".into()));
    };

    let mut libraries = Vec::new();
    for (key, value) in entries {
        // Only numeric keys describe libraries ("contentstatsid" etc. are skipped).
        if key.parse::<u64>().is_err() || !matches!(value, VdfValue::Object(_)) {
            continue;
        }

        let Some(path) = value.get("path").and_then(VdfValue::as_str) else {
            tracing::debug!(library = %key, "library entry without path");
            continue;
        };

        let app_ids = match value.get("apps") {
            Some(VdfValue::Object(apps)) => apps.iter().map(|(id, _)| id.clone()).collect(),
            _ => Vec::new(),
        };

        libraries.push(Library {
            path: PathBuf::from(path),
            app_ids,
        });
    }

    Ok(LibraryDescriptor { libraries })
}

/// Parses VDF text into a root object holding the top-level pairs.
pub fn parse_vdf(text: &str) -> Result<VdfValue, SteamError> {
    let tokens = tokenize(text)?;
    let mut pos = 0;
    let entries = parse_object(&tokens, &mut pos, false)?;
    Ok(VdfValue::Object(entries))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Str(String),
    Open,
    Close,
}

fn parse_object(
    tokens: &[Token],
    pos: &mut usize,
    nested: bool,
) -> Result<Vec<(String, VdfValue)>, SteamError> {
    let mut entries = Vec::new();

    loop {
        let Some(token) = tokens.get(*pos) else {
            if nested {
                return Err(SteamError::Vdf("unexpected end of data, missing '}'".into()));
            }
            return Ok(entries);
        };
        *pos += 1;

        let key = match token {
            Token::Close if nested => return Ok(entries),
            Token::Close => {
                return Err(SteamError::Vdf(format!("unexpected '}}' at token {}", *pos - 1)));
            }
            Token::Open => {
                return Err(SteamError::Vdf(format!(
                    "expected key, found '{{' at token {}",
                    *pos - 1
                )));
            }
            Token::Str(key) => key.clone(),
        };

        match tokens.get(*pos) {
            Some(Token::Str(value)) => {
                *pos += 1;
                entries.push((key, VdfValue::String(value.clone())));
            }
            Some(Token::Open) => {
                *pos += 1;
                let child = parse_object(tokens, pos, true)?;
                entries.push((key, VdfValue::Object(child)));
            }
            Some(Token::Close) | None => {
                return Err(SteamError::Vdf(format!("missing value for key '{key}'")));
            }
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, SteamError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '{' => tokens.push(Token::Open),
            '}' => tokens.push(Token::Close),
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                // Line comment.
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '"' => {
                let mut s = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, '\\')) => s.push('\\'),
                            Some((_, '"')) => s.push('"'),
                            Some((_, other)) => {
                                s.push('\\');
                                s.push(other);
                            }
                            None => break,
                        },
                        _ => s.push(c),
                    }
                }
                if !closed {
                    return Err(SteamError::Vdf(format!(
                        "unterminated string starting at byte {start}"
                    )));
                }
                tokens.push(Token::Str(s));
            }
            _ => {
                // Bare word, up to whitespace or a brace.
                let mut s = String::from(c);
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || c == '{' || c == '}' || c == '"' {
                        break;
                    }
                    s.push(c);
                    chars.next();
                }
                tokens.push(Token::Str(s));
            }
        }
    }

    Ok(tokens)
}
