//! Text command recognition.
//!
//! Matching is case-insensitive and keyword based: the first recognized
//! phrase decides the command, and arguments (`at X,Y,Z`, `id N`,
//! `description '...'`) may appear anywhere in the text.

use thiserror::Error;
use voxcsg_core::object::ObjectId;
use voxcsg_core::types::Coord;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    DrawBox {
        position: Option<Coord>,
        negative: bool,
        description: Option<String>,
    },
    DrawFigure {
        position: Option<Coord>,
        description: Option<String>,
    },
    SaveStl,
    /// `None` loads every stored object.
    LoadObjects { id: Option<ObjectId> },
    Exit,
    Unrecognized,
}

/// A recognized command whose arguments could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("number out of range: {0}")]
    NumberOutOfRange(String),
}

pub fn parse_command(text: &str) -> Result<Command, CommandError> {
    let text = text.to_lowercase();
    let description = find_description(&text);

    if text.contains("draw a box") {
        return Ok(Command::DrawBox {
            position: find_position(&text)?,
            negative: text.contains("negative"),
            description,
        });
    }
    if text.contains("draw pythagorean theorem") {
        return Ok(Command::DrawFigure {
            position: find_position(&text)?,
            description,
        });
    }
    if text.contains("save stl") {
        return Ok(Command::SaveStl);
    }
    if text.contains("load objects") {
        // Id 0 never names a row and means "everything".
        let id = find_id(&text)?.filter(|&id| id != 0);
        return Ok(Command::LoadObjects { id });
    }
    if text.contains("exit") {
        return Ok(Command::Exit);
    }
    Ok(Command::Unrecognized)
}

/// Leading ASCII digits of `s`, if any.
fn digits(s: &str) -> Option<&str> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (end > 0).then(|| &s[..end])
}

/// `s` with leading whitespace removed, if there was at least one.
fn after_whitespace(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    (trimmed.len() < s.len()).then_some(trimmed)
}

/// First `at <d>,<d>,<d>` in the text.
fn find_position(text: &str) -> Result<Option<Coord>, CommandError> {
    for (start, _) in text.match_indices("at") {
        let Some(rest) = after_whitespace(&text[start + 2..]) else {
            continue;
        };
        let mut parts = [""; 3];
        let mut cursor = rest;
        let mut ok = true;
        for (i, part) in parts.iter_mut().enumerate() {
            let Some(d) = digits(cursor) else {
                ok = false;
                break;
            };
            *part = d;
            cursor = &cursor[d.len()..];
            if i < 2 {
                match cursor.strip_prefix(',') {
                    Some(next) => cursor = next,
                    None => {
                        ok = false;
                        break;
                    }
                }
            }
        }
        if !ok {
            continue;
        }
        let mut values = [0i32; 3];
        for (value, part) in values.iter_mut().zip(parts) {
            *value = part
                .parse()
                .map_err(|_| CommandError::NumberOutOfRange(part.to_string()))?;
        }
        return Ok(Some(Coord::from_array(values)));
    }
    Ok(None)
}

/// First `id <d>` in the text.
fn find_id(text: &str) -> Result<Option<ObjectId>, CommandError> {
    for (start, _) in text.match_indices("id") {
        let Some(d) = after_whitespace(&text[start + 2..]).and_then(digits) else {
            continue;
        };
        return d
            .parse()
            .map(Some)
            .map_err(|_| CommandError::NumberOutOfRange(d.to_string()));
    }
    Ok(None)
}

/// First `description '<text>'` with non-empty text.
fn find_description(text: &str) -> Option<String> {
    for (start, _) in text.match_indices("description") {
        let Some(rest) = after_whitespace(&text[start + "description".len()..]) else {
            continue;
        };
        let Some(body) = rest.strip_prefix('\'') else {
            continue;
        };
        if let Some(end) = body.find('\'') {
            if end > 0 {
                return Some(body[..end].to_string());
            }
        }
    }
    None
}
