//! Command definitions
//!
//! Parses one text line of the command grammar.

use crate::error::{ChromoError, Result};

/// Argument delimiter
pub const DELIMITER: &[u8] = b"->";

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Mem,
    Disk,
    Put,
    Get,
    Delete,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Report current memory usage
    Mem,

    /// Report combined size of the data and index files
    Disk,

    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Get a value by key
    Get { key: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },
}

impl Command {
    /// Parse a command line
    ///
    /// The verb is the first `->`-separated field, compared case-insensitively.
    /// Every field is trimmed of surrounding ASCII whitespace, which also
    /// drops a trailing CR/LF. There is no escaping of `->` inside keys or
    /// values.
    pub fn parse(line: &[u8]) -> Result<Command> {
        let fields = split_fields(line);
        let verb = fields[0].to_ascii_uppercase();

        match verb.as_slice() {
            b"MEM" => Ok(Command::Mem),
            b"DISK" => Ok(Command::Disk),
            b"PUT" => {
                if fields.len() != 3 {
                    return Err(ChromoError::MalformedCommand(format!(
                        "PUT expects PUT->key->value, got {} fields",
                        fields.len()
                    )));
                }
                Ok(Command::Put {
                    key: fields[1].to_vec(),
                    value: fields[2].to_vec(),
                })
            }
            b"GET" => Ok(Command::Get {
                key: key_argument(&fields, "GET")?,
            }),
            b"DEL" => Ok(Command::Delete {
                key: key_argument(&fields, "DEL")?,
            }),
            _ => Err(ChromoError::UnknownCommand(
                String::from_utf8_lossy(fields[0]).into_owned(),
            )),
        }
    }

    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Mem => CommandType::Mem,
            Command::Disk => CommandType::Disk,
            Command::Put { .. } => CommandType::Put,
            Command::Get { .. } => CommandType::Get,
            Command::Delete { .. } => CommandType::Delete,
        }
    }

    /// Whether this command runs against the storage engine
    pub fn needs_engine(&self) -> bool {
        matches!(
            self,
            Command::Put { .. } | Command::Get { .. } | Command::Delete { .. }
        )
    }
}

/// GET and DEL take at least one argument; extra fields are ignored
fn key_argument(fields: &[&[u8]], verb: &str) -> Result<Vec<u8>> {
    if fields.len() < 2 {
        return Err(ChromoError::MalformedCommand(format!(
            "{} expects {}->key",
            verb, verb
        )));
    }
    Ok(fields[1].to_vec())
}

/// Split on `->` and trim each field
///
/// Always yields at least one field.
fn split_fields(line: &[u8]) -> Vec<&[u8]> {
    let mut fields = Vec::new();
    let mut rest = line;

    while let Some(pos) = find(rest, DELIMITER) {
        fields.push(trim(&rest[..pos]));
        rest = &rest[pos + DELIMITER.len()..];
    }
    fields.push(trim(rest));

    fields
}

/// Strip surrounding ASCII whitespace
pub(crate) fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |pos| pos + 1);
    &bytes[start..end]
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
