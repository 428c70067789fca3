//! Conversions between LSP protocol types and gql-assist types.

use gql_assist_config::AssistConfig;
use gql_assist_patch::TextBuffer;
use gql_assist_types::HostEvent;
use lsp_types::{FileChangeType, Position, Range};
use serde_json::Value;

/// Section name the client nests our settings under.
pub const SETTINGS_SECTION: &str = "gqlAssist";

pub const fn to_lsp_position(pos: gql_assist_types::Position) -> Position {
    Position {
        line: pos.line,
        character: pos.character,
    }
}

pub const fn to_lsp_range(range: gql_assist_types::Range) -> Range {
    Range {
        start: to_lsp_position(range.start),
        end: to_lsp_position(range.end),
    }
}

pub fn host_event(change: FileChangeType) -> Option<HostEvent> {
    match change {
        FileChangeType::CREATED => Some(HostEvent::Created),
        FileChangeType::CHANGED => Some(HostEvent::Changed),
        FileChangeType::DELETED => Some(HostEvent::Deleted),
        _ => None,
    }
}

/// Range covering all of `text`.
pub fn full_range(text: &str) -> Range {
    to_lsp_range(TextBuffer::new(text).full_range())
}

/// Read our configuration out of client settings.
///
/// Accepts either the bare configuration object or one nested under
/// [`SETTINGS_SECTION`]. `None` for null or empty settings.
pub fn config_from_settings(settings: &Value) -> Option<Result<AssistConfig, serde_json::Error>> {
    let section = settings.get(SETTINGS_SECTION).unwrap_or(settings);
    match section {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(serde_json::from_value(other.clone())),
    }
}
