use serde::{Deserialize, Serialize};

use crate::domain::{AgendaItem, EventRecord};

pub const EVENTS_ROUTE: &str = "/api/events";

pub const FIELD_TITLE: &str = "title";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_OVERVIEW: &str = "overview";
pub const FIELD_VENUE: &str = "venue";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_DATE: &str = "date";
pub const FIELD_TIME: &str = "time";
pub const FIELD_MODE: &str = "mode";
pub const FIELD_AUDIENCE: &str = "audience";
pub const FIELD_ORGANIZER: &str = "organizer";
pub const FIELD_TAGS: &str = "tags";
pub const FIELD_AGENDA: &str = "agenda";
pub const FIELD_IMAGE: &str = "image";

/// Separator between time and topic in a flattened agenda line.
///
/// Not escaped: a topic that itself contains the separator cannot be told
/// apart from a time that does. Receivers split on the first occurrence.
pub const AGENDA_SEPARATOR: &str = " | ";

pub fn encode_agenda_line(item: &AgendaItem) -> String {
    format!("{}{AGENDA_SEPARATOR}{}", item.time, item.topic)
}

/// Splits a flattened agenda line on its first separator. A line without a
/// separator is kept whole as the time with an empty topic.
pub fn decode_agenda_line(line: &str) -> AgendaItem {
    match line.split_once(AGENDA_SEPARATOR) {
        Some((time, topic)) => AgendaItem::new(time, topic),
        None => AgendaItem::new(line, ""),
    }
}

pub fn encode_agenda(items: &[AgendaItem]) -> serde_json::Result<String> {
    let lines: Vec<String> = items.iter().map(encode_agenda_line).collect();
    serde_json::to_string(&lines)
}

pub fn decode_agenda(raw: &str) -> serde_json::Result<Vec<AgendaItem>> {
    let lines: Vec<String> = serde_json::from_str(raw)?;
    Ok(lines.iter().map(|line| decode_agenda_line(line)).collect())
}

pub fn encode_tags(tags: &[String]) -> serde_json::Result<String> {
    serde_json::to_string(tags)
}

pub fn decode_tags(raw: &str) -> serde_json::Result<Vec<String>> {
    serde_json::from_str(raw)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub message: String,
    pub event: EventRecord,
}

/// The only part of a response body the form cares about. Every field is
/// optional because failure bodies come from more than one layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseNotice {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agenda_encodes_as_delimited_strings() {
        let encoded = encode_agenda(&[AgendaItem::new("10:00", "Keynote")]).expect("encode");
        assert_eq!(encoded, r#"["10:00 | Keynote"]"#);
    }

    #[test]
    fn agenda_line_splits_back_into_time_and_topic() {
        let item = AgendaItem::new("10:00", "Keynote");
        assert_eq!(decode_agenda_line(&encode_agenda_line(&item)), item);
    }

    #[test]
    fn agenda_line_with_separator_in_topic_splits_on_first_occurrence() {
        let item = AgendaItem::new("11:00", "Q | A");
        let decoded = decode_agenda_line(&encode_agenda_line(&item));
        assert_eq!(decoded, AgendaItem::new("11:00", "Q | A"));
    }

    #[test]
    fn agenda_line_without_separator_keeps_whole_line_as_time() {
        assert_eq!(decode_agenda_line("lunch"), AgendaItem::new("lunch", ""));
    }

    #[test]
    fn tags_keep_order_and_duplicates() {
        let tags = vec!["ai".to_string(), "AI".to_string(), "ai".to_string()];
        let encoded = encode_tags(&tags).expect("encode");
        assert_eq!(encoded, r#"["ai","AI","ai"]"#);
        assert_eq!(decode_tags(&encoded).expect("decode"), tags);
    }

    #[test]
    fn response_notice_tolerates_missing_message() {
        let notice: ResponseNotice = serde_json::from_str(r#"{"ok":false}"#).expect("json");
        assert!(notice.message.is_none());
    }
}
