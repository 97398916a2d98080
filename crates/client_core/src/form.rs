use shared::{
    domain::{AgendaItem, EventMode},
    protocol::{
        FIELD_AUDIENCE, FIELD_DATE, FIELD_DESCRIPTION, FIELD_LOCATION, FIELD_MODE,
        FIELD_ORGANIZER, FIELD_OVERVIEW, FIELD_TIME, FIELD_TITLE, FIELD_VENUE,
    },
};
use tracing::debug;

use crate::image::{ImageFile, PreviewRegistry, StagedImage};

/// The scalar inputs of the event form, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    Description,
    Overview,
    Venue,
    Location,
    Date,
    Time,
    Mode,
    Audience,
    Organizer,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::Title,
        FormField::Description,
        FormField::Overview,
        FormField::Venue,
        FormField::Location,
        FormField::Date,
        FormField::Time,
        FormField::Mode,
        FormField::Audience,
        FormField::Organizer,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Title => FIELD_TITLE,
            Self::Description => FIELD_DESCRIPTION,
            Self::Overview => FIELD_OVERVIEW,
            Self::Venue => FIELD_VENUE,
            Self::Location => FIELD_LOCATION,
            Self::Date => FIELD_DATE,
            Self::Time => FIELD_TIME,
            Self::Mode => FIELD_MODE,
            Self::Audience => FIELD_AUDIENCE,
            Self::Organizer => FIELD_ORGANIZER,
        }
    }
}

/// Inputs the form marks as required. Only ever reported, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Title,
    Date,
    Image,
}

/// Draft of an event being authored.
///
/// Every operation is total: blank tags and half-filled agenda rows are
/// dropped silently instead of being reported.
#[derive(Debug)]
pub struct FormState {
    title: String,
    description: String,
    overview: String,
    venue: String,
    location: String,
    date: String,
    time: String,
    mode: EventMode,
    audience: String,
    organizer: String,
    tags: Vec<String>,
    agenda: Vec<AgendaItem>,
    tag_input: String,
    agenda_time_input: String,
    agenda_topic_input: String,
    image: Option<StagedImage>,
    previews: PreviewRegistry,
}

impl Default for FormState {
    fn default() -> Self {
        Self::with_previews(PreviewRegistry::new())
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_previews(previews: PreviewRegistry) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            overview: String::new(),
            venue: String::new(),
            location: String::new(),
            date: String::new(),
            time: String::new(),
            mode: EventMode::default(),
            audience: String::new(),
            organizer: String::new(),
            tags: Vec::new(),
            agenda: Vec::new(),
            tag_input: String::new(),
            agenda_time_input: String::new(),
            agenda_topic_input: String::new(),
            image: None,
            previews,
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Overview => &self.overview,
            FormField::Venue => &self.venue,
            FormField::Location => &self.location,
            FormField::Date => &self.date,
            FormField::Time => &self.time,
            FormField::Mode => self.mode.as_str(),
            FormField::Audience => &self.audience,
            FormField::Organizer => &self.organizer,
        }
    }

    /// Replaces a scalar field verbatim. `Mode` values are parsed without
    /// regard to case; an unknown mode leaves the current one in place.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        let slot = match field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::Overview => &mut self.overview,
            FormField::Venue => &mut self.venue,
            FormField::Location => &mut self.location,
            FormField::Date => &mut self.date,
            FormField::Time => &mut self.time,
            FormField::Audience => &mut self.audience,
            FormField::Organizer => &mut self.organizer,
            FormField::Mode => {
                match value.parse::<EventMode>() {
                    Ok(mode) => self.mode = mode,
                    Err(error) => debug!(%error, "ignoring unknown event mode"),
                }
                return;
            }
        };
        *slot = value;
    }

    pub fn mode(&self) -> EventMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EventMode) {
        self.mode = mode;
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Appends the trimmed tag. Duplicates are kept.
    pub fn add_tag(&mut self, text: &str) -> bool {
        let tag = text.trim();
        if tag.is_empty() {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, index: usize) -> bool {
        if index >= self.tags.len() {
            return false;
        }
        self.tags.remove(index);
        true
    }

    pub fn tag_input(&self) -> &str {
        &self.tag_input
    }

    pub fn set_tag_input(&mut self, value: impl Into<String>) {
        self.tag_input = value.into();
    }

    /// Adds whatever is typed in the tag input. The input is cleared even
    /// when nothing was added.
    pub fn commit_tag_input(&mut self) -> bool {
        let input = std::mem::take(&mut self.tag_input);
        self.add_tag(&input)
    }

    pub fn agenda(&self) -> &[AgendaItem] {
        &self.agenda
    }

    /// Appends a trimmed agenda row when both halves are non-blank, then
    /// clears the agenda inputs. A blank half leaves everything untouched.
    pub fn add_agenda_item(&mut self, time: &str, topic: &str) -> bool {
        let (time, topic) = (time.trim(), topic.trim());
        if time.is_empty() || topic.is_empty() {
            return false;
        }
        self.agenda.push(AgendaItem::new(time, topic));
        self.agenda_time_input.clear();
        self.agenda_topic_input.clear();
        true
    }

    pub fn remove_agenda_item(&mut self, index: usize) -> bool {
        if index >= self.agenda.len() {
            return false;
        }
        self.agenda.remove(index);
        true
    }

    pub fn agenda_inputs(&self) -> (&str, &str) {
        (&self.agenda_time_input, &self.agenda_topic_input)
    }

    pub fn set_agenda_time_input(&mut self, value: impl Into<String>) {
        self.agenda_time_input = value.into();
    }

    pub fn set_agenda_topic_input(&mut self, value: impl Into<String>) {
        self.agenda_topic_input = value.into();
    }

    pub fn commit_agenda_inputs(&mut self) -> bool {
        let time = self.agenda_time_input.clone();
        let topic = self.agenda_topic_input.clone();
        self.add_agenda_item(&time, &topic)
    }

    pub fn image(&self) -> Option<&StagedImage> {
        self.image.as_ref()
    }

    pub fn preview_uri(&self) -> Option<&str> {
        self.image.as_ref().map(StagedImage::preview_uri)
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Stages `file`, revoking the preview of any image it replaces.
    pub fn set_image(&mut self, file: ImageFile) {
        self.image = Some(StagedImage::new(file, &self.previews));
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn reset(&mut self) {
        *self = Self::with_previews(self.previews.clone());
    }

    pub fn missing_required(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if self.title.is_empty() {
            missing.push(RequiredField::Title);
        }
        if self.date.is_empty() {
            missing.push(RequiredField::Date);
        }
        if self.image.is_none() {
            missing.push(RequiredField::Image);
        }
        missing
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
