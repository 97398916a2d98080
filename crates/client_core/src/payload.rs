use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use shared::protocol::{encode_agenda, encode_tags, FIELD_AGENDA, FIELD_IMAGE, FIELD_TAGS};

use crate::{
    form::{FormField, FormState},
    image::ImageFile,
};

/// Snapshot of a form in wire shape: text parts plus an optional image.
#[derive(Debug, Clone)]
pub struct EventPayload {
    text_parts: Vec<(&'static str, String)>,
    image: Option<Arc<ImageFile>>,
}

impl EventPayload {
    pub fn from_form(form: &FormState) -> serde_json::Result<Self> {
        let mut text_parts: Vec<(&'static str, String)> = FormField::ALL
            .iter()
            .map(|field| (field.wire_name(), form.field(*field).to_string()))
            .collect();
        text_parts.push((FIELD_TAGS, encode_tags(form.tags())?));
        text_parts.push((FIELD_AGENDA, encode_agenda(form.agenda())?));

        Ok(Self {
            text_parts,
            image: form.image().map(|staged| Arc::clone(staged.file())),
        })
    }

    pub fn text_parts(&self) -> &[(&'static str, String)] {
        &self.text_parts
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.text_parts
            .iter()
            .find(|(part, _)| *part == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn image(&self) -> Option<&ImageFile> {
        self.image.as_deref()
    }

    pub fn into_multipart(self) -> reqwest::Result<Form> {
        let mut form = self
            .text_parts
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        if let Some(image) = self.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.filename.clone())
                .mime_str(image.mime_type_or_default())?;
            form = form.part(FIELD_IMAGE, part);
        }
        Ok(form)
    }
}
