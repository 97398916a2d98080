//! Client side of event authoring: the draft form, its cover image staging,
//! and the submitter that posts it to the event API.

pub mod form;
pub mod image;
pub mod payload;
pub mod submit;

pub use form::{FormField, FormState, RequiredField};
pub use image::{ImageFile, PreviewHandle, PreviewRegistry, StagedImage};
pub use payload::EventPayload;
pub use submit::{
    EventSubmitter, SubmissionOutcome, SubmissionPhase, SubmitError, FALLBACK_ERROR_MESSAGE,
    SUCCESS_MESSAGE,
};
