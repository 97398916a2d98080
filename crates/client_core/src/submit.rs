use reqwest::Client;
use shared::protocol::{ResponseNotice, EVENTS_ROUTE};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{form::FormState, payload::EventPayload};

pub const SUCCESS_MESSAGE: &str = "Event created successfully!";
pub const FALLBACK_ERROR_MESSAGE: &str = "Error creating event";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Created {
        message: String,
    },
    /// `status` is `None` when no response arrived at all.
    Rejected {
        status: Option<u16>,
        message: String,
    },
}

impl SubmissionOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Created { message } | Self::Rejected { message, .. } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid server url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to encode event payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Posts drafts to the event API, one at a time.
///
/// A successful post resets the form. A rejected one leaves it as it was so
/// the organizer can fix it and submit again; nothing is retried.
pub struct EventSubmitter {
    http: Client,
    endpoint: Url,
    phase: SubmissionPhase,
    last_outcome: Option<SubmissionOutcome>,
}

impl EventSubmitter {
    pub fn new(server_url: &str) -> Result<Self, SubmitError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, SubmitError> {
        let endpoint = Url::parse(server_url)
            .and_then(|base| base.join(EVENTS_ROUTE))
            .map_err(|source| SubmitError::InvalidServerUrl {
                url: server_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            endpoint,
            phase: SubmissionPhase::Idle,
            last_outcome: None,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// The message to show next to the form, if any.
    pub fn last_outcome(&self) -> Option<&SubmissionOutcome> {
        self.last_outcome.as_ref()
    }

    /// Posts the form. Holding `&mut self` keeps one submission per
    /// submitter; a cancelled submit still leaves the phase at `Idle`.
    pub async fn submit(&mut self, form: &mut FormState) -> Result<SubmissionOutcome, SubmitError> {
        let payload = EventPayload::from_form(form)?;

        self.last_outcome = None;
        let outcome = {
            let _submitting = PhaseGuard::enter(&mut self.phase);
            post(&self.http, &self.endpoint, payload).await
        };

        if outcome.is_success() {
            form.reset();
        }
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }
}

/// Marks the submitter as `Submitting` until dropped.
struct PhaseGuard<'a> {
    phase: &'a mut SubmissionPhase,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a mut SubmissionPhase) -> Self {
        *phase = SubmissionPhase::Submitting;
        Self { phase }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.phase = SubmissionPhase::Idle;
    }
}

async fn post(http: &Client, endpoint: &Url, payload: EventPayload) -> SubmissionOutcome {
    let body = match payload.into_multipart() {
        Ok(body) => body,
        Err(error) => {
            warn!(%error, "failed to build multipart body");
            return rejected(None, None);
        }
    };

    let response = match http.post(endpoint.clone()).multipart(body).send().await {
        Ok(response) => response,
        Err(error) => {
            warn!(%error, %endpoint, "event submission did not reach the server");
            return rejected(None, None);
        }
    };

    let status = response.status();
    if status.is_success() {
        info!(status = status.as_u16(), "event created");
        return SubmissionOutcome::Created {
            message: SUCCESS_MESSAGE.to_string(),
        };
    }

    let notice = response.json::<ResponseNotice>().await.unwrap_or_default();
    let outcome = rejected(Some(status.as_u16()), notice.message);
    warn!(
        status = status.as_u16(),
        message = outcome.message(),
        "event submission rejected"
    );
    outcome
}

fn rejected(status: Option<u16>, message: Option<String>) -> SubmissionOutcome {
    SubmissionOutcome::Rejected {
        status,
        message: message
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/submit_tests.rs"]
mod tests;
