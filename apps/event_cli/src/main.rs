use std::{path::PathBuf, process::ExitCode};

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{EventSubmitter, FormField, FormState, ImageFile, RequiredField};
use shared::domain::EventMode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset, same as the server.
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(about = "Author an event and submit it to the event API")]
struct Args {
    #[arg(long)]
    server_url: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    date: String,
    #[arg(long, default_value = "")]
    time: String,
    #[arg(long, default_value_t = EventMode::default())]
    mode: EventMode,
    #[arg(long, default_value = "")]
    venue: String,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    overview: String,
    #[arg(long, default_value = "")]
    audience: String,
    #[arg(long, default_value = "")]
    organizer: String,
    /// Repeatable; blank tags are dropped.
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// Repeatable, as `TIME=TOPIC`.
    #[arg(long = "agenda", value_parser = parse_agenda_arg)]
    agenda: Vec<(String, String)>,
    #[arg(long)]
    image: Option<PathBuf>,
    /// Submit even when required inputs are blank.
    #[arg(long)]
    allow_missing: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();
    let args = Args::parse();

    let image = match &args.image {
        Some(path) => Some(ImageFile::load(path).await?),
        None => None,
    };
    if let Some(warning) = image.as_ref().and_then(non_image_warning) {
        warn!("{warning}");
    }
    let mut form = build_form(&args, image);

    let missing = form.missing_required();
    if !missing.is_empty() {
        let names = missing_names(&missing);
        if !args.allow_missing {
            bail!("missing required inputs: {names} (pass --allow-missing to submit anyway)");
        }
        warn!(missing = %names, "submitting with required inputs left blank");
    }

    let mut submitter = EventSubmitter::new(&args.server_url)?;
    info!(endpoint = %submitter.endpoint(), "submitting event");
    let outcome = submitter.submit(&mut form).await?;
    println!("{}", outcome.message());

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn build_form(args: &Args, image: Option<ImageFile>) -> FormState {
    let mut form = FormState::new();
    for (field, value) in [
        (FormField::Title, &args.title),
        (FormField::Date, &args.date),
        (FormField::Time, &args.time),
        (FormField::Venue, &args.venue),
        (FormField::Location, &args.location),
        (FormField::Description, &args.description),
        (FormField::Overview, &args.overview),
        (FormField::Audience, &args.audience),
        (FormField::Organizer, &args.organizer),
    ] {
        form.set_field(field, value.as_str());
    }
    form.set_mode(args.mode);

    for tag in &args.tags {
        form.add_tag(tag);
    }
    for (time, topic) in &args.agenda {
        form.add_agenda_item(time, topic);
    }
    if let Some(image) = image {
        form.set_image(image);
    }
    form
}

/// Anything without an `image/*` type is still sent, with a warning.
fn non_image_warning(image: &ImageFile) -> Option<String> {
    if image.is_image() {
        return None;
    }
    Some(format!(
        "'{}' does not look like an image ({}); submitting it anyway",
        image.filename,
        image.mime_type_or_default()
    ))
}

fn parse_agenda_arg(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((time, topic)) => Ok((time.trim().to_string(), topic.trim().to_string())),
        None => Err(format!("expected TIME=TOPIC, got '{raw}'")),
    }
}

fn missing_names(missing: &[RequiredField]) -> String {
    missing
        .iter()
        .map(|field| match field {
            RequiredField::Title => "title",
            RequiredField::Date => "date",
            RequiredField::Image => "image",
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
