use super::*;

fn image(name: &str) -> ImageFile {
    ImageFile::new(name, name.as_bytes().to_vec())
}

#[test]
fn new_form_starts_empty_and_offline() {
    let form = FormState::new();
    for field in FormField::ALL {
        if field == FormField::Mode {
            assert_eq!(form.field(field), "offline");
        } else {
            assert_eq!(form.field(field), "", "{field:?} should start empty");
        }
    }
    assert!(form.tags().is_empty());
    assert!(form.agenda().is_empty());
    assert!(form.image().is_none());
}

#[test]
fn set_field_accepts_empty_and_untrimmed_values() {
    let mut form = FormState::new();
    form.set_field(FormField::Title, "  Launch  ");
    form.set_field(FormField::Venue, "");
    assert_eq!(form.field(FormField::Title), "  Launch  ");
    assert_eq!(form.field(FormField::Venue), "");
}

#[test]
fn mode_is_lowercased_and_unknown_modes_are_ignored() {
    let mut form = FormState::new();
    form.set_field(FormField::Mode, "Hybrid");
    assert_eq!(form.mode(), EventMode::Hybrid);

    form.set_field(FormField::Mode, "in person");
    assert_eq!(form.mode(), EventMode::Hybrid);
}

#[test]
fn tags_are_trimmed_and_keep_duplicates_in_order() {
    let mut form = FormState::new();
    assert!(form.add_tag("  ai "));
    assert!(form.add_tag("AI"));
    assert!(form.add_tag("ai"));
    assert!(!form.add_tag("   "));
    assert!(!form.add_tag(""));
    assert_eq!(form.tags(), ["ai", "AI", "ai"]);
}

#[test]
fn tag_removal_is_positional_and_recomputed_after_each_removal() {
    let mut form = FormState::new();
    for tag in ["a", "b", "c", "d"] {
        form.add_tag(tag);
    }

    assert!(form.remove_tag(1));
    assert_eq!(form.tags(), ["a", "c", "d"]);
    assert!(form.remove_tag(1));
    assert_eq!(form.tags(), ["a", "d"]);
    assert!(!form.remove_tag(5));
    assert_eq!(form.tags(), ["a", "d"]);
}

#[test]
fn tag_input_is_cleared_on_commit_even_when_blank() {
    let mut form = FormState::new();
    form.set_tag_input(" workshop ");
    assert!(form.commit_tag_input());
    assert_eq!(form.tag_input(), "");

    form.set_tag_input("   ");
    assert!(!form.commit_tag_input());
    assert_eq!(form.tag_input(), "");
    assert_eq!(form.tags(), ["workshop"]);
}

#[test]
fn agenda_item_requires_both_halves() {
    let mut form = FormState::new();
    form.set_agenda_time_input("09:00");
    form.set_agenda_topic_input("  ");

    assert!(!form.commit_agenda_inputs());
    assert!(!form.add_agenda_item("", "Keynote"));
    assert!(!form.add_agenda_item("10:00", " "));

    assert!(form.agenda().is_empty());
    assert_eq!(form.agenda_inputs(), ("09:00", "  "));
}

#[test]
fn adding_agenda_item_trims_and_clears_inputs() {
    let mut form = FormState::new();
    form.set_agenda_time_input(" 09:00 ");
    form.set_agenda_topic_input(" Intro ");

    assert!(form.commit_agenda_inputs());

    assert_eq!(form.agenda(), [AgendaItem::new("09:00", "Intro")]);
    assert_eq!(form.agenda_inputs(), ("", ""));
}

#[test]
fn agenda_removal_is_positional() {
    let mut form = FormState::new();
    form.add_agenda_item("09:00", "Intro");
    form.add_agenda_item("09:00", "Intro");
    form.add_agenda_item("10:00", "Talk");

    assert!(form.remove_agenda_item(0));
    assert_eq!(
        form.agenda(),
        [AgendaItem::new("09:00", "Intro"), AgendaItem::new("10:00", "Talk")]
    );
    assert!(!form.remove_agenda_item(2));
}

#[test]
fn replacing_image_revokes_previous_preview() {
    let mut form = FormState::new();
    form.set_image(image("first.png"));
    let first_uri = form.preview_uri().expect("preview").to_string();

    form.set_image(image("second.png"));
    let second_uri = form.preview_uri().expect("preview").to_string();

    assert_ne!(first_uri, second_uri);
    assert!(form.previews().resolve(&first_uri).is_none());
    let live = form.previews().resolve(&second_uri).expect("live preview");
    assert_eq!(live.filename, "second.png");
    assert_eq!(form.previews().live_count(), 1);
}

#[test]
fn clearing_image_drops_blob_and_preview() {
    let mut form = FormState::new();
    form.set_image(image("cover.png"));
    form.clear_image();

    assert!(form.image().is_none());
    assert!(form.preview_uri().is_none());
    assert_eq!(form.previews().live_count(), 0);
}

#[test]
fn dropping_form_revokes_preview() {
    let previews = PreviewRegistry::new();
    let mut form = FormState::with_previews(previews.clone());
    form.set_image(image("cover.png"));
    assert_eq!(previews.live_count(), 1);

    drop(form);
    assert_eq!(previews.live_count(), 0);
}

#[test]
fn reset_restores_initial_values() {
    let mut form = FormState::new();
    for field in FormField::ALL {
        form.set_field(field, "online");
    }
    form.add_tag("ai");
    form.add_agenda_item("09:00", "Intro");
    form.set_tag_input("pending");
    form.set_agenda_time_input("10:00");
    form.set_image(image("cover.png"));

    form.reset();

    for field in FormField::ALL {
        let expected = if field == FormField::Mode { "offline" } else { "" };
        assert_eq!(form.field(field), expected);
    }
    assert!(form.tags().is_empty());
    assert!(form.agenda().is_empty());
    assert_eq!(form.tag_input(), "");
    assert_eq!(form.agenda_inputs(), ("", ""));
    assert!(form.image().is_none());
    assert_eq!(form.previews().live_count(), 0);
}

#[test]
fn missing_required_reports_title_date_and_image() {
    let mut form = FormState::new();
    assert_eq!(
        form.missing_required(),
        vec![RequiredField::Title, RequiredField::Date, RequiredField::Image]
    );

    form.set_field(FormField::Title, "Launch");
    form.set_field(FormField::Date, "2025-06-01");
    form.set_image(image("cover.png"));
    assert!(form.missing_required().is_empty());
}
