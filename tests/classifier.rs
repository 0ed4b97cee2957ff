// tests/classifier.rs

use std::path::PathBuf;

use htmlsplice::types::WatchTarget;
use htmlsplice::watch::{change_events_from_notify, ChangeClassifier, ChangeEvent};
use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};

fn source_relevant(classifier: &ChangeClassifier, event: ChangeEvent) -> bool {
    classifier.is_relevant(WatchTarget::Source, &[event])
}

#[test]
fn css_and_js_files_are_relevant_case_insensitively() {
    let c = ChangeClassifier::default();
    assert!(source_relevant(&c, ChangeEvent::modified("/in/a.css")));
    assert!(source_relevant(&c, ChangeEvent::modified("/in/deep/b.JS")));
    assert!(source_relevant(&c, ChangeEvent::modified("/in/c.Css")));
}

#[test]
fn other_extensions_are_not_relevant() {
    let c = ChangeClassifier::default();
    assert!(!source_relevant(&c, ChangeEvent::modified("/in/readme.md")));
    assert!(!source_relevant(&c, ChangeEvent::modified("/in/no_extension")));
    assert!(!source_relevant(&c, ChangeEvent::modified("/in/a.css.bak")));
}

#[test]
fn directories_and_removals_are_not_relevant() {
    let c = ChangeClassifier::default();
    assert!(!source_relevant(&c, ChangeEvent::new("/in/styles.css", true, false)));
    assert!(!source_relevant(&c, ChangeEvent::removed("/in/a.css")));
}

#[test]
fn ignore_pattern_matches_file_names_only() {
    let c = ChangeClassifier::new(Some(r"^\.#"), None);
    assert!(c.has_ignore());
    assert!(!source_relevant(&c, ChangeEvent::modified("/in/.#a.css")));
    assert!(source_relevant(&c, ChangeEvent::modified("/in/.#dir/a.css")));
}

#[test]
fn invalid_ignore_pattern_disables_filtering() {
    let c = ChangeClassifier::new(Some("(unclosed"), None);
    assert!(!c.has_ignore());
    assert!(source_relevant(&c, ChangeEvent::modified("/in/(unclosed.css")));
}

#[test]
fn batch_is_relevant_if_any_event_is() {
    let c = ChangeClassifier::default();
    let batch = vec![
        ChangeEvent::modified("/in/notes.txt"),
        ChangeEvent::removed("/in/old.js"),
        ChangeEvent::modified("/in/new.js"),
    ];
    assert!(c.is_relevant(WatchTarget::Source, &batch));
    assert!(!c.is_relevant(WatchTarget::Source, &batch[..2]));
    assert!(!c.is_relevant(WatchTarget::Source, &[]));
}

#[test]
fn template_events_must_name_the_template() {
    let template = PathBuf::from("/site/index.html");
    let c = ChangeClassifier::new(Some("index"), Some(template.clone()));

    // The ignore pattern does not apply to the template.
    assert!(c.is_relevant(WatchTarget::Template, &[ChangeEvent::modified(&template)]));
    assert!(!c.is_relevant(WatchTarget::Template, &[ChangeEvent::modified("/site/other.html")]));
    assert!(!c.is_relevant(WatchTarget::Template, &[ChangeEvent::removed(&template)]));

    let without_template = ChangeClassifier::default();
    assert!(!without_template.is_relevant(WatchTarget::Template, &[ChangeEvent::modified(&template)]));
}

#[test]
fn notify_access_events_are_dropped() {
    let ev = Event::new(EventKind::Access(AccessKind::Any)).add_path("/in/a.css".into());
    assert!(change_events_from_notify(&ev).is_empty());
}

#[test]
fn notify_remove_and_create_events_are_mapped() {
    let ev = Event::new(EventKind::Remove(RemoveKind::File)).add_path("/in/a.css".into());
    let out = change_events_from_notify(&ev);
    assert_eq!(out, vec![ChangeEvent::removed("/in/a.css")]);

    let ev = Event::new(EventKind::Create(CreateKind::Folder)).add_path("/in/sub.css".into());
    let out = change_events_from_notify(&ev);
    assert_eq!(out.len(), 1);
    assert!(out[0].is_directory);
    assert!(!out[0].was_removed);

    let ev = Event::new(EventKind::Modify(ModifyKind::Any))
        .add_path("/in/a.css".into())
        .add_path("/in/b.JS".into());
    let out = change_events_from_notify(&ev);
    assert_eq!(out.len(), 2);
    assert_eq!(out[1].extension.as_deref(), Some("js"));
}

#[test]
fn notify_rename_marks_the_old_side_removed() {
    let ev = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
        .add_path("/in/a.css".into())
        .add_path("/in/b.css".into());
    let out = change_events_from_notify(&ev);
    assert_eq!(out.len(), 2);
    assert!(out[0].was_removed);
    assert!(!out[1].was_removed);

    let ev = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From)))
        .add_path("/in/a.css".into());
    assert!(change_events_from_notify(&ev)[0].was_removed);
}
