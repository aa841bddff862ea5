use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use livepen_core::fragment::Fragment;
use livepen_core::session::PlaygroundSession;

#[test]
fn shared_link_restores_both_editors() {
    let authoring = PlaygroundSession::new(Fragment::new());
    authoring.js().set("const a = 1;".to_string());
    authoring.css().set("body { margin: 0; }".to_string());
    let link_hash = authoring.fragment().read();

    let reopened = PlaygroundSession::new(Fragment::from_hash(link_hash));
    assert_eq!(reopened.js().get(), "const a = 1;");
    assert_eq!(reopened.css().get(), "body { margin: 0; }");
}

#[test]
fn link_round_trips_across_repeated_reshares() {
    let mut hash = String::new();
    for round in 0..4 {
        let session = PlaygroundSession::new(Fragment::from_hash(hash));
        session.js().set(format!("round {round}"));
        hash = session.fragment().read();
    }
    let final_session = PlaygroundSession::new(Fragment::from_hash(hash));
    assert_eq!(final_session.js().get(), "round 3");
}

#[test]
fn restore_does_not_notify_subscribers() {
    let authoring = PlaygroundSession::new(Fragment::new());
    authoring.js().set("seed".to_string());

    let reopened = PlaygroundSession::new(Fragment::from_hash(authoring.fragment().read()));
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    reopened.js().subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(reopened.js().get(), "seed");
    assert_eq!(notified.load(Ordering::SeqCst), 0);
}

#[test]
fn malformed_field_falls_back_to_default_without_poisoning_the_other() {
    let authoring = PlaygroundSession::new(Fragment::new());
    authoring.css().set("body {}".to_string());
    let hash = format!("js%!!!not-base64--{}", authoring.fragment().read());

    let session = PlaygroundSession::new(Fragment::from_hash(hash));
    assert_eq!(session.js().get(), "", "broken js payload keeps the default");
    assert_eq!(session.css().get(), "body {}", "css must still restore");
}

#[test]
fn editing_after_restore_updates_the_link_in_place() {
    let authoring = PlaygroundSession::new(Fragment::new());
    authoring.js().set("v1".to_string());
    authoring.css().set("c1".to_string());

    let session = PlaygroundSession::new(Fragment::from_hash(authoring.fragment().read()));
    session.js().set("v2".to_string());

    let reopened = PlaygroundSession::new(Fragment::from_hash(session.fragment().read()));
    assert_eq!(reopened.js().get(), "v2");
    assert_eq!(reopened.css().get(), "c1", "untouched field must survive the edit");
}
