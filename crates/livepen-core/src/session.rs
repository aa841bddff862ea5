//! The owning application context wiring stores to the shared fragment.

use std::sync::Arc;

use crate::fragment::{Fragment, FragmentField};
use crate::store::Store;

/// Fragment field holding the script editor's contents.
pub const JS_FIELD: &str = "js";

/// Fragment field holding the style editor's contents.
pub const CSS_FIELD: &str = "css";

/// One playground session: a `js` and a `css` store persisted into a shared
/// [`Fragment`].
///
/// Construction restores both stores from the fragment with a silent read
/// (subscribers are not notified for the initial values), then wires
/// write-through persistence so every edit re-serializes the fragment. A
/// stored payload that fails to decode leaves that store at its default empty
/// value; a broken link never prevents the session from starting.
///
/// # Examples
///
/// ```
/// use livepen_core::fragment::Fragment;
/// use livepen_core::session::PlaygroundSession;
///
/// let session = PlaygroundSession::new(Fragment::new());
/// session.js().set("x = 1".to_string());
///
/// let reopened = PlaygroundSession::new(Fragment::from_hash(session.fragment().read()));
/// assert_eq!(reopened.js().get(), "x = 1");
/// ```
pub struct PlaygroundSession {
    fragment: Fragment,
    js: Store<String>,
    css: Store<String>,
}

impl PlaygroundSession {
    pub fn new(fragment: Fragment) -> Self {
        let js = Store::new(String::new());
        let css = Store::new(String::new());
        let js_field = Arc::new(FragmentField::new(JS_FIELD, fragment.clone()));
        let css_field = Arc::new(FragmentField::new(CSS_FIELD, fragment.clone()));

        // Restore before wiring persistence, so the initial reads do not
        // rewrite the fragment. Undecodable payloads leave the default.
        let _ = js.load(JS_FIELD, js_field.as_ref());
        let _ = css.load(CSS_FIELD, css_field.as_ref());

        js.persist(JS_FIELD, js_field);
        css.persist(CSS_FIELD, css_field);

        Self { fragment, js, css }
    }

    /// The script-content store.
    pub fn js(&self) -> &Store<String> {
        &self.js
    }

    /// The style-content store.
    pub fn css(&self) -> &Store<String> {
        &self.css
    }

    /// The shared fragment; its current string is the shareable link state.
    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KeyValueStorage;

    #[test]
    fn test_new_session_starts_empty() {
        let session = PlaygroundSession::new(Fragment::new());
        assert_eq!(session.js().get(), "");
        assert_eq!(session.css().get(), "");
        assert_eq!(session.fragment().read(), "");
    }

    #[test]
    fn test_edits_write_through_to_fragment() {
        let session = PlaygroundSession::new(Fragment::new());
        session.js().set("x = 1".to_string());
        session.css().set("body {}".to_string());
        let js_field = FragmentField::new(JS_FIELD, session.fragment().clone());
        let css_field = FragmentField::new(CSS_FIELD, session.fragment().clone());
        assert_eq!(js_field.get_item(JS_FIELD).unwrap().as_deref(), Some("x = 1"));
        assert_eq!(
            css_field.get_item(CSS_FIELD).unwrap().as_deref(),
            Some("body {}")
        );
    }

    #[test]
    fn test_restore_is_silent() {
        let seeded = PlaygroundSession::new(Fragment::new());
        seeded.js().set("x = 1".to_string());

        let fragment = Fragment::from_hash(seeded.fragment().read());
        let session = PlaygroundSession::new(fragment);
        let notified = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = notified.clone();
        session.js().subscribe(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        assert_eq!(session.js().get(), "x = 1");
        assert_eq!(notified.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_malformed_payload_keeps_default() {
        let session = PlaygroundSession::new(Fragment::from_hash("js%!!!not-base64"));
        assert_eq!(session.js().get(), "");
    }
}
