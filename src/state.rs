//! Reader-facing state (bookmark, highlights, consent, onboarding tour, session
//! credential) expressed as typed operations over [`PersistedStateStore`].
//! Every read here goes through the store, so scoping and expiry behave the
//! same for each feature.

use crate::db::{PersistedStateStore, Result};
use crate::models::{Bookmark, ConsentFlags, ConsentRecord, HighlightSet, Scope, TourState};

/// Stable persisted key names. Signed-in readers get them suffixed with their
/// identity id by the store.
pub const BOOKMARK_KEY: &str = "bookmark";
pub const HIGHLIGHTS_KEY: &str = "highlightedVerses";
pub const COOKIE_CONSENT_KEY: &str = "cookieConsent";
pub const COMMENT_CONSENT_KEY: &str = "commentConsent";
pub const TOUR_KEY: &str = "dashboardTourCompleted";
pub const SESSION_CREDENTIAL_KEY: &str = "sessionCredential";

pub fn bookmark(store: &mut PersistedStateStore, scope: &Scope) -> Result<Option<Bookmark>> {
    store.get(BOOKMARK_KEY, scope)
}

/// Replace the scope's bookmark; there is at most one per scope.
pub fn set_bookmark(
    store: &mut PersistedStateStore,
    scope: &Scope,
    bookmark: Bookmark,
) -> Result<()> {
    let ttl = store.default_ttl_days();
    store.set(BOOKMARK_KEY, scope, &bookmark, ttl)
}

/// Bookmark `bookmark`, or clear it when it is already the bookmark. Returns
/// whether the scope is bookmarked afterwards.
pub fn toggle_bookmark(
    store: &mut PersistedStateStore,
    scope: &Scope,
    bookmark: Bookmark,
) -> Result<bool> {
    if self::bookmark(store, scope)? == Some(bookmark) {
        clear_bookmark(store, scope)?;
        Ok(false)
    } else {
        set_bookmark(store, scope, bookmark)?;
        Ok(true)
    }
}

pub fn clear_bookmark(store: &mut PersistedStateStore, scope: &Scope) -> Result<()> {
    store.remove(BOOKMARK_KEY, scope)
}

/// Highlighted verses; empty when nothing was ever highlighted or the set
/// expired.
pub fn highlights(store: &mut PersistedStateStore, scope: &Scope) -> Result<HighlightSet> {
    Ok(store.get(HIGHLIGHTS_KEY, scope)?.unwrap_or_default())
}

/// Flip membership of `verse_id`. Returns whether the verse is highlighted
/// afterwards. Toggling twice leaves the set as it was.
pub fn toggle_highlight(
    store: &mut PersistedStateStore,
    scope: &Scope,
    verse_id: &str,
) -> Result<bool> {
    let mut set = highlights(store, scope)?;
    let highlighted = if set.remove(verse_id) {
        false
    } else {
        set.insert(verse_id.to_string())
    };

    let ttl = store.default_ttl_days();
    store.set(HIGHLIGHTS_KEY, scope, &set, ttl)?;
    Ok(highlighted)
}

pub fn clear_highlights(store: &mut PersistedStateStore, scope: &Scope) -> Result<()> {
    store.remove(HIGHLIGHTS_KEY, scope)
}

pub fn consent_flags(store: &mut PersistedStateStore, scope: &Scope) -> Result<ConsentFlags> {
    Ok(ConsentFlags {
        cookie_consent: store.get(COOKIE_CONSENT_KEY, scope)?,
        comment_consent: store.get(COMMENT_CONSENT_KEY, scope)?,
    })
}

pub fn accept_cookie_consent(store: &mut PersistedStateStore, scope: &Scope) -> Result<()> {
    accept(store, COOKIE_CONSENT_KEY, scope)
}

pub fn accept_comment_consent(store: &mut PersistedStateStore, scope: &Scope) -> Result<()> {
    accept(store, COMMENT_CONSENT_KEY, scope)
}

fn accept(store: &mut PersistedStateStore, key: &str, scope: &Scope) -> Result<()> {
    let record = ConsentRecord {
        accepted: true,
        accepted_at: store.now(),
    };
    let ttl = store.default_ttl_days();
    store.set(key, scope, &record, ttl)
}

pub fn tour_state(store: &mut PersistedStateStore, scope: &Scope) -> Result<TourState> {
    Ok(store.get(TOUR_KEY, scope)?.unwrap_or_default())
}

pub fn complete_tour(store: &mut PersistedStateStore, scope: &Scope) -> Result<()> {
    let ttl = store.default_ttl_days();
    store.set(TOUR_KEY, scope, &TourState { completed: true }, ttl)
}

/// Opaque credential handed over by the sign-in provider.
pub fn session_credential(store: &mut PersistedStateStore, scope: &Scope) -> Result<Option<String>> {
    store.get(SESSION_CREDENTIAL_KEY, scope)
}

pub fn store_session_credential(
    store: &mut PersistedStateStore,
    scope: &Scope,
    credential: &str,
) -> Result<()> {
    let ttl = store.default_ttl_days();
    store.set(SESSION_CREDENTIAL_KEY, scope, &credential, ttl)
}
