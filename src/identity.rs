//! Identity transitions. Signing in never merges anonymous state into the new
//! identity; signing out purges the identity-scoped categories the reader chose
//! not to keep.

use tracing::{debug, info, warn};

use crate::db::{PersistedStateStore, Result};
use crate::models::Scope;
use crate::state::{self, BOOKMARK_KEY, HIGHLIGHTS_KEY, SESSION_CREDENTIAL_KEY};

/// Per-category retention choices made at sign-out. `true` keeps the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetainFlags {
    pub highlights: bool,
    pub bookmark: bool,
    pub session_credential: bool,
}

impl RetainFlags {
    pub const KEEP_ALL: RetainFlags = RetainFlags {
        highlights: true,
        bookmark: true,
        session_credential: true,
    };

    pub const PURGE_ALL: RetainFlags = RetainFlags {
        highlights: false,
        bookmark: false,
        session_credential: false,
    };

    fn purged_keys(self) -> impl Iterator<Item = &'static str> {
        [
            (self.highlights, HIGHLIGHTS_KEY),
            (self.bookmark, BOOKMARK_KEY),
            (self.session_credential, SESSION_CREDENTIAL_KEY),
        ]
        .into_iter()
        .filter(|(retain, _)| !retain)
        .map(|(_, key)| key)
    }
}

impl Default for RetainFlags {
    fn default() -> Self {
        Self::KEEP_ALL
    }
}

/// Sign-in leaves both scopes exactly as they are. Anonymous entries are not
/// copied across; the new identity starts from whatever it already owns.
pub fn on_sign_in(previous: &Scope, new: &Scope) {
    debug!(from = %previous, to = %new, "sign-in keeps scopes independent");
}

/// Remove every identity-scoped category whose retention flag is off. Returns
/// the persisted keys that were purged. Anonymous scope has nothing to purge.
pub fn on_sign_out(
    store: &mut PersistedStateStore,
    current: &Scope,
    retain: RetainFlags,
) -> Result<Vec<&'static str>> {
    if current.is_anonymous() {
        warn!("sign-out requested without a signed-in identity");
        return Ok(Vec::new());
    }

    let mut purged = Vec::new();
    for key in retain.purged_keys() {
        store.remove(key, current)?;
        purged.push(key);
    }
    info!(scope = %current, purged = ?purged, "signed out");
    Ok(purged)
}

/// The store together with the scope the reader currently acts under.
pub struct ReaderSession {
    store: PersistedStateStore,
    scope: Scope,
}

impl ReaderSession {
    pub fn new(store: PersistedStateStore) -> Self {
        Self {
            store,
            scope: Scope::Anonymous,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Store and scope together, for the feature operations in [`crate::state`].
    pub fn parts(&mut self) -> (&mut PersistedStateStore, &Scope) {
        (&mut self.store, &self.scope)
    }

    pub fn store(&self) -> &PersistedStateStore {
        &self.store
    }

    /// Switch to `uid`, recording the credential the auth provider issued.
    pub fn sign_in(&mut self, uid: &str, credential: &str) -> Result<()> {
        let next = Scope::identity(uid);
        on_sign_in(&self.scope, &next);
        state::store_session_credential(&mut self.store, &next, credential)?;
        self.scope = next;
        Ok(())
    }

    /// Purge per `retain` and fall back to the anonymous scope.
    pub fn sign_out(&mut self, retain: RetainFlags) -> Result<Vec<&'static str>> {
        let purged = on_sign_out(&mut self.store, &self.scope, retain)?;
        self.scope = Scope::Anonymous;
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ManualClock, SqliteMedium};
    use crate::models::{BookId, Bookmark};

    fn test_session() -> ReaderSession {
        let medium = SqliteMedium::open_in_memory().expect("open test db");
        ReaderSession::new(PersistedStateStore::new(medium, ManualClock::starting_at(0)))
    }

    #[test]
    fn sign_in_does_not_carry_anonymous_state() {
        let mut session = test_session();
        let mark = Bookmark {
            book: BookId::John,
            chapter: 1,
        };
        {
            let (store, scope) = session.parts();
            state::set_bookmark(store, scope, mark).expect("bookmark");
            state::toggle_highlight(store, scope, "John.1.1").expect("highlight");
        }

        session.sign_in("u1", "token").expect("sign in");
        let (store, scope) = session.parts();
        assert_eq!(state::bookmark(store, scope).expect("read"), None);
        assert!(state::highlights(store, scope).expect("read").is_empty());
        assert_eq!(
            state::session_credential(store, scope).expect("read").as_deref(),
            Some("token")
        );
        assert_eq!(
            state::bookmark(store, &Scope::Anonymous).expect("read"),
            Some(mark)
        );
    }

    #[test]
    fn sign_out_purges_only_unretained_categories() {
        let mut session = test_session();
        session.sign_in("u1", "token").expect("sign in");
        {
            let (store, scope) = session.parts();
            state::toggle_highlight(store, scope, "Ruth.1.16").expect("highlight");
            state::set_bookmark(
                store,
                scope,
                Bookmark {
                    book: BookId::Ruth,
                    chapter: 1,
                },
            )
            .expect("bookmark");
            state::complete_tour(store, scope).expect("tour");
        }

        let purged = session
            .sign_out(RetainFlags {
                highlights: false,
                bookmark: true,
                session_credential: false,
            })
            .expect("sign out");
        assert_eq!(purged, vec![HIGHLIGHTS_KEY, SESSION_CREDENTIAL_KEY]);
        assert!(session.scope().is_anonymous());

        let user = Scope::identity("u1");
        let (store, _) = session.parts();
        assert!(state::highlights(store, &user).expect("read").is_empty());
        assert!(state::bookmark(store, &user).expect("read").is_some());
        assert_eq!(state::session_credential(store, &user).expect("read"), None);
        assert!(state::tour_state(store, &user).expect("read").completed);
    }

    #[test]
    fn sign_out_while_anonymous_is_a_no_op() {
        let mut session = test_session();
        {
            let (store, scope) = session.parts();
            state::toggle_highlight(store, scope, "Jude.1.24").expect("highlight");
        }
        let purged = session.sign_out(RetainFlags::PURGE_ALL).expect("sign out");
        assert!(purged.is_empty());
        let (store, scope) = session.parts();
        assert_eq!(state::highlights(store, scope).expect("read").len(), 1);
    }

    #[test]
    fn retained_flags_purge_nothing() {
        assert_eq!(RetainFlags::KEEP_ALL.purged_keys().count(), 0);
        assert_eq!(RetainFlags::PURGE_ALL.purged_keys().count(), 3);
    }
}
