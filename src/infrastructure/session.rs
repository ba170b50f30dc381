//! Per-browser "already viewed" tracking for view counters.
//!
//! A browser is identified by the `artfolio_session` cookie. Each session
//! keeps two bounded lists (artworks, posts); an id present in the list has
//! already been counted for that browser.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "artfolio_session";

/// Remembered ids per kind and session; the oldest is forgotten first
pub const VIEWED_CAPACITY: usize = 50;

/// Tracked sessions; the least recently seen one is dropped to make room
pub const MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewedKind {
    Artwork,
    Post,
}

#[derive(Debug)]
struct SessionViews {
    artworks: VecDeque<i32>,
    posts: VecDeque<i32>,
    last_seen: Instant,
}

impl SessionViews {
    fn new() -> Self {
        Self {
            artworks: VecDeque::with_capacity(VIEWED_CAPACITY),
            posts: VecDeque::with_capacity(VIEWED_CAPACITY),
            last_seen: Instant::now(),
        }
    }

    fn list(&mut self, kind: ViewedKind) -> &mut VecDeque<i32> {
        match kind {
            ViewedKind::Artwork => &mut self.artworks,
            ViewedKind::Post => &mut self.posts,
        }
    }
}

#[derive(Clone)]
pub struct ViewTracker {
    sessions: Arc<DashMap<String, SessionViews>>,
    max_sessions: usize,
}

impl Default for ViewTracker {
    fn default() -> Self {
        Self::with_max_sessions(MAX_SESSIONS)
    }
}

impl ViewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Remember `id` for the session; returns true when it was not seen yet
    /// and the persisted counter should be incremented.
    pub fn record(&self, session_id: &str, kind: ViewedKind, id: i32) -> bool {
        if !self.sessions.contains_key(session_id) {
            while self.sessions.len() >= self.max_sessions {
                if !self.evict_least_recent() {
                    break;
                }
            }
        }

        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionViews::new);
        entry.last_seen = Instant::now();

        let list = entry.list(kind);
        if list.contains(&id) {
            return false;
        }
        if list.len() >= VIEWED_CAPACITY {
            list.pop_front();
        }
        list.push_back(id);
        true
    }

    /// Undo a `record` whose counter update failed, so a later view counts
    pub fn forget(&self, session_id: &str, kind: ViewedKind, id: i32) {
        if let Some(mut entry) = self.sessions.get_mut(session_id) {
            entry.list(kind).retain(|seen| *seen != id);
        }
    }

    fn evict_least_recent(&self) -> bool {
        // the iterator's shard guards are released before `remove`
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.value().last_seen)
            .map(|entry| entry.key().clone());
        match oldest {
            Some(key) => self.sessions.remove(&key).is_some(),
            None => false,
        }
    }

    /// Drop sessions idle for longer than `max_idle`; returns how many went
    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, views| views.last_seen.elapsed() < max_idle);
        before.saturating_sub(self.sessions.len())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Reads the session id from the cookie jar, issuing a fresh one if the
/// cookie is missing or malformed.
pub fn ensure_session(jar: CookieJar) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && Uuid::parse_str(cookie.value()).is_ok()
    {
        let id = cookie.value().to_string();
        return (jar, id);
    }

    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), id)
}
