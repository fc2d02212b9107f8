//! Session guard: token ownership, route gating and forced sign-out.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult, ValidationError};

/// Where the bearer token lives between calls.
///
/// The session reads the store on every request so a sign-out performed out of
/// band (another process deleting the token file) is observed immediately.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token persisted as a single-line file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create token directory '{}'", parent.display())
            })?;
        }
        fs::write(&self.path, token)
            .with_context(|| format!("failed to write token file '{}'", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to remove token file '{}'", self.path.display())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    Logout,
    Unauthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Users,
    Astrologers,
    UserServiceComplaints,
    UserGeneralComplaints,
    AstroGeneralComplaints,
    Horoscopes,
    Feedbacks,
    Scheduler,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Self::Login,
        Self::Dashboard,
        Self::Users,
        Self::Astrologers,
        Self::UserServiceComplaints,
        Self::UserGeneralComplaints,
        Self::AstroGeneralComplaints,
        Self::Horoscopes,
        Self::Feedbacks,
        Self::Scheduler,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Users => "/users",
            Self::Astrologers => "/astros",
            Self::UserServiceComplaints => "/user-service-complaints",
            Self::UserGeneralComplaints => "/user-general-complaints",
            Self::AstroGeneralComplaints => "/astro-general-complaints",
            Self::Horoscopes => "/horoscopes",
            Self::Feedbacks => "/feedbacks",
            Self::Scheduler => "/scheduler",
        }
    }

    /// `/` resolves to the dashboard; trailing slashes are ignored.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(Self::Dashboard);
        }
        Self::ALL.into_iter().find(|route| route.path() == trimmed)
    }

    pub fn is_protected(self) -> bool {
        self != Self::Login
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    Redirect(Route),
}

/// Navigation request emitted whenever the session drops to anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub reason: SignOutReason,
}

pub type RedirectHook = Box<dyn Fn(Redirect) + Send + Sync>;

pub struct Session {
    store: Arc<dyn TokenStore>,
    state: watch::Sender<SessionState>,
    on_sign_out: Option<RedirectHook>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Arc<Self> {
        Self::build(store, None)
    }

    /// `on_sign_out` runs on every transition from authenticated to anonymous,
    /// including the ones forced by 401 responses.
    pub fn with_redirect_hook(
        store: Arc<dyn TokenStore>,
        on_sign_out: impl Fn(Redirect) + Send + Sync + 'static,
    ) -> Arc<Self> {
        Self::build(store, Some(Box::new(on_sign_out)))
    }

    fn build(store: Arc<dyn TokenStore>, on_sign_out: Option<RedirectHook>) -> Arc<Self> {
        let initial = if store.load().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        let (state, _) = watch::channel(initial);
        Arc::new(Self {
            store,
            state,
            on_sign_out,
        })
    }

    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    pub fn state(&self) -> SessionState {
        let current = if self.token().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        self.state.send_if_modified(|state| {
            let changed = *state != current;
            *state = current;
            changed
        });
        current
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn establish(&self, token: &str) -> ClientResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ValidationError::EmptyToken.into());
        }
        self.store.save(token).map_err(|err| ClientError::Io {
            message: format!("{err:#}"),
        })?;
        self.state.send_replace(SessionState::Authenticated);
        info!("admin session established");
        Ok(())
    }

    pub fn logout(&self) {
        self.sign_out(SignOutReason::Logout);
    }

    /// Called by the HTTP layer for every 401 response.
    pub fn expire(&self) {
        self.sign_out(SignOutReason::Unauthorized);
    }

    fn sign_out(&self, reason: SignOutReason) {
        // The store is authoritative; a token saved behind our back still counts.
        let previous = self.state();
        if let Err(err) = self.store.clear() {
            warn!("failed to clear stored admin token: {err:#}");
        }
        self.state.send_replace(SessionState::Anonymous);
        if previous == SessionState::Anonymous {
            debug!(?reason, "sign-out requested while already anonymous");
            return;
        }
        match reason {
            SignOutReason::Logout => info!("admin session closed"),
            SignOutReason::Unauthorized => warn!("admin session rejected by backend; signing out"),
        }
        if let Some(hook) = &self.on_sign_out {
            hook(Redirect {
                to: Route::Login,
                reason,
            });
        }
    }

    /// Resolves a navigation target. Protected routes never render while anonymous.
    pub fn guard(&self, path: &str) -> RouteDecision {
        let authenticated = self.is_authenticated();
        match Route::from_path(path) {
            Some(route) if !route.is_protected() => RouteDecision::Render(route),
            Some(route) if authenticated => RouteDecision::Render(route),
            Some(_) => RouteDecision::Redirect(Route::Login),
            None if authenticated => RouteDecision::Redirect(Route::Dashboard),
            None => RouteDecision::Redirect(Route::Login),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
