use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::session::{Credential, SessionManager, Subscription};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    Interview(i64),
    Results(i64),
    Analytics,
    Admin,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Interview(id) => format!("/interview/{}", id),
            Route::Results(id) => format!("/results/{}", id),
            Route::Analytics => "/analytics".to_string(),
            Route::Admin => "/admin".to_string(),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let segments: Vec<&str> = path
            .trim()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Some(Route::Root),
            ["login"] => Some(Route::Login),
            ["register"] => Some(Route::Register),
            ["dashboard"] => Some(Route::Dashboard),
            ["analytics"] => Some(Route::Analytics),
            ["admin"] => Some(Route::Admin),
            ["interview", id] => id.parse().ok().map(Route::Interview),
            ["results", id] => id.parse().ok().map(Route::Results),
            _ => None,
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Root | Route::Login | Route::Register)
    }

    /// Entry views a signed-in user should never see.
    pub fn is_auth_entry(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render(Route),
    Redirect(Route),
}

impl GuardDecision {
    pub fn route(&self) -> &Route {
        match self {
            GuardDecision::Render(route) | GuardDecision::Redirect(route) => route,
        }
    }
}

/// Decides what may render for `target` given the current credential.
pub fn guard(target: &Route, credential: Option<&Credential>) -> GuardDecision {
    match (target, credential) {
        (Route::Root, Some(_)) => GuardDecision::Redirect(Route::Dashboard),
        (Route::Root, None) => GuardDecision::Redirect(Route::Login),
        (route, Some(_)) if route.is_auth_entry() => GuardDecision::Redirect(Route::Dashboard),
        (Route::Admin, Some(credential)) if !credential.profile().role.can_manage_questions() => {
            GuardDecision::Redirect(Route::Dashboard)
        }
        (route, None) if route.requires_auth() => GuardDecision::Redirect(Route::Login),
        (route, _) => GuardDecision::Render(route.clone()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Dashboard,
    Analytics,
    Admin,
    Logout,
    Login,
    Register,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Dashboard => "Dashboard",
            MenuItem::Analytics => "Analytics",
            MenuItem::Admin => "Admin",
            MenuItem::Logout => "Logout",
            MenuItem::Login => "Login",
            MenuItem::Register => "Register",
        }
    }
}

/// Navigation entries for the current credential.
pub fn menu(credential: Option<&Credential>) -> Vec<MenuItem> {
    match credential {
        Some(credential) => {
            let mut items = vec![MenuItem::Dashboard, MenuItem::Analytics];
            if credential.profile().role.can_manage_questions() {
                items.push(MenuItem::Admin);
            }
            items.push(MenuItem::Logout);
            items
        }
        None => vec![MenuItem::Login, MenuItem::Register],
    }
}

/// Current location of one context, kept consistent with the credential.
///
/// The guard runs on every `navigate` and again on every auth broadcast, so
/// a logout anywhere moves this context off protected views immediately.
pub struct Navigator {
    session: SessionManager,
    current: Arc<Mutex<Route>>,
    _subscription: Subscription,
}

impl Navigator {
    pub fn new(session: SessionManager) -> Self {
        let initial = guard(&Route::Root, session.credential().as_ref())
            .route()
            .clone();
        let current = Arc::new(Mutex::new(initial));

        let watcher = session.clone();
        let location = Arc::clone(&current);
        let subscription = session.subscribe(move |change| {
            let credential = watcher.credential();
            let mut current = location.lock();
            if let GuardDecision::Redirect(to) = guard(&current, credential.as_ref()) {
                info!(
                    "🧭 Auth change (signed in: {}) moves {} to {}",
                    change.signed_in, *current, to
                );
                *current = to;
            }
        });

        Self {
            session,
            current,
            _subscription: subscription,
        }
    }

    /// Resolves `target` through the guard and returns where we ended up.
    /// Storage is re-read first, so a sign-out from another process counts.
    pub fn navigate(&self, target: Route) -> Route {
        if let Err(e) = self.session.hub().reload() {
            warn!("⚠️ Could not re-read stored credential: {}", e);
        }
        let decision = guard(&target, self.session.credential().as_ref());
        if let GuardDecision::Redirect(to) = &decision {
            debug!("🧭 {} redirected to {}", target, to);
        }
        let resolved = decision.route().clone();
        *self.current.lock() = resolved.clone();
        resolved
    }

    pub fn current(&self) -> Route {
        self.current.lock().clone()
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        menu(self.session.credential().as_ref())
    }
}
