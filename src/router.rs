//! Stack router over the app's named screens.
//!
//! The stack is never empty: `back` on the root is a no-op and `reset`
//! collapses the stack to a single route.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Welcome,
    Login,
    Signup,
    /// Alternate sign-in entry.
    SignIn,
    Home,
    Profile,
    Create,
    Edit { id: u64 },
}

impl Route {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Login => "login",
            Self::Signup => "signup",
            Self::SignIn => "signin",
            Self::Home => "home",
            Self::Profile => "profile",
            Self::Create => "create",
            Self::Edit { .. } => "edit",
        }
    }

    /// Parse a route path such as `home` or `edit/7`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_matches('/');
        if let Some(id) = raw.strip_prefix("edit/") {
            return id.parse().ok().map(|id| Self::Edit { id });
        }
        match raw {
            "welcome" => Some(Self::Welcome),
            "login" => Some(Self::Login),
            "signup" => Some(Self::Signup),
            "signin" => Some(Self::SignIn),
            "home" => Some(Self::Home),
            "profile" => Some(Self::Profile),
            "create" => Some(Self::Create),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edit { id } => write!(f, "edit/{id}"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    stack: Vec<Route>,
}

impl Router {
    #[must_use]
    pub fn new(initial: Route) -> Self {
        Self { stack: vec![initial] }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        // The stack always holds at least the root.
        self.stack.last().copied().unwrap_or(Route::Welcome)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, route: Route) {
        tracing::debug!(%route, "navigate");
        self.stack.push(route);
    }

    /// Pop one step. Returns false at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }

    /// Swap the current route without growing the stack.
    pub fn replace(&mut self, route: Route) {
        tracing::debug!(%route, "replace");
        match self.stack.last_mut() {
            Some(top) => *top = route,
            None => self.stack.push(route),
        }
    }

    /// Dismiss everything and land on `route`.
    pub fn reset(&mut self, route: Route) {
        tracing::debug!(%route, "reset");
        self.stack.clear();
        self.stack.push(route);
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
