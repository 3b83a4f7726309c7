use crate::client::session::Session;

/// Named views of the single-page UI. Transitions are plain navigation;
/// there is no routing-history integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Catalog,
    Detail(i32),
    Login,
    Register,
    Admin,
    ProductManagement,
    Stats,
    Users,
}

impl View {
    /// Views that only make sense for a logged-in administrator.
    pub fn requires_session(self) -> bool {
        matches!(
            self,
            View::Admin | View::ProductManagement | View::Stats | View::Users
        )
    }
}

/// Client-side view state machine. On load a stored session is taken at
/// face value and the UI jumps straight to the admin view; the token is
/// only reconciled against the server on the first protected call, whose
/// 401/403 demotes the UI to the login view via [`ViewState::on_unauthorized`].
#[derive(Debug)]
pub struct ViewState {
    current: View,
    logged_in: bool,
    email: Option<String>,
}

impl ViewState {
    pub fn on_load(stored: Option<&Session>) -> Self {
        match stored {
            Some(session) => Self {
                current: View::Admin,
                logged_in: true,
                email: Some(session.email.clone()),
            },
            None => Self {
                current: View::Catalog,
                logged_in: false,
                email: None,
            },
        }
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Navigate to a view; admin views bounce to login when not logged in.
    pub fn navigate(&mut self, target: View) {
        self.current = if target.requires_session() && !self.logged_in {
            View::Login
        } else {
            target
        };
    }

    pub fn on_login_success(&mut self, email: &str) {
        self.logged_in = true;
        self.email = Some(email.to_string());
        self.current = View::Admin;
    }

    /// A protected call answered 401/403: the stored token was stale or
    /// expired. Drop to the login view.
    pub fn on_unauthorized(&mut self) {
        self.logged_in = false;
        self.email = None;
        self.current = View::Login;
    }

    pub fn on_logout(&mut self) {
        self.logged_in = false;
        self.email = None;
        self.current = View::Catalog;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            token: "ey.token".into(),
            email: "admin@bodega.pe".into(),
        }
    }

    #[test]
    fn load_without_session_starts_at_catalog() {
        let state = ViewState::on_load(None);
        assert_eq!(state.current(), View::Catalog);
        assert!(!state.logged_in());
    }

    #[test]
    fn load_with_stored_session_jumps_to_admin() {
        let state = ViewState::on_load(Some(&session()));
        assert_eq!(state.current(), View::Admin);
        assert!(state.logged_in());
        assert_eq!(state.email(), Some("admin@bodega.pe"));
    }

    #[test]
    fn admin_views_bounce_to_login_when_logged_out() {
        let mut state = ViewState::on_load(None);
        state.navigate(View::ProductManagement);
        assert_eq!(state.current(), View::Login);

        state.navigate(View::Stats);
        assert_eq!(state.current(), View::Login);

        state.navigate(View::Detail(4));
        assert_eq!(state.current(), View::Detail(4));
    }

    #[test]
    fn login_success_lands_on_admin() {
        let mut state = ViewState::on_load(None);
        state.navigate(View::Login);
        state.on_login_success("admin@bodega.pe");
        assert_eq!(state.current(), View::Admin);
        assert!(state.logged_in());

        state.navigate(View::Users);
        assert_eq!(state.current(), View::Users);
    }

    #[test]
    fn unauthorized_demotes_stale_session_to_login() {
        // trusted-on-load session turns out to be expired server-side
        let mut state = ViewState::on_load(Some(&session()));
        state.on_unauthorized();
        assert_eq!(state.current(), View::Login);
        assert!(!state.logged_in());
        assert_eq!(state.email(), None);
    }

    #[test]
    fn logout_returns_to_catalog() {
        let mut state = ViewState::on_load(Some(&session()));
        state.on_logout();
        assert_eq!(state.current(), View::Catalog);
        assert!(!state.logged_in());

        state.navigate(View::Admin);
        assert_eq!(state.current(), View::Login);
    }
}
