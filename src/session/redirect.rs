//! Hook invoked when the backend rejects a request's authentication.

/// Navigation to the login entry point.
///
/// Called once per 401 response, after the session has been cleared.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self, login_path: &str);
}

/// Redirect that only records the event in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRedirect;

impl LoginRedirect for TracingRedirect {
    fn redirect_to_login(&self, login_path: &str) {
        tracing::warn!(login_path, "Authentication rejected, redirecting to login");
    }
}
