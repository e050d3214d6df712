use core::fmt::{Display, Formatter};
use std::sync::Arc;

/// The end user whose projects are being collected.
///
/// The user id addresses the manual project store; the optional usernames select the
/// accounts to query on each external platform. A platform without a username is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    user_id: Arc<str>,
    github_username: Option<Arc<str>>,
    devto_username: Option<Arc<str>>,
    is_admin: bool,
}

impl Identity {
    #[must_use]
    pub fn new(user_id: impl AsRef<str>) -> Self {
        Self {
            user_id: Arc::from(user_id.as_ref()),
            github_username: None,
            devto_username: None,
            is_admin: false,
        }
    }

    #[must_use]
    pub fn with_github(mut self, username: impl AsRef<str>) -> Self {
        self.github_username = non_empty(username.as_ref());
        self
    }

    #[must_use]
    pub fn with_devto(mut self, username: impl AsRef<str>) -> Self {
        self.devto_username = non_empty(username.as_ref());
        self
    }

    #[must_use]
    pub const fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn github_username(&self) -> Option<&str> {
        self.github_username.as_deref()
    }

    #[must_use]
    pub fn devto_username(&self) -> Option<&str> {
        self.devto_username.as_deref()
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }
}

fn non_empty(s: &str) -> Option<Arc<str>> {
    let s = s.trim();
    (!s.is_empty()).then(|| Arc::from(s))
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.user_id)
    }
}
