use std::fmt;

/// Authentication strategy a gateway (and its workers) is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStrategy {
    /// OAuth2 client credentials (anonymous when no token endpoint is configured).
    OAuth,
    /// HTTP Basic with the client id / secret.
    Basic,
}

impl AuthStrategy {
    /// Launch order used by the supervisor.
    pub const ALL: [AuthStrategy; 2] = [AuthStrategy::OAuth, AuthStrategy::Basic];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStrategy::OAuth => "oauth",
            AuthStrategy::Basic => "basic",
        }
    }
}

impl fmt::Display for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
