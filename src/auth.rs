use std::fmt;

/// An access token for a GitLab server.
///
/// `Debug` never prints the secret so tokens can travel through logged structs.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Credentials used for one search and the clone that follows it.
///
/// The GitLab token and the Gerrit user/password pair are independent; which
/// one applies is decided by the server kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub gitlab_token: Option<Token>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(
        gitlab_token: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            gitlab_token: non_blank(gitlab_token).map(Token::from),
            username: non_blank(username),
            password: non_blank(password),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Gerrit user and password, only when both are set.
    pub fn basic(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        self.gitlab_token.as_ref()
    }
}

// Preference values arrive as empty strings when unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Supplies the credentials and query limit for a search.
pub trait CredentialSource {
    fn credentials(&self) -> Credentials;

    fn query_limit(&self) -> usize;
}
