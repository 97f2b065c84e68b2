use crate::config::ServerConfig;
use crate::core_auth::helper::verify_password;

/// The single account a server accepts, fixed when the server starts.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    secret: Secret,
}

#[derive(Clone)]
enum Secret {
    Plain(String),
    Hashed(String),
}

// Keep passwords out of debug output and logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: Secret::Plain(password.into()),
        }
    }

    pub fn with_hash(username: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: Secret::Hashed(hashed_password.into()),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        match &config.password_hash {
            Some(hash) => Self::with_hash(&config.username, hash),
            None => Self::new(&config.username, &config.password),
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn matches_username(&self, username: &str) -> bool {
        self.username == username
    }

    pub fn matches_password(&self, password: &str) -> bool {
        match &self.secret {
            Secret::Plain(expected) => expected == password,
            Secret::Hashed(hash) => verify_password(password, hash),
        }
    }
}
