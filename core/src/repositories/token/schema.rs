//! Key naming for stored tokens.

/// Default namespace of token keys
const TOKEN_KEY_PREFIX: &str = "tokens";

/// Maps a (subject, type) identity to the storage key holding its token
pub trait KeySchema: Send + Sync {
    /// Key under which the token of `subject`/`token_type` is stored
    fn subject_token_key(&self, subject: &str, token_type: &str) -> String;

    /// Glob matching every key this schema produces.
    ///
    /// Used only by backends that must scan for a token value; it has to
    /// cover every key [`subject_token_key`](Self::subject_token_key) returns.
    fn token_key_pattern(&self) -> String;
}

/// `tokens:{subject}:{type}`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKeySchema;

impl KeySchema for DefaultKeySchema {
    fn subject_token_key(&self, subject: &str, token_type: &str) -> String {
        format!("{}:{}:{}", TOKEN_KEY_PREFIX, subject, token_type)
    }

    fn token_key_pattern(&self) -> String {
        format!("{}:*", TOKEN_KEY_PREFIX)
    }
}

/// `{prefix}:tokens:{subject}:{type}`, for deployments sharing one keyspace
#[derive(Debug, Clone)]
pub struct PrefixedKeySchema {
    prefix: String,
}

impl PrefixedKeySchema {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl KeySchema for PrefixedKeySchema {
    fn subject_token_key(&self, subject: &str, token_type: &str) -> String {
        format!(
            "{}:{}",
            self.prefix,
            DefaultKeySchema.subject_token_key(subject, token_type)
        )
    }

    fn token_key_pattern(&self) -> String {
        format!("{}:{}", self.prefix, DefaultKeySchema.token_key_pattern())
    }
}
