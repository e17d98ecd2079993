//! Student identity tokens
//!
//! A scannable token has the shape `<prefix>-<student_number>`. Parsing is
//! purely syntactic: a token that does not match is rejected before any
//! lookup happens.

use regex::Regex;

use crate::error::{MealError, MealResult};

/// Default token prefix
pub const DEFAULT_TOKEN_PREFIX: &str = "STUDENT";

/// Compiled token shape `^<prefix>-(.+)$`
#[derive(Debug, Clone)]
pub struct TokenFormat {
    prefix: String,
    pattern: Regex,
}

impl Default for TokenFormat {
    fn default() -> Self {
        // The default prefix is a plain word, so the pattern always compiles.
        Self::new(DEFAULT_TOKEN_PREFIX).unwrap_or_else(|_| unreachable!("default token prefix is valid"))
    }
}

impl TokenFormat {
    /// Compile a token format for `prefix`
    pub fn new(prefix: impl Into<String>) -> MealResult<Self> {
        let prefix = prefix.into();
        if prefix.trim().is_empty() {
            return Err(MealError::validation("token prefix must not be empty"));
        }
        let pattern = Regex::new(&format!("^{}-(.+)$", regex::escape(&prefix)))
            .map_err(|e| MealError::validation(format!("invalid token prefix: {}", e)))?;
        Ok(Self { prefix, pattern })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Extract the student number from a token
    pub fn parse<'t>(&self, token: &'t str) -> MealResult<&'t str> {
        self.pattern
            .captures(token.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or(MealError::InvalidTokenFormat)
    }
}
