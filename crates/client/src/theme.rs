//! Light/dark theme preference.
//!
//! Kept under the `theme` key as the bare string `"light"` or `"dark"`, the
//! same value the web build writes to `localStorage`. Without a stored choice
//! the system color scheme decides.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::log_warn;
use crate::storage::{KeyValueStorage, StorageError};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

#[derive(Clone)]
pub struct ThemePreference {
    storage: Arc<dyn KeyValueStorage>,
}

impl ThemePreference {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// The explicitly chosen theme, if any. Unreadable or unknown values
    /// count as no choice.
    pub fn stored(&self) -> Option<Theme> {
        match self.storage.get(THEME_KEY) {
            Ok(value) => value.and_then(|v| v.parse().ok()),
            Err(err) => {
                log_warn!("Failed to read theme preference: {}", err);
                None
            }
        }
    }

    /// The theme to render with, given whether the system prefers dark.
    pub fn resolve(&self, prefers_dark: bool) -> Theme {
        self.stored().unwrap_or(if prefers_dark { Theme::Dark } else { Theme::Light })
    }

    pub fn set(&self, theme: Theme) -> Result<(), StorageError> {
        self.storage.set(THEME_KEY, theme.as_str())
    }

    /// Flip the resolved theme and persist the result.
    pub fn toggle(&self, prefers_dark: bool) -> Result<Theme, StorageError> {
        let next = self.resolve(prefers_dark).toggled();
        self.set(next)?;
        Ok(next)
    }
}
