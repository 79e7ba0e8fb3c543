//! Color themes and their persistence through the preference store

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{StoreError, ValidationError};
use crate::store::PreferenceStore;

/// Preference key holding the chosen theme name
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Theme {
    Pink,
    Green,
    #[default]
    Blue,
}

/// Three background tones, darkest-ish first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub bg1: &'static str,
    pub bg2: &'static str,
    pub bg3: &'static str,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Pink, Theme::Green, Theme::Blue];

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Pink => "Pink",
            Theme::Green => "Green",
            Theme::Blue => "Blue",
        }
    }

    pub fn colors(&self) -> ThemeColors {
        match self {
            Theme::Pink => ThemeColors {
                bg1: "#fb6f92",
                bg2: "#ffb3c6",
                bg3: "#ff8fab",
            },
            Theme::Green => ThemeColors {
                bg1: "#416f5d",
                bg2: "#9cbb89",
                bg3: "#638262",
            },
            Theme::Blue => ThemeColors {
                bg1: "#476f95",
                bg2: "#a3b7ca",
                bg3: "#7593af",
            },
        }
    }

    pub fn next(&self) -> Theme {
        match self {
            Theme::Pink => Theme::Green,
            Theme::Green => Theme::Blue,
            Theme::Blue => Theme::Pink,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownTheme(s.to_string()))
    }
}

/// Stored theme, or `None` when unset or unrecognized
pub async fn load_theme<P: PreferenceStore + ?Sized>(prefs: &P) -> Result<Option<Theme>, StoreError> {
    let value = prefs.query(THEME_KEY).await?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|name| name.parse().ok()))
}

pub async fn save_theme<P: PreferenceStore + ?Sized>(prefs: &P, theme: Theme) -> Result<(), StoreError> {
    prefs
        .post_value(THEME_KEY, serde_json::Value::from(theme.name()))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonPreferenceStore;
    use tempfile::TempDir;

    #[test]
    fn test_parse() {
        assert_eq!("green".parse::<Theme>(), Ok(Theme::Green));
        assert_eq!(" Pink ".parse::<Theme>(), Ok(Theme::Pink));
        assert!("purple".parse::<Theme>().is_err());
    }

    #[test]
    fn test_cycle_visits_all() {
        let mut theme = Theme::Pink;
        let mut seen = vec![];
        for _ in 0..3 {
            seen.push(theme);
            theme = theme.next();
        }
        assert_eq!(seen, Theme::ALL.to_vec());
        assert_eq!(theme, Theme::Pink);
    }

    #[tokio::test]
    async fn test_persisted_theme() {
        let dir = TempDir::new().unwrap();
        let prefs = JsonPreferenceStore::in_dir(dir.path());
        assert_eq!(load_theme(&prefs).await.unwrap(), None);

        save_theme(&prefs, Theme::Green).await.unwrap();
        assert_eq!(load_theme(&prefs).await.unwrap(), Some(Theme::Green));

        prefs
            .post_value(THEME_KEY, serde_json::Value::from("Purple"))
            .await
            .unwrap();
        assert_eq!(load_theme(&prefs).await.unwrap(), None);
    }
}
