use serde::{Deserialize, Serialize};

/// Persisted colour scheme choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Dark,
    #[default]
    Light,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Dark => "dark",
            ThemePreference::Light => "light",
        }
    }

    /// Only an exact `"dark"` selects the dark scheme.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => ThemePreference::Dark,
            _ => ThemePreference::Light,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ThemePreference::Dark => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Dark,
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == ThemePreference::Dark
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_value_parsing() {
        assert_eq!(ThemePreference::from_stored(Some("dark")), ThemePreference::Dark);
        assert_eq!(ThemePreference::from_stored(Some("light")), ThemePreference::Light);
        assert_eq!(ThemePreference::from_stored(Some("Dark")), ThemePreference::Light);
        assert_eq!(ThemePreference::from_stored(None), ThemePreference::Light);
    }

    #[test]
    fn toggle_flips() {
        assert_eq!(ThemePreference::Light.toggled(), ThemePreference::Dark);
        assert_eq!(ThemePreference::Dark.toggled().toggled(), ThemePreference::Dark);
    }
}
