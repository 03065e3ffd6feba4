use crate::db::Database;
use crate::error::Result;
use crate::models::ThemePreference;
use chrono::Utc;
use rusqlite::params;

pub const THEME_KEY: &str = "theme";

// Settings Queries

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                params![key, value, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
    }

    /// Stored theme, defaulting to light when unset or unrecognised.
    pub fn load_theme(&self) -> Result<ThemePreference> {
        let stored = self.get_setting(THEME_KEY)?;
        if let Some(ref value) = stored {
            if value != "dark" && value != "light" {
                tracing::warn!(theme = %value, "Unknown theme in database, defaulting to light");
            }
        }
        Ok(ThemePreference::from_stored(stored.as_deref()))
    }

    pub fn save_theme(&self, theme: ThemePreference) -> Result<()> {
        self.set_setting(THEME_KEY, theme.as_str())
    }
}

trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_defaults_to_light() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_theme().unwrap(), ThemePreference::Light);
    }

    #[test]
    fn theme_round_trips() {
        let db = Database::open_in_memory().unwrap();
        db.save_theme(ThemePreference::Dark).unwrap();
        assert_eq!(db.load_theme().unwrap(), ThemePreference::Dark);
        assert_eq!(db.get_setting(THEME_KEY).unwrap().as_deref(), Some("dark"));

        db.save_theme(ThemePreference::Light).unwrap();
        assert_eq!(db.load_theme().unwrap(), ThemePreference::Light);
    }

    #[test]
    fn unknown_theme_value_falls_back_to_light() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(THEME_KEY, "solarized").unwrap();
        assert_eq!(db.load_theme().unwrap(), ThemePreference::Light);
    }

    #[test]
    fn missing_setting_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_setting("nope").unwrap().is_none());
    }
}
