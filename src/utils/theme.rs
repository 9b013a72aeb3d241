use colored::Color;
use strum_macros::{Display, EnumString};
use tracing::warn;

use crate::auth::storage::{SessionStorage, THEME_KEY};
use crate::errors::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    /// Unknown or missing values read as light.
    pub fn load(storage: &dyn SessionStorage) -> Theme {
        match storage.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "could not read theme preference");
                Theme::default()
            }
        }
    }

    pub fn save(self, storage: &dyn SessionStorage) -> Result<()> {
        storage.set(THEME_KEY, &self.to_string())
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Flips the stored preference and returns the new one.
    pub fn toggle(storage: &dyn SessionStorage) -> Result<Theme> {
        let next = Theme::load(storage).toggled();
        next.save(storage)?;
        Ok(next)
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                heading: Color::BrightCyan,
                accent: Color::BrightYellow,
                muted: Color::BrightBlack,
                error: Color::BrightRed,
                success: Color::BrightGreen,
            },
            Theme::Light => Palette {
                heading: Color::Blue,
                accent: Color::Magenta,
                muted: Color::White,
                error: Color::Red,
                success: Color::Green,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub heading: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub success: Color,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryStorage;

    #[test]
    fn defaults_to_light_and_toggles() {
        let storage = MemoryStorage::new();
        assert_eq!(Theme::load(&storage), Theme::Light);

        assert_eq!(Theme::toggle(&storage).unwrap(), Theme::Dark);
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(Theme::toggle(&storage).unwrap(), Theme::Light);
    }

    #[test]
    fn garbage_reads_as_light() {
        let storage = MemoryStorage::new();
        storage.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(Theme::load(&storage), Theme::Light);
    }
}
