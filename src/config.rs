use rand::Rng;
use std::env;
use std::path::PathBuf;

pub const NOTES_FILE_ENV: &str = "STICKIES_NOTES_FILE";
pub const SPAWN_AREA_ENV: &str = "STICKIES_SPAWN_AREA";

const DEFAULT_NOTES_FILE: &str = "sticky_notes.json";
const SPAWN_MARGIN: i32 = 50;
const SPAWN_RESERVE: i32 = 250;

/// Area in which brand-new notes are dropped at a random position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnArea {
    pub width: i32,
    pub height: i32,
}

impl Default for SpawnArea {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

impl SpawnArea {
    pub fn parse(raw: &str) -> Option<Self> {
        let (width, height) = raw.trim().split_once(['x', 'X'])?;
        let width = width.trim().parse::<i32>().ok().filter(|value| *value > 0)?;
        let height = height.trim().parse::<i32>().ok().filter(|value| *value > 0)?;
        Some(Self { width, height })
    }

    pub fn pick(&self) -> (i32, i32) {
        let mut rng = rand::thread_rng();
        let max_x = (self.width - SPAWN_RESERVE).max(SPAWN_MARGIN);
        let max_y = (self.height - SPAWN_RESERVE).max(SPAWN_MARGIN);
        (
            rng.gen_range(SPAWN_MARGIN..=max_x),
            rng.gen_range(SPAWN_MARGIN..=max_y),
        )
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub notes_file: PathBuf,
    pub spawn_area: SpawnArea,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            notes_file: PathBuf::from(DEFAULT_NOTES_FILE),
            spawn_area: SpawnArea::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(NOTES_FILE_ENV).filter(|value| !value.trim().is_empty()) {
            config.notes_file = PathBuf::from(path);
        }

        if let Some(raw) = lookup(SPAWN_AREA_ENV) {
            match SpawnArea::parse(&raw) {
                Some(area) => config.spawn_area = area,
                None => log::warn!(
                    "ignoring {SPAWN_AREA_ENV}={raw:?}, expected WIDTHxHEIGHT; using {}x{}",
                    config.spawn_area.width,
                    config.spawn_area.height
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_overrides() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.notes_file, PathBuf::from("sticky_notes.json"));
        assert_eq!(config.spawn_area, SpawnArea::default());
    }

    #[test]
    fn env_overrides_apply() {
        let config = AppConfig::from_lookup(|key| match key {
            NOTES_FILE_ENV => Some("/tmp/notes.json".to_string()),
            SPAWN_AREA_ENV => Some("1920x1080".to_string()),
            _ => None,
        });
        assert_eq!(config.notes_file, PathBuf::from("/tmp/notes.json"));
        assert_eq!(
            config.spawn_area,
            SpawnArea {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn invalid_spawn_area_keeps_default() {
        let config = AppConfig::from_lookup(|key| {
            (key == SPAWN_AREA_ENV).then(|| "wide".to_string())
        });
        assert_eq!(config.spawn_area, SpawnArea::default());
        assert!(SpawnArea::parse("0x100").is_none());
    }

    #[test]
    fn pick_stays_inside_margins_even_for_tiny_areas() {
        let tiny = SpawnArea {
            width: 120,
            height: 90,
        };
        for _ in 0..32 {
            assert_eq!(tiny.pick(), (50, 50));
        }

        let area = SpawnArea::default();
        for _ in 0..32 {
            let (x, y) = area.pick();
            assert!((50..=1030).contains(&x));
            assert!((50..=550).contains(&y));
        }
    }
}
