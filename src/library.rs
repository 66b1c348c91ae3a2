//! Component Library - Digit Stroke Assets
//!
//! Loaded once from an asset directory, read-only afterwards.
//! A slot without a usable file is simply absent.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::numeral::Place;

pub const COMPONENT_EXTENSION: &str = "png";

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Asset directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Asset path is not a directory: {0}")]
    NotADirectory(String),
}

/// Identifies one slot of the library: a digit 1..=9 in a place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKey {
    pub place: Place,
    pub digit: u8,
}

impl ComponentKey {
    /// `None` for digit 0 or anything above 9; zero never has strokes
    pub fn new(place: Place, digit: u8) -> Option<Self> {
        (1..=9).contains(&digit).then_some(Self { place, digit })
    }

    /// Every slot, thousands first, digits ascending
    pub fn all() -> impl Iterator<Item = ComponentKey> {
        Place::ALL
            .into_iter()
            .flat_map(|place| (1..=9u8).map(move |digit| ComponentKey { place, digit }))
    }

    /// Value the component stands for, e.g. hundreds 3 -> 300
    pub fn value(&self) -> u32 {
        self.digit as u32 * self.place.multiplier()
    }

    /// unit_3.png, ten_30.png, hundred_300.png, thousand_3000.png
    pub fn file_name(&self) -> String {
        let family = match self.place {
            Place::Units => "unit",
            Place::Tens => "ten",
            Place::Hundreds => "hundred",
            Place::Thousands => "thousand",
        };
        format!("{}_{}.{}", family, self.value(), COMPONENT_EXTENSION)
    }
}

/// One pre-rendered stroke group
#[derive(Debug, Clone)]
pub struct DigitComponent {
    pub key: ComponentKey,
    pub image: RgbaImage,
    pub source: Option<PathBuf>,
}

impl DigitComponent {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedAsset {
    pub key: ComponentKey,
    pub path: String,
    pub reason: String,
}

/// What happened while scanning the asset directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub directory: String,
    pub directory_created: bool,
    pub loaded: usize,
    pub skipped: Vec<SkippedAsset>,
}

impl LoadReport {
    /// One-time advisory for a freshly created, necessarily empty directory
    pub fn advisory(&self) -> Option<String> {
        self.directory_created.then(|| {
            format!("Component directory created. Please place your component images in: {}", self.directory)
        })
    }
}

/// Component library - loads and holds digit components by (place, digit)
#[derive(Debug, Clone, Default)]
pub struct ComponentLibrary {
    components: HashMap<ComponentKey, DigitComponent>,
}

impl ComponentLibrary {
    pub fn new() -> Self {
        Self { components: HashMap::new() }
    }

    /// Scan `dir` for every slot's asset. Creates the directory when absent.
    ///
    /// Undecodable files are skipped and listed in the report; the slot stays empty.
    pub fn load_from_dir(dir: &Path) -> Result<(Self, LoadReport), LibraryError> {
        let mut report = LoadReport::default();

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| LibraryError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            report.directory_created = true;
        } else if !dir.is_dir() {
            return Err(LibraryError::NotADirectory(dir.display().to_string()));
        }

        report.directory = fs::canonicalize(dir)
            .unwrap_or_else(|_| dir.to_path_buf())
            .display()
            .to_string();

        if let Some(advisory) = report.advisory() {
            tracing::warn!("{advisory}");
        }

        let mut library = Self::new();
        for key in ComponentKey::all() {
            let path = dir.join(key.file_name());
            if !path.is_file() {
                continue;
            }
            match image::open(&path) {
                Ok(img) => {
                    tracing::debug!(file = %path.display(), "loaded component");
                    library.components.insert(key, DigitComponent {
                        key,
                        image: img.to_rgba8(),
                        source: Some(path),
                    });
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping unreadable component");
                    report.skipped.push(SkippedAsset {
                        key,
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.loaded = library.len();
        tracing::info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            directory = %report.directory,
            "component library ready"
        );

        Ok((library, report))
    }

    /// Add a component held in memory. Replaces any previous asset for the slot.
    pub fn register(&mut self, key: ComponentKey, image: RgbaImage) {
        self.components.insert(key, DigitComponent { key, image, source: None });
    }

    pub fn lookup(&self, place: Place, digit: u8) -> Option<&DigitComponent> {
        let key = ComponentKey::new(place, digit)?;
        self.components.get(&key)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Loaded slots in overlay order
    pub fn keys(&self) -> Vec<ComponentKey> {
        let mut keys: Vec<_> = self.components.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Loaded components in overlay order
    pub fn components(&self) -> Vec<&DigitComponent> {
        self.keys().iter().filter_map(|k| self.components.get(k)).collect()
    }

    pub fn missing(&self) -> Vec<ComponentKey> {
        ComponentKey::all().filter(|k| !self.components.contains_key(k)).collect()
    }
}
