//! Filesystem texture loading and the built-in demo catalog.

use cardkit::{Catalog, Item, Level, LoadError, ResourceId, ResourceLoader, Rgba, TextureData};
use std::path::{Component, Path, PathBuf};

/// Resolves resource ids against an asset root and decodes them with `image`.
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps `/raw_texture.webp` to `<root>/raw_texture.webp`. Ids that try to
    /// climb out of the root resolve to nothing.
    pub fn resolve(&self, id: &ResourceId) -> Option<PathBuf> {
        let rel = Path::new(id.as_str().trim_start_matches('/'));
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || rel.as_os_str().is_empty() {
            return None;
        }
        Some(self.root.join(rel))
    }
}

impl ResourceLoader for FsLoader {
    fn load(&self, id: &ResourceId) -> Result<TextureData, LoadError> {
        let path = self
            .resolve(id)
            .ok_or_else(|| LoadError::NotFound(id.to_string()))?;

        let img = image::open(&path).map_err(|e| match e {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                LoadError::NotFound(path.display().to_string())
            }
            other => LoadError::Decode(format!("{}: {}", path.display(), other)),
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        TextureData::new(width, height, rgba.into_raw())
    }
}

/// The skills shown when no catalog file is configured.
pub fn demo_catalog() -> Catalog {
    const BG: &str = "/raw_texture.webp";
    const GIT_ART: &str = "/github_gitlab.webp";

    let entries: [(&str, u32, Rgba, &str); 13] = [
        ("VueJS", 80, rgb(0x33, 0x99, 0x33), "/VueJS_concept_in_Magic_the_Gathering_art_style.webp"),
        ("React", 70, rgb(0x61, 0xda, 0xfb), "/Magic_the_Gathering_style_card_art_for_React_JS_the_library.webp"),
        ("Ruby on Rails", 75, rgb(0xe1, 0x00, 0x98), "/ruby_on_rails.webp"),
        ("Ruby", 80, rgb(0xff, 0x00, 0x00), "/Ruby_on_Rails_framework_concept_in_an_MTG_art_style.webp"),
        ("GIT", 80, rgb(0xff, 0xa5, 0x00), GIT_ART),
        ("Python", 70, rgb(0x37, 0x76, 0xab), "/Python3_card_art_for_a_Magic_the_Gathering_like_game_incorporating_the_Python_logo.webp"),
        (".NET", 70, rgb(0x00, 0x00, 0xff), "/backend_concept_in_Magic_the_Gathering_art_style.webp"),
        ("Azure", 60, rgb(0x00, 0x00, 0xff), "/Azure_the_cloud_in_Magic_the_Gathering_art_style_with_the_logo.webp"),
        ("TypeScript", 60, rgb(0x31, 0x78, 0xc6), GIT_ART),
        ("Javascript", 70, rgb(0xff, 0xff, 0x00), GIT_ART),
        ("SQL", 70, rgb(0xad, 0xd8, 0xe6), GIT_ART),
        ("Docker", 50, rgb(0x00, 0x00, 0xff), GIT_ART),
        ("Astro", 40, rgb(0xff, 0xa5, 0x00), GIT_ART),
    ];

    let items = entries
        .into_iter()
        .map(|(name, level, tint, art)| Item {
            name: name.to_string(),
            level: Level::new(level).expect("demo catalog is static and valid"),
            tint,
            art: ResourceId::new(art),
            background: ResourceId::new(BG),
        })
        .collect();

    Catalog::new(items).expect("demo catalog is static and valid")
}

fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    Rgba::from_rgba8(r, g, b, 255)
}
