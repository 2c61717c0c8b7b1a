use crate::error::AssetError;
use crate::model::{FIELD_H, FIELD_W, FIRST_ROW_Y, MEDIAN_GAP, ROW_HEIGHT};
use crate::spawner::{LOG_ROWS, TRUCK_ROWS};
use crossterm::style::Color;
use image::{imageops, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

// larger images are shrunk to this before sampling
const SAMPLE_MAX: u32 = 128;
const ALPHA_CUTOFF: u8 = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TextureId {
    Truck,
    Log,
    Player,
    Background,
    Bar,
    GameOver,
}

impl TextureId {
    pub(crate) const ALL: [TextureId; 6] = [
        TextureId::Truck,
        TextureId::Log,
        TextureId::Player,
        TextureId::Background,
        TextureId::Bar,
        TextureId::GameOver,
    ];

    pub(crate) fn file_name(self) -> &'static str {
        match self {
            TextureId::Truck => "truck.png",
            TextureId::Log => "logLong.png",
            TextureId::Player => "frog.png",
            TextureId::Background => "background.bmp",
            TextureId::Bar => "bar.bmp",
            TextureId::GameOver => "gameOver.png",
        }
    }

    /// Backdrops paint cell backgrounds, everything else paints dots on top.
    pub(crate) fn is_backdrop(self) -> bool {
        matches!(
            self,
            TextureId::Background | TextureId::Bar | TextureId::GameOver
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

pub(crate) struct Texture {
    tint: Color,
    image: Option<RgbaImage>,
}

impl Texture {
    fn flat(r: u8, g: u8, b: u8) -> Self {
        Self {
            tint: Color::Rgb { r, g, b },
            image: None,
        }
    }

    fn from_image(img: RgbaImage) -> Self {
        let img = if img.width() > SAMPLE_MAX || img.height() > SAMPLE_MAX {
            let k = (img.width().max(img.height()) as f32) / SAMPLE_MAX as f32;
            let w = ((img.width() as f32 / k) as u32).max(1);
            let h = ((img.height() as f32 / k) as u32).max(1);
            imageops::thumbnail(&img, w, h)
        } else {
            img
        };
        Self {
            tint: average_opaque(&img),
            image: Some(img),
        }
    }

    /// Colour at (u, v) in [0, 1]. `None` where the image is transparent.
    pub(crate) fn sample(&self, u: f32, v: f32) -> Option<Color> {
        let Some(img) = &self.image else {
            return Some(self.tint);
        };
        let x = ((u.clamp(0.0, 1.0) * img.width() as f32) as u32).min(img.width() - 1);
        let y = ((v.clamp(0.0, 1.0) * img.height() as f32) as u32).min(img.height() - 1);
        let Rgba([r, g, b, a]) = *img.get_pixel(x, y);
        if a < ALPHA_CUTOFF {
            None
        } else {
            Some(Color::Rgb { r, g, b })
        }
    }
}

fn average_opaque(img: &RgbaImage) -> Color {
    let mut sum = [0u64; 3];
    let mut n = 0u64;
    for Rgba([r, g, b, a]) in img.pixels() {
        if *a < ALPHA_CUTOFF {
            continue;
        }
        sum[0] += *r as u64;
        sum[1] += *g as u64;
        sum[2] += *b as u64;
        n += 1;
    }
    if n == 0 {
        return Color::Rgb { r: 0, g: 0, b: 0 };
    }
    Color::Rgb {
        r: (sum[0] / n) as u8,
        g: (sum[1] / n) as u8,
        b: (sum[2] / n) as u8,
    }
}

// grass, river, grass, road, grass; drawn at 1/5 scale
fn builtin_background() -> RgbaImage {
    const K: u32 = 5;
    let river = FIRST_ROW_Y..FIRST_ROW_Y + LOG_ROWS as i32 * ROW_HEIGHT;
    let road_top = river.end + MEDIAN_GAP;
    let road = road_top..road_top + TRUCK_ROWS as i32 * ROW_HEIGHT;
    RgbaImage::from_fn(FIELD_W as u32 / K, FIELD_H as u32 / K, |_, y| {
        let fy = (y * K) as i32;
        if river.contains(&fy) {
            Rgba([24, 60, 140, 255])
        } else if road.contains(&fy) {
            Rgba([48, 48, 54, 255])
        } else {
            Rgba([34, 110, 40, 255])
        }
    })
}

/// One texture per [`TextureId`], either decoded from disk or the built-in palette.
pub(crate) struct Textures {
    textures: Vec<Texture>,
    source: Option<PathBuf>,
}

impl Textures {
    pub(crate) fn builtin() -> Self {
        let textures = TextureId::ALL
            .iter()
            .map(|id| match id {
                TextureId::Truck => Texture::flat(230, 70, 60),
                TextureId::Log => Texture::flat(150, 100, 50),
                TextureId::Player => Texture::flat(120, 240, 110),
                TextureId::Background => Texture::from_image(builtin_background()),
                TextureId::Bar => Texture::flat(80, 80, 100),
                TextureId::GameOver => Texture::flat(110, 10, 20),
            })
            .collect();
        Self {
            textures,
            source: None,
        }
    }

    /// Decodes every texture from `dir`. The first failure aborts the load.
    pub(crate) fn load(dir: &Path) -> Result<Self, AssetError> {
        let mut textures = Vec::with_capacity(TextureId::ALL.len());
        for id in TextureId::ALL {
            let path = dir.join(id.file_name());
            let img = image::open(&path)
                .map_err(|source| AssetError {
                    path: path.clone(),
                    source,
                })?
                .into_rgba8();
            log::debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());
            textures.push(Texture::from_image(img));
        }
        Ok(Self {
            textures,
            source: Some(dir.to_path_buf()),
        })
    }

    pub(crate) fn from_source(dir: Option<&Path>) -> Result<Self, AssetError> {
        match dir {
            Some(dir) => Self::load(dir),
            None => Ok(Self::builtin()),
        }
    }

    pub(crate) fn get(&self, id: TextureId) -> &Texture {
        &self.textures[id.index()]
    }

    pub(crate) fn describe(&self) -> String {
        match &self.source {
            Some(dir) => dir.display().to_string(),
            None => "built-in palette".to_string(),
        }
    }
}
