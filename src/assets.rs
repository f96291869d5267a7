use crate::config::AttributeConfig;
use crate::face::FrameSets;
use crate::render::Pixel;
use crate::sprites;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
    thread,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AssetError {
    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Opaque RGBA bitmap; its size is its natural size in logical units.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Bitmap {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
}

impl Bitmap {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> Pixel {
        if x >= self.w || y >= self.h {
            return Pixel::default();
        }
        self.px[self.idx(x, y)]
    }

    pub(crate) fn set(&mut self, x: i32, y: i32, p: Pixel) {
        if x < 0 || y < 0 || x as u32 >= self.w || y as u32 >= self.h {
            return;
        }
        let i = self.idx(x as u32, y as u32);
        self.px[i] = p;
    }

    fn from_rgba(img: &image::RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let px = img
            .pixels()
            .map(|p| Pixel {
                r: p[0],
                g: p[1],
                b: p[2],
                a: p[3],
            })
            .collect();
        Self { w, h, px }
    }
}

/// Shared handle to an image that may still be decoding.
#[derive(Clone, Debug, Default)]
pub(crate) struct ImageHandle(Arc<OnceLock<Bitmap>>);

impl ImageHandle {
    pub(crate) fn ready(bitmap: Bitmap) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(bitmap);
        Self(Arc::new(cell))
    }

    pub(crate) fn pending() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self) -> Option<&Bitmap> {
        self.0.get()
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.0.get().is_some()
    }
}

pub(crate) fn decode_image(path: &Path) -> Result<Bitmap, AssetError> {
    let img = image::open(path).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Bitmap::from_rgba(&img.to_rgba8()))
}

/// Returns immediately; the handle fills in once a worker thread has decoded
/// the file. Failures are logged and leave the handle pending forever.
pub(crate) fn load_image(path: PathBuf) -> ImageHandle {
    let handle = ImageHandle::pending();
    let cell = Arc::clone(&handle.0);
    let name = format!("load {}", path.display());
    let spawned = thread::Builder::new().name(name).spawn(move || match decode_image(&path) {
        Ok(bitmap) => {
            log::debug!("loaded {} ({}x{})", path.display(), bitmap.w, bitmap.h);
            let _ = cell.set(bitmap);
        }
        Err(e) => log::warn!("{e}"),
    });
    if let Err(e) = spawned {
        log::warn!("could not start image loader: {e}");
    }
    handle
}

pub(crate) fn load_images(dir: &Path, names: &[&str]) -> Vec<ImageHandle> {
    names.iter().map(|n| load_image(dir.join(n))).collect()
}

/// `iconEnergy.png` for `energy`.
pub(crate) fn icon_file_name(attribute: &str) -> String {
    let mut chars = attribute.chars();
    let head: String = chars.next().map(|c| c.to_uppercase().collect()).unwrap_or_default();
    format!("icon{}{}.png", head, chars.as_str())
}

#[derive(Clone, Debug)]
pub(crate) struct Assets {
    pub(crate) background: ImageHandle,
    pub(crate) body: ImageHandle,
    pub(crate) faces: FrameSets<ImageHandle>,
    /// One per attribute, in declaration order.
    pub(crate) icons: Vec<ImageHandle>,
}

impl Assets {
    pub(crate) fn load(dir: &Path, attributes: &[AttributeConfig]) -> Self {
        log::info!("loading assets from {}", dir.display());
        Self {
            background: load_image(dir.join("background1.png")),
            body: load_image(dir.join("body.png")),
            faces: FrameSets {
                happy: load_images(dir, &["happy1.png", "happy2.png", "happy3.png"]),
                sad: load_images(dir, &["sad1.png", "sad2.png"]),
            },
            icons: attributes
                .iter()
                .map(|a| load_image(dir.join(icon_file_name(&a.name))))
                .collect(),
        }
    }

    pub(crate) fn builtin(attributes: &[AttributeConfig], width: f32, height: f32) -> Self {
        Self {
            background: ImageHandle::ready(sprites::background(width as u32, height as u32)),
            body: ImageHandle::ready(sprites::body()),
            faces: FrameSets {
                happy: sprites::happy_faces().into_iter().map(ImageHandle::ready).collect(),
                sad: sprites::sad_faces().into_iter().map(ImageHandle::ready).collect(),
            },
            icons: attributes
                .iter()
                .map(|a| ImageHandle::ready(sprites::icon(&a.name)))
                .collect(),
        }
    }
}
