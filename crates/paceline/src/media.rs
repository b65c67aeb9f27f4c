//! In-memory texture cache for activity photos.

use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle};
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, warn};

use crate::archive::{Archive, BytesPromise};

/// Longest edge uploaded to the GPU. Anything bigger is downscaled first.
const MAX_TEXTURE_EDGE: u32 = 2048;

/// One cached photo.
pub enum TextureState {
    Loading(BytesPromise),
    Ready(TextureHandle),
    Failed(String),
}

/// Decoded photo textures keyed by URL, kept for the lifetime of the
/// process. History and detail records are re-fetched on every selection,
/// pictures are not.
#[derive(Default)]
pub struct Textures {
    cache: HashMap<String, TextureState>,
}

impl Textures {
    /// Look up a photo, starting its fetch on first sight. The returned
    /// state advances across calls as the fetch and decode complete.
    pub fn get(&mut self, ctx: &Context, archive: &Archive, url: &str) -> &TextureState {
        let entry = self.cache.entry(url.to_owned()).or_insert_with(|| {
            debug!(url, "fetching picture");
            TextureState::Loading(archive.fetch_url(ctx, url))
        });

        if let TextureState::Loading(promise) = entry {
            if let Some(result) = promise.ready_mut().and_then(Option::take) {
                *entry = match result.and_then(|bytes| decode_texture(ctx, url, &bytes)) {
                    Ok(texture) => TextureState::Ready(texture),
                    Err(err) => {
                        warn!(url, %err, "picture failed");
                        TextureState::Failed(err.to_string())
                    }
                };
            }
        }
        entry
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn decode_texture(ctx: &Context, url: &str, bytes: &[u8]) -> crate::Result<TextureHandle> {
    let image = image::load_from_memory(bytes)?;
    let image = downscale_if_large(image, MAX_TEXTURE_EDGE, FilterType::CatmullRom);
    let buffer = image.into_rgba8();
    let color = ColorImage::from_rgba_unmultiplied(
        [buffer.width() as usize, buffer.height() as usize],
        buffer.as_flat_samples().as_slice(),
    );
    Ok(ctx.load_texture(url, color, Default::default()))
}

/// `resize` keeps the aspect ratio while fitting inside the bounds, so a
/// single call covers both orientations.
fn downscale_if_large(image: DynamicImage, max_edge: u32, filter: FilterType) -> DynamicImage {
    if image.width().max(image.height()) > max_edge {
        image.resize(max_edge, max_edge, filter)
    } else {
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::DataRoot;
    use pretty_assertions::assert_eq;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let pixel = image::Rgba([10u8, 20, 30, 255]);
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(w, h, pixel));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn small_images_keep_their_size() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::new(300, 100));
        let out = downscale_if_large(img, 2048, FilterType::CatmullRom);
        assert_eq!((out.width(), out.height()), (300, 100));
    }

    #[test]
    fn large_images_shrink_to_the_edge_limit() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::new(300, 100));
        let out = downscale_if_large(img, 150, FilterType::CatmullRom);
        assert_eq!((out.width(), out.height()), (150, 50));
    }

    #[test]
    fn decode_produces_a_texture() {
        let ctx = Context::default();
        let texture = decode_texture(&ctx, "pic.png", &png_bytes(4, 6)).unwrap();
        assert_eq!(texture.size(), [4, 6]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let ctx = Context::default();
        assert!(decode_texture(&ctx, "pic.png", b"not an image").is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn fetches_and_caches_by_url() {
        let tmp = tempfile::tempdir().unwrap();
        let user_dir = tmp.path().join("u");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(user_dir.join("workout-1-picture-7.jpg"), png_bytes(8, 8)).unwrap();

        let archive = Archive::new(DataRoot::parse(tmp.path().to_str().unwrap()), "u");
        let mut textures = Textures::default();
        let ctx = Context::default();

        let mut ready = false;
        for _ in 0..500 {
            if let TextureState::Ready(texture) =
                textures.get(&ctx, &archive, "workout-1-picture-7.jpg")
            {
                assert_eq!(texture.size(), [8, 8]);
                ready = true;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert!(ready, "picture fetch did not finish");
        assert_eq!(textures.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn missing_picture_reports_failure() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("u")).unwrap();

        let archive = Archive::new(DataRoot::parse(tmp.path().to_str().unwrap()), "u");
        let mut textures = Textures::default();
        let ctx = Context::default();

        let mut failed = false;
        for _ in 0..500 {
            if let TextureState::Failed(message) = textures.get(&ctx, &archive, "gone.jpg") {
                assert!(message.contains("gone.jpg"));
                failed = true;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert!(failed, "missing picture did not fail");
    }
}
