use std::ffi::OsStr;
use std::path::Path;

use anyhow::{bail, Context};
use image::buffer::ConvertBuffer;
use image::{ImageFormat, RgbImage, RgbaImage};
use log::info;

// 확장자로 인코더를 고름. 모르는 확장자면 None
pub fn format_for<P: AsRef<Path>>(path: P) -> Option<ImageFormat> {
    let extension = path.as_ref().extension()?;
    if extension.eq(OsStr::new("jpg")) | extension.eq(OsStr::new("jpeg")) {
        Some(ImageFormat::Jpeg)
    } else if extension.eq(OsStr::new("png")) {
        Some(ImageFormat::Png)
    } else {
        None
    }
}

pub fn save<P: AsRef<Path>>(image: &RgbaImage, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let Some(format) = format_for(path) else {
        bail!("unsupported output format: {}", path.display());
    };

    let written = match format {
        // JPEG는 알파 채널이 없음
        ImageFormat::Jpeg => {
            let rgb: RgbImage = image.convert();
            rgb.save_with_format(path, format)
        }
        _ => image.save_with_format(path, format),
    };
    written.with_context(|| format!("failed to write {}", path.display()))?;

    info!("saved {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(())
}
