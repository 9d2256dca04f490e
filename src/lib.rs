use log::info;

use crate::gleam::scene::Scene;
use crate::gleam::{texture, Gleam, Settings};

pub mod camera;
pub mod gleam;
pub mod util;

pub use crate::gleam::error::TraceError;

// 고정 장면을 그려서 settings.output에 저장. 실패하면 파일은 건드리지 않음
pub fn run() -> anyhow::Result<()> {
    // 로거 초기화. RUST_LOG로 레벨 조절
    env_logger::init();

    let scene = Scene::default();
    let gleam = Gleam::new(Settings::default());
    info!(
        "scene: {} spheres, {} lights",
        scene.spheres.len(),
        scene.lights.len()
    );

    let image = gleam.render(&scene)?;
    texture::save(&image, &gleam.settings.output)?;

    Ok(())
}
