use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::Context;
use image::{Rgba, RgbaImage};
use log::{debug, info};
use nalgebra::{Point3, Vector3};
use rayon::ThreadPoolBuilder;

use crate::camera::Camera;
use crate::gleam::error::TraceError;
use crate::gleam::ray::Ray;
use crate::gleam::scene::{Scene, Sphere};
use crate::util::VectorExt;

pub mod error;
pub mod light;
pub mod ray;
pub mod scene;
pub mod texture;

// 점광원 확산광을 무엇으로 나눌지.
// OriginDistance: |교차점| * |법선|. 원본 출력과 같은 값을 얻으려면 이쪽
// Lambertian: |광원 방향| * |법선|. 일반적인 람베르트 반사
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffuseFalloff {
    #[default]
    OriginDistance,
    Lambertian,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub recursion_depth: u32,
    // 그림자, 반사 광선이 자기 자신과 부딪히지 않도록 띄우는 거리
    pub epsilon: f64,
    pub max_intensity: f64,
    pub background: Rgba<u8>,
    // None이면 CPU 개수만큼
    pub workers: Option<usize>,
    pub diffuse_falloff: DiffuseFalloff,
    pub output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 2048,
            height: 2048,
            recursion_depth: 3,
            epsilon: 0.001,
            max_intensity: 1.0,
            background: Rgba([125, 125, 125, 255]),
            workers: None,
            diffuse_falloff: DiffuseFalloff::default(),
            output: PathBuf::from("img.png"),
        }
    }
}

impl Settings {
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|count| count.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

pub struct Gleam {
    pub settings: Settings,
    camera: Camera,
}

impl Gleam {
    pub fn new(settings: Settings) -> Self {
        let camera = Camera::new(settings.width, settings.height);
        Self { settings, camera }
    }

    // 워커 i는 i, i + n, i + 2n ... 번째 줄만 그림. 줄끼리 겹치지 않으니 동기화 필요 없음
    pub fn render(&self, scene: &Scene) -> anyhow::Result<RgbaImage> {
        let Settings { width, height, .. } = self.settings;
        let mut image = RgbaImage::new(width, height);
        if width == 0 || height == 0 {
            return Ok(image);
        }

        let workers = self.settings.worker_count();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("gleam-worker-{index}"))
            .build()
            .context("failed to build render worker pool")?;

        info!("rendering {width}x{height} with {workers} workers");
        let started = Instant::now();

        let mut stripes: Vec<Vec<(u32, &mut [u8])>> = (0..workers).map(|_| Vec::new()).collect();
        for (y, row) in image.chunks_mut(width as usize * 4).enumerate() {
            stripes[y % workers].push((y as u32, row));
        }

        let failed = AtomicBool::new(false);
        let mut results: Vec<Result<(), TraceError>> = vec![Ok(()); workers];
        pool.scope(|s| {
            let jobs = stripes.into_iter().zip(results.iter_mut()).enumerate();
            for (index, (stripe, result)) in jobs {
                let failed = &failed;
                s.spawn(move |_| {
                    *result = self.render_rows(scene, stripe, failed);
                    if result.is_err() {
                        failed.store(true, Ordering::Relaxed);
                    }
                    debug!("worker {index} finished");
                });
            }
        });

        // 하나라도 실패하면 그림 전체를 버림
        results.into_iter().collect::<Result<(), TraceError>>()?;

        info!("rendered in {} ms", started.elapsed().as_millis());
        Ok(image)
    }

    fn render_rows(
        &self,
        scene: &Scene,
        rows: Vec<(u32, &mut [u8])>,
        failed: &AtomicBool,
    ) -> Result<(), TraceError> {
        for (y, row) in rows {
            if failed.load(Ordering::Relaxed) {
                break;
            }

            for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                let color = self.per_pixel(scene, x as u32, y)?;
                pixel.copy_from_slice(&color.0);
            }
        }
        Ok(())
    }

    // DirectX의 RayGen 쉐이더와 같음
    pub fn per_pixel(&self, scene: &Scene, x: u32, y: u32) -> Result<Rgba<u8>, TraceError> {
        let ray = self.camera.ray(x, y);
        self.trace_ray(&ray, scene, self.settings.recursion_depth, 1.0, f64::MAX)
    }

    pub fn trace_ray(
        &self,
        ray: &Ray,
        scene: &Scene,
        depth: u32,
        t_min: f64,
        t_max: f64,
    ) -> Result<Rgba<u8>, TraceError> {
        if ray.direction.norm() == 0.0 {
            return Err(TraceError::DegenerateRay);
        }

        let Some((sphere, distance)) = find_closest(ray, &scene.spheres, t_min, t_max)? else {
            return Ok(self.settings.background);
        };
        let HitPayload { position, normal, sphere, .. } = closest_hit(ray, distance, sphere);

        let inverse_direction = -ray.direction;
        let mut light: f64 = 0.0;
        for source in &scene.lights {
            light += source.compute_lighting(
                &position,
                &normal,
                &inverse_direction,
                sphere.specular,
                scene,
                &self.settings,
            )?;
        }
        let light = light.min(self.settings.max_intensity);
        let local = scale(sphere.color, light);

        if sphere.reflective <= 0.0 || depth == 0 {
            return Ok(local);
        }

        // 자기 자신과 바로 다시 부딪히지 않게 t_min을 epsilon으로
        let reflected_ray = Ray::new(position, reflect_ray(&inverse_direction, &normal));
        let reflected = self.trace_ray(
            &reflected_ray,
            scene,
            depth - 1,
            self.settings.epsilon,
            t_max,
        )?;

        Ok(blend(reflected, local, sphere.reflective))
    }
}

pub struct HitPayload<'a> {
    pub distance: f64,
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub sphere: &'a Sphere,
}

pub fn closest_hit<'a>(ray: &Ray, distance: f64, sphere: &'a Sphere) -> HitPayload<'a> {
    let position = ray.at(distance);
    let normal = (position - sphere.position).normalize_or_zero();

    HitPayload {
        distance,
        position,
        normal,
        sphere,
    }
}

// [t_min, t_max] 안에서 가장 가까운 구. t가 같으면 먼저 나온 구가 이김
pub fn find_closest<'a>(
    ray: &Ray,
    spheres: &'a [Sphere],
    t_min: f64,
    t_max: f64,
) -> Result<Option<(&'a Sphere, f64)>, TraceError> {
    let mut closest = None;
    let mut closest_distance = f64::MAX;

    for sphere in spheres {
        let Some((first, second)) = sphere.intersect(ray)? else {
            continue;
        };

        for distance in [first, second] {
            if distance >= t_min && distance <= t_max && distance < closest_distance {
                closest = Some(sphere);
                closest_distance = distance;
            }
        }
    }

    Ok(closest.map(|sphere| (sphere, closest_distance)))
}

// 물리에선 r = l - 2n(n . l) 이지만 광원 방향 벡터가 표면에서 나가는 쪽이라 뒤집어서 반사함
pub fn reflect_ray(ray: &Vector3<f64>, normal: &Vector3<f64>) -> Vector3<f64> {
    (-ray).reflect_about(normal)
}

// as u8은 0..=255로 포화되고 소수점은 버림
fn scale(color: Rgba<u8>, factor: f64) -> Rgba<u8> {
    let Rgba([r, g, b, a]) = color;
    Rgba([
        (r as f64 * factor) as u8,
        (g as f64 * factor) as u8,
        (b as f64 * factor) as u8,
        a,
    ])
}

fn blend(reflected: Rgba<u8>, local: Rgba<u8>, reflective: f64) -> Rgba<u8> {
    let local = scale(local, 1.0 - reflective);
    let reflected = scale(reflected, reflective);
    Rgba([
        reflected[0].saturating_add(local[0]),
        reflected[1].saturating_add(local[1]),
        reflected[2].saturating_add(local[2]),
        reflected[3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gleam::light::Light;

    const GRAY: Rgba<u8> = Rgba([125, 125, 125, 255]);

    fn gleam() -> Gleam {
        Gleam::new(Settings {
            width: 16,
            height: 16,
            workers: Some(2),
            ..Default::default()
        })
    }

    fn mirror_scene(reflective: f64) -> Scene {
        Scene::new(
            vec![Sphere {
                position: Point3::new(0.0, 0.0, 3.0),
                color: Rgba([200, 100, 50, 255]),
                reflective,
                ..Default::default()
            }],
            vec![Light::ambient(1.0)],
        )
    }

    fn forward() -> Ray {
        Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn miss_returns_background() {
        let scene = Scene::default();
        let gleam = gleam();

        for direction in [
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(-1.0, 1.0, 1.0),
        ] {
            let ray = Ray::new(Point3::origin(), direction);
            assert_eq!(gleam.trace_ray(&ray, &scene, 3, 1.0, f64::MAX), Ok(GRAY));
        }
    }

    #[test]
    fn zero_direction_fails_fast() {
        let ray = Ray::new(Point3::origin(), Vector3::zeros());
        let empty = Scene::new(vec![], vec![]);

        assert_eq!(
            gleam().trace_ray(&ray, &empty, 3, 1.0, f64::MAX),
            Err(TraceError::DegenerateRay)
        );
    }

    #[test]
    fn find_closest_picks_nearest_root() {
        let scene = Scene::default();
        let (sphere, distance) = find_closest(&forward(), &scene.spheres, 1.0, f64::MAX)
            .unwrap()
            .unwrap();

        // 원점에서 +z로 가면 빨간 구 (0, -1, 3)의 꼭대기를 스치듯 지남
        assert_eq!(sphere.color, Rgba([255, 0, 0, 255]));
        assert!((distance - 3.0).abs() < 1e-6);
    }

    #[test]
    fn find_closest_respects_interval() {
        let scene = mirror_scene(0.0);

        assert!(find_closest(&forward(), &scene.spheres, 4.5, f64::MAX).unwrap().is_none());
        assert!(find_closest(&forward(), &scene.spheres, 0.0, 1.5).unwrap().is_none());

        let (_, distance) = find_closest(&forward(), &scene.spheres, 2.5, f64::MAX)
            .unwrap()
            .unwrap();
        assert_eq!(distance, 4.0);
    }

    #[test]
    fn find_closest_ties_go_to_first_sphere() {
        let first = Sphere {
            position: Point3::new(0.0, 0.0, 3.0),
            color: Rgba([1, 0, 0, 255]),
            ..Default::default()
        };
        let second = Sphere {
            color: Rgba([2, 0, 0, 255]),
            ..first.clone()
        };
        let spheres = vec![first, second];

        let (sphere, _) = find_closest(&forward(), &spheres, 1.0, f64::MAX).unwrap().unwrap();
        assert!(std::ptr::eq(sphere, &spheres[0]));
    }

    #[test]
    fn find_closest_is_idempotent() {
        let scene = Scene::default();
        let ray = Ray::new(Point3::origin(), Vector3::new(0.3, -0.4, 1.0));

        let a = find_closest(&ray, &scene.spheres, 1.0, f64::MAX).unwrap().unwrap();
        let b = find_closest(&ray, &scene.spheres, 1.0, f64::MAX).unwrap().unwrap();
        assert!(std::ptr::eq(a.0, b.0));
        assert_eq!(a.1, b.1);
    }

    #[test]
    fn depth_zero_never_recurses() {
        let gleam = gleam();
        let local = gleam.trace_ray(&forward(), &mirror_scene(1.0), 0, 1.0, f64::MAX);

        // 반사 없이 주변광 1.0 으로 칠한 원래 색
        assert_eq!(local, Ok(Rgba([200, 100, 50, 255])));
    }

    #[test]
    fn non_reflective_sphere_returns_local_color() {
        let gleam = gleam();
        let scene = mirror_scene(0.0);

        assert_eq!(
            gleam.trace_ray(&forward(), &scene, 3, 1.0, f64::MAX),
            gleam.trace_ray(&forward(), &scene, 0, 1.0, f64::MAX)
        );
    }

    #[test]
    fn fully_reflective_sphere_returns_reflected_color() {
        // 반사 광선은 (0, 0, 2)에서 -z로 나가서 아무것도 안 맞음
        let color = gleam().trace_ray(&forward(), &mirror_scene(1.0), 3, 1.0, f64::MAX);
        assert_eq!(color, Ok(GRAY));
    }

    #[test]
    fn partial_reflection_blends() {
        let color = gleam().trace_ray(&forward(), &mirror_scene(0.5), 3, 1.0, f64::MAX);

        // 125 * 0.5 -> 62, (200, 100, 50) * 0.5 -> (100, 50, 25)
        assert_eq!(color, Ok(Rgba([162, 112, 87, 255])));
    }

    #[test]
    fn channels_saturate_instead_of_wrapping() {
        assert_eq!(scale(Rgba([200, 10, 0, 255]), 2.0), Rgba([255, 20, 0, 255]));
        assert_eq!(scale(Rgba([200, 10, 0, 255]), -1.0), Rgba([0, 0, 0, 255]));
        assert_eq!(
            blend(Rgba([200, 0, 0, 255]), Rgba([200, 0, 0, 255]), 1.5),
            Rgba([255, 0, 0, 255])
        );
    }

    #[test]
    fn worker_count_never_zero() {
        let settings = Settings {
            workers: Some(0),
            ..Default::default()
        };
        assert_eq!(settings.worker_count(), 1);
        assert!(Settings::default().worker_count() >= 1);
    }

    #[test]
    fn render_fills_every_pixel() {
        let gleam = gleam();
        let image = gleam.render(&Scene::default()).unwrap();

        assert_eq!(image.dimensions(), (16, 16));
        assert!(image.pixels().all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn render_reports_trace_errors() {
        // 1x1 이미지의 유일한 광선은 (0, 0, 2)에 맞음. 광원이 바로 거기 있으면 그림자 광선 방향이 0
        let scene = Scene::new(
            vec![Sphere {
                position: Point3::new(0.0, 0.0, 3.0),
                ..Default::default()
            }],
            vec![Light::point(Point3::new(0.0, 0.0, 2.0), 0.5)],
        );
        let gleam = Gleam::new(Settings {
            width: 1,
            height: 1,
            workers: Some(3),
            ..Default::default()
        });

        let error = gleam.render(&scene).unwrap_err();
        assert_eq!(error.downcast_ref::<TraceError>(), Some(&TraceError::DegenerateRay));
    }
}
