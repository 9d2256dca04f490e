use image::Rgba;
use nalgebra::Point3;

use crate::gleam::error::TraceError;
use crate::gleam::light::Light;
use crate::gleam::ray::Ray;

pub struct Scene {
    pub spheres: Vec<Sphere>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new(spheres: Vec<Sphere>, lights: Vec<Light>) -> Self {
        Self { spheres, lights }
    }
}

// 기본 장면: 작은 구 3개 + 바닥 역할의 큰 구 1개, 점광원 2개 + 환경광 1개.
// 순서가 바뀌면 t가 같을 때 고르는 구가 달라지니 그대로 둘 것
impl Default for Scene {
    fn default() -> Self {
        let spheres = vec![
            Sphere {
                position: Point3::new(0.0, -1.0, 3.0),
                radius: 1.0,
                color: Rgba([255, 0, 0, 255]),
                specular: 100.0,
                reflective: 0.01,
            },
            Sphere {
                position: Point3::new(-2.0, 0.0, 3.0),
                radius: 1.0,
                color: Rgba([0, 255, 0, 255]),
                specular: 25.0,
                reflective: 0.5,
            },
            Sphere {
                position: Point3::new(2.0, 0.0, 3.0),
                radius: 1.0,
                color: Rgba([0, 0, 255, 255]),
                specular: 15.0,
                reflective: 0.1,
            },
            Sphere {
                position: Point3::new(0.0, -2001.0, 5.0),
                radius: 2000.0,
                color: Rgba([255, 255, 0, 255]),
                specular: 1000.0,
                reflective: 0.0,
            },
        ];

        let lights = vec![
            Light::point(Point3::new(-4.0, 5.0, 2.0), 0.2),
            Light::point(Point3::new(2.0, 1.0, 0.0), 0.2),
            Light::ambient(0.3),
        ];

        Self { spheres, lights }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub position: Point3<f64>,
    pub radius: f64,
    pub color: Rgba<u8>,
    // NO_SPECULAR 이하이면 하이라이트 없음
    pub specular: f64,
    // 0..=1, 반사 광선에서 가져올 색의 비율
    pub reflective: f64,
}

impl Sphere {
    pub const NO_SPECULAR: f64 = -1.0;

    pub fn has_specular(&self) -> bool {
        self.specular > Self::NO_SPECULAR
    }

    // a = 빔 방향의 길이 제곱
    // b = 2 * (빔 시작 - 구 중심) . 빔 방향
    // c = |빔 시작 - 구 중심|^2 - r^2
    // a * t^2 + b * t + c = 0 의 두 근을 구함. 근이 없으면 None.
    // 두 근은 정렬하지 않음: (-b + sqrt(D)) / 2a 가 먼저
    pub fn intersect(&self, ray: &Ray) -> Result<Option<(f64, f64)>, TraceError> {
        let origin = ray.origin - self.position;

        let first = ray.direction.dot(&ray.direction);
        if first == 0.0 {
            return Err(TraceError::DegenerateRay);
        }
        let second = 2.0 * origin.dot(&ray.direction);
        let third = origin.dot(&origin) - self.radius * self.radius;

        // 판별식
        let discriminant = second * second - 4.0 * first * third;
        if discriminant < 0.0 {
            return Ok(None);
        }

        let root = discriminant.sqrt();
        Ok(Some((
            (-second + root) / (2.0 * first),
            (-second - root) / (2.0 * first),
        )))
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            radius: 1.0,
            color: Rgba([255, 255, 255, 255]),
            specular: Self::NO_SPECULAR,
            reflective: 0.0,
        }
    }
}
