use nalgebra::{Point3, Vector3};

use crate::gleam::error::TraceError;
use crate::gleam::ray::Ray;
use crate::gleam::scene::{Scene, Sphere};
use crate::gleam::{find_closest, reflect_ray, DiffuseFalloff, Settings};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Point(Point3<f64>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub intensity: f64,
}

impl Light {
    pub fn ambient(intensity: f64) -> Self {
        Self {
            kind: LightKind::Ambient,
            intensity,
        }
    }

    pub fn point(position: Point3<f64>, intensity: f64) -> Self {
        Self {
            kind: LightKind::Point(position),
            intensity,
        }
    }

    // 광원 하나가 point에 주는 밝기. 0 이상이지만 위로는 자르지 않음 (합산 후 호출하는 쪽에서 자름)
    pub fn compute_lighting(
        &self,
        point: &Point3<f64>,
        normal: &Vector3<f64>,
        inverse_direction: &Vector3<f64>,
        specular: f64,
        scene: &Scene,
        settings: &Settings,
    ) -> Result<f64, TraceError> {
        let light_direction = match self.kind {
            LightKind::Ambient => return Ok(self.intensity),
            LightKind::Point(position) => position - *point,
        };

        // 방향 벡터를 정규화하지 않았으니 t = 1 이 곧 광원 위치
        let shadow_ray = Ray::new(*point, light_direction);
        if find_closest(&shadow_ray, &scene.spheres, settings.epsilon, 1.0)?.is_some() {
            return Ok(0.0);
        }

        let divisor = match settings.diffuse_falloff {
            DiffuseFalloff::OriginDistance => point.coords.norm() * normal.norm(),
            DiffuseFalloff::Lambertian => light_direction.norm() * normal.norm(),
        };
        let mut intensity = self.intensity * light_direction.dot(normal).max(0.0) / divisor;

        if specular > Sphere::NO_SPECULAR {
            let reflected = reflect_ray(&light_direction, normal);
            let reflected_length = reflected.norm();
            let inverse_length = inverse_direction.norm();
            if reflected_length == 0.0 || inverse_length == 0.0 {
                return Err(TraceError::DegenerateSpecular);
            }

            let cosine = reflected.dot(inverse_direction).max(0.0);
            intensity +=
                self.intensity * (cosine / (reflected_length * inverse_length)).powf(specular);
        }

        Ok(intensity.max(0.0))
    }
}
