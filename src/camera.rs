use nalgebra::{Point3, Vector2, Vector3};

use crate::gleam::ray::Ray;

// 원점에 고정된 핀홀 카메라. +z를 바라보고 화면은 z = 1 평면에 있음.
// 회전, 이동, 원근 행렬 없음
pub struct Camera {
    pub position: Point3<f64>,
    pub viewport_distance: f64,
    width: u32,
    height: u32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::origin(),
            viewport_distance: 1.0,
            width,
            height,
        }
    }

    // 픽셀 중심을 [-1, 1] x [-1, 1]로. 열은 x(오른쪽으로 증가), 행은 y(위로 증가)
    pub fn coord(&self, x: u32, y: u32) -> Vector2<f64> {
        Vector2::new(
            (x as f64 + 0.5) * 2.0 / self.width as f64 - 1.0,
            1.0 - (y as f64 + 0.5) * 2.0 / self.height as f64,
        )
    }

    pub fn ray(&self, x: u32, y: u32) -> Ray {
        let coord = self.coord(x, y);
        Ray::new(
            self.position,
            Vector3::new(coord.x, coord.y, self.viewport_distance),
        )
    }
}
