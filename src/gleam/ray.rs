use nalgebra::{Point3, Vector3};

// 방향은 정규화하지 않음. 그림자 광선은 t = 1이 정확히 광원 위치여야 함
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    // P = O + tD
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }
}
