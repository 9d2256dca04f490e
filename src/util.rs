use nalgebra::Vector3;

pub type Vec3 = Vector3<f64>;

// 더하기, 빼기, 내적, 외적, 길이, lerp 등은 nalgebra가 이미 제공함.
// add_scalar도 nalgebra에 있음. 여기엔 nalgebra에 없거나 동작이 다른 것들만 모아둠
pub trait VectorExt {
    fn sub_scalar(&self, scalar: f64) -> Vec3;
    fn normalize_or_zero(&self) -> Vec3;
    fn reflect_about(&self, normal: &Vec3) -> Vec3;
    fn distance(&self, other: &Vec3) -> f64;
}

impl VectorExt for Vec3 {
    fn sub_scalar(&self, scalar: f64) -> Vec3 {
        self.add_scalar(-scalar)
    }

    // nalgebra의 normalize는 길이가 0이면 NaN을 뱉음. 여기선 0벡터를 그대로 돌려줌
    fn normalize_or_zero(&self) -> Vec3 {
        let length = self.norm();
        if length > 0.0 {
            self / length
        } else {
            *self
        }
    }

    // r = i - 2 * (i . n) * n
    fn reflect_about(&self, normal: &Vec3) -> Vec3 {
        self - normal * (2.0 * self.dot(normal))
    }

    fn distance(&self, other: &Vec3) -> f64 {
        (self - other).norm()
    }
}
