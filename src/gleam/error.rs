use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceError {
    // 방향 벡터 길이가 0인 광선. 교차 방정식의 a가 0이 되어버림
    DegenerateRay,
    // 정반사 계산 중 반사 벡터나 시선 벡터의 길이가 0
    DegenerateSpecular,
}

impl Display for TraceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceError::DegenerateRay => write!(f, "ray direction has zero length"),
            TraceError::DegenerateSpecular => {
                write!(f, "specular term divides by a zero-length vector")
            }
        }
    }
}

impl Error for TraceError {}
