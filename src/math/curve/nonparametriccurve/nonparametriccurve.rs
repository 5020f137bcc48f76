#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    x: f64,
    y: f64
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x: x, y: y }
    }

    /// 將兩條等長序列配對成節點；長度不同時回傳 `None`。
    pub fn zip(x: &[f64], y: &[f64]) -> Option<Vec<Point2D>> {
        if x.len() != y.len() {
            return None;
        }
        Some(
            x.iter()
                .zip(y.iter())
                .map(|(&x, &y)| Point2D::new(x, y))
                .collect()
        )
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn slope(lhs_pt: &Point2D, rhs_pt: &Point2D) -> f64 {
        (rhs_pt.y - lhs_pt.y) / (rhs_pt.x - lhs_pt.x)
    }
}

pub trait NonparametricCurve {
    fn points(&self) -> Vec<Point2D>;

    fn min_x(&self) -> f64;

    fn max_x(&self) -> f64;

    fn contains(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}
