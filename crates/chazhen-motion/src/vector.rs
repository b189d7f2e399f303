//! 运动矢量.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// 运动矢量 (亚像素精度)
///
/// 表示前一帧中的块到当前帧中最佳匹配位置的位移, 单位为像素.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionVector {
    /// 水平位移 (向右为正)
    pub dx: f32,
    /// 垂直位移 (向下为正)
    pub dy: f32,
}

impl MotionVector {
    /// 零矢量
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// 创建运动矢量
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// 四舍五入到整像素 (远离零方向取整)
    #[inline]
    pub fn rounded(self) -> (i64, i64) {
        (self.dx.round() as i64, self.dy.round() as i64)
    }

    /// 按比例缩放 (用于按时间比例拆分矢量)
    #[inline]
    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.dx * factor, self.dy * factor)
    }

    /// 欧氏长度
    pub fn length(self) -> f32 {
        self.dx.hypot(self.dy)
    }
}

impl Add for MotionVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl Sub for MotionVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

impl Neg for MotionVector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }
}

impl Mul<f32> for MotionVector {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl fmt::Display for MotionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.dx, self.dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_取整_远离零() {
        assert_eq!(MotionVector::new(1.5, -1.5).rounded(), (2, -2));
        assert_eq!(MotionVector::new(0.49, -0.49).rounded(), (0, 0));
        assert_eq!(MotionVector::new(-2.6, 2.4).rounded(), (-3, 2));
    }

    #[test]
    fn test_缩放与运算() {
        let mv = MotionVector::new(3.0, -2.0);
        assert_eq!(mv.scale(0.5), MotionVector::new(1.5, -1.0));
        assert_eq!(mv * 2.0, MotionVector::new(6.0, -4.0));
        assert_eq!(-mv, MotionVector::new(-3.0, 2.0));
        assert_eq!(mv - mv, MotionVector::ZERO);
        assert_eq!(mv + MotionVector::ZERO, mv);
        assert!((MotionVector::new(3.0, 4.0).length() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_显示() {
        assert_eq!(MotionVector::new(1.0, -0.5).to_string(), "(1.00, -0.50)");
    }
}
