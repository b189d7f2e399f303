//! 单通道采样平面 (Plane).
//!
//! 平面是按行优先存储的实数采样网格, 是运动估计与补偿的基本数据载体.
//! 采样类型由 [`Sample`] 约束, 仅允许 `f32` 与 `f64`, 因此
//! "单通道实数采样" 这一前置条件在编译期即可保证.

use crate::error::{ChazhenError, ChazhenResult};

/// 平面采样类型 (实数)
pub trait Sample: Copy + Default + PartialOrd + Send + Sync + 'static {
    /// 转换为 f64
    fn to_f64(self) -> f64;

    /// 从 f64 转换
    fn from_f64(value: f64) -> Self;
}

impl Sample for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

/// 单通道采样平面
///
/// 数据长度恒等于 `width * height`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane<T: Sample = f32> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Sample> Plane<T> {
    /// 创建全零平面
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    /// 创建以指定值填充的平面
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// 由行优先数据创建平面
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> ChazhenResult<Self> {
        if data.len() != width * height {
            return Err(ChazhenError::InvalidData(format!(
                "平面数据长度 {} 与尺寸 {}x{} 不符",
                data.len(),
                width,
                height,
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// 由坐标函数生成平面
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// 宽度 (采样数)
    pub fn width(&self) -> usize {
        self.width
    }

    /// 高度 (行数)
    pub fn height(&self) -> usize {
        self.height
    }

    /// (宽, 高)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// 是否为空平面
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 行优先数据
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// 可变行优先数据
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// 第 `y` 行
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// 读取 (x, y) 处采样, 调用方保证坐标合法
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[y * self.width + x]
    }

    /// 写入 (x, y) 处采样
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.data[y * self.width + x] = value;
    }

    /// 带边界检查的读取, 越界返回 `None`
    #[inline]
    pub fn get_checked(&self, x: i64, y: i64) -> Option<T> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.data[y as usize * self.width + x as usize])
    }

    /// 将坐标钳制到平面范围内后读取
    ///
    /// 空平面返回默认值.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> T {
        if self.data.is_empty() {
            return T::default();
        }
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.data[cy * self.width + cx]
    }

    /// 是否与另一平面尺寸相同
    pub fn same_size<U: Sample>(&self, other: &Plane<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// 逐采样映射为新平面
    pub fn map<U: Sample>(&self, f: impl Fn(T) -> U) -> Plane<U> {
        Plane {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// 截取矩形区域 (坐标需在平面范围内)
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> ChazhenResult<Self> {
        if x + width > self.width || y + height > self.height {
            return Err(ChazhenError::InvalidArgument(format!(
                "截取区域 ({x}, {y}) {width}x{height} 超出平面 {}x{}",
                self.width, self.height,
            )));
        }
        let mut data = Vec::with_capacity(width * height);
        for row in y..y + height {
            let start = row * self.width + x;
            data.extend_from_slice(&self.data[start..start + width]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_长度校验() {
        assert!(Plane::<f32>::from_vec(2, 2, vec![0.0; 3]).is_err());
        let plane = Plane::<f32>::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(plane.get(1, 1), 4.0);
        assert_eq!(plane.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_越界读取() {
        let plane = Plane::<f32>::from_fn(3, 2, |x, y| (y * 3 + x) as f32);
        assert_eq!(plane.get_checked(-1, 0), None);
        assert_eq!(plane.get_checked(3, 0), None);
        assert_eq!(plane.get_checked(2, 1), Some(5.0));
        assert_eq!(plane.get_clamped(-5, -5), 0.0);
        assert_eq!(plane.get_clamped(10, 10), 5.0);
    }

    #[test]
    fn test_空平面_钳制读取() {
        let plane = Plane::<f64>::new(0, 0);
        assert!(plane.is_empty());
        assert_eq!(plane.get_clamped(0, 0), 0.0);
    }

    #[test]
    fn test_截取() {
        let plane = Plane::<f32>::from_fn(4, 4, |x, y| (y * 4 + x) as f32);
        let sub = plane.crop(1, 2, 2, 2).unwrap();
        assert_eq!(sub.data(), &[9.0, 10.0, 13.0, 14.0]);
        assert!(plane.crop(3, 3, 2, 2).is_err());
    }

    #[test]
    fn test_映射() {
        let plane = Plane::<f32>::filled(2, 1, 2.5);
        let doubled: Plane<f64> = plane.map(|v| f64::from(v) * 2.0);
        assert_eq!(doubled.data(), &[5.0, 5.0]);
    }
}
