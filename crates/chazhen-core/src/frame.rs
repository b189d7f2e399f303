//! 视频帧 (Frame).
//!
//! 由一个或多个同尺寸平面组成, 采样以 f32 存储.

use crate::error::{ChazhenError, ChazhenResult};
use crate::pixel_format::PixelFormat;
use crate::plane::Plane;

/// 未设置的时间戳
pub const NOPTS_VALUE: i64 = i64::MIN;

/// 视频帧
///
/// 所有平面与帧尺寸一致, 平面数量由像素格式决定.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixel_format: PixelFormat,
    planes: Vec<Plane<f32>>,
    /// 显示时间戳 (PTS)
    pub pts: i64,
}

impl Frame {
    /// 创建全零帧
    pub fn new(width: usize, height: usize, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            pixel_format,
            planes: vec![Plane::new(width, height); pixel_format.plane_count()],
            pts: NOPTS_VALUE,
        }
    }

    /// 由平面创建帧, 校验平面数量与尺寸
    pub fn from_planes(pixel_format: PixelFormat, planes: Vec<Plane<f32>>) -> ChazhenResult<Self> {
        if planes.len() != pixel_format.plane_count() {
            return Err(ChazhenError::InvalidArgument(format!(
                "像素格式 {pixel_format} 需要 {} 个平面, 实际 {}",
                pixel_format.plane_count(),
                planes.len(),
            )));
        }
        let (width, height) = planes[0].dimensions();
        for plane in &planes[1..] {
            if plane.dimensions() != (width, height) {
                return Err(ChazhenError::dimension_mismatch(
                    "帧平面",
                    (width, height),
                    plane.dimensions(),
                ));
            }
        }
        Ok(Self {
            width,
            height,
            pixel_format,
            planes,
            pts: NOPTS_VALUE,
        })
    }

    /// 由单个灰度平面创建帧
    pub fn from_gray(plane: Plane<f32>) -> Self {
        Self {
            width: plane.width(),
            height: plane.height(),
            pixel_format: PixelFormat::Gray,
            planes: vec![plane],
            pts: NOPTS_VALUE,
        }
    }

    /// 设置时间戳
    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = pts;
        self
    }

    /// 宽度 (像素)
    pub fn width(&self) -> usize {
        self.width
    }

    /// 高度 (像素)
    pub fn height(&self) -> usize {
        self.height
    }

    /// 像素格式
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// 全部平面
    pub fn planes(&self) -> &[Plane<f32>] {
        &self.planes
    }

    /// 第 `index` 个平面
    pub fn plane(&self, index: usize) -> Option<&Plane<f32>> {
        self.planes.get(index)
    }

    /// 校验与另一帧的尺寸和像素格式一致
    pub fn ensure_compatible(&self, other: &Frame) -> ChazhenResult<()> {
        if (self.width, self.height) != (other.width, other.height) {
            return Err(ChazhenError::dimension_mismatch(
                "参考帧",
                (self.width, self.height),
                (other.width, other.height),
            ));
        }
        if self.pixel_format != other.pixel_format {
            return Err(ChazhenError::InvalidArgument(format!(
                "参考帧像素格式不一致: {} vs {}",
                self.pixel_format, other.pixel_format,
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_新建帧_平面数量() {
        let frame = Frame::new(8, 4, PixelFormat::Rgb);
        assert_eq!(frame.planes().len(), 3);
        assert_eq!(frame.plane(2).map(|p| p.dimensions()), Some((8, 4)));
        assert_eq!(frame.pts, NOPTS_VALUE);
    }

    #[test]
    fn test_from_planes_校验() {
        let ok = Frame::from_planes(PixelFormat::Gray, vec![Plane::new(4, 4)]);
        assert!(ok.is_ok());

        let wrong_count = Frame::from_planes(PixelFormat::Rgb, vec![Plane::new(4, 4)]);
        assert!(matches!(wrong_count, Err(ChazhenError::InvalidArgument(_))));

        let wrong_size = Frame::from_planes(
            PixelFormat::Rgb,
            vec![Plane::new(4, 4), Plane::new(4, 4), Plane::new(4, 3)],
        );
        assert!(matches!(
            wrong_size,
            Err(ChazhenError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_兼容性校验() {
        let a = Frame::new(8, 8, PixelFormat::Gray);
        let b = Frame::new(8, 8, PixelFormat::Rgb);
        let c = Frame::new(8, 4, PixelFormat::Gray);
        assert!(a.ensure_compatible(&a.clone()).is_ok());
        assert!(a.ensure_compatible(&b).is_err());
        assert!(a.ensure_compatible(&c).is_err());
    }
}
