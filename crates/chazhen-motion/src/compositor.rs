//! 双向运动补偿合成 (BidirectionalCompositor).
//!
//! 对输出帧的每个像素 p, 取其所在块的运动矢量 mv:
//! - 前一帧在 `p - t * mv` 处采样 (前向补偿)
//! - 当前帧在 `p + (1 - t) * mv` 处采样 (后向补偿)
//!
//! 采样坐标四舍五入后钳制到帧内, 输出为 `(1 - t) * prev + t * curr`.
//! `t = 0.5` 即两帧正中间.

use chazhen_core::{BlockGrid, ChazhenError, ChazhenResult, Frame, Plane};
use log::debug;
use rayon::prelude::*;

use crate::field::MotionField;
use crate::vector::MotionVector;

/// 默认时间位置 (两帧中点)
pub const DEFAULT_TEMPORAL_FRACTION: f32 = 0.5;

/// 校验时间位置 `t ∈ [0, 1]`
pub fn validate_fraction(t: f32) -> ChazhenResult<()> {
    if (0.0..=1.0).contains(&t) {
        Ok(())
    } else {
        Err(ChazhenError::InvalidArgument(format!(
            "时间位置必须位于 [0, 1], 实际为 {t}"
        )))
    }
}

/// 双向运动补偿合成器
#[derive(Debug, Clone, Copy)]
pub struct BidirectionalCompositor {
    fraction: f32,
}

impl BidirectionalCompositor {
    /// 创建合成器, `fraction` 为中间帧的时间位置
    pub fn new(fraction: f32) -> ChazhenResult<Self> {
        validate_fraction(fraction)?;
        Ok(Self { fraction })
    }

    /// 时间位置
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    fn check_inputs(
        width: usize,
        height: usize,
        field: &MotionField,
        grid: &BlockGrid,
    ) -> ChazhenResult<()> {
        if (width, height) != (grid.frame_width(), grid.frame_height()) {
            return Err(ChazhenError::dimension_mismatch(
                "块网格",
                (grid.frame_width(), grid.frame_height()),
                (width, height),
            ));
        }
        if !field.matches_grid(grid) {
            return Err(ChazhenError::InvalidArgument(format!(
                "运动场 {}x{} 与块网格 {}x{} 不符",
                field.rows(),
                field.cols(),
                grid.rows(),
                grid.cols(),
            )));
        }
        if !field.is_complete() {
            return Err(ChazhenError::InvalidArgument(format!(
                "运动场不完整: {}/{} 块已确定",
                field.finalized_count(),
                grid.len(),
            )));
        }
        Ok(())
    }

    /// 合成单个平面
    pub fn compose_plane(
        &self,
        prev: &Plane<f32>,
        curr: &Plane<f32>,
        field: &MotionField,
        grid: &BlockGrid,
    ) -> ChazhenResult<Plane<f32>> {
        if !prev.same_size(curr) {
            return Err(ChazhenError::dimension_mismatch(
                "合成输入",
                prev.dimensions(),
                curr.dimensions(),
            ));
        }
        let (width, height) = prev.dimensions();
        Self::check_inputs(width, height, field, grid)?;

        let t = f64::from(self.fraction);
        let mut out = Plane::<f32>::new(width, height);
        out.data_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, value) in row.iter_mut().enumerate() {
                    let (block_row, block_col) = grid.block_of_pixel(x, y);
                    let mv = field.vector_or_zero(block_row, block_col);
                    *value = blend_sample(prev, curr, x, y, mv, t);
                }
            });
        Ok(out)
    }

    /// 合成整帧: 以亮度运动场补偿每个平面
    pub fn compose(
        &self,
        prev: &Frame,
        curr: &Frame,
        field: &MotionField,
        grid: &BlockGrid,
    ) -> ChazhenResult<Frame> {
        prev.ensure_compatible(curr)?;
        let planes = prev
            .planes()
            .iter()
            .zip(curr.planes())
            .map(|(p, c)| self.compose_plane(p, c, field, grid))
            .collect::<ChazhenResult<Vec<_>>>()?;
        debug!(
            "双向补偿合成完成: {}x{} {}, t={}, 平均矢量 {}",
            prev.width(),
            prev.height(),
            prev.pixel_format(),
            self.fraction,
            field.mean(),
        );
        Ok(Frame::from_planes(prev.pixel_format(), planes)?.with_pts(prev.pts))
    }
}

impl Default for BidirectionalCompositor {
    fn default() -> Self {
        Self {
            fraction: DEFAULT_TEMPORAL_FRACTION,
        }
    }
}

/// 单像素双向混合
#[inline]
fn blend_sample(
    prev: &Plane<f32>,
    curr: &Plane<f32>,
    x: usize,
    y: usize,
    mv: MotionVector,
    t: f64,
) -> f32 {
    let (dx, dy) = (f64::from(mv.dx), f64::from(mv.dy));
    let (px, py) = (x as f64, y as f64);
    let a = prev.get_clamped(round_coord(px - t * dx), round_coord(py - t * dy));
    let b = curr.get_clamped(
        round_coord(px + (1.0 - t) * dx),
        round_coord(py + (1.0 - t) * dy),
    );
    ((1.0 - t) * f64::from(a) + t * f64::from(b)) as f32
}

/// 四舍五入 (远离零) 到整数坐标; 非有限值按 0 处理
#[inline]
fn round_coord(v: f64) -> i64 {
    if v.is_finite() { v.round() as i64 } else { 0 }
}
