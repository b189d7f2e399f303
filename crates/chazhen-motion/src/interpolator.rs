//! 插帧流水线 (FrameInterpolator).
//!
//! 一次请求处理一对帧: 提取亮度 → 相位相关 → 块匹配 → 双向补偿合成.
//! 要么返回完整的中间帧, 要么返回错误, 不产生部分输出.

use std::time::{Duration, Instant};

use chazhen_core::{BlockGrid, ChazhenError, ChazhenResult, Frame};
use chazhen_scale::luma_plane;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::compositor::{BidirectionalCompositor, DEFAULT_TEMPORAL_FRACTION, validate_fraction};
use crate::field::MotionField;
use crate::matcher::{BlockMatcher, MatchOrder, SpectralCandidates};
use crate::spectral::{SpectralMotionEstimator, estimate_blocks};

/// 默认块大小
pub const DEFAULT_BLOCK_SIZE: usize = 16;

/// 相位相关的作用范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectralScope {
    /// 每个块独立做相位相关
    #[default]
    PerBlock,
    /// 整帧做一次相位相关, 所有块共用结果
    Global,
}

/// 插帧参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolateConfig {
    /// 块大小 (像素)
    pub block_size: usize,
    /// 中间帧的时间位置, 0 为前一帧, 1 为当前帧
    pub temporal_fraction: f32,
    /// 相位相关前是否加 Hann 窗
    pub use_window: bool,
    /// 相位相关作用范围
    pub spectral_scope: SpectralScope,
    /// 块匹配遍历顺序
    pub match_order: MatchOrder,
}

impl Default for InterpolateConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            temporal_fraction: DEFAULT_TEMPORAL_FRACTION,
            use_window: true,
            spectral_scope: SpectralScope::default(),
            match_order: MatchOrder::default(),
        }
    }
}

impl InterpolateConfig {
    /// 校验参数
    pub fn validate(&self) -> ChazhenResult<()> {
        if self.block_size == 0 {
            return Err(ChazhenError::InvalidArgument("块大小不能为 0".into()));
        }
        validate_fraction(self.temporal_fraction)
    }
}

/// 一次插帧的结果
#[derive(Debug, Clone)]
pub struct Interpolation {
    /// 中间帧
    pub frame: Frame,
    /// 亮度运动场
    pub field: MotionField,
    /// 块网格
    pub grid: BlockGrid,
    /// 耗时 (不含帧读取)
    pub elapsed: Duration,
}

/// 插帧器
pub struct FrameInterpolator {
    config: InterpolateConfig,
    compositor: BidirectionalCompositor,
    matcher: BlockMatcher,
}

impl FrameInterpolator {
    /// 创建插帧器, 参数非法时返回错误
    pub fn new(config: InterpolateConfig) -> ChazhenResult<Self> {
        config.validate()?;
        Ok(Self {
            compositor: BidirectionalCompositor::new(config.temporal_fraction)?,
            matcher: BlockMatcher::new(config.match_order),
            config,
        })
    }

    /// 当前参数
    pub fn config(&self) -> &InterpolateConfig {
        &self.config
    }

    /// 估计 `prev → curr` 的亮度运动场
    pub fn estimate(&self, prev: &Frame, curr: &Frame) -> ChazhenResult<(MotionField, BlockGrid)> {
        prev.ensure_compatible(curr)?;
        let grid = BlockGrid::new(prev.width(), prev.height(), self.config.block_size)?;
        let prev_luma = luma_plane(prev);
        let curr_luma = luma_plane(curr);

        let field = match self.config.spectral_scope {
            SpectralScope::PerBlock => {
                let results = estimate_blocks(&prev_luma, &curr_luma, &grid, self.config.use_window)?;
                self.matcher.match_field(
                    &prev_luma,
                    &curr_luma,
                    &grid,
                    SpectralCandidates::PerBlock(&results),
                )?
            }
            SpectralScope::Global => {
                let global = SpectralMotionEstimator::new().estimate_global(
                    &prev_luma,
                    &curr_luma,
                    self.config.use_window,
                )?;
                debug!(
                    "整帧相位相关: primary={}, secondary={}, response={:.4}",
                    global.primary, global.secondary, global.response,
                );
                self.matcher.match_field(
                    &prev_luma,
                    &curr_luma,
                    &grid,
                    SpectralCandidates::Global(&global),
                )?
            }
        };
        Ok((field, grid))
    }

    /// 生成 `prev` 与 `curr` 之间的中间帧
    pub fn interpolate(&self, prev: &Frame, curr: &Frame) -> ChazhenResult<Interpolation> {
        let start = Instant::now();
        let (field, grid) = self.estimate(prev, curr)?;
        let frame = self.compositor.compose(prev, curr, &field, &grid)?;
        let elapsed = start.elapsed();
        debug!(
            "插帧完成: {}x{}, {}x{} 块, 耗时 {:.2} ms",
            prev.width(),
            prev.height(),
            grid.rows(),
            grid.cols(),
            elapsed.as_secs_f64() * 1000.0,
        );
        Ok(Interpolation {
            frame,
            field,
            grid,
            elapsed,
        })
    }
}
