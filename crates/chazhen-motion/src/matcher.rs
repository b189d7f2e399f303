//! 块匹配 (BlockMatcher).
//!
//! 对每个块, 在少量候选矢量 (相位相关主/次峰, 邻域中值, 零矢量) 中选择
//! SAD 最小者. 候选按优先级排列, 代价相同时保留优先级更高的候选.
//!
//! 运动场按光栅顺序逐块确定. 波前 (wavefront) 顺序把满足 `col + 2 * row == k`
//! 的块分为第 `k` 批: 每个块依赖的邻居都位于更早的批次, 同一批内的块可以
//! 并行匹配, 结果与光栅顺序完全一致.

use chazhen_core::{BlockGrid, BlockRect, ChazhenError, ChazhenResult, Plane};
use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::field::MotionField;
use crate::predictor::NeighborPredictor;
use crate::spectral::PhaseCorrelation;
use crate::vector::MotionVector;

/// 候选来源 (声明顺序即优先级)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CandidateKind {
    /// 相位相关主峰
    SpectralPrimary,
    /// 相位相关次峰
    SpectralSecondary,
    /// 邻域中值
    NeighborMedian,
    /// 零矢量 (保底)
    Zero,
}

/// 候选矢量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub vector: MotionVector,
}

/// 单个块的候选集合, 按优先级排列
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    /// 组装候选: 主峰, 次峰 (如有), 邻域中值, 零矢量
    pub fn assemble(spectral: Option<&PhaseCorrelation>, median: MotionVector) -> Self {
        let mut candidates = Vec::with_capacity(4);
        if let Some(pc) = spectral {
            candidates.push(Candidate {
                kind: CandidateKind::SpectralPrimary,
                vector: pc.primary,
            });
            candidates.push(Candidate {
                kind: CandidateKind::SpectralSecondary,
                vector: pc.secondary,
            });
        }
        candidates.push(Candidate {
            kind: CandidateKind::NeighborMedian,
            vector: median,
        });
        candidates.push(Candidate {
            kind: CandidateKind::Zero,
            vector: MotionVector::ZERO,
        });
        Self { candidates }
    }

    /// 候选列表
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

/// 单个块的匹配结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockMatch {
    pub vector: MotionVector,
    pub kind: CandidateKind,
    pub cost: f64,
}

/// 前一帧块与当前帧偏移区域的绝对差之和
///
/// 矢量四舍五入到整像素. 偏移后超出当前帧的位置 (包括坐标溢出 `i64` 的极端矢量),
/// 以前一帧采样自身的幅值作为该像素的代价, 因此代价总是有限且非负.
pub fn sad(prev: &Plane<f32>, curr: &Plane<f32>, rect: BlockRect, mv: MotionVector) -> f64 {
    let (dx, dy) = mv.rounded();
    let mut sum = 0.0f64;
    for y in rect.y..rect.y + rect.height {
        let cy = (y as i64).checked_add(dy);
        for x in rect.x..rect.x + rect.width {
            let p = f64::from(prev.get(x, y));
            let sample = match ((x as i64).checked_add(dx), cy) {
                (Some(cx), Some(cy)) => curr.get_checked(cx, cy),
                _ => None,
            };
            sum += match sample {
                Some(c) => (p - f64::from(c)).abs(),
                None => p.abs(),
            };
        }
    }
    sum
}

/// 在候选集中选择 SAD 最小者 (严格小于才替换, 保留高优先级)
pub fn best_candidate(
    prev: &Plane<f32>,
    curr: &Plane<f32>,
    rect: BlockRect,
    set: &CandidateSet,
) -> BlockMatch {
    let mut best = BlockMatch {
        vector: MotionVector::ZERO,
        kind: CandidateKind::Zero,
        cost: f64::INFINITY,
    };
    for candidate in set.candidates() {
        let cost = sad(prev, curr, rect, candidate.vector);
        if cost < best.cost {
            best = BlockMatch {
                vector: candidate.vector,
                kind: candidate.kind,
                cost,
            };
        }
    }
    best
}

/// 相位相关候选的来源
#[derive(Debug, Clone, Copy)]
pub enum SpectralCandidates<'a> {
    /// 每块一个结果 (光栅顺序)
    PerBlock(&'a [PhaseCorrelation]),
    /// 整帧一个结果, 所有块共用
    Global(&'a PhaseCorrelation),
    /// 不使用相位相关候选
    None,
}

impl<'a> SpectralCandidates<'a> {
    fn for_block(&self, index: usize) -> Option<&'a PhaseCorrelation> {
        match *self {
            Self::PerBlock(results) => results.get(index),
            Self::Global(result) => Some(result),
            Self::None => None,
        }
    }
}

/// 块遍历顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrder {
    /// 严格光栅顺序, 单线程
    Raster,
    /// 波前批次, 批内并行
    #[default]
    Wavefront,
}

/// 块匹配器
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockMatcher {
    order: MatchOrder,
}

impl BlockMatcher {
    /// 创建块匹配器
    pub fn new(order: MatchOrder) -> Self {
        Self { order }
    }

    /// 为整帧构建运动场
    pub fn match_field(
        &self,
        prev: &Plane<f32>,
        curr: &Plane<f32>,
        grid: &BlockGrid,
        spectral: SpectralCandidates<'_>,
    ) -> ChazhenResult<MotionField> {
        if !prev.same_size(curr) {
            return Err(ChazhenError::dimension_mismatch(
                "块匹配参考帧",
                prev.dimensions(),
                curr.dimensions(),
            ));
        }
        if prev.dimensions() != (grid.frame_width(), grid.frame_height()) {
            return Err(ChazhenError::dimension_mismatch(
                "块网格",
                (grid.frame_width(), grid.frame_height()),
                prev.dimensions(),
            ));
        }
        if let SpectralCandidates::PerBlock(results) = spectral {
            if results.len() != grid.len() {
                return Err(ChazhenError::InvalidArgument(format!(
                    "相位相关结果数量 {} 与块数 {} 不符",
                    results.len(),
                    grid.len(),
                )));
            }
        }

        let mut field = MotionField::for_grid(grid);
        let mut stats = [0usize; 4];
        let evaluate = |field: &MotionField, row: usize, col: usize| {
            let median = NeighborPredictor::predict(field, row, col);
            let set = CandidateSet::assemble(spectral.for_block(grid.index(row, col)), median);
            best_candidate(prev, curr, grid.block_rect(row, col), &set)
        };

        match self.order {
            MatchOrder::Raster => {
                for (row, col) in grid.raster() {
                    let m = evaluate(&field, row, col);
                    trace!("块 ({row}, {col}): {:?} {} SAD={:.1}", m.kind, m.vector, m.cost);
                    stats[m.kind as usize] += 1;
                    field.finalize(row, col, m.vector)?;
                }
            }
            MatchOrder::Wavefront => {
                let (rows, cols) = (grid.rows(), grid.cols());
                let last_batch = (cols - 1) + 2 * (rows - 1);
                for k in 0..=last_batch {
                    let batch: Vec<(usize, usize)> = (0..rows)
                        .filter_map(|row| {
                            let col = k.checked_sub(2 * row)?;
                            (col < cols).then_some((row, col))
                        })
                        .collect();
                    let matches: Vec<(usize, usize, BlockMatch)> = batch
                        .par_iter()
                        .map(|&(row, col)| (row, col, evaluate(&field, row, col)))
                        .collect();
                    for (row, col, m) in matches {
                        trace!("块 ({row}, {col}): {:?} {} SAD={:.1}", m.kind, m.vector, m.cost);
                        stats[m.kind as usize] += 1;
                        field.finalize(row, col, m.vector)?;
                    }
                }
            }
        }

        if !field.is_complete() {
            return Err(ChazhenError::Internal(format!(
                "运动场未完整覆盖: {}/{}",
                field.finalized_count(),
                grid.len(),
            )));
        }
        debug!(
            "块匹配完成 ({:?}): 主峰 {}, 次峰 {}, 中值 {}, 零矢量 {}",
            self.order, stats[0], stats[1], stats[2], stats[3],
        );
        Ok(field)
    }
}
