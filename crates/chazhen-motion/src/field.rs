//! 运动场 (MotionField).
//!
//! 每个块一个运动矢量, 形状与块网格一致. 运动场在光栅遍历前整体预分配,
//! 每个单元只能写入一次; 未写入的单元读出为 `None`, 邻域预测据此跳过
//! 尚未确定的块.

use chazhen_core::{BlockGrid, ChazhenError, ChazhenResult};
use serde::{Deserialize, Serialize};

use crate::vector::MotionVector;

/// 块运动场
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMotionField")]
pub struct MotionField {
    rows: usize,
    cols: usize,
    cells: Vec<Option<MotionVector>>,
}

/// 反序列化的中间形式, 转换时校验单元数与形状一致
#[derive(Deserialize)]
struct RawMotionField {
    rows: usize,
    cols: usize,
    cells: Vec<Option<MotionVector>>,
}

impl TryFrom<RawMotionField> for MotionField {
    type Error = ChazhenError;

    fn try_from(raw: RawMotionField) -> ChazhenResult<Self> {
        let expected = raw.rows.checked_mul(raw.cols);
        if expected != Some(raw.cells.len()) {
            return Err(ChazhenError::InvalidData(format!(
                "运动场单元数 {} 与形状 {}x{} 不符",
                raw.cells.len(),
                raw.rows,
                raw.cols,
            )));
        }
        Ok(Self {
            rows: raw.rows,
            cols: raw.cols,
            cells: raw.cells,
        })
    }
}

impl MotionField {
    /// 创建 `rows x cols` 的空运动场
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// 按块网格创建空运动场
    pub fn for_grid(grid: &BlockGrid) -> Self {
        Self::new(grid.rows(), grid.cols())
    }

    /// 由完整矢量列表 (行优先) 创建运动场
    pub fn from_vectors(rows: usize, cols: usize, vectors: Vec<MotionVector>) -> ChazhenResult<Self> {
        if vectors.len() != rows * cols {
            return Err(ChazhenError::InvalidData(format!(
                "运动矢量数量 {} 与运动场 {}x{} 不符",
                vectors.len(),
                rows,
                cols,
            )));
        }
        Ok(Self {
            rows,
            cols,
            cells: vectors.into_iter().map(Some).collect(),
        })
    }

    /// 块行数
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 块列数
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// 是否与块网格形状一致
    pub fn matches_grid(&self, grid: &BlockGrid) -> bool {
        self.rows == grid.rows() && self.cols == grid.cols()
    }

    /// 读取已确定的矢量; 越界或未确定返回 `None`
    pub fn get(&self, row: usize, col: usize) -> Option<MotionVector> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row * self.cols + col]
    }

    /// 读取矢量, 未确定时返回零矢量
    pub fn vector_or_zero(&self, row: usize, col: usize) -> MotionVector {
        self.get(row, col).unwrap_or(MotionVector::ZERO)
    }

    /// 写入单元 (每个单元只能写入一次)
    pub fn finalize(&mut self, row: usize, col: usize, mv: MotionVector) -> ChazhenResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(ChazhenError::InvalidArgument(format!(
                "块坐标 ({row}, {col}) 超出运动场 {}x{}",
                self.rows, self.cols,
            )));
        }
        let cell = &mut self.cells[row * self.cols + col];
        if cell.is_some() {
            return Err(ChazhenError::Internal(format!(
                "运动场单元 ({row}, {col}) 被重复写入"
            )));
        }
        *cell = Some(mv);
        Ok(())
    }

    /// 已确定的单元数
    pub fn finalized_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// 是否所有单元都已确定
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// 按光栅顺序遍历已确定的单元 (row, col, mv)
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, MotionVector)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|mv| (i / self.cols.max(1), i % self.cols.max(1), mv))
        })
    }

    /// 已确定矢量的平均值, 用于日志
    pub fn mean(&self) -> MotionVector {
        let mut sum = MotionVector::ZERO;
        let mut count = 0usize;
        for (_, _, mv) in self.iter() {
            sum = sum + mv;
            count += 1;
        }
        if count == 0 {
            return MotionVector::ZERO;
        }
        sum.scale(1.0 / count as f32)
    }
}
