//! 邻域中值预测 (NeighborPredictor).
//!
//! 按块在网格中的位置选取最近的三个邻居:
//!
//! | 位置 | 邻居 |
//! |------|------|
//! | 左上角 | 右, 下, 右下 |
//! | 左边缘 | 上, 右上, 右 |
//! | 上边缘 | 左, 左下, 下 |
//! | 内部 | 左上, 上, 左 |
//!
//! 只读取运动场中已确定的邻居 (越界或未确定的位置跳过), 因此在逐块构建
//! 运动场的过程中调用时, 永远不会读到当前块或光栅顺序之后的块.
//! x、y 分量分别取中值后组合; 没有可用邻居时返回零矢量.

use crate::field::MotionField;
use crate::vector::MotionVector;

/// 邻域候选位置 (行偏移, 列偏移)
type Offset = (isize, isize);

const CORNER: [Offset; 3] = [(0, 1), (1, 0), (1, 1)];
const LEFT_EDGE: [Offset; 3] = [(-1, 0), (-1, 1), (0, 1)];
const TOP_EDGE: [Offset; 3] = [(0, -1), (1, -1), (1, 0)];
const INTERIOR: [Offset; 3] = [(-1, -1), (-1, 0), (0, -1)];

/// 邻域中值预测器
#[derive(Debug, Clone, Copy, Default)]
pub struct NeighborPredictor;

impl NeighborPredictor {
    /// 按位置选择邻居偏移
    fn offsets(row: usize, col: usize) -> &'static [Offset; 3] {
        match (row, col) {
            (0, 0) => &CORNER,
            (_, 0) => &LEFT_EDGE,
            (0, _) => &TOP_EDGE,
            _ => &INTERIOR,
        }
    }

    /// 收集 (row, col) 的可用邻居矢量
    pub fn neighbors(field: &MotionField, row: usize, col: usize) -> Vec<MotionVector> {
        Self::offsets(row, col)
            .iter()
            .filter_map(|&(dr, dc)| {
                let r = row.checked_add_signed(dr)?;
                let c = col.checked_add_signed(dc)?;
                field.get(r, c)
            })
            .collect()
    }

    /// (row, col) 处的邻域中值矢量
    pub fn predict(field: &MotionField, row: usize, col: usize) -> MotionVector {
        let neighbors = Self::neighbors(field, row, col);
        if neighbors.is_empty() {
            return MotionVector::ZERO;
        }
        let mut xs: Vec<f32> = neighbors.iter().map(|mv| mv.dx).collect();
        let mut ys: Vec<f32> = neighbors.iter().map(|mv| mv.dy).collect();
        MotionVector::new(median(&mut xs), median(&mut ys))
    }
}

/// 一维中值: 对 `len / 2` 位置做第 n 元素选择, 不对两个中间值取平均
///
/// 调用方保证 `values` 非空.
fn median(values: &mut [f32]) -> f32 {
    let mid = values.len() / 2;
    let (_, value, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
    *value
}
