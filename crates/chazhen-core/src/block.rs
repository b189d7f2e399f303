//! 块划分 (BlockGrid).
//!
//! 帧按 `block_size x block_size` 无重叠平铺, 网格尺寸为
//! `ceil(height / block_size) x ceil(width / block_size)`.
//! 右侧与底部的不完整块被钳制到帧范围内, 不会被丢弃.

use crate::error::{ChazhenError, ChazhenResult};

/// 块在帧中的像素矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRect {
    /// 左上角 X
    pub x: usize,
    /// 左上角 Y
    pub y: usize,
    /// 宽度 (边缘块可能小于块大小)
    pub width: usize,
    /// 高度 (边缘块可能小于块大小)
    pub height: usize,
}

/// 帧的块网格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockGrid {
    frame_width: usize,
    frame_height: usize,
    block_size: usize,
    rows: usize,
    cols: usize,
}

impl BlockGrid {
    /// 创建块网格
    pub fn new(frame_width: usize, frame_height: usize, block_size: usize) -> ChazhenResult<Self> {
        if block_size == 0 {
            return Err(ChazhenError::InvalidArgument("块大小不能为 0".into()));
        }
        if frame_width == 0 || frame_height == 0 {
            return Err(ChazhenError::InvalidArgument(format!(
                "帧尺寸无效: {frame_width}x{frame_height}"
            )));
        }
        Ok(Self {
            frame_width,
            frame_height,
            block_size,
            rows: frame_height.div_ceil(block_size),
            cols: frame_width.div_ceil(block_size),
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

    /// 块总数
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// 网格是否为空 (构造时已保证非空)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 块大小
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// 帧宽度
    pub fn frame_width(&self) -> usize {
        self.frame_width
    }

    /// 帧高度
    pub fn frame_height(&self) -> usize {
        self.frame_height
    }

    /// (row, col) 处块的矩形, 已钳制到帧范围
    pub fn block_rect(&self, row: usize, col: usize) -> BlockRect {
        let x = col * self.block_size;
        let y = row * self.block_size;
        BlockRect {
            x,
            y,
            width: self.block_size.min(self.frame_width - x),
            height: self.block_size.min(self.frame_height - y),
        }
    }

    /// 包含像素 (x, y) 的块坐标 (row, col)
    pub fn block_of_pixel(&self, x: usize, y: usize) -> (usize, usize) {
        (y / self.block_size, x / self.block_size)
    }

    /// 行优先索引
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// 按光栅顺序 (行优先) 遍历所有块坐标
    pub fn raster(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| (row, col)))
    }
}
