//! # chazhen-filter
//!
//! chazhen 插帧框架滤镜库, 以滤镜图 (FilterGraph) 的形式处理帧序列.
//!
//! 与逐帧变换不同, 插帧滤镜每送入一帧可能产出零帧、一帧或多帧,
//! 因此滤镜图在每一级都会取空该滤镜的输出队列.
//!
//! ## 支持的滤镜
//!
//! - **minterpolate**: 运动补偿插帧, 帧率翻倍
//!
//! ## 使用示例
//!
//! ```rust
//! use chazhen_filter::{FilterGraph, MinterpolateFilter};
//! use chazhen_motion::InterpolateConfig;
//!
//! let mut graph = FilterGraph::new();
//! graph.add_filter(Box::new(MinterpolateFilter::new(InterpolateConfig::default()).unwrap()));
//!
//! // 将帧送入滤镜链处理
//! // let output = graph.process_frame(&input_frame).unwrap();
//! ```

pub mod filters;

use chazhen_core::{ChazhenError, ChazhenResult, Frame};

/// 滤镜 trait
///
/// 滤镜接收输入帧, 处理后输出帧.
/// 输出队列为空时 `receive_frame` 返回 `NeedMoreData`, 刷新后返回 `Eof`.
pub trait Filter: Send {
    /// 获取滤镜名称
    fn name(&self) -> &str;

    /// 送入一帧数据
    fn send_frame(&mut self, frame: &Frame) -> ChazhenResult<()>;

    /// 取出一帧处理后的数据
    fn receive_frame(&mut self) -> ChazhenResult<Frame>;

    /// 刷新滤镜 (处理剩余缓存数据)
    fn flush(&mut self) -> ChazhenResult<()>;
}

/// 取空滤镜当前可输出的帧
fn drain(filter: &mut dyn Filter, out: &mut Vec<Frame>) -> ChazhenResult<()> {
    loop {
        match filter.receive_frame() {
            Ok(frame) => out.push(frame),
            Err(ChazhenError::NeedMoreData) | Err(ChazhenError::Eof) => return Ok(()),
            Err(e) => return Err(e),
        }
    }
}

/// 滤镜图
///
/// 线性链: 每个滤镜的全部输出依次作为下一个滤镜的输入.
pub struct FilterGraph {
    /// 滤镜链中的滤镜列表
    filters: Vec<Box<dyn Filter>>,
}

impl FilterGraph {
    /// 创建空的滤镜图
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// 添加滤镜到图中
    pub fn add_filter(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    /// 获取滤镜数量
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// 将帧送入滤镜链, 返回链末端产出的全部帧.
    ///
    /// 如果滤镜链为空, 则直接返回输入帧 (透传).
    pub fn process_frame(&mut self, frame: &Frame) -> ChazhenResult<Vec<Frame>> {
        let mut pending = vec![frame.clone()];
        for filter in &mut self.filters {
            let mut next = Vec::new();
            for frame in &pending {
                filter.send_frame(frame)?;
                drain(filter.as_mut(), &mut next)?;
            }
            pending = next;
        }
        Ok(pending)
    }

    /// 刷新所有滤镜, 获取剩余缓存帧.
    ///
    /// 上游刷新产出的帧会继续流过下游滤镜, 之后再刷新下游.
    pub fn flush_all(&mut self) -> ChazhenResult<Vec<Frame>> {
        let mut pending = Vec::new();
        for filter in &mut self.filters {
            let mut next = Vec::new();
            for frame in &pending {
                filter.send_frame(frame)?;
                drain(filter.as_mut(), &mut next)?;
            }
            filter.flush()?;
            drain(filter.as_mut(), &mut next)?;
            pending = next;
        }
        Ok(pending)
    }

    /// 获取滤镜名称列表 (调试用)
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl Default for FilterGraph {
    fn default() -> Self {
        Self::new()
    }
}

// 便捷重导出
pub use filters::minterpolate::MinterpolateFilter;

#[cfg(test)]
mod tests {
    use super::*;
    use chazhen_core::Plane;
    use chazhen_motion::InterpolateConfig;

    fn gray_frame(value: f32, pts: i64) -> Frame {
        Frame::from_gray(Plane::filled(16, 16, value)).with_pts(pts)
    }

    fn config() -> InterpolateConfig {
        InterpolateConfig {
            block_size: 8,
            ..Default::default()
        }
    }

    #[test]
    fn test_滤镜图_空链透传() {
        let mut graph = FilterGraph::new();
        let input = gray_frame(42.0, 3);
        let output = graph.process_frame(&input).unwrap();
        assert_eq!(output, vec![input]);
        assert!(graph.flush_all().unwrap().is_empty());
    }

    #[test]
    fn test_滤镜图_单个滤镜() {
        let mut graph = FilterGraph::new();
        graph.add_filter(Box::new(MinterpolateFilter::new(config()).unwrap()));
        assert_eq!(graph.process_frame(&gray_frame(0.0, 0)).unwrap().len(), 1);
        let out = graph.process_frame(&gray_frame(100.0, 1)).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].planes()[0].data().iter().all(|&v| (v - 50.0).abs() < 1e-4));
    }

    #[test]
    fn test_滤镜图_链式处理() {
        // 两级翻倍: 3 帧 → 5 帧 → 9 帧
        let mut graph = FilterGraph::new();
        graph.add_filter(Box::new(MinterpolateFilter::new(config()).unwrap()));
        graph.add_filter(Box::new(MinterpolateFilter::new(config()).unwrap()));
        let mut frames = Vec::new();
        for (i, value) in [0.0, 80.0, 160.0].into_iter().enumerate() {
            frames.extend(graph.process_frame(&gray_frame(value, i as i64)).unwrap());
        }
        frames.extend(graph.flush_all().unwrap());
        assert_eq!(frames.len(), 9);
        let pts: Vec<i64> = frames.iter().map(|f| f.pts).collect();
        assert_eq!(pts, (0..9).collect::<Vec<_>>());
        let levels: Vec<f32> = frames.iter().map(|f| f.planes()[0].get(5, 5)).collect();
        for (i, level) in levels.iter().enumerate() {
            assert!((level - 20.0 * i as f32).abs() < 1e-3, "帧 {i}: {level}");
        }
    }

    #[test]
    fn test_滤镜图_名称列表() {
        let mut graph = FilterGraph::new();
        graph.add_filter(Box::new(MinterpolateFilter::new(config()).unwrap()));
        assert_eq!(graph.filter_count(), 1);
        assert_eq!(graph.filter_names(), vec!["minterpolate"]);
    }

    #[test]
    fn test_滤镜图_错误传播() {
        let mut graph = FilterGraph::new();
        graph.add_filter(Box::new(MinterpolateFilter::new(config()).unwrap()));
        graph.process_frame(&gray_frame(0.0, 0)).unwrap();
        let other = Frame::from_gray(Plane::filled(8, 8, 0.0)).with_pts(1);
        assert!(matches!(
            graph.process_frame(&other),
            Err(ChazhenError::DimensionMismatch { .. })
        ));
    }
}
