//! 运动补偿插帧滤镜.
//!
//! 对标 FFmpeg 的 `minterpolate` 滤镜 (仅 `mi_mode=mci`, 帧率翻倍).
//! 输入 `f0, f1, f2, ...`, 输出 `f0, i(0,1), f1, i(1,2), f2, ...`.
//! 每对相邻帧是一次独立的插帧请求, 运动场不跨帧对传递.
//!
//! 输出时间基为输入的一半: 原始帧 PTS 乘 2, 中间帧 PTS 为前后两帧 PTS 之和.

use std::collections::VecDeque;

use chazhen_core::frame::NOPTS_VALUE;
use chazhen_core::{ChazhenError, ChazhenResult, Frame};
use chazhen_motion::{FrameInterpolator, InterpolateConfig};
use log::debug;

use crate::Filter;

/// 运动补偿插帧滤镜
pub struct MinterpolateFilter {
    interpolator: FrameInterpolator,
    /// 上一输入帧 (原始 PTS)
    previous: Option<Frame>,
    /// 输出帧缓冲
    output: VecDeque<Frame>,
    /// 已插帧数
    interpolated: u64,
    flushed: bool,
}

impl MinterpolateFilter {
    /// 创建插帧滤镜, 参数非法时返回错误
    pub fn new(config: InterpolateConfig) -> ChazhenResult<Self> {
        Ok(Self {
            interpolator: FrameInterpolator::new(config)?,
            previous: None,
            output: VecDeque::new(),
            interpolated: 0,
            flushed: false,
        })
    }

    /// 已插帧数
    pub fn interpolated_count(&self) -> u64 {
        self.interpolated
    }

    fn rescaled(frame: &Frame) -> Frame {
        let mut out = frame.clone();
        if out.pts != NOPTS_VALUE {
            out.pts = out.pts.saturating_mul(2);
        }
        out
    }
}

impl Filter for MinterpolateFilter {
    fn name(&self) -> &str {
        "minterpolate"
    }

    fn send_frame(&mut self, frame: &Frame) -> ChazhenResult<()> {
        if self.flushed {
            return Err(ChazhenError::InvalidArgument(
                "minterpolate: 刷新后不能再送入帧".into(),
            ));
        }
        if let Some(prev) = &self.previous {
            let result = self.interpolator.interpolate(prev, frame)?;
            let mut mid = result.frame;
            mid.pts = if prev.pts == NOPTS_VALUE || frame.pts == NOPTS_VALUE {
                NOPTS_VALUE
            } else {
                prev.pts.saturating_add(frame.pts)
            };
            self.interpolated += 1;
            debug!(
                "minterpolate: 第 {} 帧插值, PTS={}, 耗时 {:.2} ms",
                self.interpolated,
                mid.pts,
                result.elapsed.as_secs_f64() * 1000.0,
            );
            self.output.push_back(mid);
        }
        self.output.push_back(Self::rescaled(frame));
        self.previous = Some(frame.clone());
        Ok(())
    }

    fn receive_frame(&mut self) -> ChazhenResult<Frame> {
        match self.output.pop_front() {
            Some(frame) => Ok(frame),
            None if self.flushed => Err(ChazhenError::Eof),
            None => Err(ChazhenError::NeedMoreData),
        }
    }

    fn flush(&mut self) -> ChazhenResult<()> {
        self.flushed = true;
        self.previous = None;
        Ok(())
    }
}
