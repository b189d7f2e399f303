//! # chazhen (插帧)
//!
//! 纯 Rust 实现的运动补偿插帧库: 给定相邻两帧, 合成二者之间的中间帧.
//!
//! 算法由三部分组成:
//! - **相位相关**: 频域互功率谱给出每块的亚像素位移候选
//! - **块匹配**: 在相位相关候选、邻域中值与零矢量中以 SAD 择优
//! - **双向补偿**: 沿运动轨迹从前后两帧采样并按时间位置加权
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use chazhen::core::{Frame, Plane};
//! use chazhen::motion::{FrameInterpolator, InterpolateConfig};
//!
//! let prev = Frame::from_gray(Plane::filled(64, 64, 16.0));
//! let curr = Frame::from_gray(Plane::filled(64, 64, 48.0));
//! let interpolator = FrameInterpolator::new(InterpolateConfig::default()).unwrap();
//! let result = interpolator.interpolate(&prev, &curr).unwrap();
//! println!("耗时 {:?}, 平均矢量 {}", result.elapsed, result.field.mean());
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `chazhen-core` | 帧、平面、块网格、错误类型、质量指标 |
//! | `chazhen-scale` | 像素格式转换 (8 位 ↔ 浮点, RGB → 亮度) |
//! | `chazhen-motion` | 运动估计与双向运动补偿 |
//! | `chazhen-filter` | 滤镜框架 (帧率翻倍插帧滤镜) |

/// 核心类型与工具
pub use chazhen_core as core;

/// 像素格式转换
pub use chazhen_scale as scale;

/// 运动估计与运动补偿
pub use chazhen_motion as motion;

/// 滤镜框架
pub use chazhen_filter as filter;

/// 获取 chazhen 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
