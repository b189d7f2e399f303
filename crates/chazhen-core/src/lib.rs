//! # chazhen-core
//!
//! chazhen 插帧框架核心库, 提供基础类型定义、错误处理和工具函数.
//!
//! 本 crate 为运动估计、运动补偿与滤镜提供底层基础设施:
//! - [`Plane`]: 单通道实数采样网格
//! - [`Frame`]: 由一个或多个平面组成的视频帧
//! - [`BlockGrid`]: 帧的块划分 (运动估计的基本单位)
//! - [`ChazhenError`]: 统一错误类型

pub mod block;
pub mod error;
pub mod frame;
pub mod pixel_format;
pub mod plane;
pub mod quality;

// 重导出常用类型
pub use block::{BlockGrid, BlockRect};
pub use error::{ChazhenError, ChazhenResult};
pub use frame::Frame;
pub use pixel_format::PixelFormat;
pub use plane::{Plane, Sample};
