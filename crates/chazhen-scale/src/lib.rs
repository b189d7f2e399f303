//! # chazhen-scale
//!
//! chazhen 插帧框架像素格式转换库.
//!
//! 提供:
//! - 交错 8 位像素 (Gray8 / RGB24) ↔ 平面 f32 帧
//! - 亮度平面提取 (BT.601), 运动估计只在亮度上进行

pub mod convert;

pub use convert::{
    frame_from_gray8, frame_from_rgb8, frame_to_gray8, frame_to_rgb8, luma_plane,
};
