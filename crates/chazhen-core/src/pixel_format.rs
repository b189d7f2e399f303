//! 像素格式定义.
//!
//! 帧在内存中以平面 (planar) 方式存储, 每个平面是一个 f32 采样网格.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 像素格式
///
/// 决定帧的平面数量与含义. 采样值保持源数据的数值范围 (8 位来源为 0..=255).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 灰度, 单平面
    #[default]
    Gray,
    /// RGB 平面格式, 三个平面依次为 R, G, B
    Rgb,
}

impl PixelFormat {
    /// 平面数量
    pub const fn plane_count(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }

    /// 是否为单通道格式
    pub const fn is_single_channel(&self) -> bool {
        matches!(self, Self::Gray)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gray => "gray",
            Self::Rgb => "rgb",
        };
        write!(f, "{name}")
    }
}
