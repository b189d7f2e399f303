//! 像素格式转换模块.
//!
//! 支持的转换路径:
//! - Gray8 → 灰度帧, RGB24 → RGB 平面帧
//! - 灰度帧 / RGB 平面帧 → Gray8 / RGB24
//! - 任意帧 → 亮度平面
//!
//! 使用 BT.601 亮度系数:
//! ```text
//! Y = 0.299 * R + 0.587 * G + 0.114 * B
//! ```

use chazhen_core::{ChazhenError, ChazhenResult, Frame, PixelFormat, Plane};
use rayon::prelude::*;

// ============================================================
// BT.601 亮度系数
// ============================================================

const Y_R: f32 = 0.299;
const Y_G: f32 = 0.587;
const Y_B: f32 = 0.114;

/// 四舍五入并钳制到 0..=255
#[inline]
pub fn clamp_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn check_len(data: &[u8], expected: usize, what: &str) -> ChazhenResult<()> {
    if data.len() != expected {
        return Err(ChazhenError::InvalidData(format!(
            "{what} 数据长度错误: 期望 {expected}, 实际 {}",
            data.len(),
        )));
    }
    Ok(())
}

// ============================================================
// 8 位交错 → 平面帧
// ============================================================

/// Gray8 → 灰度帧
pub fn frame_from_gray8(width: usize, height: usize, data: &[u8]) -> ChazhenResult<Frame> {
    check_len(data, width * height, "Gray8")?;
    let plane = Plane::from_vec(width, height, data.iter().map(|&v| f32::from(v)).collect())?;
    Ok(Frame::from_gray(plane))
}

/// RGB24 → RGB 平面帧
pub fn frame_from_rgb8(width: usize, height: usize, data: &[u8]) -> ChazhenResult<Frame> {
    check_len(data, width * height * 3, "RGB24")?;
    let mut planes = Vec::with_capacity(3);
    for channel in 0..3 {
        let samples = data
            .chunks_exact(3)
            .map(|px| f32::from(px[channel]))
            .collect();
        planes.push(Plane::from_vec(width, height, samples)?);
    }
    Frame::from_planes(PixelFormat::Rgb, planes)
}

// ============================================================
// 平面帧 → 8 位交错
// ============================================================

/// 帧 → Gray8 (RGB 帧先转换为亮度)
pub fn frame_to_gray8(frame: &Frame) -> Vec<u8> {
    luma_plane(frame)
        .data()
        .iter()
        .map(|&v| clamp_to_u8(v))
        .collect()
}

/// 帧 → RGB24 (灰度帧扩展到三通道)
pub fn frame_to_rgb8(frame: &Frame) -> Vec<u8> {
    let planes = frame.planes();
    let pixels = frame.width() * frame.height();
    let mut out = vec![0u8; pixels * 3];
    match frame.pixel_format() {
        PixelFormat::Gray => {
            for (px, &v) in out.chunks_exact_mut(3).zip(planes[0].data()) {
                let val = clamp_to_u8(v);
                px.fill(val);
            }
        }
        PixelFormat::Rgb => {
            for (i, px) in out.chunks_exact_mut(3).enumerate() {
                px[0] = clamp_to_u8(planes[0].data()[i]);
                px[1] = clamp_to_u8(planes[1].data()[i]);
                px[2] = clamp_to_u8(planes[2].data()[i]);
            }
        }
    }
    out
}

// ============================================================
// 亮度提取
// ============================================================

/// 提取亮度平面 (运动估计的输入)
///
/// 灰度帧直接复制; RGB 帧按 BT.601 逐行并行转换.
pub fn luma_plane(frame: &Frame) -> Plane<f32> {
    let planes = frame.planes();
    match frame.pixel_format() {
        PixelFormat::Gray => planes[0].clone(),
        PixelFormat::Rgb => {
            let width = frame.width();
            let mut luma = Plane::new(width, frame.height());
            if width == 0 {
                return luma;
            }
            let (r, g, b) = (planes[0].data(), planes[1].data(), planes[2].data());
            luma.data_mut()
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(row, out)| {
                    let base = row * width;
                    for (col, y) in out.iter_mut().enumerate() {
                        let i = base + col;
                        *y = Y_R * r[i] + Y_G * g[i] + Y_B * b[i];
                    }
                });
            luma
        }
    }
}
