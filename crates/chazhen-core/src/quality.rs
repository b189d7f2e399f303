//! 客观质量指标.
//!
//! 用于将插值帧与真实中间帧比较 (MSE / PSNR).

use crate::error::{ChazhenError, ChazhenResult};
use crate::frame::Frame;
use crate::plane::{Plane, Sample};

/// 8 位来源的峰值
pub const PEAK_8BIT: f64 = 255.0;

/// 两个平面的均方误差
pub fn mse<T: Sample>(reference: &Plane<T>, distorted: &Plane<T>) -> ChazhenResult<f64> {
    if !reference.same_size(distorted) {
        return Err(ChazhenError::dimension_mismatch(
            "质量评估平面",
            reference.dimensions(),
            distorted.dimensions(),
        ));
    }
    if reference.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = reference
        .data()
        .iter()
        .zip(distorted.data())
        .map(|(&r, &d)| {
            let diff = r.to_f64() - d.to_f64();
            diff * diff
        })
        .sum();
    Ok(sum / reference.data().len() as f64)
}

/// MSE 转 PSNR (dB), 完全一致时返回正无穷
pub fn mse_to_psnr(mse: f64, peak: f64) -> f64 {
    if mse == 0.0 {
        f64::INFINITY
    } else {
        10.0 * ((peak * peak) / mse).log10()
    }
}

/// 两个平面的 PSNR (dB)
pub fn psnr<T: Sample>(reference: &Plane<T>, distorted: &Plane<T>, peak: f64) -> ChazhenResult<f64> {
    Ok(mse_to_psnr(mse(reference, distorted)?, peak))
}

/// 两帧的 PSNR (dB), 以全部平面的平均 MSE 计算
pub fn frame_psnr(reference: &Frame, distorted: &Frame, peak: f64) -> ChazhenResult<f64> {
    reference.ensure_compatible(distorted)?;
    let mut total = 0.0;
    for (r, d) in reference.planes().iter().zip(distorted.planes()) {
        total += mse(r, d)?;
    }
    let planes = reference.planes().len().max(1) as f64;
    Ok(mse_to_psnr(total / planes, peak))
}
