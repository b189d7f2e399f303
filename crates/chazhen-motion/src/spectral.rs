//! 相位相关运动估计 (SpectralMotionEstimator).
//!
//! 在频域计算两幅图像的归一化互功率谱, 逆变换得到相关曲面, 曲面峰值位置
//! 即为最佳对齐的整数位移; 再对峰值 5x5 邻域取加权质心得到亚像素精度.
//! 返回最强与次强两个候选位移.
//!
//! 每个阶段都是返回新缓冲区的纯函数, 便于单独测试:
//!
//! ```text
//! pad_to → apply_window → forward_transform → cross_power_spectrum
//!        → inverse_transform → fft_shift → max_location → weighted_centroid
//! ```

use std::sync::Arc;

use chazhen_core::{BlockGrid, ChazhenError, ChazhenResult, Plane, Sample};
use log::{debug, trace};
use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};

use crate::vector::MotionVector;

/// 亚像素质心窗口边长
pub const CENTROID_WINDOW: usize = 5;

/// 峰值高出曲面均值不足 `FLAT_TOLERANCE * max(|峰值|, 1)` 时视为平坦曲面
const FLAT_TOLERANCE: f64 = 1e-9;

/// 频谱 (二维复数网格, 行优先)
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    width: usize,
    height: usize,
    data: Vec<Complex64>,
}

impl Spectrum {
    /// 宽度
    pub fn width(&self) -> usize {
        self.width
    }

    /// 高度
    pub fn height(&self) -> usize {
        self.height
    }

    /// 行优先数据
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }
}

/// 相位相关结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseCorrelation {
    /// 最强峰对应的位移
    pub primary: MotionVector,
    /// 次强峰对应的位移
    pub secondary: MotionVector,
    /// 归一化响应 (最强峰能量 / 曲面面积), 范围约为 0..=1
    pub response: f64,
    /// 变换尺寸 (填充后的宽, 高)
    pub transform_size: (usize, usize),
}

impl PhaseCorrelation {
    /// 无相关 (退化输入) 的结果
    fn degenerate(transform_size: (usize, usize)) -> Self {
        Self {
            primary: MotionVector::ZERO,
            secondary: MotionVector::ZERO,
            response: 0.0,
            transform_size,
        }
    }
}

// ============================================================
// 各阶段纯函数
// ============================================================

/// 不小于 `n` 的最小 2^a * 3^b * 5^c, 变换在该尺寸上效率最高
pub fn optimal_dft_size(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    let mut candidate = n;
    loop {
        let mut m = candidate;
        for factor in [2, 3, 5] {
            while m % factor == 0 {
                m /= factor;
            }
        }
        if m == 1 {
            return candidate;
        }
        candidate += 1;
    }
}

/// 在右侧与底部补零到 `width x height`, 同时转换为 f64
pub fn pad_to<T: Sample>(plane: &Plane<T>, width: usize, height: usize) -> Plane<f64> {
    Plane::from_fn(width, height, |x, y| {
        if x < plane.width() && y < plane.height() {
            plane.get(x, y).to_f64()
        } else {
            0.0
        }
    })
}

/// 二维汉宁窗 (可分离升余弦窗)
///
/// 每个方向 `w(i) = 0.5 * (1 - cos(2πi / (n - 1)))`; 长度不足 3 的方向权重全为 1,
/// 避免极小边缘块被整体清零.
pub fn hanning_window(width: usize, height: usize) -> Plane<f64> {
    fn axis(n: usize) -> Vec<f64> {
        if n < 3 {
            return vec![1.0; n];
        }
        let denom = (n - 1) as f64;
        (0..n)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / denom).cos()))
            .collect()
    }
    let wx = axis(width);
    let wy = axis(height);
    Plane::from_fn(width, height, |x, y| wx[x] * wy[y])
}

/// 逐元素乘以窗函数
pub fn apply_window(plane: &Plane<f64>, window: &Plane<f64>) -> ChazhenResult<Plane<f64>> {
    if !plane.same_size(window) {
        return Err(ChazhenError::dimension_mismatch(
            "窗函数",
            plane.dimensions(),
            window.dimensions(),
        ));
    }
    let data = plane
        .data()
        .iter()
        .zip(window.data())
        .map(|(&v, &w)| v * w)
        .collect();
    Plane::from_vec(plane.width(), plane.height(), data)
}

/// 归一化互功率谱 `A·conj(B) / |A·conj(B)|`
///
/// 幅值不超过 `最大幅值 * f64::EPSILON` 的分量视为零贡献.
pub fn cross_power_spectrum(a: &Spectrum, b: &Spectrum) -> ChazhenResult<Spectrum> {
    if (a.width, a.height) != (b.width, b.height) {
        return Err(ChazhenError::dimension_mismatch(
            "频谱",
            (a.width, a.height),
            (b.width, b.height),
        ));
    }
    let products: Vec<Complex64> = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(&fa, &fb)| fa * fb.conj())
        .collect();
    let max_mag = products.iter().map(|p| p.norm()).fold(0.0, f64::max);
    let floor = max_mag * f64::EPSILON;
    let data = products
        .into_iter()
        .map(|p| {
            let mag = p.norm();
            if mag <= floor || mag == 0.0 {
                Complex64::new(0.0, 0.0)
            } else {
                p / mag
            }
        })
        .collect();
    Ok(Spectrum {
        width: a.width,
        height: a.height,
        data,
    })
}

/// 循环移位, 使零位移落在 `(width / 2, height / 2)` (整数除法)
pub fn fft_shift(surface: &Plane<f64>) -> Plane<f64> {
    let (w, h) = surface.dimensions();
    let mut out = Plane::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }
    for y in 0..h {
        let ty = (y + h / 2) % h;
        for x in 0..w {
            let tx = (x + w / 2) % w;
            out.set(tx, ty, surface.get(x, y));
        }
    }
    out
}

/// 最大值位置 (x, y); 多个相等最大值时取行优先的第一个
pub fn max_location(surface: &Plane<f64>) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_value = f64::NEG_INFINITY;
    for y in 0..surface.height() {
        for (x, &v) in surface.row(y).iter().enumerate() {
            if v > best_value {
                best_value = v;
                best = (x, y);
            }
        }
    }
    best
}

/// 曲面是否平坦: 峰值没有明显高于均值
///
/// 两个平坦块 (或仅亮度不同的平坦块) 的互功率谱只剩直流分量, 逆变换得到常数曲面,
/// 此时峰值位置没有意义.
pub fn is_flat(surface: &Plane<f64>, peak: (usize, usize)) -> bool {
    if surface.is_empty() {
        return true;
    }
    let mean = surface.data().iter().sum::<f64>() / surface.data().len() as f64;
    let peak_value = surface.get(peak.0, peak.1);
    peak_value - mean <= FLAT_TOLERANCE * peak_value.abs().max(1.0)
}

/// 峰值邻域加权质心
///
/// 窗口以 `peak` 为中心, 边长 `size`, 裁剪到曲面范围内; 权重为曲面值 (负值按 0 计).
/// 返回 (质心 x, 质心 y, 权重和). 权重和为 0 时质心即峰值本身.
pub fn weighted_centroid(
    surface: &Plane<f64>,
    peak: (usize, usize),
    size: usize,
) -> (f64, f64, f64) {
    let half = size / 2;
    let (w, h) = surface.dimensions();
    let x0 = peak.0.saturating_sub(half);
    let y0 = peak.1.saturating_sub(half);
    let x1 = (peak.0 + half).min(w.saturating_sub(1));
    let y1 = (peak.1 + half).min(h.saturating_sub(1));

    let mut sum = 0.0;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let weight = surface.get(x, y).max(0.0);
            sum += weight;
            sx += weight * x as f64;
            sy += weight * y as f64;
        }
    }
    if sum <= 0.0 {
        return (peak.0 as f64, peak.1 as f64, 0.0);
    }
    (sx / sum, sy / sum, sum)
}

// ============================================================
// 估计器
// ============================================================

/// 相位相关运动估计器
///
/// 内部缓存 FFT 计划, 同尺寸的重复调用 (逐块估计) 复用计划.
pub struct SpectralMotionEstimator {
    planner: FftPlanner<f64>,
}

impl SpectralMotionEstimator {
    /// 创建估计器
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    fn plan(&mut self, len: usize, direction: FftDirection) -> Arc<dyn Fft<f64>> {
        self.planner.plan_fft(len, direction)
    }

    /// 先行后列的二维 FFT, 不做缩放
    fn transform_2d(
        &mut self,
        data: &mut [Complex64],
        width: usize,
        height: usize,
        direction: FftDirection,
    ) {
        if width == 0 || height == 0 {
            return;
        }
        let row_fft = self.plan(width, direction);
        for row in data.chunks_exact_mut(width) {
            row_fft.process(row);
        }

        let col_fft = self.plan(height, direction);
        let mut column = vec![Complex64::new(0.0, 0.0); height];
        for x in 0..width {
            for (y, c) in column.iter_mut().enumerate() {
                *c = data[y * width + x];
            }
            col_fft.process(&mut column);
            for (y, c) in column.iter().enumerate() {
                data[y * width + x] = *c;
            }
        }
    }

    /// 正向二维变换
    pub fn forward_transform(&mut self, plane: &Plane<f64>) -> Spectrum {
        let (width, height) = plane.dimensions();
        let mut data: Vec<Complex64> = plane
            .data()
            .iter()
            .map(|&v| Complex64::new(v, 0.0))
            .collect();
        self.transform_2d(&mut data, width, height, FftDirection::Forward);
        Spectrum {
            width,
            height,
            data,
        }
    }

    /// 逆向二维变换 (不缩放), 取实部
    pub fn inverse_transform(&mut self, spectrum: &Spectrum) -> Plane<f64> {
        let mut data = spectrum.data.clone();
        self.transform_2d(&mut data, spectrum.width, spectrum.height, FftDirection::Inverse);
        Plane::from_fn(spectrum.width, spectrum.height, |x, y| {
            data[y * spectrum.width + x].re
        })
    }

    /// 相位相关: 返回 `current` 相对 `reference` 的两个候选位移
    ///
    /// 前置条件: 两个输入 (及窗函数) 尺寸相同且非空, 否则立即返回错误.
    pub fn phase_correlate<T: Sample>(
        &mut self,
        reference: &Plane<T>,
        current: &Plane<T>,
        window: Option<&Plane<T>>,
    ) -> ChazhenResult<PhaseCorrelation> {
        if !reference.same_size(current) {
            return Err(ChazhenError::dimension_mismatch(
                "相位相关输入",
                reference.dimensions(),
                current.dimensions(),
            ));
        }
        if let Some(window) = window {
            if !reference.same_size(window) {
                return Err(ChazhenError::dimension_mismatch(
                    "相位相关窗函数",
                    reference.dimensions(),
                    window.dimensions(),
                ));
            }
        }
        if reference.is_empty() {
            return Err(ChazhenError::InvalidArgument("相位相关输入为空".into()));
        }

        let m = optimal_dft_size(reference.height());
        let n = optimal_dft_size(reference.width());

        let mut padded1 = pad_to(reference, n, m);
        let mut padded2 = pad_to(current, n, m);
        if let Some(window) = window {
            let padded_window = pad_to(window, n, m);
            padded1 = apply_window(&padded1, &padded_window)?;
            padded2 = apply_window(&padded2, &padded_window)?;
        }

        let fft1 = self.forward_transform(&padded1);
        let fft2 = self.forward_transform(&padded2);
        let cross = cross_power_spectrum(&fft1, &fft2)?;
        let mut surface = fft_shift(&self.inverse_transform(&cross));

        let peak1 = max_location(&surface);
        if is_flat(&surface, peak1) {
            trace!("相位相关曲面平坦, 按零位移处理 ({n}x{m})");
            return Ok(PhaseCorrelation::degenerate((n, m)));
        }
        let (t1x, t1y, energy) = weighted_centroid(&surface, peak1, CENTROID_WINDOW);
        if energy <= 0.0 {
            trace!("相位相关曲面无正峰值, 按零位移处理 ({n}x{m})");
            return Ok(PhaseCorrelation::degenerate((n, m)));
        }

        surface.set(peak1.0, peak1.1, 0.0);
        let peak2 = max_location(&surface);
        let (t2x, t2y, _) = weighted_centroid(&surface, peak2, CENTROID_WINDOW);

        let cx = (n / 2) as f64;
        let cy = (m / 2) as f64;
        let result = PhaseCorrelation {
            primary: MotionVector::new((cx - t1x) as f32, (cy - t1y) as f32),
            secondary: MotionVector::new((cx - t2x) as f32, (cy - t2y) as f32),
            response: energy / (m * n) as f64,
            transform_size: (n, m),
        };
        trace!(
            "相位相关: primary={}, secondary={}, response={:.4}",
            result.primary, result.secondary, result.response,
        );
        Ok(result)
    }

    /// 整帧相位相关
    pub fn estimate_global(
        &mut self,
        prev: &Plane<f32>,
        curr: &Plane<f32>,
        use_window: bool,
    ) -> ChazhenResult<PhaseCorrelation> {
        let window = use_window.then(|| hanning_window(prev.width(), prev.height()));
        let prev = prev.map(f64::from);
        let curr = curr.map(f64::from);
        self.phase_correlate(&prev, &curr, window.as_ref())
    }
}

impl Default for SpectralMotionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// 逐块相位相关, 结果按光栅顺序排列
///
/// 前一帧的块与当前帧同位置的块做相关; 块之间相互独立, 使用 rayon 并行计算,
/// 每个工作线程持有自己的估计器.
pub fn estimate_blocks(
    prev: &Plane<f32>,
    curr: &Plane<f32>,
    grid: &BlockGrid,
    use_window: bool,
) -> ChazhenResult<Vec<PhaseCorrelation>> {
    if !prev.same_size(curr) {
        return Err(ChazhenError::dimension_mismatch(
            "逐块估计参考帧",
            prev.dimensions(),
            curr.dimensions(),
        ));
    }
    if prev.dimensions() != (grid.frame_width(), grid.frame_height()) {
        return Err(ChazhenError::dimension_mismatch(
            "块网格",
            (grid.frame_width(), grid.frame_height()),
            prev.dimensions(),
        ));
    }

    let positions: Vec<(usize, usize)> = grid.raster().collect();
    let results = positions
        .par_iter()
        .map_init(SpectralMotionEstimator::new, |estimator, &(row, col)| {
            let rect = grid.block_rect(row, col);
            let a = prev.crop(rect.x, rect.y, rect.width, rect.height)?.map(f64::from);
            let b = curr.crop(rect.x, rect.y, rect.width, rect.height)?.map(f64::from);
            let window = use_window.then(|| hanning_window(rect.width, rect.height));
            estimator.phase_correlate(&a, &b, window.as_ref())
        })
        .collect::<ChazhenResult<Vec<_>>>()?;

    debug!(
        "逐块相位相关完成: {}x{} 块, 块大小 {}",
        grid.rows(),
        grid.cols(),
        grid.block_size(),
    );
    Ok(results)
}
