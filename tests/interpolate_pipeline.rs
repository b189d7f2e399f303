//! 端到端集成测试: 已知平移的帧对插帧.
//!
//! 测试流程: 生成噪声纹理 → 平移得到当前帧 → 相位相关 → 块匹配 → 双向补偿 → 验证

use chazhen::core::quality::{PEAK_8BIT, psnr};
use chazhen::core::{ChazhenError, Frame, PixelFormat, Plane};
use chazhen::motion::spectral::SpectralMotionEstimator;
use chazhen::motion::{
    FrameInterpolator, InterpolateConfig, MatchOrder, MotionVector, SpectralScope,
};

const SIZE: usize = 256;
const SHIFT: (i64, i64) = (3, -2);

/// 定义在整个整数平面上的确定性噪声纹理
fn texture(x: i64, y: i64) -> f32 {
    let mut h = (x as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ^ (y as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f);
    h ^= h >> 29;
    h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h ^= h >> 32;
    (h % 256) as f32
}

/// out(x, y) = texture(x - dx, y - dy), 即整体向 (dx, dy) 移动
fn shifted(width: usize, height: usize, dx: i64, dy: i64) -> Plane<f32> {
    Plane::from_fn(width, height, |x, y| texture(x as i64 - dx, y as i64 - dy))
}

fn shifted_pair() -> (Frame, Frame) {
    let _ = env_logger::builder().is_test(true).try_init();
    let prev = Frame::from_gray(shifted(SIZE, SIZE, 0, 0));
    let curr = Frame::from_gray(shifted(SIZE, SIZE, SHIFT.0, SHIFT.1));
    (prev, curr)
}

fn block_config(order: MatchOrder) -> InterpolateConfig {
    InterpolateConfig {
        match_order: order,
        ..Default::default()
    }
}

#[test]
fn test_整帧相位相关_已知平移() {
    let (prev, curr) = shifted_pair();
    let mut estimator = SpectralMotionEstimator::new();
    let result = estimator
        .estimate_global(&prev.planes()[0], &curr.planes()[0], true)
        .unwrap();
    assert!(
        (result.primary.dx - SHIFT.0 as f32).abs() < 0.5
            && (result.primary.dy - SHIFT.1 as f32).abs() < 0.5,
        "primary = {}",
        result.primary,
    );
    assert!(result.response > 0.0);
    assert_eq!(result.transform_size, (SIZE, SIZE));
}

#[test]
fn test_逐块运动场_内部块命中平移() {
    let (prev, curr) = shifted_pair();
    let interpolator = FrameInterpolator::new(block_config(MatchOrder::Wavefront)).unwrap();
    let result = interpolator.interpolate(&prev, &curr).unwrap();
    assert!(result.field.is_complete());
    assert_eq!((result.grid.rows(), result.grid.cols()), (16, 16));

    let mut total = 0;
    let mut hits = 0;
    for (row, col, mv) in result.field.iter() {
        if row == 0 || col == 0 || row == result.grid.rows() - 1 || col == result.grid.cols() - 1 {
            continue;
        }
        total += 1;
        if mv.rounded() == SHIFT {
            hits += 1;
        }
    }
    assert!(hits * 10 >= total * 9, "内部块命中 {hits}/{total}");
}

#[test]
fn test_中点帧_半程平移() {
    let (prev, curr) = shifted_pair();
    let interpolator = FrameInterpolator::new(InterpolateConfig::default()).unwrap();
    let result = interpolator.interpolate(&prev, &curr).unwrap();
    let out = &result.frame.planes()[0];

    // 半程位移 (1.5, -1): 输出介于 texture(x-1, y+1) 与 texture(x-2, y+1) 之间
    let margin = 2 * result.grid.block_size();
    for y in margin..SIZE - margin {
        for x in margin..SIZE - margin {
            let (row, col) = result.grid.block_of_pixel(x, y);
            if result.field.get(row, col).map(MotionVector::rounded) != Some(SHIFT) {
                continue;
            }
            let a = texture(x as i64 - 1, y as i64 + 1);
            let b = texture(x as i64 - 2, y as i64 + 1);
            let v = out.get(x, y);
            assert!(
                v >= a.min(b) - 1e-3 && v <= a.max(b) + 1e-3,
                "({x}, {y}): {v} 不在 [{a}, {b}] 之间"
            );
        }
    }

    // 与半程平移的参考相比, 明显优于直接取前一帧
    let reference = Plane::from_fn(SIZE, SIZE, |x, y| {
        0.5 * (texture(x as i64 - 1, y as i64 + 1) + texture(x as i64 - 2, y as i64 + 1))
    });
    let inner = |p: &Plane<f32>| p.crop(margin, margin, SIZE - 2 * margin, SIZE - 2 * margin).unwrap();
    let compensated = psnr(&inner(&reference), &inner(out), PEAK_8BIT).unwrap();
    let naive = psnr(&inner(&reference), &inner(&prev.planes()[0]), PEAK_8BIT).unwrap();
    assert!(compensated > naive + 3.0, "补偿 {compensated:.2} dB, 直接 {naive:.2} dB");
}

#[test]
fn test_光栅与波前结果一致() {
    let (prev, curr) = shifted_pair();
    let raster = FrameInterpolator::new(block_config(MatchOrder::Raster))
        .unwrap()
        .interpolate(&prev, &curr)
        .unwrap();
    let wavefront = FrameInterpolator::new(block_config(MatchOrder::Wavefront))
        .unwrap()
        .interpolate(&prev, &curr)
        .unwrap();
    assert_eq!(raster.field, wavefront.field);
    assert_eq!(raster.frame, wavefront.frame);
}

#[test]
fn test_整帧候选模式() {
    let (prev, curr) = shifted_pair();
    let config = InterpolateConfig {
        spectral_scope: SpectralScope::Global,
        ..Default::default()
    };
    let result = FrameInterpolator::new(config)
        .unwrap()
        .interpolate(&prev, &curr)
        .unwrap();
    let (rows, cols) = (result.grid.rows(), result.grid.cols());
    for row in 1..rows - 1 {
        for col in 1..cols - 1 {
            assert_eq!(result.field.get(row, col).map(MotionVector::rounded), Some(SHIFT));
        }
    }
}

#[test]
fn test_无窗_逐块与整帧命中平移() {
    let (prev, curr) = shifted_pair();
    for scope in [SpectralScope::PerBlock, SpectralScope::Global] {
        let config = InterpolateConfig {
            use_window: false,
            spectral_scope: scope,
            ..Default::default()
        };
        let result = FrameInterpolator::new(config)
            .unwrap()
            .interpolate(&prev, &curr)
            .unwrap();
        let (rows, cols) = (result.grid.rows(), result.grid.cols());
        let mut total = 0;
        let mut hits = 0;
        for row in 1..rows - 1 {
            for col in 1..cols - 1 {
                total += 1;
                if result.field.get(row, col).map(MotionVector::rounded) == Some(SHIFT) {
                    hits += 1;
                }
            }
        }
        assert!(hits * 10 >= total * 9, "{scope:?}: 内部块命中 {hits}/{total}");
    }
}

#[test]
fn test_无窗_零位移_输出等于输入() {
    let textured = Frame::from_gray(shifted(128, 96, 0, 0));
    let flat = Frame::from_gray(Plane::filled(128, 96, 80.0));
    for frame in [textured, flat] {
        for scope in [SpectralScope::PerBlock, SpectralScope::Global] {
            let config = InterpolateConfig {
                use_window: false,
                spectral_scope: scope,
                ..Default::default()
            };
            let result = FrameInterpolator::new(config)
                .unwrap()
                .interpolate(&frame, &frame)
                .unwrap();
            for (row, col, mv) in result.field.iter() {
                assert_eq!(mv.rounded(), (0, 0), "{scope:?} 块 ({row}, {col}): {mv}");
            }
            assert_eq!(result.frame, frame);
        }
    }
}

#[test]
fn test_零位移_输出等于输入() {
    let frame = Frame::from_gray(shifted(128, 96, 0, 0));
    let result = FrameInterpolator::new(InterpolateConfig::default())
        .unwrap()
        .interpolate(&frame, &frame)
        .unwrap();
    for (_, _, mv) in result.field.iter() {
        assert_eq!(mv.rounded(), (0, 0));
    }
    assert_eq!(result.frame, frame);
}

#[test]
fn test_确定性() {
    let (prev, curr) = shifted_pair();
    let interpolator = FrameInterpolator::new(InterpolateConfig::default()).unwrap();
    let first = interpolator.interpolate(&prev, &curr).unwrap();
    let second = interpolator.interpolate(&prev, &curr).unwrap();
    assert_eq!(first.field, second.field);
    assert_eq!(first.frame, second.frame);
}

#[test]
fn test_彩色帧_亮度驱动全部平面() {
    let make = |dx: i64, dy: i64| {
        let r = shifted(64, 64, dx, dy);
        let g = r.map(|v| 255.0 - v);
        let b = r.map(|v| v * 0.5);
        Frame::from_planes(PixelFormat::Rgb, vec![r, g, b]).unwrap()
    };
    let prev = make(0, 0);
    let curr = make(2, 0);
    let config = InterpolateConfig {
        block_size: 16,
        spectral_scope: SpectralScope::Global,
        ..Default::default()
    };
    let result = FrameInterpolator::new(config)
        .unwrap()
        .interpolate(&prev, &curr)
        .unwrap();
    assert_eq!(result.frame.pixel_format(), PixelFormat::Rgb);
    // mv (2, 0) 时中点帧内部恰为 texture(x - 1, y)
    let expected = make(1, 0);
    for plane in 0..3 {
        let out = result.frame.planes()[plane].crop(16, 16, 32, 32).unwrap();
        let want = expected.planes()[plane].crop(16, 16, 32, 32).unwrap();
        assert!(psnr(&want, &out, PEAK_8BIT).unwrap() > 40.0, "平面 {plane}");
    }
}

#[test]
fn test_不兼容输入() {
    let a = Frame::from_gray(shifted(32, 32, 0, 0));
    let b = Frame::from_gray(shifted(48, 32, 0, 0));
    let interpolator = FrameInterpolator::new(InterpolateConfig::default()).unwrap();
    assert!(matches!(
        interpolator.interpolate(&a, &b),
        Err(ChazhenError::DimensionMismatch { .. })
    ));
}
