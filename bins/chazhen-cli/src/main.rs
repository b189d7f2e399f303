//! chazhen-cli - 运动补偿插帧命令行工具
//!
//! 从图像序列目录读取两帧, 生成二者之间的中间帧, 并把耗时追加到报告文件.
//! 默认读取第 0 帧与第 2 帧, 第 1 帧 (若存在) 作为真实中间帧计算 PSNR.

mod logging;
mod report;
mod source;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{error, info, warn};

use chazhen_core::quality::{PEAK_8BIT, frame_psnr};
use chazhen_motion::{FrameInterpolator, InterpolateConfig, MatchOrder, SpectralScope};

use report::Report;
use source::{FrameSource, save_frame};

/// 相位相关作用范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    /// 每块独立相关
    PerBlock,
    /// 整帧相关一次
    Global,
}

impl From<ScopeArg> for SpectralScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::PerBlock => SpectralScope::PerBlock,
            ScopeArg::Global => SpectralScope::Global,
        }
    }
}

/// 块匹配遍历顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OrderArg {
    /// 光栅顺序, 单线程
    Raster,
    /// 波前批次并行
    Wavefront,
}

impl From<OrderArg> for MatchOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Raster => MatchOrder::Raster,
            OrderArg::Wavefront => MatchOrder::Wavefront,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "chazhen-cli", version, about = "纯 Rust 运动补偿插帧工具")]
struct Cli {
    /// 帧目录 (jpg/png/bmp/pgm/ppm 图像序列, 按文件名排序)
    #[arg(short, long, default_value = "video")]
    input: PathBuf,

    /// 前一帧序号
    #[arg(long, default_value_t = 0)]
    first: usize,

    /// 后一帧序号
    #[arg(long, default_value_t = 2)]
    second: usize,

    /// 中间帧输出路径 (格式由扩展名决定)
    #[arg(short, long, default_value = "interpolated.png")]
    output: PathBuf,

    /// 耗时报告文件 (追加写入)
    #[arg(long, default_value = "report.txt")]
    report: PathBuf,

    /// JSON 参数文件, 命令行参数优先
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 块大小 (像素)
    #[arg(short, long)]
    block_size: Option<usize>,

    /// 中间帧时间位置 (0..=1)
    #[arg(short = 't', long)]
    fraction: Option<f32>,

    /// 相位相关作用范围
    #[arg(long, value_enum)]
    scope: Option<ScopeArg>,

    /// 块匹配遍历顺序
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// 相位相关前不加窗
    #[arg(long)]
    no_window: bool,

    /// 按灰度读取并输出
    #[arg(long)]
    gray: bool,

    /// 将运动场以 JSON 写入该文件
    #[arg(long)]
    dump_field: Option<PathBuf>,

    /// 日志级别 (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// 读取参数文件并叠加命令行参数
fn build_config(cli: &Cli) -> anyhow::Result<InterpolateConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("无法读取参数文件 '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("参数文件 '{}' 格式错误", path.display()))?
        }
        None => InterpolateConfig::default(),
    };
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }
    if let Some(fraction) = cli.fraction {
        config.temporal_fraction = fraction;
    }
    if let Some(scope) = cli.scope {
        config.spectral_scope = scope.into();
    }
    if let Some(order) = cli.order {
        config.match_order = order.into();
    }
    if cli.no_window {
        config.use_window = false;
    }
    config.validate()?;
    Ok(config)
}

/// 真实中间帧序号: 仅当两帧间隔 2 且取中点时存在
fn ground_truth_index(cli: &Cli, config: &InterpolateConfig) -> Option<usize> {
    (cli.second == cli.first + 2 && config.temporal_fraction == 0.5).then_some(cli.first + 1)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = build_config(cli)?;
    let mut report = Report::open(&cli.report)?;
    let source = FrameSource::open(&cli.input, cli.gray)?;

    let prev = source.load(cli.first)?;
    let curr = source.load(cli.second)?;
    info!(
        "输入: '{}' 第 {} 帧与第 {} 帧, {}x{} {}",
        cli.input.display(),
        cli.first,
        cli.second,
        prev.width(),
        prev.height(),
        prev.pixel_format(),
    );

    let interpolator = FrameInterpolator::new(config.clone())?;
    let result = interpolator.interpolate(&prev, &curr)?;
    report.record(result.elapsed)?;
    info!(
        "插帧完成: {}x{} 块 (块大小 {}), 平均矢量 {}, 耗时 {} ms",
        result.grid.rows(),
        result.grid.cols(),
        config.block_size,
        result.field.mean(),
        result.elapsed.as_millis(),
    );

    save_frame(&result.frame, &cli.output)?;
    info!("输出: '{}'", cli.output.display());

    if let Some(path) = &cli.dump_field {
        let dump = serde_json::json!({
            "block_size": config.block_size,
            "rows": result.grid.rows(),
            "cols": result.grid.cols(),
            "field": result.field,
        });
        let text = serde_json::to_string_pretty(&dump)?;
        std::fs::write(path, text)
            .with_context(|| format!("无法写入运动场文件 '{}'", path.display()))?;
        info!("运动场: '{}'", path.display());
    }

    match ground_truth_index(cli, &config) {
        Some(index) if index < source.len() => {
            let truth = source.load(index)?;
            let score = frame_psnr(&truth, &result.frame, PEAK_8BIT)?;
            info!("与第 {index} 帧比较 PSNR: {score:.2} dB");
        }
        Some(index) => warn!("第 {index} 帧不存在, 跳过 PSNR"),
        None => {}
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init("chazhen-cli", cli.verbose) {
        eprintln!("错误: {e:#}");
        process::exit(1);
    }

    if let Err(e) = run(&cli) {
        error!("{e:#}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("chazhen-cli").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_默认参数() {
        let cli = parse(&[]);
        assert_eq!((cli.first, cli.second), (0, 2));
        let config = build_config(&cli).unwrap();
        assert_eq!(config, InterpolateConfig::default());
        assert_eq!(ground_truth_index(&cli, &config), Some(1));
    }

    #[test]
    fn test_命令行覆盖() {
        let cli = parse(&[
            "-b", "8", "-t", "0.25", "--scope", "global", "--order", "raster", "--no-window",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.block_size, 8);
        assert_eq!(config.temporal_fraction, 0.25);
        assert_eq!(config.spectral_scope, SpectralScope::Global);
        assert_eq!(config.match_order, MatchOrder::Raster);
        assert!(!config.use_window);
        assert_eq!(ground_truth_index(&cli, &config), None);
    }

    #[test]
    fn test_参数文件() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"block_size": 32, "match_order": "raster"}"#).unwrap();
        let path_arg = path.to_string_lossy().into_owned();

        let cli = parse(&["--config", &path_arg]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.block_size, 32);
        assert_eq!(config.match_order, MatchOrder::Raster);

        let cli = parse(&["--config", &path_arg, "-b", "4"]);
        assert_eq!(build_config(&cli).unwrap().block_size, 4);
    }

    #[test]
    fn test_非法参数() {
        assert!(build_config(&parse(&["-b", "0"])).is_err());
        assert!(build_config(&parse(&["-t", "1.5"])).is_err());
        let cli = parse(&["--config", "/nonexistent/chazhen.json"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_端到端_图像目录() {
        let dir = tempfile::tempdir().unwrap();
        for (i, value) in [40u8, 80, 120].into_iter().enumerate() {
            image::GrayImage::from_pixel(24, 16, image::Luma([value]))
                .save(dir.path().join(format!("{i:03}.png")))
                .unwrap();
        }
        let output = dir.path().join("mid.png");
        let report_path = dir.path().join("report.txt");
        let field_path = dir.path().join("field.json");
        let input = dir.path().to_string_lossy().into_owned();
        let output_arg = output.to_string_lossy().into_owned();
        let report_arg = report_path.to_string_lossy().into_owned();
        let field_arg = field_path.to_string_lossy().into_owned();
        let cli = parse(&[
            "-i", &input, "-o", &output_arg, "--report", &report_arg, "--dump-field",
            &field_arg, "--gray", "-b", "8",
        ]);
        run(&cli).unwrap();

        let mid = image::open(&output).unwrap().to_luma8();
        assert!(mid.pixels().all(|p| p.0[0] == 80));
        let report = std::fs::read_to_string(&report_path).unwrap();
        assert!(report.starts_with("Interpolated frame in :"));
        let dump: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&field_path).unwrap()).unwrap();
        assert_eq!(dump["rows"], 2);
        assert_eq!(dump["cols"], 3);
    }
}
