//! 帧来源: 图像序列目录.
//!
//! 目录中的图像文件按文件名排序后视为连续帧, 按序号读取.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chazhen_core::Frame;
use chazhen_scale::{frame_from_gray8, frame_from_rgb8, frame_to_gray8, frame_to_rgb8};
use image::{GrayImage, RgbImage};
use log::debug;

/// 支持的图像扩展名 (不区分大小写)
pub const EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "pgm", "ppm"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// 图像序列帧来源
#[derive(Debug)]
pub struct FrameSource {
    files: Vec<PathBuf>,
    gray: bool,
}

impl FrameSource {
    /// 扫描目录; `gray` 为真时按灰度读取
    pub fn open(dir: &Path, gray: bool) -> anyhow::Result<Self> {
        let entries =
            std::fs::read_dir(dir).with_context(|| format!("无法读取帧目录 '{}'", dir.display()))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                files.push(path);
            }
        }
        if files.is_empty() {
            bail!("帧目录 '{}' 中没有图像文件", dir.display());
        }
        files.sort();
        debug!("帧目录 '{}': {} 帧", dir.display(), files.len());
        Ok(Self { files, gray })
    }

    /// 帧数
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// 第 `index` 帧的文件路径
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.files.get(index).map(PathBuf::as_path)
    }

    /// 读取第 `index` 帧, PTS 设为序号
    pub fn load(&self, index: usize) -> anyhow::Result<Frame> {
        let Some(path) = self.path(index) else {
            bail!("帧序号 {index} 超出范围 (共 {} 帧)", self.len());
        };
        let image = image::open(path).with_context(|| format!("无法读取帧 '{}'", path.display()))?;
        let (width, height) = (image.width() as usize, image.height() as usize);
        let frame = if self.gray {
            frame_from_gray8(width, height, image.to_luma8().as_raw())?
        } else {
            frame_from_rgb8(width, height, image.to_rgb8().as_raw())?
        };
        debug!("读取帧 {index}: '{}' {width}x{height}", path.display());
        Ok(frame.with_pts(index as i64))
    }
}

/// 保存帧, 格式由扩展名决定
pub fn save_frame(frame: &Frame, path: &Path) -> anyhow::Result<()> {
    let (width, height) = (frame.width() as u32, frame.height() as u32);
    let saved = if frame.pixel_format().is_single_channel() {
        GrayImage::from_raw(width, height, frame_to_gray8(frame))
            .context("灰度图像缓冲尺寸不符")?
            .save(path)
    } else {
        RgbImage::from_raw(width, height, frame_to_rgb8(frame))
            .context("RGB 图像缓冲尺寸不符")?
            .save(path)
    };
    saved.with_context(|| format!("无法写入 '{}'", path.display()))
}
