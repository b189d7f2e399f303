//! 耗时报告.
//!
//! 每次插帧向报告文件追加一行 `Interpolated frame in :<ms> milliseconds`.
//! 报告文件在处理开始前打开, 打不开视为配置错误.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

/// 报告行
pub fn report_line(elapsed: Duration) -> String {
    format!("Interpolated frame in :{} milliseconds", elapsed.as_millis())
}

/// 追加写入的报告文件
pub struct Report {
    writer: BufWriter<File>,
}

impl Report {
    /// 以追加方式打开 (不存在则创建)
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("无法打开报告文件 '{}'", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// 记录一次插帧耗时
    pub fn record(&mut self, elapsed: Duration) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", report_line(elapsed))?;
        self.writer.flush()?;
        Ok(())
    }
}
