//! 统一错误类型定义.
//!
//! 所有 chazhen crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// chazhen 框架统一错误类型
#[derive(Debug, Error)]
pub enum ChazhenError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 尺寸不匹配 (前置条件违规, 调用方不应以不同尺寸的输入调用)
    #[error("尺寸不匹配: {what}, 期望 {expected_width}x{expected_height}, 实际 {actual_width}x{actual_height}")]
    DimensionMismatch {
        /// 不匹配的对象
        what: &'static str,
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 数据不足, 需要更多输入
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,

    /// 无效数据 (缓冲区长度错误等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 内部错误 (不应发生)
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ChazhenError {
    /// 构造尺寸不匹配错误
    pub fn dimension_mismatch(
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            what,
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: actual.0,
            actual_height: actual.1,
        }
    }
}

/// chazhen 框架统一 Result 类型
pub type ChazhenResult<T> = Result<T, ChazhenError>;
