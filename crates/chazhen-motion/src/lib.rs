//! # chazhen-motion
//!
//! chazhen 插帧框架的运动估计与运动补偿库.
//!
//! 处理流程:
//! 1. [`SpectralMotionEstimator`]: 相位相关, 每块 (或整帧) 给出两个亚像素位移候选
//! 2. [`NeighborPredictor`]: 由已确定的相邻块给出中值预测
//! 3. [`BlockMatcher`]: 以 SAD 在候选中择优, 逐块构建 [`MotionField`]
//! 4. [`BidirectionalCompositor`]: 沿运动轨迹混合前后两帧, 得到中间帧
//!
//! [`FrameInterpolator`] 把以上步骤串成一次完整的插帧请求.

pub mod compositor;
pub mod field;
pub mod interpolator;
pub mod matcher;
pub mod predictor;
pub mod spectral;
pub mod vector;

pub use compositor::BidirectionalCompositor;
pub use field::MotionField;
pub use interpolator::{FrameInterpolator, InterpolateConfig, Interpolation, SpectralScope};
pub use matcher::{BlockMatcher, CandidateKind, CandidateSet, MatchOrder, SpectralCandidates};
pub use predictor::NeighborPredictor;
pub use spectral::{PhaseCorrelation, SpectralMotionEstimator};
pub use vector::MotionVector;
