//! 内置滤镜实现模块.

pub mod minterpolate;
