//! Tensor types and operations
//!
//! This module provides the core `Tensor` type, an n-dimensional array whose
//! data lives either in host memory or in an accelerator texture, plus the
//! rank-specialized views (`Scalar`, `Vector`, `Matrix`) and the `NdArray`
//! enum that dispatches between them.

mod core;
mod id;
mod indexing;
mod ndarray;
mod random;
mod shape;
mod storage;
mod strides;
mod views;

pub use core::{Tensor, TensorData};
pub use id::TensorId;
pub use indexing::Indexing;
pub use ndarray::NdArray;
pub use shape::{Shape, size};
pub use storage::{Location, Storage};
pub use strides::Strides;
pub use views::{Matrix, Scalar, Vector};
