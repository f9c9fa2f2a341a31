//! A rust library for serving cutouts of multidimensional scientific arrays as self-describing wire messages.
//!
//! A cutout is a bounded rectangular sub-region of a larger array (e.g. an imaging volume) held in a dataset repository.
//! The core of the crate is the array wire codec, a bit-exact conversion between an in-memory typed array with a column-major axis convention and a flat, DType tagged [`WireArray`](wire::WireArray) message.
//!
//! ## Getting Started
//! - [`cutout::CutoutService`] lists, describes, and serves cutouts of the datasets in a [`repository`].
//! - [`codec::encode_array`] and [`codec::decode_array`] convert between [`array::TypedArray`] and [`wire::WireArray`].
//! - [`codec::encode_ndarray`] and [`codec::decode_ndarray`] are statically typed equivalents operating on [`ndarray`] arrays.
//! - [`dtype_registry`] documents how each logical element type is carried on the wire.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use dvidmsg::{
//!     codec::decode_ndarray,
//!     cutout::CutoutService,
//!     repository::MemoryRepository,
//!     wire::Bounds,
//! };
//!
//! let repository = Arc::new(MemoryRepository::new());
//! let array = ndarray::array![[1u16, 2, 3], [4, 5, 6]].into_dyn();
//! repository.insert("grid", array.into(), Some(vec!['y', 'x']))?;
//!
//! let service = CutoutService::new(repository);
//! assert_eq!(service.list_datasets()?, vec!["grid"]);
//! let description = service.get_description("grid")?;
//! assert_eq!(description.bounds().stop(), &[2, 3]);
//!
//! let bounds = Bounds::new(vec![0, 1], vec![2, 3])?;
//! let message = service.get_cutout_block("grid", &bounds)?;
//! let json = serde_json::to_string(&message)?;
//!
//! let cutout = decode_ndarray::<u16>(&serde_json::from_str(&json)?)?;
//! assert_eq!(cutout.array(), &ndarray::array![[2u16, 3], [5, 6]].into_dyn());
//! assert_eq!(cutout.origin(), &[0, 1]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Licence
//! `dvidmsg` is licensed under either of the Apache License, Version 2.0 or the MIT license, at your option.

#![warn(unused_variables)]
#![warn(dead_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]

pub mod array;
pub mod array_subset;
pub mod codec;
pub mod config;
pub mod cutout;
pub mod dtype_registry;
pub mod repository;
pub mod wire;

pub use ndarray;
