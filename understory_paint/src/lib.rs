// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_paint --heading-base-level=0

//! Understory Paint: per-pixel gradient sampling and mesh gradients.
//!
//! This crate turns gradient descriptions into colors, the way a software
//! rasterizer needs them. It provides:
//! - [`ColorRamp`]: a precomputed lookup of a stop list, with a fast single
//!   table for well-spaced stops and a per-interval layout for tiny intervals.
//! - [`CycleMethod`]: no-cycle (pad), repeat and reflect remapping.
//! - [`LinearSampler`] and [`RadialSampler`]: row fillers that map device
//!   pixels back through the paint transform, with an incremental fast path
//!   for plain radial gradients.
//! - [`MeshGradient`]: a grid of Coons patches with corner colors, rendered
//!   by adaptive subdivision into flat-colored leaves.
//! - [`RampCache`]: epoch-based reuse of ramps across paints and frames.
//!
//! It does **not** rasterize or composite. Callers are expected to:
//! - Own the pixel buffers and compositing; samplers only write
//!   [`Rgba8`] rows.
//! - Fill each [`MeshLeaf`] outline with its color using their own path
//!   rasterizer.
//! - Parse documents themselves; [`EdgeCommand::parse`] covers only the
//!   one-command path fragments of mesh stops.
//!
//! ## Linear gradient example
//!
//! ```rust
//! use kurbo::{Affine, Point};
//! use peniko::{Color, Gradient};
//! use understory_paint::{Paint, Rgba8, device_to_local};
//!
//! let gradient = Gradient::new_linear((0.0, 0.0), (10.0, 0.0))
//!     .with_stops([(0.0, Color::BLACK), (1.0, Color::WHITE)]);
//! let paint = Paint::from_gradient(&gradient).unwrap().unwrap();
//!
//! // Halfway along the axis is mid-gray.
//! let mid = paint.sample(Point::new(5.0, 0.0)).unwrap();
//! assert!(mid.r.abs_diff(128) <= 1, "{mid:?}");
//!
//! // Fill one device row, with the gradient scaled up 2x on screen.
//! let to_local = device_to_local(Affine::scale(2.0));
//! let mut row = [Rgba8 { r: 0, g: 0, b: 0, a: 0 }; 20];
//! assert!(paint.fill_row(to_local, 0, 0, &mut row), "gradients always paint");
//! assert!(row[0].r < row[19].r, "the row gets lighter");
//! ```
//!
//! ## Mesh gradient example
//!
//! ```rust
//! use kurbo::{Affine, Point};
//! use understory_paint::{
//!     EdgeCommand, MeshDesc, MeshGradient, MeshPatchDesc, MeshRenderOptions, MeshStop, Rgba8,
//! };
//!
//! let stop = |edge: &str, r: u8, g: u8, b: u8| {
//!     MeshStop::new(EdgeCommand::parse(edge).unwrap(), Rgba8 { r, g, b, a: 255 })
//! };
//! let desc = MeshDesc {
//!     origin: Point::new(0.0, 0.0),
//!     rows: vec![vec![MeshPatchDesc::new(vec![
//!         stop("c 25,-10 75,10 100,0", 255, 0, 0),
//!         stop("l 0,100", 0, 255, 0),
//!         stop("l -100,0", 0, 0, 255),
//!         // The closing edge may leave its end point out.
//!         stop("l", 255, 255, 0),
//!     ])]],
//! };
//! let mesh = MeshGradient::assemble(&desc).unwrap();
//!
//! let mut leaves = Vec::new();
//! let stats = mesh.render(Affine::IDENTITY, &MeshRenderOptions::default(), |leaf| {
//!     leaves.push(leaf)
//! });
//! assert_eq!(stats.leaves, leaves.len(), "one callback per leaf");
//! ```
//!
//! ## Design notes
//!
//! - Pixels are sampled at their centers on every path, so a fast-path row
//!   and a general-path row agree to within a couple of levels per channel.
//! - Ramps are immutable once built and shared through [`Arc`]; samplers and
//!   the [`RampCache`] hold them without copying tables.
//! - Gradient inputs come from [`peniko`]; geometry from [`kurbo`].
//! - Mesh edges are shared by value. A neighbor's edge is the exact reverse
//!   of the shared one, so seams between patches never open.
//!
//! Diagnostics go through the [`log`] facade: warnings for clamped or
//! rejected inputs, debug and trace output for ramp builds, cache activity
//! and mesh subdivision.
//!
//! This crate is `no_std`. [`EdgeCommand::parse`] is only available with the
//! `std` feature, which is on by default.
//!
//! [`Arc`]: alloc::sync::Arc

#![no_std]

extern crate alloc;

mod bezier;
mod cache;
mod color;
mod coons;
mod cycle;
mod edge;
mod error;
mod linear;
mod mesh;
mod paint;
mod radial;
mod ramp;

pub use bezier::{Bezier, MAX_SUBDIVISION_DEPTH};
pub use cache::{RampCache, RampCacheConfig};
pub use color::{
    Rgba8, lerp_rgba8, linear_to_srgb, max_channel_diff, rgba8_to_linear, rgba8_to_srgb,
    srgb_to_linear,
};
pub use coons::{CoonsPatch, CornerWeights, Subdivided};
pub use cycle::CycleMethod;
pub use edge::EdgeCommand;
pub use error::{EdgeParseError, MeshError, MeshErrorKind, PaintError, RampError, Side};
pub use linear::{LinearGeometry, LinearSampler};
pub use mesh::{
    CornerColors, MeshDesc, MeshGradient, MeshLeaf, MeshPatch, MeshPatchDesc, MeshRenderOptions,
    MeshStop, RenderStats,
};
pub use paint::{Paint, device_to_local};
pub use radial::{RadialGeometry, RadialSampler};
pub use ramp::{ColorRamp, GradientStop, InterpolationSpace, RampLayout};
