//! `plot-upset` reads lines of the form `<filename>: <hash>, <hash>, ...` and
//! draws an UpSet plot showing, for each combination of filenames, how many
//! hashes occur in exactly those files and no others.
//!
//! The `chart_from` function is the kernel of the application. The `args`
//! module parses the command line, `input` and `output` hide I/O details,
//! `dataset` parses the input lines, `intersections` counts, and `render`
//! lays out and draws.

#![cfg_attr(debug_assertions, allow(dead_code, unused_imports))]
#![deny(unused_must_use)]
#![deny(clippy::all)]
#![allow(clippy::needless_return)]
#![deny(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![deny(missing_docs)]

use anyhow::Result;
use log::debug;
use std::io::Read;

pub mod args;
pub mod dataset;
pub mod input;
pub mod intersections;
pub mod output;
pub mod render;

use crate::dataset::Dataset;
use crate::intersections::Membership;
use crate::render::{Chart, PlotOptions};

/// Reads all of `input`, parses each line as `<filename>: <hash>, <hash>, ...`,
/// and draws the UpSet plot of the resulting sets. Nothing is drawn if any
/// line is malformed.
pub fn chart_from(input: impl Read, options: &PlotOptions) -> Result<Chart> {
    let text = input::read_all(input)?;
    let dataset = Dataset::from_text(&text)?;
    let membership = Membership::from_dataset(&dataset);
    let intersections = membership.intersections();
    debug!(
        "{} sets, {} distinct hashes, {} non-empty intersections",
        dataset.len(),
        membership.hash_count(),
        intersections.len()
    );
    Ok(render::chart(&intersections, options))
}
