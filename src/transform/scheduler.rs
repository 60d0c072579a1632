//! Band-parallel dispatch
//!
//! Each band owns a disjoint byte range of the body and a disjoint slice of
//! the output buffer, so bands run as independent tasks on a rayon pool. The
//! alpha plane is decoded beside them into its own buffer. The first failing
//! task fails the whole decode.

use super::alpha::decode_alpha;
use super::band::{decode_band, BandContext};
use crate::{CbgError, Result};
use rayon::prelude::*;
use rayon::ThreadPool;

/// How band tasks are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduling {
    /// One task per band plus one for alpha on a thread pool
    #[default]
    Parallel,
    /// Bands then alpha on the calling thread
    Sequential,
}

/// Compressed byte range of one 8-row band
#[derive(Debug, Clone, Copy)]
pub struct Band<'a> {
    /// Band number counted from the top
    pub index: usize,
    /// Payload after the padding skip
    pub payload: &'a [u8],
}

/// Alpha segment waiting to be decoded
#[derive(Debug, Clone, Copy)]
pub struct AlphaJob<'a> {
    /// Bytes from the last offset-table entry to the end of the body
    pub segment: &'a [u8],
    /// Padded image width in pixels
    pub width: usize,
    /// Padded pixel count
    pub pixels: usize,
}

impl AlphaJob<'_> {
    fn run(self) -> Result<Option<Vec<u8>>> {
        let mut plane = vec![0u8; self.pixels];
        let present = decode_alpha(self.segment, self.width, &mut plane)?;
        Ok(present.then_some(plane))
    }
}

/// Decode every band into `output` and return the alpha plane, if any
///
/// Parallel work runs on `pool` when given, otherwise on the global pool.
pub fn run(
    ctx: &BandContext<'_>,
    bands: &[Band<'_>],
    output: &mut [u8],
    alpha: Option<AlphaJob<'_>>,
    scheduling: Scheduling,
    pool: Option<&ThreadPool>,
) -> Result<Option<Vec<u8>>> {
    match (scheduling, pool) {
        (Scheduling::Sequential, _) => run_sequential(ctx, bands, output, alpha),
        (Scheduling::Parallel, Some(pool)) => {
            pool.install(|| run_parallel(ctx, bands, output, alpha))
        }
        (Scheduling::Parallel, None) => run_parallel(ctx, bands, output, alpha),
    }
}

/// Build a dedicated pool of `threads` workers
pub fn build_pool(threads: usize) -> Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("cbg-band-{index}"))
        .build()
        .map_err(|e| CbgError::ThreadPool(e.to_string()))
}

fn run_sequential(
    ctx: &BandContext<'_>,
    bands: &[Band<'_>],
    output: &mut [u8],
    alpha: Option<AlphaJob<'_>>,
) -> Result<Option<Vec<u8>>> {
    for (chunk, band) in output.chunks_mut(ctx.band_bytes()).zip(bands) {
        log::trace!("band {}: {} bytes", band.index, band.payload.len());
        decode_band(ctx, band.payload, chunk)?;
    }
    alpha.map_or(Ok(None), AlphaJob::run)
}

fn run_parallel(
    ctx: &BandContext<'_>,
    bands: &[Band<'_>],
    output: &mut [u8],
    alpha: Option<AlphaJob<'_>>,
) -> Result<Option<Vec<u8>>> {
    let (decoded, plane) = rayon::join(
        || {
            output
                .par_chunks_mut(ctx.band_bytes())
                .zip(bands.par_iter())
                .try_for_each(|(chunk, band)| {
                    log::trace!("band {}: {} bytes", band.index, band.payload.len());
                    decode_band(ctx, band.payload, chunk)
                })
        },
        || alpha.map_or(Ok(None), AlphaJob::run),
    );
    decoded?;
    plane
}
