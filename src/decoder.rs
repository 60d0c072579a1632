//! Top-level decoder: header checks and dispatch on format version

use crate::common::{FormatVersion, DEFAULT_MAX_PIXELS, HEADER_SIZE, SIGNATURE};
use crate::header::CbgHeader;
use crate::image::DecodedImage;
use crate::transform::{build_pool, Scheduling};
use crate::{predictive, transform, CbgError, Result};
use rayon::ThreadPool;
use std::sync::Arc;

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Band scheduling for version 2 images
    pub scheduling: Scheduling,
    /// Size of a dedicated worker pool; `None` uses the global rayon pool
    pub threads: Option<usize>,
    /// Largest padded pixel count accepted before any work starts
    pub max_pixels: usize,
}

impl DecodeOptions {
    /// Default options: parallel bands on the global pool
    pub fn new() -> Self {
        Self {
            scheduling: Scheduling::Parallel,
            threads: None,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Set the band scheduling mode
    pub fn with_scheduling(mut self, scheduling: Scheduling) -> Self {
        self.scheduling = scheduling;
        self
    }

    /// Run bands on a dedicated pool of `threads` workers
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the pixel limit
    pub fn with_max_pixels(mut self, max_pixels: usize) -> Self {
        self.max_pixels = max_pixels;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for CbgDecoder {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}

/// Where parallel band work runs
#[derive(Debug, Clone)]
enum Workers {
    Global,
    Dedicated(Arc<ThreadPool>),
    Unavailable(String),
}

/// CompressedBG decoder
///
/// A dedicated pool requested through [`DecodeOptions::with_threads`] is
/// built once here and shared by every decode call and every clone.
#[derive(Debug, Clone)]
pub struct CbgDecoder {
    options: DecodeOptions,
    workers: Workers,
}

impl CbgDecoder {
    /// Create a decoder with the given options
    pub fn new(options: DecodeOptions) -> Self {
        let workers = match options.threads {
            None => Workers::Global,
            Some(threads) => match build_pool(threads) {
                Ok(pool) => Workers::Dedicated(Arc::new(pool)),
                Err(e) => {
                    log::warn!("{e}");
                    Workers::Unavailable(e.to_string())
                }
            },
        };
        Self { options, workers }
    }

    /// Threads available to parallel band decoding
    pub fn worker_threads(&self) -> usize {
        match &self.workers {
            Workers::Dedicated(pool) => pool.current_num_threads(),
            Workers::Global | Workers::Unavailable(_) => rayon::current_num_threads(),
        }
    }

    /// Options in effect
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Cheap signature sniff for format dispatchers
    pub fn probe(data: &[u8]) -> bool {
        data.len() >= HEADER_SIZE && data.starts_with(SIGNATURE)
    }

    /// Decode a complete blob (header included)
    pub fn decode(&self, data: &[u8]) -> Result<DecodedImage> {
        let header = CbgHeader::parse(data)?;
        self.decode_parts(&header, &data[HEADER_SIZE..])
    }

    /// Decode a blob, mapping "not this format" to `Ok(None)`
    pub fn try_decode(&self, data: &[u8]) -> Result<Option<DecodedImage>> {
        match self.decode(data) {
            Ok(image) => Ok(Some(image)),
            Err(e) if e.is_recoverable() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Decode with a header supplied by the caller and the body that follows it
    pub fn decode_parts(&self, header: &CbgHeader, body: &[u8]) -> Result<DecodedImage> {
        header.check_supported()?;
        header.validate(self.options.max_pixels)?;

        let version = header.format_version()?;
        log::debug!(
            "{}x{} {}bpp version {} ({version:?}), control block {} bytes, body {} bytes",
            header.width,
            header.height,
            header.bpp,
            header.version,
            header.enc_length,
            body.len()
        );

        let image = match version {
            FormatVersion::RunPredictive => predictive::decode(header, body)?,
            FormatVersion::BlockTransform => {
                let pool = match &self.workers {
                    Workers::Global => None,
                    Workers::Dedicated(pool) => Some(pool.as_ref()),
                    Workers::Unavailable(reason) => {
                        return Err(CbgError::ThreadPool(reason.clone()))
                    }
                };
                transform::decode(header, body, self.options.scheduling, pool)?
            }
        };

        if image.pixels.len() != image.stride * image.height as usize {
            return Err(CbgError::DimensionMismatch(format!(
                "buffer of {} bytes for {} rows of {}",
                image.pixels.len(),
                image.height,
                image.stride
            )));
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = DecodeOptions::new()
            .with_scheduling(Scheduling::Sequential)
            .with_threads(2)
            .with_max_pixels(100);
        assert_eq!(options.scheduling, Scheduling::Sequential);
        assert_eq!(options.threads, Some(2));
        assert_eq!(options.max_pixels, 100);
        assert_eq!(DecodeOptions::default().scheduling, Scheduling::Parallel);
    }

    #[test]
    fn test_dedicated_pool_built_once() {
        let decoder = CbgDecoder::new(DecodeOptions::new().with_threads(3));
        assert_eq!(decoder.worker_threads(), 3);

        let clone = decoder.clone();
        match (&decoder.workers, &clone.workers) {
            (Workers::Dedicated(a), Workers::Dedicated(b)) => assert!(Arc::ptr_eq(a, b)),
            other => panic!("expected a shared dedicated pool, got {other:?}"),
        }
        assert!(matches!(CbgDecoder::default().workers, Workers::Global));
    }

    #[test]
    fn test_probe() {
        let mut data = b"CompressedBG___\0".to_vec();
        assert!(!CbgDecoder::probe(&data));
        data.resize(HEADER_SIZE, 0);
        assert!(CbgDecoder::probe(&data));
        assert!(!CbgDecoder::probe(&[0u8; HEADER_SIZE]));
    }

    #[test]
    fn test_try_decode_other_format() {
        let decoder = CbgDecoder::default();
        assert!(decoder.try_decode(b"\x89PNG\r\n\x1a\n").unwrap().is_none());
    }

    #[test]
    fn test_zero_width_rejected_before_decode() {
        let header = CbgHeader {
            width: 0,
            height: 8,
            bpp: 24,
            intermediate_length: 0,
            key: 0,
            enc_length: 0,
            check_sum: 0,
            check_xor: 0,
            version: 2,
        };
        let decoder = CbgDecoder::default();
        assert!(matches!(
            decoder.decode_parts(&header, &[]),
            Err(CbgError::DimensionMismatch(_))
        ));
        assert!(matches!(
            decoder.try_decode(&header.to_bytes()),
            Err(CbgError::DimensionMismatch(_))
        ));
    }
}
