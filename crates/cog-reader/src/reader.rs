//! Windowed COG reads over byte ranges.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::try_join_all;
use ndvi_common::{BandSamples, Georeference, PixelWindow};
use tracing::debug;

use crate::decode::decode_block;
use crate::error::{redact_url, CogError, Result};
use crate::http::RangeClient;
use crate::source::{RasterHandle, RasterSource};
use crate::tiff::{is_wanted_tag, parse_ifd, ImageInfo, TagSet, TiffHeader};

/// Bytes fetched up front; COG writers place the first IFD and its tag
/// data at the start of the file.
pub const HEADER_FETCH_BYTES: u64 = 64 * 1024;

/// Random access to the bytes of one file.
#[async_trait]
pub trait RangeRead: Send + Sync {
    /// Read up to `length` bytes at `offset`.
    async fn read_range(&self, offset: u64, length: u64) -> Result<Bytes>;

    /// Description used in logs and errors.
    fn location(&self) -> String;
}

/// A file behind an HTTP URL.
pub struct RemoteFile {
    client: RangeClient,
    url: String,
}

impl RemoteFile {
    pub fn new(client: RangeClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RangeRead for RemoteFile {
    async fn read_range(&self, offset: u64, length: u64) -> Result<Bytes> {
        self.client.fetch_range(&self.url, offset, length).await
    }

    fn location(&self) -> String {
        redact_url(&self.url)
    }
}

/// A whole file already in memory.
#[async_trait]
impl RangeRead for Bytes {
    async fn read_range(&self, offset: u64, length: u64) -> Result<Bytes> {
        let start = (offset as usize).min(self.len());
        let end = (offset.saturating_add(length) as usize).min(self.len());
        Ok(self.slice(start..end))
    }

    fn location(&self) -> String {
        format!("<{} bytes in memory>", self.len())
    }
}

/// An opened Cloud Optimized GeoTIFF.
pub struct CogReader<R: RangeRead> {
    file: R,
    info: ImageInfo,
}

impl<R: RangeRead> CogReader<R> {
    /// Read the header and first IFD of `file`.
    pub async fn open(file: R) -> Result<Self> {
        let head = file.read_range(0, HEADER_FETCH_BYTES).await?;
        let header = TiffHeader::parse(&head)?;
        let order = header.order;

        let count_bytes = bytes_at(&file, &head, header.first_ifd, 2).await?;
        let count = order.u16(&count_bytes) as usize;
        let entry_bytes = bytes_at(&file, &head, header.first_ifd + 2, count * 12).await?;

        let mut ifd = Vec::with_capacity(2 + entry_bytes.len());
        ifd.extend_from_slice(&count_bytes);
        ifd.extend_from_slice(&entry_bytes);
        let entries = parse_ifd(order, &ifd, 0)?;

        let mut tags = TagSet::default();
        for entry in entries.iter().filter(|e| is_wanted_tag(e.tag)) {
            let value = match entry.value_range(order)? {
                None => entry.decode(order, &[])?,
                Some((offset, len)) => {
                    let raw = bytes_at(&file, &head, offset, len).await?;
                    entry.decode_raw(order, &raw)?
                }
            };
            tags.insert(entry.tag, value);
        }

        let info = tags.image_info(order)?;

        debug!(
            location = %file.location(),
            width = info.width,
            height = info.height,
            bits = info.bits_per_sample,
            compression = info.compression,
            layout = ?info.layout,
            epsg = ?info.georeference.epsg,
            "Opened COG"
        );

        Ok(Self { file, info })
    }

    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    async fn read_block(&self, col: u32, row: u32, across: u32) -> Result<Vec<f32>> {
        let (pw, ph) = self.info.block_pixels(row);
        let index = row as usize * across as usize + col as usize;
        let offset = self.info.offsets[index];
        let length = self.info.byte_counts[index];

        // Sparse block: never written, reads as zero
        if length == 0 {
            return Ok(vec![0.0; pw as usize * ph as usize]);
        }

        let data = self.file.read_range(offset, length).await?;
        if (data.len() as u64) < length {
            return Err(CogError::decode(format!(
                "block {} truncated: {} of {} bytes",
                index,
                data.len(),
                length
            )));
        }

        decode_block(&self.info, &data, pw as usize, ph as usize)
    }
}

/// Slice `len` bytes at `offset` from the prefetched head, fetching them
/// when they lie beyond it.
async fn bytes_at<R: RangeRead>(file: &R, head: &Bytes, offset: u64, len: usize) -> Result<Bytes> {
    let start = offset as usize;
    if let Some(end) = start.checked_add(len) {
        if end <= head.len() {
            return Ok(head.slice(start..end));
        }
    }

    let fetched = file.read_range(offset, len as u64).await?;
    if fetched.len() < len {
        return Err(CogError::invalid(format!(
            "file truncated at offset {} (wanted {} bytes, got {})",
            offset,
            len,
            fetched.len()
        )));
    }
    Ok(fetched)
}

#[async_trait]
impl<R: RangeRead + 'static> RasterHandle for CogReader<R> {
    fn width(&self) -> u64 {
        self.info.width as u64
    }

    fn height(&self) -> u64 {
        self.info.height as u64
    }

    fn georeference(&self) -> Georeference {
        self.info.georeference
    }

    async fn read_window(&self, window: PixelWindow) -> Result<BandSamples> {
        let clipped = window.clip(self.width(), self.height());
        let out_w = clipped.width() as usize;
        let out_h = clipped.height() as usize;

        if clipped.is_empty() {
            return Ok(BandSamples::new(Vec::new(), out_w, out_h));
        }

        let (bw, bh) = self.info.block_size();
        let (across, _) = self.info.blocks_across_down();
        let (bw, bh) = (bw as i64, bh as i64);

        let col0 = (clipped.min_x / bw) as u32;
        let col1 = ((clipped.max_x - 1) / bw) as u32;
        let row0 = (clipped.min_y / bh) as u32;
        let row1 = ((clipped.max_y - 1) / bh) as u32;

        let wanted: Vec<(u32, u32)> = (row0..=row1)
            .flat_map(|r| (col0..=col1).map(move |c| (c, r)))
            .collect();

        let blocks = try_join_all(wanted.iter().map(|&(c, r)| self.read_block(c, r, across))).await?;

        let mut out = vec![0.0f32; out_w * out_h];
        for (&(c, r), block) in wanted.iter().zip(blocks) {
            let (pw, ph) = self.info.block_pixels(r);
            let (pw, ph) = (pw as i64, ph as i64);
            let bx0 = c as i64 * bw;
            let by0 = r as i64 * bh;

            let x_start = clipped.min_x.max(bx0);
            let x_end = clipped.max_x.min(bx0 + pw);
            let y_start = clipped.min_y.max(by0);
            let y_end = clipped.max_y.min(by0 + ph);

            for y in y_start..y_end {
                let src_row = ((y - by0) * pw) as usize;
                let dst_row = (y - clipped.min_y) as usize * out_w;
                for x in x_start..x_end {
                    let src = src_row + (x - bx0) as usize;
                    let dst = dst_row + (x - clipped.min_x) as usize;
                    out[dst] = block.get(src).copied().unwrap_or_default();
                }
            }
        }

        debug!(
            location = %self.file.location(),
            window = %window,
            blocks = wanted.len(),
            width = out_w,
            height = out_h,
            "Read window"
        );

        Ok(BandSamples::new(out, out_w, out_h))
    }
}

/// Opens COGs over HTTP range requests.
#[derive(Clone)]
pub struct HttpCogSource {
    client: RangeClient,
}

impl HttpCogSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: RangeClient::new(timeout)?,
        })
    }

    pub fn with_client(client: RangeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RasterSource for HttpCogSource {
    async fn open(&self, url: &str) -> Result<Arc<dyn RasterHandle>> {
        let reader = CogReader::open(RemoteFile::new(self.client.clone(), url)).await?;
        Ok(Arc::new(reader))
    }
}
