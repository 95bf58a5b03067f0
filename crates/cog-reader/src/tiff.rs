//! Classic TIFF header, IFD and GeoTIFF tag parsing.
//!
//! Only the first IFD (full-resolution image) is read. Values that do not
//! fit inside an IFD entry are resolved from the fetched header bytes;
//! [`IfdEntry::value_range`] reports where they live when the header is
//! too short so the caller can fetch them separately.

use ndvi_common::Georeference;

use crate::error::{CogError, Result};

// Baseline tags
pub const TAG_IMAGE_WIDTH: u16 = 256;
pub const TAG_IMAGE_LENGTH: u16 = 257;
pub const TAG_BITS_PER_SAMPLE: u16 = 258;
pub const TAG_COMPRESSION: u16 = 259;
pub const TAG_STRIP_OFFSETS: u16 = 273;
pub const TAG_SAMPLES_PER_PIXEL: u16 = 277;
pub const TAG_ROWS_PER_STRIP: u16 = 278;
pub const TAG_STRIP_BYTE_COUNTS: u16 = 279;
pub const TAG_PLANAR_CONFIGURATION: u16 = 284;
pub const TAG_PREDICTOR: u16 = 317;
pub const TAG_TILE_WIDTH: u16 = 322;
pub const TAG_TILE_LENGTH: u16 = 323;
pub const TAG_TILE_OFFSETS: u16 = 324;
pub const TAG_TILE_BYTE_COUNTS: u16 = 325;
pub const TAG_SAMPLE_FORMAT: u16 = 339;

// GeoTIFF tags
pub const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
pub const TAG_MODEL_TIEPOINT: u16 = 33922;
pub const TAG_MODEL_TRANSFORMATION: u16 = 34264;
pub const TAG_GEO_KEY_DIRECTORY: u16 = 34735;

// GeoKeys
const GEOKEY_GEOGRAPHIC_TYPE: u16 = 2048;
const GEOKEY_PROJECTED_CS_TYPE: u16 = 3072;
const GEOKEY_USER_DEFINED: u16 = 32767;

/// Byte order declared in the TIFF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn u16(self, b: &[u8]) -> u16 {
        let arr = [b[0], b[1]];
        match self {
            Self::Little => u16::from_le_bytes(arr),
            Self::Big => u16::from_be_bytes(arr),
        }
    }

    pub fn u32(self, b: &[u8]) -> u32 {
        let arr = [b[0], b[1], b[2], b[3]];
        match self {
            Self::Little => u32::from_le_bytes(arr),
            Self::Big => u32::from_be_bytes(arr),
        }
    }

    pub fn u64(self, b: &[u8]) -> u64 {
        let mut arr = [0u8; 8];
        arr.copy_from_slice(&b[..8]);
        match self {
            Self::Little => u64::from_le_bytes(arr),
            Self::Big => u64::from_be_bytes(arr),
        }
    }
}

/// Size in bytes of one value of a TIFF field type.
fn type_size(field_type: u16) -> Option<usize> {
    match field_type {
        1 | 2 | 6 | 7 => Some(1),
        3 | 8 => Some(2),
        4 | 9 | 11 => Some(4),
        5 | 10 | 12 => Some(8),
        _ => None,
    }
}

/// Parsed 8-byte TIFF header.
#[derive(Debug, Clone, Copy)]
pub struct TiffHeader {
    pub order: ByteOrder,
    pub first_ifd: u64,
}

impl TiffHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 {
            return Err(CogError::invalid("file shorter than TIFF header"));
        }

        let order = match &bytes[0..2] {
            b"II" => ByteOrder::Little,
            b"MM" => ByteOrder::Big,
            _ => return Err(CogError::invalid("missing byte order mark")),
        };

        match order.u16(&bytes[2..4]) {
            42 => {}
            43 => return Err(CogError::unsupported("BigTIFF")),
            other => return Err(CogError::invalid(format!("bad magic number {}", other))),
        }

        Ok(Self {
            order,
            first_ifd: order.u32(&bytes[4..8]) as u64,
        })
    }
}

/// One 12-byte IFD entry.
#[derive(Debug, Clone, Copy)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    /// Raw 4-byte value/offset field.
    pub value: [u8; 4],
}

impl IfdEntry {
    fn byte_len(&self) -> Result<usize> {
        let size = type_size(self.field_type).ok_or_else(|| {
            CogError::unsupported(format!(
                "field type {} for tag {}",
                self.field_type, self.tag
            ))
        })?;
        Ok(size * self.count as usize)
    }

    /// Byte range of the value when stored outside the entry.
    pub fn value_range(&self, order: ByteOrder) -> Result<Option<(u64, usize)>> {
        let len = self.byte_len()?;
        if len <= 4 {
            Ok(None)
        } else {
            Ok(Some((order.u32(&self.value) as u64, len)))
        }
    }

    /// Decode the entry's values, reading out-of-line data from `bytes`
    /// (which must start at file offset 0).
    pub fn decode(&self, order: ByteOrder, bytes: &[u8]) -> Result<TagValue> {
        let raw: &[u8] = match self.value_range(order)? {
            None => &self.value[..self.byte_len()?],
            Some((offset, len)) => {
                let start = offset as usize;
                bytes.get(start..start + len).ok_or_else(|| {
                    CogError::invalid(format!("tag {} value outside fetched bytes", self.tag))
                })?
            }
        };
        self.decode_raw(order, raw)
    }

    /// Decode values from a buffer holding exactly this entry's data.
    pub fn decode_raw(&self, order: ByteOrder, raw: &[u8]) -> Result<TagValue> {
        let n = self.count as usize;
        let value = match self.field_type {
            1 | 7 => TagValue::Unsigned(raw.iter().take(n).map(|&b| b as u64).collect()),
            6 => TagValue::Signed(raw.iter().take(n).map(|&b| b as i8 as i64).collect()),
            2 => {
                let text = raw.split(|&b| b == 0).next().unwrap_or_default();
                TagValue::Ascii(String::from_utf8_lossy(text).into_owned())
            }
            3 => TagValue::Unsigned(raw.chunks_exact(2).map(|c| order.u16(c) as u64).collect()),
            8 => TagValue::Signed(
                raw.chunks_exact(2)
                    .map(|c| order.u16(c) as i16 as i64)
                    .collect(),
            ),
            4 => TagValue::Unsigned(raw.chunks_exact(4).map(|c| order.u32(c) as u64).collect()),
            9 => TagValue::Signed(
                raw.chunks_exact(4)
                    .map(|c| order.u32(c) as i32 as i64)
                    .collect(),
            ),
            11 => TagValue::Float(
                raw.chunks_exact(4)
                    .map(|c| f32::from_bits(order.u32(c)) as f64)
                    .collect(),
            ),
            12 => TagValue::Float(
                raw.chunks_exact(8)
                    .map(|c| f64::from_bits(order.u64(c)))
                    .collect(),
            ),
            5 => TagValue::Float(
                raw.chunks_exact(8)
                    .map(|c| order.u32(&c[0..4]) as f64 / order.u32(&c[4..8]) as f64)
                    .collect(),
            ),
            10 => TagValue::Float(
                raw.chunks_exact(8)
                    .map(|c| order.u32(&c[0..4]) as i32 as f64 / order.u32(&c[4..8]) as i32 as f64)
                    .collect(),
            ),
            other => {
                return Err(CogError::unsupported(format!(
                    "field type {} for tag {}",
                    other, self.tag
                )))
            }
        };
        Ok(value)
    }
}

/// Decoded tag values.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Unsigned(Vec<u64>),
    Signed(Vec<i64>),
    Float(Vec<f64>),
    Ascii(String),
}

impl TagValue {
    pub fn as_u64s(&self) -> Option<Vec<u64>> {
        match self {
            Self::Unsigned(v) => Some(v.clone()),
            Self::Signed(v) => v.iter().map(|&x| u64::try_from(x).ok()).collect(),
            _ => None,
        }
    }

    pub fn as_f64s(&self) -> Option<Vec<f64>> {
        match self {
            Self::Unsigned(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::Signed(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::Float(v) => Some(v.clone()),
            Self::Ascii(_) => None,
        }
    }

    pub fn first_u64(&self) -> Option<u64> {
        self.as_u64s().and_then(|v| v.first().copied())
    }
}

/// Parse the IFD at `offset` into its entries.
pub fn parse_ifd(order: ByteOrder, bytes: &[u8], offset: u64) -> Result<Vec<IfdEntry>> {
    let start = offset as usize;
    let count_bytes = bytes
        .get(start..start + 2)
        .ok_or_else(|| CogError::invalid("IFD offset outside fetched header"))?;
    let count = order.u16(count_bytes) as usize;

    let entries_start = start + 2;
    let entries = bytes
        .get(entries_start..entries_start + count * 12)
        .ok_or_else(|| CogError::invalid("IFD entries outside fetched header"))?;

    Ok(entries
        .chunks_exact(12)
        .map(|e| IfdEntry {
            tag: order.u16(&e[0..2]),
            field_type: order.u16(&e[2..4]),
            count: order.u32(&e[4..8]),
            value: [e[8], e[9], e[10], e[11]],
        })
        .collect())
}

/// How image data is split into independently compressed blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Tiled { tile_width: u32, tile_height: u32 },
    Stripped { rows_per_strip: u32 },
}

/// Everything needed to read pixels from the full-resolution image.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub order: ByteOrder,
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u16,
    /// 1 = unsigned int, 2 = signed int, 3 = IEEE float
    pub sample_format: u16,
    pub samples_per_pixel: u16,
    /// 1 = chunky, 2 = planar
    pub planar_configuration: u16,
    pub compression: u16,
    pub predictor: u16,
    pub layout: Layout,
    pub offsets: Vec<u64>,
    pub byte_counts: Vec<u64>,
    pub georeference: Georeference,
}

impl ImageInfo {
    /// Block (tile or strip) dimensions in pixels.
    pub fn block_size(&self) -> (u32, u32) {
        match self.layout {
            Layout::Tiled {
                tile_width,
                tile_height,
            } => (tile_width, tile_height),
            Layout::Stripped { rows_per_strip } => (self.width, rows_per_strip.min(self.height)),
        }
    }

    /// Number of blocks across and down.
    pub fn blocks_across_down(&self) -> (u32, u32) {
        let (bw, bh) = self.block_size();
        (self.width.div_ceil(bw), self.height.div_ceil(bh))
    }

    /// Decoded pixel dimensions of a block in block row `row`.
    ///
    /// Tiles are always full-size (edge tiles are padded); the last strip
    /// only holds the remaining rows.
    pub fn block_pixels(&self, row: u32) -> (u32, u32) {
        let (bw, bh) = self.block_size();
        match self.layout {
            Layout::Tiled { .. } => (bw, bh),
            Layout::Stripped { .. } => (bw, bh.min(self.height - row * bh)),
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample as usize).div_ceil(8)
    }

    /// Check the image can be decoded by this reader.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CogError::invalid("image has zero size"));
        }
        let (bw, bh) = self.block_size();
        if bw == 0 || bh == 0 {
            return Err(CogError::invalid("zero block size"));
        }
        if !matches!(self.compression, 1 | 8 | 32946) {
            return Err(CogError::unsupported(format!(
                "compression {}",
                self.compression
            )));
        }
        if !matches!(self.predictor, 1 | 2) {
            return Err(CogError::unsupported(format!("predictor {}", self.predictor)));
        }
        if self.predictor == 2 && self.sample_format == 3 {
            return Err(CogError::unsupported("horizontal predictor on float samples"));
        }
        match (self.sample_format, self.bits_per_sample) {
            (1 | 2, 8 | 16 | 32) | (3, 32 | 64) => {}
            (format, bits) => {
                return Err(CogError::unsupported(format!(
                    "sample format {} with {} bits",
                    format, bits
                )))
            }
        }

        let (across, down) = self.blocks_across_down();
        let mut expected = across as usize * down as usize;
        if self.planar_configuration == 2 {
            expected *= self.samples_per_pixel as usize;
        }
        if self.offsets.len() < expected || self.byte_counts.len() < expected {
            return Err(CogError::invalid(format!(
                "expected {} blocks, found {} offsets and {} byte counts",
                expected,
                self.offsets.len(),
                self.byte_counts.len()
            )));
        }
        Ok(())
    }
}

/// Values of the tags this reader uses, keyed by tag.
#[derive(Debug, Default)]
pub struct TagSet {
    values: Vec<(u16, TagValue)>,
}

impl TagSet {
    pub fn insert(&mut self, tag: u16, value: TagValue) {
        self.values.push((tag, value));
    }

    pub fn get(&self, tag: u16) -> Option<&TagValue> {
        self.values.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }

    fn u32_or(&self, tag: u16, default: u32) -> Result<u32> {
        match self.get(tag).and_then(TagValue::first_u64) {
            Some(v) => u32::try_from(v).map_err(|_| CogError::invalid(format!("tag {} too large", tag))),
            None => Ok(default),
        }
    }

    fn u16_or(&self, tag: u16, default: u16) -> Result<u16> {
        match self.get(tag).and_then(TagValue::first_u64) {
            Some(v) => u16::try_from(v).map_err(|_| CogError::invalid(format!("tag {} too large", tag))),
            None => Ok(default),
        }
    }

    fn required_u32(&self, tag: u16, name: &str) -> Result<u32> {
        if self.get(tag).is_none() {
            return Err(CogError::invalid(format!("missing {}", name)));
        }
        self.u32_or(tag, 0)
    }

    fn u64s(&self, tag: u16) -> Option<Vec<u64>> {
        self.get(tag).and_then(TagValue::as_u64s)
    }

    fn f64s(&self, tag: u16) -> Option<Vec<f64>> {
        self.get(tag).and_then(TagValue::as_f64s)
    }

    /// Build the image description from the collected tags.
    pub fn image_info(&self, order: ByteOrder) -> Result<ImageInfo> {
        let width = self.required_u32(TAG_IMAGE_WIDTH, "ImageWidth")?;
        let height = self.required_u32(TAG_IMAGE_LENGTH, "ImageLength")?;

        let (layout, offsets, byte_counts) = if self.get(TAG_TILE_WIDTH).is_some() {
            let layout = Layout::Tiled {
                tile_width: self.required_u32(TAG_TILE_WIDTH, "TileWidth")?,
                tile_height: self.required_u32(TAG_TILE_LENGTH, "TileLength")?,
            };
            let offsets = self
                .u64s(TAG_TILE_OFFSETS)
                .ok_or_else(|| CogError::invalid("missing TileOffsets"))?;
            let counts = self
                .u64s(TAG_TILE_BYTE_COUNTS)
                .ok_or_else(|| CogError::invalid("missing TileByteCounts"))?;
            (layout, offsets, counts)
        } else {
            let layout = Layout::Stripped {
                rows_per_strip: self.u32_or(TAG_ROWS_PER_STRIP, height)?,
            };
            let offsets = self
                .u64s(TAG_STRIP_OFFSETS)
                .ok_or_else(|| CogError::invalid("missing StripOffsets"))?;
            let counts = self
                .u64s(TAG_STRIP_BYTE_COUNTS)
                .ok_or_else(|| CogError::invalid("missing StripByteCounts"))?;
            (layout, offsets, counts)
        };

        let info = ImageInfo {
            order,
            width,
            height,
            bits_per_sample: self.u16_or(TAG_BITS_PER_SAMPLE, 1)?,
            sample_format: self.u16_or(TAG_SAMPLE_FORMAT, 1)?,
            samples_per_pixel: self.u16_or(TAG_SAMPLES_PER_PIXEL, 1)?.max(1),
            planar_configuration: self.u16_or(TAG_PLANAR_CONFIGURATION, 1)?,
            compression: self.u16_or(TAG_COMPRESSION, 1)?,
            predictor: self.u16_or(TAG_PREDICTOR, 1)?,
            layout,
            offsets,
            byte_counts,
            georeference: self.georeference(),
        };
        info.validate()?;
        Ok(info)
    }

    /// Origin, resolution and EPSG code from the GeoTIFF tags.
    ///
    /// Missing pieces stay `None`; the coordinate mapper rejects them.
    pub fn georeference(&self) -> Georeference {
        let mut georef = Georeference::default();

        let scale = self.f64s(TAG_MODEL_PIXEL_SCALE);
        let tiepoint = self.f64s(TAG_MODEL_TIEPOINT);

        if let (Some(scale), Some(tie)) = (&scale, &tiepoint) {
            if scale.len() >= 2 && tie.len() >= 6 {
                let (sx, sy) = (scale[0], scale[1]);
                georef.origin = Some((tie[3] - tie[0] * sx, tie[4] + tie[1] * sy));
                georef.resolution = Some((sx, -sy));
            }
        } else if let Some(m) = self.f64s(TAG_MODEL_TRANSFORMATION) {
            // Row-major 4x4 affine; rotation terms are ignored
            if m.len() >= 8 {
                georef.origin = Some((m[3], m[7]));
                georef.resolution = Some((m[0], m[5]));
            }
        }

        georef.epsg = self.u64s(TAG_GEO_KEY_DIRECTORY).and_then(|keys| epsg_from_geokeys(&keys));
        georef
    }
}

/// Tags whose values are needed to read the image.
pub fn is_wanted_tag(tag: u16) -> bool {
    matches!(
        tag,
        TAG_IMAGE_WIDTH
            | TAG_IMAGE_LENGTH
            | TAG_BITS_PER_SAMPLE
            | TAG_COMPRESSION
            | TAG_STRIP_OFFSETS
            | TAG_SAMPLES_PER_PIXEL
            | TAG_ROWS_PER_STRIP
            | TAG_STRIP_BYTE_COUNTS
            | TAG_PLANAR_CONFIGURATION
            | TAG_PREDICTOR
            | TAG_TILE_WIDTH
            | TAG_TILE_LENGTH
            | TAG_TILE_OFFSETS
            | TAG_TILE_BYTE_COUNTS
            | TAG_SAMPLE_FORMAT
            | TAG_MODEL_PIXEL_SCALE
            | TAG_MODEL_TIEPOINT
            | TAG_MODEL_TRANSFORMATION
            | TAG_GEO_KEY_DIRECTORY
    )
}

/// Extract the EPSG code from a GeoKeyDirectory.
///
/// Prefers ProjectedCSTypeGeoKey, then GeographicTypeGeoKey. Only keys
/// stored inline (TIFFTagLocation = 0) are considered.
pub fn epsg_from_geokeys(keys: &[u64]) -> Option<u32> {
    if keys.len() < 4 {
        return None;
    }
    let count = keys[3] as usize;

    let lookup = |wanted: u16| {
        keys[4..]
            .chunks_exact(4)
            .take(count)
            .find(|k| k[0] == wanted as u64 && k[1] == 0)
            .map(|k| k[3])
            .filter(|&code| code != 0 && code != GEOKEY_USER_DEFINED as u64)
            .and_then(|code| u32::try_from(code).ok())
    };

    lookup(GEOKEY_PROJECTED_CS_TYPE).or_else(|| lookup(GEOKEY_GEOGRAPHIC_TYPE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_little_endian() {
        let header = TiffHeader::parse(&[b'I', b'I', 42, 0, 8, 0, 0, 0]).unwrap();
        assert_eq!(header.order, ByteOrder::Little);
        assert_eq!(header.first_ifd, 8);
    }

    #[test]
    fn test_header_big_endian() {
        let header = TiffHeader::parse(&[b'M', b'M', 0, 42, 0, 0, 0, 16]).unwrap();
        assert_eq!(header.order, ByteOrder::Big);
        assert_eq!(header.first_ifd, 16);
    }

    #[test]
    fn test_header_rejects_bigtiff() {
        let err = TiffHeader::parse(&[b'I', b'I', 43, 0, 8, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, CogError::Unsupported(_)));
    }

    #[test]
    fn test_header_rejects_garbage() {
        assert!(TiffHeader::parse(b"GIF89a..").is_err());
        assert!(TiffHeader::parse(b"II").is_err());
    }

    #[test]
    fn test_inline_short_values() {
        let entry = IfdEntry {
            tag: TAG_BITS_PER_SAMPLE,
            field_type: 3,
            count: 2,
            value: [16, 0, 8, 0],
        };
        let value = entry.decode(ByteOrder::Little, &[]).unwrap();
        assert_eq!(value, TagValue::Unsigned(vec![16, 8]));
    }

    #[test]
    fn test_out_of_line_doubles() {
        let mut bytes = vec![0u8; 16];
        bytes.extend_from_slice(&10.0f64.to_le_bytes());
        bytes.extend_from_slice(&20.0f64.to_le_bytes());
        let entry = IfdEntry {
            tag: TAG_MODEL_PIXEL_SCALE,
            field_type: 12,
            count: 2,
            value: 16u32.to_le_bytes(),
        };
        assert_eq!(
            entry.value_range(ByteOrder::Little).unwrap(),
            Some((16, 16))
        );
        let value = entry.decode(ByteOrder::Little, &bytes).unwrap();
        assert_eq!(value.as_f64s().unwrap(), vec![10.0, 20.0]);
    }

    #[test]
    fn test_out_of_line_value_beyond_buffer() {
        let entry = IfdEntry {
            tag: TAG_TILE_OFFSETS,
            field_type: 4,
            count: 100,
            value: 1000u32.to_le_bytes(),
        };
        assert!(entry.decode(ByteOrder::Little, &[0u8; 64]).is_err());
    }

    #[test]
    fn test_epsg_prefers_projected_key() {
        let keys = [1, 1, 0, 2, 2048, 0, 1, 4326, 3072, 0, 1, 32632];
        assert_eq!(epsg_from_geokeys(&keys), Some(32632));
    }

    #[test]
    fn test_epsg_falls_back_to_geographic_key() {
        let keys = [1, 1, 0, 1, 2048, 0, 1, 4326];
        assert_eq!(epsg_from_geokeys(&keys), Some(4326));
    }

    #[test]
    fn test_epsg_user_defined_is_none() {
        let keys = [1, 1, 0, 1, 3072, 0, 1, 32767];
        assert_eq!(epsg_from_geokeys(&keys), None);
        assert_eq!(epsg_from_geokeys(&[1, 1]), None);
    }

    #[test]
    fn test_georeference_from_tiepoint() {
        let mut tags = TagSet::default();
        tags.insert(TAG_MODEL_PIXEL_SCALE, TagValue::Float(vec![10.0, 10.0, 0.0]));
        tags.insert(
            TAG_MODEL_TIEPOINT,
            TagValue::Float(vec![0.0, 0.0, 0.0, 399960.0, 5700000.0, 0.0]),
        );
        tags.insert(
            TAG_GEO_KEY_DIRECTORY,
            TagValue::Unsigned(vec![1, 1, 0, 1, 3072, 0, 1, 32632]),
        );

        let georef = tags.georeference();
        assert_eq!(georef.origin, Some((399960.0, 5700000.0)));
        assert_eq!(georef.resolution, Some((10.0, -10.0)));
        assert_eq!(georef.epsg, Some(32632));
    }

    #[test]
    fn test_image_info_requires_offsets() {
        let mut tags = TagSet::default();
        tags.insert(TAG_IMAGE_WIDTH, TagValue::Unsigned(vec![4]));
        tags.insert(TAG_IMAGE_LENGTH, TagValue::Unsigned(vec![4]));
        tags.insert(TAG_TILE_WIDTH, TagValue::Unsigned(vec![16]));
        tags.insert(TAG_TILE_LENGTH, TagValue::Unsigned(vec![16]));
        assert!(tags.image_info(ByteOrder::Little).is_err());
    }

    #[test]
    fn test_image_info_rejects_jpeg() {
        let mut tags = TagSet::default();
        tags.insert(TAG_IMAGE_WIDTH, TagValue::Unsigned(vec![4]));
        tags.insert(TAG_IMAGE_LENGTH, TagValue::Unsigned(vec![4]));
        tags.insert(TAG_BITS_PER_SAMPLE, TagValue::Unsigned(vec![8]));
        tags.insert(TAG_COMPRESSION, TagValue::Unsigned(vec![7]));
        tags.insert(TAG_STRIP_OFFSETS, TagValue::Unsigned(vec![8]));
        tags.insert(TAG_STRIP_BYTE_COUNTS, TagValue::Unsigned(vec![16]));
        let err = tags.image_info(ByteOrder::Little).unwrap_err();
        assert!(matches!(err, CogError::Unsupported(_)));
    }
}
