//! Tile and strip decoding: decompression, predictor and sample conversion.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{CogError, Result};
use crate::tiff::{ByteOrder, ImageInfo};

/// Decompress a block according to the TIFF compression code.
///
/// Deflate output larger than `expected_len` is rejected without being
/// inflated past one extra byte.
pub fn decompress(compression: u16, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    match compression {
        1 => Ok(data.to_vec()),
        // Adobe deflate and the older PKZIP code are both zlib streams
        8 | 32946 => {
            let limit = (expected_len as u64).saturating_add(1);
            let mut decoder = ZlibDecoder::new(data).take(limit);
            let mut out = Vec::with_capacity(expected_len);
            decoder.read_to_end(&mut out)?;

            if out.len() > expected_len {
                return Err(CogError::decode(format!(
                    "block inflates past {} bytes",
                    expected_len
                )));
            }
            Ok(out)
        }
        other => Err(CogError::unsupported(format!("compression {}", other))),
    }
}

/// Undo horizontal differencing (predictor 2) in place.
///
/// Integer samples only; wrapping addition at the sample width is the same
/// for signed and unsigned data.
pub fn undo_horizontal_predictor(
    buf: &mut [u8],
    order: ByteOrder,
    bytes_per_sample: usize,
    row_pixels: usize,
    samples_per_pixel: usize,
) {
    let row_samples = row_pixels * samples_per_pixel;
    let row_bytes = row_samples * bytes_per_sample;
    if row_bytes == 0 {
        return;
    }

    for row in buf.chunks_exact_mut(row_bytes) {
        match bytes_per_sample {
            1 => {
                for i in samples_per_pixel..row_samples {
                    row[i] = row[i].wrapping_add(row[i - samples_per_pixel]);
                }
            }
            2 => {
                for i in samples_per_pixel..row_samples {
                    let prev = order.u16(&row[(i - samples_per_pixel) * 2..]);
                    let cur = order.u16(&row[i * 2..]);
                    let sum = cur.wrapping_add(prev);
                    let bytes = match order {
                        ByteOrder::Little => sum.to_le_bytes(),
                        ByteOrder::Big => sum.to_be_bytes(),
                    };
                    row[i * 2..i * 2 + 2].copy_from_slice(&bytes);
                }
            }
            4 => {
                for i in samples_per_pixel..row_samples {
                    let prev = order.u32(&row[(i - samples_per_pixel) * 4..]);
                    let cur = order.u32(&row[i * 4..]);
                    let sum = cur.wrapping_add(prev);
                    let bytes = match order {
                        ByteOrder::Little => sum.to_le_bytes(),
                        ByteOrder::Big => sum.to_be_bytes(),
                    };
                    row[i * 4..i * 4 + 4].copy_from_slice(&bytes);
                }
            }
            _ => {}
        }
    }
}

/// Convert raw sample bytes to `f32`, taking every `stride`-th sample.
pub fn samples_to_f32(
    buf: &[u8],
    order: ByteOrder,
    sample_format: u16,
    bits_per_sample: u16,
    stride: usize,
) -> Result<Vec<f32>> {
    let size = (bits_per_sample as usize).div_ceil(8);
    let stride = stride.max(1);

    let values = buf
        .chunks_exact(size)
        .step_by(stride)
        .map(|c| match (sample_format, bits_per_sample) {
            (1, 8) => Ok(c[0] as f32),
            (2, 8) => Ok(c[0] as i8 as f32),
            (1, 16) => Ok(order.u16(c) as f32),
            (2, 16) => Ok(order.u16(c) as i16 as f32),
            (1, 32) => Ok(order.u32(c) as f32),
            (2, 32) => Ok(order.u32(c) as i32 as f32),
            (3, 32) => Ok(f32::from_bits(order.u32(c))),
            (3, 64) => Ok(f64::from_bits(order.u64(c)) as f32),
            (format, bits) => Err(CogError::unsupported(format!(
                "sample format {} with {} bits",
                format, bits
            ))),
        })
        .collect::<Result<Vec<f32>>>()?;

    Ok(values)
}

/// Decode one compressed block of the first band into `f32` samples.
///
/// `block_width` x `block_height` is the decoded pixel size of the block.
pub fn decode_block(
    info: &ImageInfo,
    data: &[u8],
    block_width: usize,
    block_height: usize,
) -> Result<Vec<f32>> {
    let spp = if info.planar_configuration == 2 {
        1
    } else {
        info.samples_per_pixel as usize
    };
    let bytes_per_sample = info.bytes_per_sample();
    let expected = block_width * block_height * spp * bytes_per_sample;

    let mut raw = decompress(info.compression, data, expected)?;
    if raw.len() < expected {
        return Err(CogError::decode(format!(
            "block decoded to {} bytes, expected {}",
            raw.len(),
            expected
        )));
    }
    raw.truncate(expected);

    if info.predictor == 2 {
        undo_horizontal_predictor(&mut raw, info.order, bytes_per_sample, block_width, spp);
    }

    samples_to_f32(&raw, info.order, info.sample_format, info.bits_per_sample, spp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_deflate_roundtrip() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload).unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(decompress(8, &compressed, 1024).unwrap(), payload);
        assert_eq!(decompress(32946, &compressed, 1024).unwrap(), payload);
    }

    #[test]
    fn test_deflate_larger_than_block_is_error() {
        let payload = vec![0u8; 1 << 20];
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let err = decompress(8, &compressed, 1024).unwrap_err();
        assert!(matches!(err, CogError::Decode(_)));
        assert_eq!(decompress(8, &compressed, payload.len()).unwrap().len(), payload.len());
    }

    #[test]
    fn test_decompress_rejects_lzw() {
        assert!(matches!(
            decompress(5, &[0u8; 4], 4),
            Err(CogError::Unsupported(_))
        ));
    }

    #[test]
    fn test_corrupt_deflate_is_error() {
        assert!(decompress(8, &[1, 2, 3, 4], 16).is_err());
    }

    #[test]
    fn test_predictor_u8() {
        // differences of a ramp 10, 11, 12, 13 per row
        let mut buf = vec![10, 1, 1, 1, 20, 2, 2, 2];
        undo_horizontal_predictor(&mut buf, ByteOrder::Little, 1, 4, 1);
        assert_eq!(buf, vec![10, 11, 12, 13, 20, 22, 24, 26]);
    }

    #[test]
    fn test_predictor_u16_wraps() {
        let mut buf = Vec::new();
        for v in [65535u16, 2, 3] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        undo_horizontal_predictor(&mut buf, ByteOrder::Little, 2, 3, 1);
        let values: Vec<u16> = buf
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(values, vec![65535, 1, 4]);
    }

    #[test]
    fn test_samples_u16_big_endian() {
        let buf = [0x01, 0x00, 0x00, 0x02];
        let values = samples_to_f32(&buf, ByteOrder::Big, 1, 16, 1).unwrap();
        assert_eq!(values, vec![256.0, 2.0]);
    }

    #[test]
    fn test_samples_stride_takes_first_band() {
        let buf = [1u8, 100, 2, 100, 3, 100];
        let values = samples_to_f32(&buf, ByteOrder::Little, 1, 8, 2).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_samples_f32() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0.25f32.to_le_bytes());
        buf.extend_from_slice(&(-1.5f32).to_le_bytes());
        let values = samples_to_f32(&buf, ByteOrder::Little, 3, 32, 1).unwrap();
        assert_eq!(values, vec![0.25, -1.5]);
    }
}
