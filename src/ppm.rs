//! Binary PPM (`P6`) reading and writing, 8 bits per channel only.
//!
//! Header: the `P6` magic, then width, height and maxval as ASCII decimals
//! separated by whitespace, with `#` comments allowed between tokens. A
//! single whitespace byte follows the maxval, then `width * height * 3`
//! raster bytes.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{FilterError, Result};
use crate::pixel::PixelBuffer;

pub const MAGIC: &str = "P6";
pub const MAX_VALUE: u32 = 255;
pub const EXTENSION: &str = "ppm";

// Longest header token we accept; u32::MAX has ten digits.
const MAX_TOKEN_LEN: usize = 16;

/// Token-level access to a PPM header.
trait HeaderReader: BufRead {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.fill_buf()?.first() {
            Some(&b) => b,
            None => return Ok(None),
        };
        self.consume(1);
        Ok(Some(byte))
    }

    /// Next whitespace-delimited token, skipping comments. Consumes exactly
    /// one trailing whitespace byte.
    fn next_token(&mut self, what: &str) -> Result<String> {
        let mut token = Vec::new();

        loop {
            let byte = match self.next_byte()? {
                Some(b) => b,
                None if token.is_empty() => {
                    return Err(FilterError::format(format!(
                        "header ended before {}",
                        what
                    )))
                }
                None => break,
            };

            match byte {
                b'#' if token.is_empty() => self.skip_comment()?,
                b if b.is_ascii_whitespace() => {
                    if !token.is_empty() {
                        break;
                    }
                }
                b if !b.is_ascii() => {
                    return Err(FilterError::format(format!(
                        "non-ASCII byte 0x{:02x} in header",
                        b
                    )))
                }
                b => {
                    if token.len() == MAX_TOKEN_LEN {
                        return Err(FilterError::format(format!("{} token is too long", what)));
                    }
                    token.push(b);
                }
            }
        }

        // Only ASCII bytes were pushed
        Ok(String::from_utf8_lossy(&token).into_owned())
    }

    fn skip_comment(&mut self) -> io::Result<()> {
        while let Some(b) = self.next_byte()? {
            if b == b'\n' || b == b'\r' {
                break;
            }
        }
        Ok(())
    }

    fn next_u32(&mut self, what: &str) -> Result<u32> {
        let token = self.next_token(what)?;
        token
            .parse::<u32>()
            .map_err(|_| FilterError::format(format!("invalid {} '{}'", what, token)))
    }
}

impl<R: BufRead + ?Sized> HeaderReader for R {}

/// Parsed `P6` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: usize,
    pub height: usize,
}

impl Header {
    /// Raster size in bytes. A size that does not fit in memory can never be
    /// backed by the stream, so it is reported as running out of input.
    pub fn raster_len(&self) -> Result<usize> {
        self.width
            .checked_mul(self.height)
            .and_then(|area| area.checked_mul(3))
            .ok_or_else(|| {
                FilterError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "raster for {}x{} image exceeds addressable input",
                        self.width, self.height
                    ),
                ))
            })
    }
}

/// Parse the header, leaving `reader` positioned at the first raster byte.
pub fn read_header<R: BufRead>(reader: &mut R) -> Result<Header> {
    let magic = reader.next_token("magic")?;
    if magic != MAGIC {
        return Err(FilterError::format(format!(
            "expected magic '{}', found '{}'",
            MAGIC, magic
        )));
    }

    let width = reader.next_u32("width")? as usize;
    let height = reader.next_u32("height")? as usize;
    let max_value = reader.next_u32("max value")?;

    if max_value != MAX_VALUE {
        return Err(FilterError::Range {
            found: max_value,
            expected: MAX_VALUE,
        });
    }
    if width == 0 || height == 0 {
        return Err(FilterError::config(format!(
            "image dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }

    Ok(Header { width, height })
}

/// Decode a `P6` stream. Bytes after the raster are left unread.
pub fn decode<R: BufRead>(mut reader: R) -> Result<PixelBuffer> {
    let header = read_header(&mut reader)?;
    let expected = header.raster_len()?;

    let mut raster = Vec::new();
    reader.take(expected as u64).read_to_end(&mut raster)?;
    if raster.len() != expected {
        return Err(FilterError::Truncated {
            expected,
            actual: raster.len(),
        });
    }

    PixelBuffer::from_raw(header.width, header.height, &raster)
}

/// Write `image` as a `P6` stream.
pub fn encode<W: Write>(image: &PixelBuffer, mut writer: W) -> Result<()> {
    write!(
        writer,
        "{}\n{} {}\n{}\n",
        MAGIC,
        image.width(),
        image.height(),
        MAX_VALUE
    )?;
    writer.write_all(&image.to_raw())?;
    writer.flush()?;
    Ok(())
}

pub fn read_ppm(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let image = decode(BufReader::new(File::open(path)?))?;
    info!(
        "decoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

pub fn write_ppm(path: impl AsRef<Path>, image: &PixelBuffer) -> Result<()> {
    let path = path.as_ref();
    encode(image, BufWriter::new(File::create(path)?))?;
    info!(
        "encoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(())
}

/// Where the filtered copy of `input` is written:
/// `dir/photo.ppm` becomes `dir/photo{suffix}.ppm`.
pub fn output_path(input: &Path, suffix: &str) -> Result<PathBuf> {
    let stem = input.file_stem().ok_or_else(|| {
        FilterError::config(format!("'{}' does not name a file", input.display()))
    })?;

    let mut name = stem.to_os_string();
    name.push(suffix);
    name.push(".");
    name.push(EXTENSION);
    Ok(input.with_file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pixel::Pixel;
    use std::io::Cursor;

    fn ppm_bytes(header: &str, raster: &[u8]) -> Vec<u8> {
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(raster);
        bytes
    }

    #[test]
    fn test_decode_simple() {
        let bytes = ppm_bytes("P6\n2 1\n255\n", &[255, 0, 0, 0, 0, 255]);
        let image = decode(Cursor::new(bytes)).unwrap();

        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.get(0, 0), Pixel::new(255, 0, 0));
        assert_eq!(image.get(1, 0), Pixel::new(0, 0, 255));
    }

    #[test]
    fn test_decode_comments_and_whitespace() {
        let header = "P6 # binary rgb\n# a comment line\n\t2\r\n  # another\n2 255\n";
        let bytes = ppm_bytes(header, &[7; 12]);
        let image = decode(Cursor::new(bytes)).unwrap();

        assert_eq!(image.dimensions(), (2, 2));
        assert!(image.pixels().iter().all(|&p| p == Pixel::new(7, 7, 7)));
    }

    #[test]
    fn test_raster_starting_with_whitespace_byte() {
        // The first raster byte is '\n' and must not be eaten by the header.
        let bytes = ppm_bytes("P6 1 1 255\n", &[b'\n', b' ', b'#']);
        let image = decode(Cursor::new(bytes)).unwrap();
        assert_eq!(image.get(0, 0), Pixel::new(b'\n', b' ', b'#'));
    }

    #[test]
    fn test_wrong_magic() {
        let bytes = ppm_bytes("P3\n1 1\n255\n", &[0, 0, 0]);
        let err = decode(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, FilterError::Format(_)));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_wrong_max_value() {
        let bytes = ppm_bytes("P6\n1 1\n65535\n", &[0; 6]);
        let err = decode(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            FilterError::Range {
                found: 65535,
                expected: 255
            }
        ));
    }

    #[test]
    fn test_truncated_raster() {
        let bytes = ppm_bytes("P6\n2 2\n255\n", &[1; 10]);
        let err = decode(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            FilterError::Truncated {
                expected: 12,
                actual: 10
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_huge_declared_dimensions_without_raster() {
        let bytes = ppm_bytes("P6\n4294967295 4294967295\n255\n", &[]);
        let err = decode(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, FilterError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);

        let bytes = ppm_bytes("P6\n10000 10000\n255\n", &[9; 30]);
        let err = decode(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, FilterError::Truncated { actual: 30, .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_truncated_header() {
        let err = decode(Cursor::new(b"P6\n4".to_vec())).unwrap_err();
        assert!(matches!(err, FilterError::Format(_)));
        let err = decode(Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(err, FilterError::Format(_)));
    }

    #[test]
    fn test_garbage_dimension() {
        let bytes = ppm_bytes("P6\nwide 2\n255\n", &[]);
        assert!(matches!(decode(Cursor::new(bytes)), Err(FilterError::Format(_))));
    }

    #[test]
    fn test_zero_dimension_is_config_error() {
        let bytes = ppm_bytes("P6\n0 4\n255\n", &[]);
        assert!(matches!(decode(Cursor::new(bytes)), Err(FilterError::Config(_))));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let bytes = ppm_bytes("P6\n1 1\n255\n", &[1, 2, 3, 4, 5]);
        let image = decode(Cursor::new(bytes)).unwrap();
        assert_eq!(image.to_raw(), vec![1, 2, 3]);
    }

    #[test]
    fn test_encode_header_layout() {
        let image = PixelBuffer::filled(3, 2, Pixel::new(1, 2, 3)).unwrap();
        let mut out = Vec::new();
        encode(&image, &mut out).unwrap();

        let header = b"P6\n3 2\n255\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(out.len(), header.len() + 18);
        assert_eq!(decode(Cursor::new(out)).unwrap(), image);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.ppm");
        let image = PixelBuffer::from_raw(2, 2, &[0, 50, 100, 150, 200, 250, 1, 2, 3, 4, 5, 6]).unwrap();

        write_ppm(&path, &image).unwrap();
        assert_eq!(read_ppm(&path).unwrap(), image);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_ppm(dir.path().join("absent.ppm")).unwrap_err();
        assert!(matches!(err, FilterError::Io(_)));
    }

    #[test]
    fn test_unwritable_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = PixelBuffer::filled(1, 1, Pixel::BLACK).unwrap();
        let err = write_ppm(dir.path().join("no/such/dir/out.ppm"), &image).unwrap_err();
        assert!(matches!(err, FilterError::Io(_)));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("photo.ppm"), "_laplacian").unwrap(),
            PathBuf::from("photo_laplacian.ppm")
        );
        assert_eq!(
            output_path(Path::new("dir/a.b.ppm"), "_laplacian").unwrap(),
            PathBuf::from("dir/a.b_laplacian.ppm")
        );
        assert_eq!(
            output_path(Path::new("raw"), "_edges").unwrap(),
            PathBuf::from("raw_edges.ppm")
        );
        assert!(output_path(Path::new(""), "_laplacian").is_err());
    }
}
