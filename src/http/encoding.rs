//! Content-coding support for HTML bodies buffered for rewriting.
//!
//! Only the codings a browser commonly advertises are decoded. A body whose
//! `content-encoding` lists anything else is not rewritten at all.

use std::io::{self, Read};

use axum::http::{header, HeaderMap};
use flate2::read::{GzDecoder, ZlibDecoder};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coding {
    Gzip,
    Deflate,
    Brotli,
}

#[derive(Debug, Error)]
#[error("failed to decode {coding:?} body: {source}")]
pub struct DecodeError {
    coding: Coding,
    #[source]
    source: io::Error,
}

/// Codings applied to a body, in application order.
///
/// `identity` tokens are dropped. Returns `None` when any coding is
/// unsupported.
pub fn content_codings(headers: &HeaderMap) -> Option<Vec<Coding>> {
    let mut codings = Vec::new();
    for value in headers.get_all(header::CONTENT_ENCODING) {
        let value = value.to_str().ok()?;
        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let coding = match token.to_ascii_lowercase().as_str() {
                "identity" => continue,
                "gzip" | "x-gzip" => Coding::Gzip,
                "deflate" => Coding::Deflate,
                "br" => Coding::Brotli,
                _ => return None,
            };
            codings.push(coding);
        }
    }
    Some(codings)
}

/// Undo `codings`, last applied first.
pub fn decode(body: Vec<u8>, codings: &[Coding]) -> Result<Vec<u8>, DecodeError> {
    codings.iter().rev().try_fold(body, |body, &coding| {
        decode_one(&body, coding).map_err(|source| DecodeError { coding, source })
    })
}

fn decode_one(body: &[u8], coding: Coding) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len().saturating_mul(4));
    match coding {
        Coding::Gzip => GzDecoder::new(body).read_to_end(&mut out)?,
        // HTTP "deflate" is the zlib format.
        Coding::Deflate => ZlibDecoder::new(body).read_to_end(&mut out)?,
        Coding::Brotli => brotli::Decompressor::new(body, 4096).read_to_end(&mut out)?,
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use flate2::write::{GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    const HTML: &[u8] = br#"<a href="/foo">foo</a>"#;

    fn headers(encoding: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static(encoding));
        headers
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_no_encoding_is_empty_chain() {
        assert_eq!(content_codings(&HeaderMap::new()), Some(vec![]));
        assert_eq!(content_codings(&headers("identity")), Some(vec![]));
    }

    #[test]
    fn test_parses_coding_chain() {
        assert_eq!(
            content_codings(&headers("GZIP, br")),
            Some(vec![Coding::Gzip, Coding::Brotli])
        );
        assert_eq!(content_codings(&headers("x-gzip")), Some(vec![Coding::Gzip]));
    }

    #[test]
    fn test_unsupported_coding() {
        assert_eq!(content_codings(&headers("zstd")), None);
        assert_eq!(content_codings(&headers("gzip, compress")), None);
    }

    #[test]
    fn test_decode_gzip() {
        assert_eq!(decode(gzip(HTML), &[Coding::Gzip]).unwrap(), HTML);
    }

    #[test]
    fn test_decode_deflate() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(HTML).unwrap();
        let body = encoder.finish().unwrap();
        assert_eq!(decode(body, &[Coding::Deflate]).unwrap(), HTML);
    }

    #[test]
    fn test_decode_brotli() {
        let mut body = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(&mut body, 4096, 5, 22);
            writer.write_all(HTML).unwrap();
        }
        assert_eq!(decode(body, &[Coding::Brotli]).unwrap(), HTML);
    }

    #[test]
    fn test_decode_chain_in_reverse() {
        // deflate applied first, then gzip.
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(HTML).unwrap();
        let body = gzip(&encoder.finish().unwrap());
        assert_eq!(decode(body, &[Coding::Deflate, Coding::Gzip]).unwrap(), HTML);
    }

    #[test]
    fn test_corrupt_body_is_error() {
        let err = decode(b"not gzip".to_vec(), &[Coding::Gzip]).unwrap_err();
        assert!(err.to_string().contains("Gzip"));
    }

    #[test]
    fn test_empty_chain_is_passthrough() {
        assert_eq!(decode(HTML.to_vec(), &[]).unwrap(), HTML);
    }
}
