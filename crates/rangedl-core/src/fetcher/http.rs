//! curl-backed range source.

use crate::planner::PartSpec;

use super::{PartFetchError, RangeSource};

/// Issues one `GET` with an inclusive `Range: bytes=start-end` header per part.
///
/// No timeouts are configured: a request that never completes holds its
/// admission permit until it does.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRangeSource;

impl RangeSource for HttpRangeSource {
    fn fetch(&self, url: &str, part: &PartSpec) -> Result<Vec<u8>, PartFetchError> {
        let expected = part.len();
        let mut body: Vec<u8> = Vec::with_capacity(expected.min(64 * 1024 * 1024) as usize);
        let mut received = 0u64;

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;

        let mut headers = curl::easy::List::new();
        headers.append(&format!("Range: {}", part.range_header_value()))?;
        easy.http_headers(headers)?;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                received += data.len() as u64;
                // Stop reading once the body outgrows the range instead of
                // buffering a whole resource from a server that ignored Range.
                if received > expected {
                    return Ok(0);
                }
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()
        };

        let overflowed = received > expected;
        if let Err(e) = performed {
            if !(overflowed && e.is_write_error()) {
                return Err(PartFetchError::Transport(e));
            }
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(PartFetchError::Status(code));
        }
        if overflowed {
            return Err(PartFetchError::LengthMismatch { expected, received });
        }
        Ok(body)
    }
}
