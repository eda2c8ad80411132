//! Outbound HTTP notifications.
//!
//! [`HttpNotifier`] implements [`NotifyPort`] on top of any [`HttpPost`]
//! transport.  Each notification is one synchronous, empty-body POST:
//!
//! ```text
//!   open ─▶ send request ─▶ read status + Content-Length ─▶ drain ≤ 2 KiB ─▶ release
//! ```
//!
//! Nothing is retried.  Every failure is logged and reported as a
//! [`NotifyOutcome::Failed`]; the connection is released on every path.

use log::{info, warn};

use crate::app::ports::{NotifyOutcome, NotifyPort};
use crate::error::CommsError;

/// Upper bound on how much of a response body is read back.
pub const RESPONSE_BUFFER_LEN: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_length: Option<u64>,
    /// Bytes actually drained into the response buffer.
    pub body_len: usize,
}

/// One-shot POST transport.
pub trait HttpPost {
    /// POST an empty body to `url`, reading at most `body.len()` bytes of
    /// the response into `body`.  The connection must be closed before
    /// returning, on success and on error.
    fn post(&mut self, url: &str, body: &mut [u8]) -> Result<HttpResponse, CommsError>;
}

/// Transport for builds without a network stack.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHttpPost;

impl HttpPost for NullHttpPost {
    fn post(&mut self, _url: &str, _body: &mut [u8]) -> Result<HttpResponse, CommsError> {
        Err(CommsError::NoTransport)
    }
}

pub struct HttpNotifier<T> {
    transport: T,
    buffer: [u8; RESPONSE_BUFFER_LEN],
    sent: u32,
    failed: u32,
}

impl<T: HttpPost> HttpNotifier<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buffer: [0; RESPONSE_BUFFER_LEN],
            sent: 0,
            failed: 0,
        }
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: HttpPost> NotifyPort for HttpNotifier<T> {
    fn notify(&mut self, url: &str) -> NotifyOutcome {
        match self.transport.post(url, &mut self.buffer) {
            Ok(resp) => {
                self.sent += 1;
                info!(
                    "http: POST {} -> {} (content_length={:?}, read={})",
                    url, resp.status, resp.content_length, resp.body_len
                );
                NotifyOutcome::Delivered {
                    status: resp.status,
                    content_length: resp.content_length,
                }
            }
            Err(e) => {
                self.failed += 1;
                warn!("http: POST {} failed: {}", url, e);
                NotifyOutcome::Failed(e)
            }
        }
    }
}

// ── ESP-IDF transport ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::EspHttpPost;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

    use super::{HttpPost, HttpResponse};
    use crate::error::CommsError;

    /// Uses the client's default configuration (and so its default timeout).
    #[derive(Debug, Default)]
    pub struct EspHttpPost;

    impl EspHttpPost {
        pub fn new() -> Self {
            Self
        }
    }

    impl HttpPost for EspHttpPost {
        fn post(&mut self, url: &str, body: &mut [u8]) -> Result<HttpResponse, CommsError> {
            // The connection is dropped (and the client cleaned up) on every
            // return path below.
            let mut conn =
                EspHttpConnection::new(&Configuration::default()).map_err(|_| CommsError::RequestFailed)?;

            conn.initiate_request(Method::Post, url, &[("Content-Length", "0")])
                .map_err(|_| CommsError::RequestFailed)?;
            conn.initiate_response().map_err(|_| CommsError::ResponseFailed)?;

            let status = conn.status();
            let content_length = conn.header("Content-Length").and_then(|v| v.parse().ok());

            let mut body_len = 0;
            while body_len < body.len() {
                match conn.read(&mut body[body_len..]) {
                    Ok(0) => break,
                    Ok(n) => body_len += n,
                    Err(_) => return Err(CommsError::ResponseFailed),
                }
            }

            Ok(HttpResponse {
                status,
                content_length,
                body_len,
            })
        }
    }
}
