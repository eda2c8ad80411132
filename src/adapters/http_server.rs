//! HTTP command surface (ESP-IDF only).
//!
//! One handler per [`CommandKind`]: `GET /status`, `POST /pulse`, `/dim`,
//! `/position`, `/beam`.  Handlers read the JSON body, pass it to the
//! shared [`CommandService`] and write back its reply.  The service does
//! all decoding and validation; this module is transport only.

use std::sync::{Arc, Mutex, PoisonError};

use esp_idf_svc::http::Method;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::io::{Read, Write};
use log::info;

use crate::adapters::log_sink::LogEventSink;
use crate::app::commands::CommandKind;
use crate::app::ports::{PulseSink, PwmPort};
use crate::app::service::CommandService;
use crate::error::CommsError;

/// Request bodies longer than this are truncated (and then fail to parse).
pub const MAX_BODY_LEN: usize = 512;

pub fn start<P, S>(service: Arc<Mutex<CommandService<P, S>>>) -> Result<EspHttpServer<'static>, CommsError>
where
    P: PwmPort + Send + 'static,
    S: PulseSink + Send + 'static,
{
    let mut server = EspHttpServer::new(&Configuration::default()).map_err(|_| CommsError::ServerStartFailed)?;

    for kind in CommandKind::ALL {
        let method = if kind == CommandKind::Status {
            Method::Get
        } else {
            Method::Post
        };
        let service = Arc::clone(&service);
        server
            .fn_handler::<anyhow::Error, _>(kind.path(), method, move |mut req| {
                let mut body = [0u8; MAX_BODY_LEN];
                let mut len = 0;
                while len < body.len() {
                    let n = req.read(&mut body[len..])?;
                    if n == 0 {
                        break;
                    }
                    len += n;
                }

                let reply = service
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .handle_request(kind.path(), &body[..len], &mut LogEventSink);

                let mut resp = req.into_response(
                    reply.code,
                    None,
                    &[
                        ("Content-Type", "application/json"),
                        ("Access-Control-Allow-Origin", "*"),
                    ],
                )?;
                resp.write_all(reply.body.as_bytes())?;
                Ok(())
            })
            .map_err(|_| CommsError::ServerStartFailed)?;
    }

    info!("http: command surface listening on :80");
    Ok(server)
}
