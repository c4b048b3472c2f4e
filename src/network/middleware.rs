//! Handler middleware
//!
//! Wrappers applied around every `CommandHandler` the server is given:
//! - `RequestLogging`: one span per command carrying a request id, plus a
//!   completion line with status and elapsed time
//! - `Recovery`: turns a panicking handler into an ERROR response

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::protocol::{Command, Response};

use super::CommandHandler;

/// Logs every command with a fresh request id, its status and duration
pub struct RequestLogging {
    inner: Arc<dyn CommandHandler>,
}

impl RequestLogging {
    pub fn new(inner: Arc<dyn CommandHandler>) -> Self {
        Self { inner }
    }
}

impl CommandHandler for RequestLogging {
    fn handle(&self, command: Command) -> Response {
        let request_id = Uuid::new_v4();
        let op = command.command_type();
        let span = tracing::info_span!("command", %request_id, ?op);
        let _guard = span.enter();

        let started = Instant::now();
        let response = self.inner.handle(command);
        let elapsed_us = started.elapsed().as_micros() as u64;

        tracing::info!(status = ?response.status, elapsed_us, "command completed");
        response
    }
}

/// Catches handler panics so a worker keeps serving its connection
pub struct Recovery {
    inner: Arc<dyn CommandHandler>,
}

impl Recovery {
    pub fn new(inner: Arc<dyn CommandHandler>) -> Self {
        Self { inner }
    }
}

impl CommandHandler for Recovery {
    fn handle(&self, command: Command) -> Response {
        match panic::catch_unwind(AssertUnwindSafe(|| self.inner.handle(command))) {
            Ok(response) => response,
            Err(payload) => {
                tracing::error!(panic = %panic_message(payload.as_ref()), "command handler panicked");
                Response::error("internal server error")
            }
        }
    }
}

/// Full middleware stack, outermost first
pub fn wrap(handler: Arc<dyn CommandHandler>) -> Arc<dyn CommandHandler> {
    Arc::new(RequestLogging::new(Arc::new(Recovery::new(handler))))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Status;
    use parking_lot::Mutex;
    use std::io;

    struct Pong;

    impl CommandHandler for Pong {
        fn handle(&self, command: Command) -> Response {
            match command {
                Command::Ping => Response::json("PONG").unwrap(),
                _ => panic!("unsupported command"),
            }
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged<F: FnOnce()>(f: F) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_each_command_logged_with_request_id_and_status() {
        let handler = wrap(Arc::new(Pong));

        let output = logged(|| {
            assert_eq!(handler.handle(Command::Ping).status, Status::Ok);
            assert_eq!(handler.handle(Command::Ping).status, Status::Ok);
        });

        let lines: Vec<&str> = output
            .lines()
            .filter(|l| l.contains("command completed"))
            .collect();
        assert_eq!(lines.len(), 2);

        let ids: Vec<&str> = lines
            .iter()
            .map(|l| {
                let start = l.find("request_id=").unwrap() + "request_id=".len();
                &l[start..start + 36]
            })
            .collect();
        assert_ne!(ids[0], ids[1]);

        for line in lines {
            assert!(line.contains("op=Ping"));
            assert!(line.contains("status=Ok"));
            assert!(line.contains("elapsed_us="));
        }
    }

    #[test]
    fn test_panic_becomes_error_response() {
        let handler = wrap(Arc::new(Pong));

        let output = logged(|| {
            let response = handler.handle(Command::GetPost { id: "post-1".into() });
            assert_eq!(response.status, Status::Error);
            assert_eq!(response.error_body().unwrap().code, "INTERNAL_ERROR");

            // Still usable afterwards
            assert_eq!(handler.handle(Command::Ping).status, Status::Ok);
        });

        assert!(output.contains("unsupported command"));
        assert!(output.contains("status=Error"));
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");

        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
