use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use std::time::{Duration, Instant};

/// Aggregate routes fan out to the upstream; anything slower than this is worth a warning.
const SLOW_REQUEST: Duration = Duration::from_secs(30);

/// Fairing to log one line per HTTP request with timing
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(Instant::now);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let duration = request.local_cache(Instant::now).elapsed();
        let method = request.method();
        let uri = request.uri();
        let status = response.status();
        let millis = duration.as_secs_f64() * 1000.0;

        if duration >= SLOW_REQUEST {
            log::warn!("{} {} -> {} ({:.2}ms, slow)", method, uri, status.code, millis);
        } else {
            log::info!("{} {} -> {} ({:.2}ms)", method, uri, status.code, millis);
        }
    }
}
