//! Shared test utilities for the quickdir test suite.
//!
//! Provides a small item collection covering several categories and a
//! one-shot HTTP server for exercising the fetch and post stages without
//! touching the network.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (base, handle) = serve_once(200, r#"{"entries": []}"#);
//! // ... point a client at `base` ...
//! let request = handle.join().unwrap();
//! assert_eq!(request.method, "GET");
//! ```

use chrono::NaiveDate;
use std::io::Read;
use std::thread::{self, JoinHandle};

use crate::item::Item;

// =========================================================================
// Fixtures
// =========================================================================

fn api(title: &str, description: &str, category: &str, url: &str, auth: &str, cors: &str) -> Item {
    let mut item = Item::new(title, description, category, url);
    item.auth = Some(auth.to_string());
    item.https = Some(true);
    item.cors = Some(cors.to_string());
    item
}

/// Five items across four categories, sorted by title as the fetch stage
/// would leave them.
pub fn sample_items() -> Vec<Item> {
    vec![
        api(
            "Alpha Vantage",
            "Realtime and historical stock data",
            "Finance",
            "https://www.alphavantage.co/",
            "apiKey",
            "unknown",
        ),
        api(
            "Cat Facts",
            "Daily cat facts",
            "Animals",
            "https://alexwohlbruck.github.io/cat-facts/",
            "None",
            "no",
        ),
        api(
            "Dog API",
            "Based on the Stanford Dogs Dataset",
            "Animals",
            "https://dog.ceo/dog-api/",
            "None",
            "yes",
        ),
        api(
            "Open Library",
            "Books, book covers and related data",
            "Books",
            "https://openlibrary.org/developers/api",
            "None",
            "no",
        ),
        api(
            "OpenWeatherMap",
            "Weather forecasts and history",
            "Weather",
            "https://openweathermap.org/api",
            "apiKey",
            "unknown",
        ),
    ]
}

/// Fixed build date used across tests.
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

// =========================================================================
// One-shot HTTP server
// =========================================================================

/// What the one-shot server received.
#[derive(Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Serve exactly one request with `status` and a JSON `body`.
///
/// Returns the server's base URL (`http://127.0.0.1:<port>`) and a handle
/// that yields the captured request once it has been answered.
pub fn serve_once(status: u16, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let body = body.to_string();

    let handle = thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut content = String::new();
        request.as_reader().read_to_string(&mut content).unwrap();
        let captured = CapturedRequest {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|h| (h.field.to_string(), h.value.to_string()))
                .collect(),
            body: content,
        };
        let response = tiny_http::Response::from_string(body)
            .with_status_code(status)
            .with_header(
                tiny_http::Header::from_bytes("Content-Type", "application/json").unwrap(),
            );
        request.respond(response).unwrap();
        captured
    });

    (format!("http://{addr}"), handle)
}

/// A local URL nothing is listening on.
pub fn unused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
