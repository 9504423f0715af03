//! Minimal HTTP/1.1 server serving images for integration tests.
//!
//! `GET /img/<anything>` returns a small PNG, `GET /junk/<anything>` returns
//! HTML with status 200, everything else is 404. Every request is counted.

use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Handle to a running server.
pub struct ImageServer {
    /// Base URL without trailing slash, e.g. `http://127.0.0.1:12345`.
    pub base: String,
    hits: Arc<AtomicUsize>,
}

impl ImageServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

pub fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(3, 2, Rgb([10, 120, 200]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Starts the server in a background thread. It runs until the process exits.
pub fn start() -> ImageServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let png = Arc::new(png_bytes());
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            counter.fetch_add(1, Ordering::SeqCst);
            let png = Arc::clone(&png);
            thread::spawn(move || handle(stream, &png));
        }
    });
    ImageServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(mut stream: std::net::TcpStream, png: &[u8]) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    let (status, content_type, body): (&str, &str, &[u8]) = if path.starts_with("/img/") {
        ("200 OK", "image/png", png)
    } else if path.starts_with("/junk/") {
        ("200 OK", "text/html", b"<html>not an image</html>")
    } else {
        ("404 Not Found", "text/plain", b"not found")
    };
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
