//! Simple CLI that reads HTML from stdin and prints the parsed
//! microformats as indented JSON.
//!
//! An optional first argument supplies the base URL for relative URL
//! resolution: `parse_stdin http://example.com/ < page.html`

use std::io::{self, Read};

use url::Url;

fn main() {
    let base_url = std::env::args().nth(1).and_then(|arg| {
        let parsed = Url::parse(&arg);
        if parsed.is_err() {
            eprintln!("Ignoring unparseable base URL: {arg}");
        }
        parsed.ok()
    });

    let mut html = Vec::new();
    if io::stdin().read_to_end(&mut html).is_err() {
        eprintln!("Failed to read from stdin");
        std::process::exit(1);
    }

    let data = rs_microformats::parse_bytes(&html, base_url.as_ref());

    println!(
        "{}",
        serde_json::to_string_pretty(&data).unwrap_or_default()
    );
}
