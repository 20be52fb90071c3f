//! namumark CLI - wiki markup to HTML.

use std::io::{self, Read, Write};

use namumark::{MemorySource, Options, ParseContext};

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Simple usage: read from stdin or file
    let input = if args.len() > 1 && args[1] != "-" {
        std::fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    // Standalone rendering: no page store, so every link is dangling and
    // inclusions resolve to inert markers.
    let store = MemorySource::new();
    let mut ctx = ParseContext::new(None, &store, Options::default());
    let html = namumark::to_html(&input, &mut ctx);
    io::stdout().write_all(html.as_bytes())?;

    Ok(())
}
