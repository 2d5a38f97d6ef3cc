//! # media-atlas CLI
//!
//! Command-line interface for the media indexer.
//!
//! ## Usage
//! ```bash
//! media-atlas scan ~/Pictures
//! media-atlas analyze --threshold 8 --output json
//! media-atlas stats
//! ```

mod cli;

use media_atlas::Result;

fn main() -> Result<()> {
    cli::run()
}
