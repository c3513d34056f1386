//! `facteur <numéros>` — one-shot tracking lookup.
//!
//! Fetches the given tracking numbers and prints the report to stdout.
//! Per-identifier failures are part of the report, so the process still
//! exits 0 when every block is a failure block; only fatal conditions
//! (no usable response, malformed payload, invalid endpoint) exit 1,
//! printed to stderr by `main`.

use std::io::Write;

use crate::cli::TrackArgs;
use crate::client::{ClientConfig, TrackingClient};
use crate::error::FacteurError;
use crate::logging;
use crate::output::{self, Mode, Palette};

pub async fn execute(ids: &[String], args: &TrackArgs) -> Result<(), FacteurError> {
    logging::init_cli();

    let client = TrackingClient::new(ClientConfig {
        api_key: args.api_key.clone(),
        endpoint: args.endpoint.clone(),
        relay_attribution: false,
    });

    let batch = client.fetch(ids).await?;

    if args.raw {
        // Byte-identical passthrough, never re-serialized.
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&batch.raw)?;
        stdout.flush()?;
        return Ok(());
    }

    let palette = Palette::new(!args.no_color);

    if args.api_key.is_some() {
        println!(
            "{}\n",
            palette.context.apply_to(
                "Appel direct à l'API suivis postaux via la clef d'API passée en paramètre."
            )
        );
    }

    let mode = if args.full { Mode::Full } else { Mode::Basic };
    let report = output::render_batch(batch.results, ids, mode, &palette);
    println!("\n{report}\n");

    Ok(())
}
