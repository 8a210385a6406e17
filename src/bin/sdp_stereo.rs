//! SDP stereo munger
//!
//! Reads a session description on stdin and writes it back with Opus
//! stereo enabled.
//!
//! ```text
//! sdp-stereo [--config PATH] < offer.sdp
//! sdp-stereo --mirror remote_offer.sdp < local_answer.sdp
//! ```

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rtc_audio_store::{config::AppConfig, sdp};

struct Args {
    config: Option<PathBuf>,
    mirror: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        mirror: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = Some(iter.next().context("--config needs a path")?.into()),
            "--mirror" => args.mirror = Some(iter.next().context("--mirror needs a path")?.into()),
            other => bail!("Unknown argument: {other}"),
        }
    }
    Ok(args)
}

/// Accept `\n`-separated input from files edited by hand
fn normalize(text: &str) -> String {
    if text.contains(sdp::LINE_SEPARATOR) {
        text.to_owned()
    } else {
        text.replace('\n', sdp::LINE_SEPARATOR)
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the SDP
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args()?;
    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read SDP from stdin")?;
    let local = normalize(&input);

    let output = match args.mirror {
        Some(path) => {
            let remote = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read remote offer {}", path.display()))?;
            tracing::info!(remote = %path.display(), "Mirroring remote stereo capability");
            sdp::mirror_stereo(&normalize(&remote), &local)
        }
        None if config.sdp.enable_stereo => sdp::enable_stereo(&local),
        None => {
            tracing::info!("Stereo disabled in configuration, passing SDP through");
            local
        }
    };

    std::io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write SDP")?;
    Ok(())
}
