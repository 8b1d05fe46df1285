use clap::Parser;
use color_eyre::Result;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing::Subscriber;
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::Catalog;
use crate::discovery::discover_all;
use crate::provider::{aws, gcp};
use crate::session::{Session, Submission};

mod catalog;
mod cli;
mod config;
mod connector;
mod discovery;
mod error;
mod model;
mod prompt;
mod provider;
mod search;
mod session;
mod theme;
pub mod tui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;

    let args = cli::Args::parse();
    let mut config = config::load(args.config.as_deref())?;
    config.apply_cli_args(&args);

    let eks = aws::discover(&config.aws);
    let gke = gcp::discover(&config.gcp.projects);
    let discovered = match discover_all(eks, gke).await {
        Ok(discovered) => discovered,
        Err(err) => {
            for cause in err.errors() {
                error!("{cause}");
            }
            return Err(err.into());
        }
    };

    let catalog = Catalog::build(discovered.eks, discovered.gke);
    if catalog.is_empty() {
        warn!("No clusters found");
    } else {
        info!(clusters = catalog.len(), "Catalog ready");
    }

    let theme = theme::theme_from_name(&config.theme.name);
    match prompt::run(Session::new(catalog), &config.prompt, theme).await {
        Ok(Submission::Connected(key)) => info!(%key, "Connected"),
        Ok(_) => info!("Exiting"),
        Err(err) => {
            error!("{err}");
            return Err(err);
        }
    }

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("k8s-connector").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "k8s-connector.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_filter(env_filter),
        )
        .with(terminal_layer(std::io::stderr))
        .init();

    Ok(guard)
}

/// Compact INFO output for the operator, muted while the prompt owns the screen.
fn terminal_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(writer)
        .with_filter(LevelFilter::INFO)
        .with_filter(filter_fn(|_| !tui::is_active()))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_terminal_layer_is_muted_while_tui_is_active() {
        let buffer = SharedBuffer::default();
        let subscriber = tracing_subscriber::registry().with(terminal_layer(buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            info!("before prompt");
            tui::set_active(true);
            warn!("during prompt");
            tui::set_active(false);
            info!("after prompt");
            tracing::debug!("debug detail");
        });

        let output = buffer.contents();
        assert!(output.contains("before prompt"));
        assert!(output.contains("after prompt"));
        assert!(!output.contains("during prompt"));
        assert!(!output.contains("debug detail"));
    }
}
