#![deny(warnings, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use mapty::cli::{Cli, Cmd};
use mapty::error::PositionError;
use mapty::position::{FixedPosition, GpxPosition, NoPositioning, PositionProvider, with_timeout};
use mapty::session::{Session, SessionConfig};
use mapty::storage::{FileStore, WorkoutStore};
use mapty::terminal::TerminalView;
use mapty::types::{Coordinates, WorkoutId};
use mapty::view::{ViewEvent, WorkoutForm};
use mapty::{dlog, utils};
use std::io;
use std::time::Duration;

/// Position source picked from the command line.
enum CliPosition {
    Fixed(FixedPosition),
    Gpx(GpxPosition),
    Unavailable(NoPositioning),
}

impl CliPosition {
    fn from_cli(cli: &Cli) -> Self {
        match (&cli.gpx, cli.lat, cli.lng) {
            (Some(path), _, _) => Self::Gpx(GpxPosition::new(path)),
            (None, Some(lat), Some(lng)) => Self::Fixed(FixedPosition(Coordinates::new(lat, lng))),
            _ => Self::Unavailable(NoPositioning),
        }
    }
}

impl PositionProvider for CliPosition {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        match self {
            Self::Fixed(p) => p.current_position().await,
            Self::Gpx(p) => p.current_position().await,
            Self::Unavailable(p) => p.current_position().await,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let dir = cli.store.clone().unwrap_or_else(FileStore::default_dir);
    let backend =
        FileStore::open(&dir).with_context(|| format!("opening store: {}", dir.display()))?;
    dlog!("store={}", dir.display());

    let position = with_timeout(
        CliPosition::from_cli(&cli),
        Duration::from_secs(cli.position_timeout),
    );
    let config = SessionConfig {
        zoom_level: cli.zoom,
    };

    let (show_map, show_entries) = match &cli.cmd {
        Cmd::List { details } => (*details, true),
        Cmd::Add { .. } | Cmd::Reset => (false, false),
        Cmd::Focus { .. } => (true, false),
    };
    let view = TerminalView::new(io::stdout(), show_map, show_entries);
    let mut session = Session::new(view, WorkoutStore::new(backend), config);

    match cli.cmd {
        Cmd::List { .. } => {
            // Without a position the list is still useful; the failure was already shown.
            if session.start(&position).await.is_err() {
                dlog!("listing without a map");
            }
            if session.workouts().is_empty() {
                tracing::info!("no workouts stored yet");
            }
        }
        Cmd::Add {
            kind,
            at,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            session
                .start(&position)
                .await
                .context("a current position is needed to open the map (use --lat/--lng or --gpx)")?;

            let form = WorkoutForm {
                kind,
                distance_km: distance,
                duration_min: duration,
                cadence: cadence.unwrap_or(0.0),
                elevation_gain_m: elevation.unwrap_or(0.0),
            };
            session.handle(ViewEvent::KindChanged(kind));
            session.handle(ViewEvent::MapClicked(at));
            let id = session.submit(&form).context("workout not recorded")?;
            println!("{id}");
        }
        Cmd::Focus { id } => {
            session
                .start(&position)
                .await
                .context("a current position is needed to open the map (use --lat/--lng or --gpx)")?;

            let id = WorkoutId::from(id);
            if !session.list_entry_clicked(&id) {
                bail!("No workout with id {id}. Run `mapty list` to see stored ids.");
            }
        }
        Cmd::Reset => {
            session.reset();
            println!("all workouts deleted");
        }
    }

    Ok(())
}
