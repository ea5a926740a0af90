use crate::types::{Coordinates, WorkoutKind};
use crate::utils::parse_coordinates;
use crate::view::DEFAULT_ZOOM;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log geotagged running and cycling workouts and find them again on the map"
)]
pub struct Cli {
    /// Directory holding the workout store.
    ///
    /// Default: the platform data directory (e.g. ~/.local/share/mapty).
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Current latitude (with --lng).
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Current longitude (with --lat).
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Take the current position from the last point of a GPX track.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["lat", "lng"])]
    pub gpx: Option<PathBuf>,

    /// Map zoom level used when centering.
    #[arg(long, default_value_t = DEFAULT_ZOOM)]
    pub zoom: u8,

    /// Seconds to wait for a position before giving up.
    #[arg(long, default_value_t = 10)]
    pub position_timeout: u64,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Show every stored workout.
    List {
        /// Also print the map center and one marker line per workout.
        #[arg(long)]
        details: bool,
    },

    /// Record a workout at a point on the map.
    Add {
        /// Workout type: running or cycling.
        #[arg(long = "type", default_value = "running")]
        kind: WorkoutKind,

        /// Where the workout happened, as LAT,LNG.
        #[arg(long, value_parser = parse_coordinates, allow_hyphen_values = true)]
        at: Coordinates,

        /// Distance in km.
        #[arg(long, allow_hyphen_values = true)]
        distance: f64,

        /// Duration in minutes.
        #[arg(long, allow_hyphen_values = true)]
        duration: f64,

        /// Steps per minute (running).
        #[arg(long, allow_hyphen_values = true)]
        cadence: Option<f64>,

        /// Elevation gain in meters (cycling).
        #[arg(long, allow_hyphen_values = true)]
        elevation: Option<f64>,
    },

    /// Move the map to a workout and count the visit.
    Focus {
        /// Workout id as shown by `list`.
        id: String,
    },

    /// Delete all stored workouts.
    Reset,
}
