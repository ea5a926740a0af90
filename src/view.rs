//! The map/view boundary: what the session asks a front end to draw, and
//! the events a front end feeds back.

use crate::types::{Coordinates, Metrics, Workout, WorkoutId, WorkoutKind};
use std::fmt;

pub const DEFAULT_ZOOM: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

/// Form rows shown for a workout type.
pub const fn visible_fields(kind: WorkoutKind) -> &'static [FormField] {
    match kind {
        WorkoutKind::Running => &[FormField::Distance, FormField::Duration, FormField::Cadence],
        WorkoutKind::Cycling => &[
            FormField::Distance,
            FormField::Duration,
            FormField::Elevation,
        ],
    }
}

/// Raw numbers as read from the input form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutForm {
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub cadence: f64,
    pub elevation_gain_m: f64,
}

impl WorkoutForm {
    pub const fn running(distance_km: f64, duration_min: f64, cadence: f64) -> Self {
        Self {
            kind: WorkoutKind::Running,
            distance_km,
            duration_min,
            cadence,
            elevation_gain_m: 0.0,
        }
    }

    pub const fn cycling(distance_km: f64, duration_min: f64, elevation_gain_m: f64) -> Self {
        Self {
            kind: WorkoutKind::Cycling,
            distance_km,
            duration_min,
            cadence: 0.0,
            elevation_gain_m,
        }
    }
}

/// Input raised by the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    MapClicked(Coordinates),
    KindChanged(WorkoutKind),
    FormSubmitted(WorkoutForm),
    ListEntryClicked(WorkoutId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: WorkoutId,
    pub coordinates: Coordinates,
    pub popup: String,
    pub style_class: String,
}

impl Marker {
    pub fn for_workout(w: &Workout) -> Self {
        Self {
            id: w.id().clone(),
            coordinates: w.coordinates(),
            popup: format!("{} {}", w.kind().icon(), w.describe()),
            style_class: format!("{}-popup", w.kind()),
        }
    }
}

/// One displayed statistic: icon, formatted value, unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Stat {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: WorkoutId,
    pub kind: WorkoutKind,
    pub title: String,
    pub stats: Vec<Stat>,
}

impl ListEntry {
    pub fn for_workout(w: &Workout) -> Self {
        let metrics = w.metrics();
        let mut stats = vec![
            Stat::new(w.kind().icon(), w.distance_km().to_string(), "km"),
            Stat::new("⏱", w.duration_min().to_string(), "min"),
            Stat::new("⚡️", format!("{:.1}", metrics.rate()), metrics.rate_unit()),
        ];
        stats.push(match *metrics {
            Metrics::Running { cadence, .. } => Stat::new("🦶🏼", cadence.to_string(), "spm"),
            Metrics::Cycling {
                elevation_gain_m, ..
            } => Stat::new("⛰", elevation_gain_m.to_string(), "m"),
        });

        Self {
            id: w.id().clone(),
            kind: w.kind(),
            title: w.describe().to_string(),
            stats,
        }
    }
}

/// Messages surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PositionUnavailable(String),
    InvalidInput(String),
    SaveFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PositionUnavailable(why) => write!(f, "Could not get your position! ({why})"),
            Self::InvalidInput(why) => write!(f, "Inputs have to be positive numbers! ({why})"),
            Self::SaveFailed(why) => write!(f, "Workouts could not be saved: {why}"),
        }
    }
}

/// Rendering capabilities the session needs from a front end.
pub trait MapView {
    fn center_on(&mut self, at: Coordinates, zoom: u8);

    /// Removes every marker and list entry drawn so far.
    fn clear(&mut self);

    /// Animated move to a workout; defaults to a plain recenter.
    fn pan_to(&mut self, at: Coordinates, zoom: u8) {
        self.center_on(at, zoom);
    }

    fn place_marker(&mut self, marker: &Marker);
    fn show_form(&mut self, focus: FormField);
    fn hide_form(&mut self);
    fn toggle_input_visibility(&mut self, fields: &[FormField]);
    fn render_list_entry(&mut self, entry: &ListEntry);
    fn notify(&mut self, notice: &Notice);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Details;
    use chrono::{Local, TimeZone};

    fn run() -> Workout {
        Workout::create_at(
            Local.with_ymd_and_hms(2026, 4, 14, 9, 30, 0).unwrap(),
            Coordinates::new(39.0, -12.0),
            5.2,
            24.0,
            Details::Running { cadence: 171 },
        )
        .unwrap()
    }

    #[test]
    fn test_marker_popup_and_class() {
        let m = Marker::for_workout(&run());
        assert_eq!(m.popup, "🏃‍♂️ Running on April 14");
        assert_eq!(m.style_class, "running-popup");
        assert_eq!(m.coordinates, Coordinates::new(39.0, -12.0));
    }

    #[test]
    fn test_list_entry_shows_real_cadence() {
        let entry = ListEntry::for_workout(&run());
        assert_eq!(entry.title, "Running on April 14");
        assert_eq!(entry.stats.len(), 4);
        assert_eq!(entry.stats[2].value, "4.6");
        assert_eq!(entry.stats[2].unit, "min/km");
        assert_eq!(entry.stats[3].value, "171");
        assert_eq!(entry.stats[3].unit, "spm");
    }

    #[test]
    fn test_visible_fields_per_kind() {
        assert!(visible_fields(WorkoutKind::Running).contains(&FormField::Cadence));
        assert!(!visible_fields(WorkoutKind::Running).contains(&FormField::Elevation));
        assert!(visible_fields(WorkoutKind::Cycling).contains(&FormField::Elevation));
    }
}
