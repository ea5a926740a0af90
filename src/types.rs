use crate::error::WorkoutError;
use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A point on the map, stored as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    /// Capitalized name used in descriptions.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" | "run" => Ok(Self::Running),
            "cycling" | "ride" => Ok(Self::Cycling),
            other => Err(format!("unknown workout type: {other:?}")),
        }
    }
}

/// Opaque workout identifier; joins list entries and markers to their workout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkoutId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WorkoutId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Variant-specific input supplied when a workout is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Details {
    Running { cadence: u32 },
    Cycling { elevation_gain_m: f64 },
}

impl Details {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// Variant-specific data together with the metric derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metrics {
    /// `pace` in min/km.
    Running { cadence: u32, pace: f64 },
    /// `speed` in km/h.
    Cycling { elevation_gain_m: f64, speed: f64 },
}

impl Metrics {
    fn derive(details: Details, distance_km: f64, duration_min: f64) -> Self {
        match details {
            Details::Running { cadence } => Self::Running {
                cadence,
                pace: duration_min / distance_km,
            },
            Details::Cycling { elevation_gain_m } => Self::Cycling {
                elevation_gain_m,
                speed: distance_km / (duration_min / 60.0),
            },
        }
    }

    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    pub const fn details(&self) -> Details {
        match *self {
            Self::Running { cadence, .. } => Details::Running { cadence },
            Self::Cycling {
                elevation_gain_m, ..
            } => Details::Cycling { elevation_gain_m },
        }
    }

    /// Pace for running, speed for cycling.
    pub const fn rate(&self) -> f64 {
        match *self {
            Self::Running { pace, .. } => pace,
            Self::Cycling { speed, .. } => speed,
        }
    }

    pub const fn rate_unit(&self) -> &'static str {
        match self {
            Self::Running { .. } => "min/km",
            Self::Cycling { .. } => "km/h",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    click_count: u32,
    description: String,
    metrics: Metrics,
}

impl Workout {
    /// Builds a workout stamped with the current local time.
    pub fn create(
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        details: Details,
    ) -> Result<Self, WorkoutError> {
        Self::create_at(Local::now(), coordinates, distance_km, duration_min, details)
    }

    pub fn create_at(
        created_at: DateTime<Local>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        details: Details,
    ) -> Result<Self, WorkoutError> {
        let distance_km = check_metric("distance", distance_km)?;
        let duration_min = check_metric("duration", duration_min)?;
        let details = check_details(details)?;

        Ok(Self {
            id: WorkoutId::generate(),
            created_at: created_at.with_timezone(&Utc),
            coordinates,
            distance_km,
            duration_min,
            click_count: 0,
            description: describe_date(details.kind(), &created_at),
            metrics: Metrics::derive(details, distance_km, duration_min),
        })
    }

    /// Rebuilds a previously stored workout. Derived metrics are recomputed;
    /// a stored description is kept as-is.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        click_count: u32,
        description: Option<String>,
        details: Details,
    ) -> Result<Self, WorkoutError> {
        let distance_km = check_metric("distance", distance_km)?;
        let duration_min = check_metric("duration", duration_min)?;
        let details = check_details(details)?;
        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| {
                describe_date(details.kind(), &created_at.with_timezone(&Local))
            });

        Ok(Self {
            id,
            created_at,
            coordinates,
            distance_km,
            duration_min,
            click_count,
            description,
            metrics: Metrics::derive(details, distance_km, duration_min),
        })
    }

    pub const fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub const fn click_count(&self) -> u32 {
        self.click_count
    }

    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.metrics.kind()
    }

    /// The label computed at construction, e.g. "Running on April 14".
    pub fn describe(&self) -> &str {
        &self.description
    }

    pub const fn pace(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Running { pace, .. } => Some(pace),
            Metrics::Cycling { .. } => None,
        }
    }

    pub const fn speed(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Cycling { speed, .. } => Some(speed),
            Metrics::Running { .. } => None,
        }
    }

    pub fn register_interaction(&mut self) {
        self.click_count = self.click_count.saturating_add(1);
    }
}

fn check_metric(field: &'static str, value: f64) -> Result<f64, WorkoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(WorkoutError::InvalidMetric { field, value })
    }
}

/// Cadence must be non-zero; elevation gain finite and not negative.
fn check_details(details: Details) -> Result<Details, WorkoutError> {
    match details {
        Details::Running { cadence: 0 } => Err(WorkoutError::InvalidDetail {
            field: "cadence",
            value: 0.0,
        }),
        Details::Cycling { elevation_gain_m }
            if !(elevation_gain_m.is_finite() && elevation_gain_m >= 0.0) =>
        {
            Err(WorkoutError::InvalidDetail {
                field: "elevation gain",
                value: elevation_gain_m,
            })
        }
        d => Ok(d),
    }
}

/// "<Kind> on <Month> <day>".
pub fn describe_date(kind: WorkoutKind, date: &impl Datelike) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} on {month} {}", kind.label(), date.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn april_14() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 4, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_running_pace() {
        let run = Workout::create_at(
            april_14(),
            Coordinates::new(39.0, -12.0),
            5.2,
            24.0,
            Details::Running { cadence: 178 },
        )
        .unwrap();

        assert_eq!(run.kind(), WorkoutKind::Running);
        assert_eq!(run.pace(), Some(24.0 / 5.2));
        assert!((run.pace().unwrap() - 4.615).abs() < 1e-3);
        assert_eq!(run.speed(), None);
        assert_eq!(run.describe(), "Running on April 14");
    }

    #[test]
    fn test_cycling_speed() {
        let ride = Workout::create_at(
            april_14(),
            Coordinates::new(39.0, -12.0),
            27.0,
            95.0,
            Details::Cycling {
                elevation_gain_m: 523.0,
            },
        )
        .unwrap();

        assert_eq!(ride.kind(), WorkoutKind::Cycling);
        assert_eq!(ride.speed(), Some(27.0 / (95.0 / 60.0)));
        assert_eq!(ride.metrics().rate_unit(), "km/h");
        assert_eq!(ride.describe(), "Cycling on April 14");
    }

    #[test]
    fn test_create_rejects_non_positive_metrics() {
        let c = Coordinates::new(0.0, 0.0);
        let d = Details::Running { cadence: 170 };

        assert!(matches!(
            Workout::create(c, 0.0, 10.0, d),
            Err(WorkoutError::InvalidMetric {
                field: "distance",
                ..
            })
        ));
        assert!(matches!(
            Workout::create(c, 3.0, -1.0, d),
            Err(WorkoutError::InvalidMetric {
                field: "duration",
                ..
            })
        ));
        assert!(Workout::create(c, f64::NAN, 10.0, d).is_err());
    }

    #[test]
    fn test_create_rejects_bad_details() {
        let c = Coordinates::new(0.0, 0.0);

        assert!(matches!(
            Workout::create(c, 5.0, 25.0, Details::Running { cadence: 0 }),
            Err(WorkoutError::InvalidDetail {
                field: "cadence",
                ..
            })
        ));
        for elevation_gain_m in [-50.0, f64::NAN] {
            assert!(matches!(
                Workout::create(c, 27.0, 95.0, Details::Cycling { elevation_gain_m }),
                Err(WorkoutError::InvalidDetail {
                    field: "elevation gain",
                    ..
                })
            ));
        }
        assert!(Workout::create(c, 27.0, 95.0, Details::Cycling { elevation_gain_m: 0.0 }).is_ok());
    }

    #[test]
    fn test_register_interaction_increments_by_one() {
        let mut run = Workout::create(
            Coordinates::new(1.0, 2.0),
            3.0,
            15.0,
            Details::Running { cadence: 160 },
        )
        .unwrap();
        assert_eq!(run.click_count(), 0);

        run.register_interaction();
        run.register_interaction();
        run.register_interaction();
        assert_eq!(run.click_count(), 3);
    }

    #[test]
    fn test_ids_are_distinct() {
        let c = Coordinates::new(1.0, 2.0);
        let d = Details::Running { cadence: 160 };
        let a = Workout::create(c, 3.0, 15.0, d).unwrap();
        let b = Workout::create(c, 3.0, 15.0, d).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_describe_every_month() {
        for (i, name) in MONTHS.iter().enumerate() {
            let month = u32::try_from(i).unwrap() + 1;
            let date = chrono::NaiveDate::from_ymd_opt(2026, month, 1).unwrap();
            assert_eq!(
                describe_date(WorkoutKind::Cycling, &date),
                format!("Cycling on {name} 1")
            );
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Running".parse::<WorkoutKind>(), Ok(WorkoutKind::Running));
        assert_eq!(" cycling ".parse::<WorkoutKind>(), Ok(WorkoutKind::Cycling));
        assert!("swimming".parse::<WorkoutKind>().is_err());
    }

    #[test]
    fn test_coordinates_serialize_as_pair() {
        let json = serde_json::to_string(&Coordinates::new(38.7, -9.1)).unwrap();
        assert_eq!(json, "[38.7,-9.1]");
        let back: Coordinates = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Coordinates::new(38.7, -9.1));
    }
}
