//! The session controller.
//!
//! A [`Session`] owns the in-memory workout collection and drives the
//! click-a-point, fill-the-form, save workflow against a [`MapView`], a
//! [`WorkoutStore`] and a [`PositionProvider`].

use crate::dlog;
use crate::error::{PositionError, ValidationError};
use crate::position::PositionProvider;
use crate::storage::{KeyValueStore, WorkoutStore};
use crate::types::{Coordinates, Details, Workout, WorkoutId, WorkoutKind};
use crate::view::{
    DEFAULT_ZOOM, FormField, ListEntry, MapView, Marker, Notice, ViewEvent, WorkoutForm,
    visible_fields,
};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Initializing,
    AwaitingPosition,
    MapReady,
    FormOpen { pending: Coordinates },
}

impl SessionState {
    /// Whether the map has been centered and can take clicks.
    pub const fn has_map(&self) -> bool {
        matches!(self, Self::MapReady | Self::FormOpen { .. })
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub zoom_level: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            zoom_level: DEFAULT_ZOOM,
        }
    }
}

pub struct Session<V, S> {
    view: V,
    store: WorkoutStore<S>,
    config: SessionConfig,
    state: SessionState,
    workouts: Vec<Workout>,
    form_kind: WorkoutKind,
}

impl<V: MapView, S: KeyValueStore> Session<V, S> {
    pub const fn new(view: V, store: WorkoutStore<S>, config: SessionConfig) -> Self {
        Self {
            view,
            store,
            config,
            state: SessionState::Initializing,
            workouts: Vec::new(),
            form_kind: WorkoutKind::Running,
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn find(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub const fn view(&self) -> &V {
        &self.view
    }

    pub const fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }

    /// Loads stored workouts, then waits for the position and centers the map.
    ///
    /// Stored workouts get their list entries right away; their markers are
    /// placed once the map exists. A position failure is reported to the
    /// user and leaves the session without a map.
    pub async fn start<P: PositionProvider>(&mut self, position: &P) -> Result<(), PositionError> {
        if self.state != SessionState::Initializing {
            dlog!("start_ignored state={:?}", self.state);
            return Ok(());
        }

        self.state = SessionState::AwaitingPosition;
        let fix = position.current_position();
        self.restore_persisted();

        match fix.await {
            Ok(at) => {
                self.enter_map_ready(at);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(err = %e, "could not get position; map unavailable");
                self.view.notify(&Notice::PositionUnavailable(e.to_string()));
                Err(e)
            }
        }
    }

    fn restore_persisted(&mut self) {
        let mut seen: HashSet<WorkoutId> = HashSet::new();
        for w in self.store.load() {
            if !seen.insert(w.id().clone()) {
                tracing::warn!(id = %w.id(), "skipping stored workout with duplicate id");
                continue;
            }
            self.view.render_list_entry(&ListEntry::for_workout(&w));
            self.workouts.push(w);
        }
        tracing::info!(workouts = self.workouts.len(), "restored stored workouts");
    }

    fn enter_map_ready(&mut self, at: Coordinates) {
        self.view.center_on(at, self.config.zoom_level);
        for w in &self.workouts {
            self.view.place_marker(&Marker::for_workout(w));
        }
        self.state = SessionState::MapReady;
        tracing::info!(at = %at, markers = self.workouts.len(), "map ready");
    }

    /// Routes a front-end event to its handler.
    pub fn handle(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::MapClicked(at) => self.map_clicked(at),
            ViewEvent::KindChanged(kind) => self.kind_changed(kind),
            ViewEvent::FormSubmitted(form) => {
                // Rejections are already reported through the view.
                let _ = self.submit(&form);
            }
            ViewEvent::ListEntryClicked(id) => {
                self.list_entry_clicked(&id);
            }
        }
    }

    /// Opens the form for a new workout at `at`. Ignored without a map.
    pub fn map_clicked(&mut self, at: Coordinates) {
        if !self.state.has_map() {
            dlog!("map_click_ignored state={:?}", self.state);
            return;
        }
        self.state = SessionState::FormOpen { pending: at };
        self.view.show_form(FormField::Distance);
        dlog!("form_open at={at}");
    }

    pub fn kind_changed(&mut self, kind: WorkoutKind) {
        if kind == self.form_kind {
            return;
        }
        self.form_kind = kind;
        self.view.toggle_input_visibility(visible_fields(kind));
    }

    /// Validates the form and records a workout at the pending position.
    ///
    /// On rejection the form stays open with the pending position kept.
    pub fn submit(&mut self, form: &WorkoutForm) -> Result<WorkoutId, ValidationError> {
        let result = self.try_submit(form);
        if let Err(e) = &result {
            tracing::info!(err = %e, "rejected workout input");
            self.view.notify(&Notice::InvalidInput(e.to_string()));
        }
        result
    }

    fn try_submit(&mut self, form: &WorkoutForm) -> Result<WorkoutId, ValidationError> {
        let SessionState::FormOpen { pending } = self.state else {
            return Err(ValidationError::NoPendingPosition);
        };

        let details = validate(form)?;
        let workout = Workout::create(pending, form.distance_km, form.duration_min, details)?;
        let id = workout.id().clone();

        self.view.place_marker(&Marker::for_workout(&workout));
        self.view.render_list_entry(&ListEntry::for_workout(&workout));
        self.view.hide_form();
        tracing::info!(id = %id, kind = %workout.kind(), "recorded {}", workout.describe());

        self.workouts.push(workout);
        self.state = SessionState::MapReady;
        self.persist();

        Ok(id)
    }

    /// Pans to the workout behind a list entry and counts the click.
    /// Returns `false` when nothing matched.
    pub fn list_entry_clicked(&mut self, id: &WorkoutId) -> bool {
        if !self.state.has_map() {
            dlog!("list_click_ignored state={:?}", self.state);
            return false;
        }
        let Some(w) = self.workouts.iter_mut().find(|w| w.id() == id) else {
            dlog!("list_click_unknown id={id}");
            return false;
        };

        w.register_interaction();
        self.view.pan_to(w.coordinates(), self.config.zoom_level);
        self.persist();
        true
    }

    /// Wipes stored and in-memory workouts, clears the view back to an empty
    /// map with a closed running form, and returns to `Initializing`; call
    /// [`Session::start`] again to bring the map back.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(err = %e, "could not clear stored workouts");
            self.view.notify(&Notice::SaveFailed(e.to_string()));
        }
        self.workouts.clear();
        self.view.clear();
        self.view.hide_form();
        self.form_kind = WorkoutKind::Running;
        self.view.toggle_input_visibility(visible_fields(self.form_kind));
        self.state = SessionState::Initializing;
        tracing::info!("session reset");
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.workouts) {
            tracing::warn!(err = %e, "could not save workouts; keeping them in memory");
            self.view.notify(&Notice::SaveFailed(e.to_string()));
        }
    }
}

/// Checks raw form numbers and picks the variant the form asks for.
///
/// Every number must be finite. Distance and duration must be positive,
/// as must cadence for runs; elevation gain for rides may be zero.
pub fn validate(form: &WorkoutForm) -> Result<Details, ValidationError> {
    let extra = match form.kind {
        WorkoutKind::Running => ("cadence", form.cadence),
        WorkoutKind::Cycling => ("elevation gain", form.elevation_gain_m),
    };
    let inputs = [
        ("distance", form.distance_km),
        ("duration", form.duration_min),
        extra,
    ];

    if let Some(&(field, value)) = inputs.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ValidationError::NotFinite { field, value });
    }

    let must_be_positive = match form.kind {
        WorkoutKind::Running => &inputs[..],
        WorkoutKind::Cycling => &inputs[..2],
    };
    if let Some(&(field, value)) = must_be_positive.iter().find(|(_, v)| *v <= 0.0) {
        return Err(ValidationError::NotPositive { field, value });
    }

    match form.kind {
        WorkoutKind::Running => {
            let cadence = form.cadence;
            if cadence.fract() != 0.0 || cadence > f64::from(u32::MAX) {
                return Err(ValidationError::NotWhole {
                    field: "cadence",
                    value: cadence,
                });
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let cadence = cadence as u32;
            Ok(Details::Running { cadence })
        }
        WorkoutKind::Cycling => {
            if form.elevation_gain_m < 0.0 {
                return Err(ValidationError::Negative {
                    field: "elevation gain",
                    value: form.elevation_gain_m,
                });
            }
            Ok(Details::Cycling {
                elevation_gain_m: form.elevation_gain_m,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_reference_run() {
        let details = validate(&WorkoutForm::running(5.2, 24.0, 178.0)).unwrap();
        assert_eq!(details, Details::Running { cadence: 178 });
    }

    #[test]
    fn test_validate_rejects_bad_distance() {
        for d in [0.0, -5.0] {
            let err = validate(&WorkoutForm::running(d, 24.0, 178.0)).unwrap_err();
            assert_eq!(err.field(), Some("distance"));
        }
    }

    #[test]
    fn test_validate_rejects_nan_duration() {
        let err = validate(&WorkoutForm::cycling(10.0, f64::NAN, 100.0)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotFinite {
                field: "duration",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_cadence_rules() {
        assert!(validate(&WorkoutForm::running(5.0, 25.0, 0.0)).is_err());
        assert!(validate(&WorkoutForm::running(5.0, 25.0, f64::INFINITY)).is_err());
        assert!(matches!(
            validate(&WorkoutForm::running(5.0, 25.0, 170.5)),
            Err(ValidationError::NotWhole { .. })
        ));
    }

    #[test]
    fn test_validate_cycling_elevation() {
        assert_eq!(
            validate(&WorkoutForm::cycling(27.0, 95.0, 0.0)).unwrap(),
            Details::Cycling {
                elevation_gain_m: 0.0
            }
        );
        assert!(matches!(
            validate(&WorkoutForm::cycling(27.0, 95.0, -10.0)),
            Err(ValidationError::Negative { .. })
        ));
        // Cadence is irrelevant for rides.
        let mut form = WorkoutForm::cycling(27.0, 95.0, 523.0);
        form.cadence = -1.0;
        assert!(validate(&form).is_ok());
    }
}
