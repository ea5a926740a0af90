//! Test doubles for driving a session without a real front end.

#![allow(dead_code)]

use mapty::storage::KeyValueStore;
use mapty::types::Coordinates;
use mapty::view::{FormField, ListEntry, MapView, Marker, Notice};
use std::io;

/// Everything a session asked the view to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CenterOn(Coordinates, u8),
    Clear,
    PanTo(Coordinates, u8),
    PlaceMarker(Marker),
    ShowForm(FormField),
    HideForm,
    ToggleInputs(Vec<FormField>),
    ListEntry(ListEntry),
    Notify(Notice),
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub calls: Vec<Call>,
}

impl RecordingView {
    /// Calls recorded since the last `Call::Clear`, or all of them.
    pub fn since_clear(&self) -> &[Call] {
        let start = self
            .calls
            .iter()
            .rposition(|c| *c == Call::Clear)
            .map_or(0, |i| i + 1);
        &self.calls[start..]
    }

    pub fn markers(&self) -> Vec<&Marker> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::PlaceMarker(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn entries(&self) -> Vec<&ListEntry> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::ListEntry(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<&Notice> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }
}

impl MapView for RecordingView {
    fn center_on(&mut self, at: Coordinates, zoom: u8) {
        self.calls.push(Call::CenterOn(at, zoom));
    }

    fn clear(&mut self) {
        self.calls.push(Call::Clear);
    }

    fn pan_to(&mut self, at: Coordinates, zoom: u8) {
        self.calls.push(Call::PanTo(at, zoom));
    }

    fn place_marker(&mut self, marker: &Marker) {
        self.calls.push(Call::PlaceMarker(marker.clone()));
    }

    fn show_form(&mut self, focus: FormField) {
        self.calls.push(Call::ShowForm(focus));
    }

    fn hide_form(&mut self) {
        self.calls.push(Call::HideForm);
    }

    fn toggle_input_visibility(&mut self, fields: &[FormField]) {
        self.calls.push(Call::ToggleInputs(fields.to_vec()));
    }

    fn render_list_entry(&mut self, entry: &ListEntry) {
        self.calls.push(Call::ListEntry(entry.clone()));
    }

    fn notify(&mut self, notice: &Notice) {
        self.calls.push(Call::Notify(notice.clone()));
    }
}

/// A store whose writes always fail; reads see nothing.
#[derive(Debug, Default)]
pub struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }

    fn remove(&mut self, _key: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
}

pub const HOME: Coordinates = Coordinates::new(38.7223, -9.1393);
pub const PARK: Coordinates = Coordinates::new(38.7369, -9.1427);
