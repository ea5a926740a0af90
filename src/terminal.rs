use crate::dlog;
use crate::types::Coordinates;
use crate::view::{FormField, ListEntry, MapView, Marker, Notice};
use std::fmt;
use std::io::Write;

/// Plain-text front end: one line per rendered item.
pub struct TerminalView<W> {
    out: W,
    show_map: bool,
    show_entries: bool,
}

impl<W: Write> TerminalView<W> {
    pub const fn new(out: W, show_map: bool, show_entries: bool) -> Self {
        Self {
            out,
            show_map,
            show_entries,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{line}") {
            tracing::debug!(err = %e, "terminal write failed");
        }
    }
}

impl<W: Write> MapView for TerminalView<W> {
    fn center_on(&mut self, at: Coordinates, zoom: u8) {
        if self.show_map {
            self.emit(format_args!("map\t{at}\tzoom={zoom}"));
        }
    }

    fn clear(&mut self) {
        if self.show_map || self.show_entries {
            self.emit(format_args!("cleared"));
        }
    }

    fn pan_to(&mut self, at: Coordinates, zoom: u8) {
        if self.show_map {
            self.emit(format_args!("pan\t{at}\tzoom={zoom}"));
        }
    }

    fn place_marker(&mut self, marker: &Marker) {
        if self.show_map {
            self.emit(format_args!(
                "marker\t{}\t{}\t{}\t[{}]",
                marker.id, marker.coordinates, marker.popup, marker.style_class
            ));
        }
    }

    fn show_form(&mut self, focus: FormField) {
        dlog!("form_shown focus={focus:?}");
    }

    fn hide_form(&mut self) {
        dlog!("form_hidden");
    }

    fn toggle_input_visibility(&mut self, fields: &[FormField]) {
        dlog!("form_fields {fields:?}");
    }

    fn render_list_entry(&mut self, entry: &ListEntry) {
        if !self.show_entries {
            return;
        }
        let stats = entry
            .stats
            .iter()
            .map(|s| format!("{} {} {}", s.icon, s.value, s.unit))
            .collect::<Vec<_>>()
            .join("  ");
        self.emit(format_args!("{}\t{}\t{stats}", entry.id, entry.title));
    }

    fn notify(&mut self, notice: &Notice) {
        self.emit(format_args!("! {notice}"));
    }
}
