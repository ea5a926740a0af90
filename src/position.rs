//! One-shot sources for the user's current position.

use crate::dlog;
use crate::error::PositionError;
use crate::types::Coordinates;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Resolves the current position once. Implementations never retry.
pub trait PositionProvider {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, PositionError>>;
}

/// Always reports the same coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl PositionProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        Ok(self.0)
    }
}

/// No positioning capability at all; fails immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositioning;

impl PositionProvider for NoPositioning {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        Err(PositionError::Unsupported)
    }
}

/// Uses the last track point of a GPX file as the current fix.
#[derive(Debug, Clone)]
pub struct GpxPosition {
    path: PathBuf,
}

impl GpxPosition {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PositionProvider for GpxPosition {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::PermissionDenied {
                PositionError::Denied
            } else {
                PositionError::Io(e)
            }
        })?;

        match last_track_point(&bytes) {
            Ok(Some(fix)) => {
                dlog!("gpx_fix path={} fix={fix}", self.path.display());
                Ok(fix)
            }
            Ok(None) => Err(PositionError::NoFix(format!(
                "no track points in {}",
                self.path.display()
            ))),
            Err(e) => Err(PositionError::NoFix(e)),
        }
    }
}

/// Fails with [`PositionError::Timeout`] if `inner` does not answer in time.
#[derive(Debug, Clone)]
pub struct WithTimeout<P> {
    inner: P,
    limit: Duration,
}

pub const fn with_timeout<P: PositionProvider>(inner: P, limit: Duration) -> WithTimeout<P> {
    WithTimeout { inner, limit }
}

impl<P: PositionProvider> PositionProvider for WithTimeout<P> {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        tokio::time::timeout(self.limit, self.inner.current_position())
            .await
            .map_err(|_| PositionError::Timeout(self.limit))?
    }
}

#[derive(Default)]
struct TrackState {
    in_trkpt: bool,
    cur_lat: Option<f64>,
    cur_lon: Option<f64>,
    last: Option<Coordinates>,
}

/// Coordinates of the final `<trkpt>` carrying both `lat` and `lon`.
pub fn last_track_point(bytes: &[u8]) -> Result<Option<Coordinates>, String> {
    let mut xml = Reader::from_reader(bytes);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut st = TrackState::default();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => handle_start(&mut st, &e),
            Ok(Event::Empty(e)) => {
                handle_start(&mut st, &e);
                finish_trkpt(&mut st);
            }
            Ok(Event::End(e)) => handle_end(&mut st, &e),
            Err(e) => return Err(format!("GPX XML parse error: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(st.last)
}

fn handle_start(st: &mut TrackState, e: &BytesStart<'_>) {
    if e.name().as_ref() == b"trkpt" {
        st.in_trkpt = true;
        let (lat, lon) = parse_trkpt_lat_lon(e);
        st.cur_lat = lat;
        st.cur_lon = lon;
    }
}

fn handle_end(st: &mut TrackState, e: &BytesEnd<'_>) {
    if e.name().as_ref() == b"trkpt" {
        finish_trkpt(st);
    }
}

fn finish_trkpt(st: &mut TrackState) {
    if !st.in_trkpt {
        return;
    }
    st.in_trkpt = false;

    if let (Some(lat), Some(lon)) = (st.cur_lat.take(), st.cur_lon.take()) {
        st.last = Some(Coordinates::new(lat, lon));
    }
}

fn parse_trkpt_lat_lon(e: &BytesStart<'_>) -> (Option<f64>, Option<f64>) {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for a in e.attributes().with_checks(false).flatten() {
        let key = a.key.as_ref();
        if key == b"lat"
            && let Ok(v) = a.unescape_value()
        {
            lat = v.parse::<f64>().ok().filter(|v| v.is_finite());
        } else if key == b"lon"
            && let Ok(v) = a.unescape_value()
        {
            lon = v.parse::<f64>().ok().filter(|v| v.is_finite());
        }
    }

    (lat, lon)
}
