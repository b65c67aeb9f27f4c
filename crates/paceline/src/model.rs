//! Serde models for the export's JSON documents.
//!
//! The archive is one directory per user: monthly `history-<YYYY>-<MM>.json`
//! arrays of [`ActivitySummary`], one `workout-<id>-details.json` per
//! activity, and for archives with the social dump a
//! `workout-<id>-feed-<feedId>.json` and `workout-<id>-comments.json`.

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::sport::Sport;
use crate::Error;

/// One row of a monthly history document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivitySummary {
    pub id: u64,
    pub sport: Sport,
    pub local_start_time: String,
}

impl ActivitySummary {
    pub fn start(&self) -> Option<NaiveDateTime> {
        parse_local_time(&self.local_start_time).ok()
    }
}

/// The full record behind one activity.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutDetail {
    pub sport: Sport,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub local_start_time: String,
    /// Kilometers.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    #[serde(default)]
    pub pictures: Vec<Picture>,
    #[serde(default)]
    pub points: PointList,
    /// Present when the archive carries the social dump for this workout.
    #[serde(default)]
    pub feed_id: Option<u64>,
}

impl WorkoutDetail {
    pub fn start(&self) -> Option<NaiveDateTime> {
        parse_local_time(&self.local_start_time).ok()
    }

    /// "Sport: title", or just the sport when the workout is untitled.
    pub fn title_line(&self) -> String {
        match &self.title {
            Some(title) => format!("{}: {}", self.sport.label(), title),
            None => self.sport.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Picture {
    pub id: u64,
    pub url: String,
}

/// Track points come nested one level down (`points.points`) in the
/// details document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointList {
    #[serde(default)]
    pub points: Vec<TrackPoint>,
}

impl PointList {
    /// Points with both coordinates, in track order.
    pub fn valid(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().filter_map(TrackPoint::coord)
    }
}

/// A single track sample. Coordinates can be missing (paused recordings,
/// indoor segments), so every consumer filters through [`TrackPoint::coord`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct TrackPoint {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl TrackPoint {
    pub fn coord(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// The feed document. Comments may be embedded here when the archive has
/// no dedicated comments document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedDoc {
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Like {
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    pub from: String,
    pub text: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// Parse the export's local wall-clock stamp. Both the space and the `T`
/// separated spellings occur, with or without fractional seconds.
pub fn parse_local_time(s: &str) -> crate::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(Error::from)
}

/// Long form date heading, e.g. "Saturday 31 October 2020 at 09:01:23".
pub fn format_start(t: NaiveDateTime) -> String {
    t.format("%A %-d %B %Y at %H:%M:%S").to_string()
}

/// Whole-second duration as HH:MM:SS, hours unbounded.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

pub fn format_distance(km: f64) -> String {
    format!("{km:.2} km")
}
