#![deny(clippy::disallowed_methods)]

mod archive;
mod args;
mod detail;
mod error;
pub mod geom;
mod history;
mod media;
pub mod model;
mod months;
mod slot;
pub mod sport;

pub use archive::{Archive, DataRoot, Document};
pub use args::Args;
pub use detail::{DetailLoader, DetailState, WorkoutSocial};
pub use error::{show_one_error_message, Error};
pub use geom::{fit_camera, CameraFit, GeoBounds, MAX_FIT_ZOOM};
pub use history::{CalendarEvent, HistoryLoader};
pub use media::{Textures, TextureState};
pub use model::{
    ActivitySummary, Comment, FeedDoc, Picture, PointList, TrackPoint, WorkoutDetail,
};
pub use months::{months_covering, MonthId};
pub use slot::FetchSlot;
pub use sport::Sport;

pub type Result<T> = std::result::Result<T, error::Error>;
