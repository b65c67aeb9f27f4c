use std::io;

/// Viewer-wide errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("image error: {0}")]
    Image(#[from] image::error::ImageError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("date error: {0}")]
    Date(#[from] chrono::ParseError),

    #[error("generic error: {0}")]
    Generic(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl Error {
    /// Missing documents are expected for months without activities and
    /// for archives without the social dump. Callers branch on this.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(err) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub fn show_one_error_message(ui: &mut egui::Ui, message: &str) {
    let id = ui.id().with(("error", message));
    let res: Option<()> = ui.ctx().data(|d| d.get_temp(id));

    if res.is_none() {
        ui.ctx().data_mut(|d| d.insert_temp(id, ()));
        tracing::error!(message);
    }
}
