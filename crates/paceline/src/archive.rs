//! Access to the export archive.
//!
//! An archive is one directory per user holding the documents described in
//! [`crate::model`]. The root can be a local directory or an http(s) base
//! URL; both are read through promises polled from the UI thread.

use std::io;
use std::path::PathBuf;

use poll_promise::Promise;
use tokio::fs;

use crate::months::MonthId;
use crate::Error;

/// Raw document bytes, completed off-thread. The inner `Option` lets the
/// poller move the result out while the promise stays stored.
pub type BytesPromise = Promise<Option<crate::Result<Vec<u8>>>>;

/// Where the archive lives.
#[derive(Debug, Clone)]
pub enum DataRoot {
    Http(String),
    Dir(PathBuf),
}

impl DataRoot {
    /// http(s) roots are fetched with ehttp, anything else is a local
    /// directory.
    pub fn parse(root: &str) -> Self {
        if root.starts_with("http://") || root.starts_with("https://") {
            DataRoot::Http(root.trim_end_matches('/').to_owned())
        } else {
            DataRoot::Dir(PathBuf::from(root))
        }
    }
}

/// The documents the archive serves for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    History(MonthId),
    Details(u64),
    Feed { workout: u64, feed: u64 },
    Comments(u64),
}

impl Document {
    pub fn file_name(&self) -> String {
        match self {
            Document::History(month) => month.history_file(),
            Document::Details(id) => format!("workout-{id}-details.json"),
            Document::Feed { workout, feed } => {
                format!("workout-{workout}-feed-{feed}.json")
            }
            Document::Comments(id) => format!("workout-{id}-comments.json"),
        }
    }
}

/// One user's slice of the archive. Cheap to clone; passed into the
/// loaders explicitly instead of living in a global.
#[derive(Debug, Clone)]
pub struct Archive {
    root: DataRoot,
    user: String,
}

impl Archive {
    pub fn new(root: DataRoot, user: impl Into<String>) -> Self {
        Self {
            root,
            user: user.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Fetch one document. Absent documents complete with
    /// [`Error::NotFound`] (or an IO not-found), which callers treat as
    /// "no data" rather than failure.
    pub fn fetch(&self, ctx: &egui::Context, doc: &Document) -> BytesPromise {
        self.fetch_file(ctx, &doc.file_name())
    }

    /// Fetch a picture by the URL stored in the detail record. Absolute
    /// http(s) URLs go out as-is; anything else resolves relative to the
    /// user's directory.
    pub fn fetch_url(&self, ctx: &egui::Context, url: &str) -> BytesPromise {
        if url.starts_with("http://") || url.starts_with("https://") {
            fetch_http(ctx, url.to_owned())
        } else {
            self.fetch_file(ctx, url)
        }
    }

    fn fetch_file(&self, ctx: &egui::Context, file: &str) -> BytesPromise {
        match &self.root {
            DataRoot::Http(base) => {
                fetch_http(ctx, format!("{base}/{}/{file}", self.user))
            }
            DataRoot::Dir(dir) => fetch_disk(ctx, dir.join(&self.user).join(file)),
        }
    }
}

fn fetch_http(ctx: &egui::Context, url: String) -> BytesPromise {
    let (sender, promise) = Promise::new();
    let request = ehttp::Request::get(&url);
    let ctx = ctx.clone();
    ehttp::fetch(request, move |response| {
        let result = response.map_err(Error::Generic).and_then(|resp| {
            if resp.status == 404 {
                Err(Error::NotFound(url))
            } else if resp.ok {
                Ok(resp.bytes)
            } else {
                Err(Error::Generic(format!(
                    "status {} fetching {url}",
                    resp.status
                )))
            }
        });
        sender.send(Some(result)); // send the results back to the UI thread.
        ctx.request_repaint();
    });
    promise
}

fn fetch_disk(ctx: &egui::Context, path: PathBuf) -> BytesPromise {
    let ctx = ctx.clone();
    Promise::spawn_async(async move {
        let result = match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            // Missing documents report the path, same as the http 404 arm.
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(Error::NotFound(path.display().to_string()))
            }
            Err(err) => Err(Error::from(err)),
        };
        ctx.request_repaint();
        Some(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_file_names() {
        assert_eq!(
            Document::History(MonthId::new(2020, 10)).file_name(),
            "history-2020-10.json"
        );
        assert_eq!(
            Document::Details(1626262626).file_name(),
            "workout-1626262626-details.json"
        );
        assert_eq!(
            Document::Feed {
                workout: 7,
                feed: 99
            }
            .file_name(),
            "workout-7-feed-99.json"
        );
        assert_eq!(
            Document::Comments(7).file_name(),
            "workout-7-comments.json"
        );
    }

    #[test]
    fn roots_parse_by_scheme() {
        assert!(matches!(
            DataRoot::parse("https://example.org/export/"),
            DataRoot::Http(base) if base == "https://example.org/export"
        ));
        assert!(matches!(
            DataRoot::parse("/srv/export"),
            DataRoot::Dir(_)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reads_documents_from_a_directory_root() {
        let tmp = tempfile::tempdir().unwrap();
        let user_dir = tmp.path().join("10121518");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(user_dir.join("history-2020-10.json"), b"[]").unwrap();

        let root = DataRoot::parse(tmp.path().to_str().unwrap());
        let archive = Archive::new(root, "10121518");
        let ctx = egui::Context::default();

        let mut promise = archive.fetch(&ctx, &Document::History(MonthId::new(2020, 10)));
        let result = promise.block_until_ready_mut().take().unwrap();
        assert_eq!(result.unwrap(), b"[]");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn missing_documents_resolve_to_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let root = DataRoot::parse(tmp.path().to_str().unwrap());
        let archive = Archive::new(root, "10121518");
        let ctx = egui::Context::default();

        let mut promise = archive.fetch(&ctx, &Document::Details(1));
        let result = promise.block_until_ready_mut().take().unwrap();
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn relative_picture_urls_resolve_under_the_user_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let user_dir = tmp.path().join("u");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(user_dir.join("workout-1-picture-7.jpg"), b"jpeg").unwrap();

        let archive = Archive::new(DataRoot::parse(tmp.path().to_str().unwrap()), "u");
        let ctx = egui::Context::default();

        let mut promise = archive.fetch_url(&ctx, "workout-1-picture-7.jpg");
        let result = promise.block_until_ready_mut().take().unwrap();
        assert_eq!(result.unwrap(), b"jpeg");
    }
}
