//! Detail loader: the lazily fetched record behind the selected activity,
//! plus its social documents when the archive carries them.

use tracing::{debug, warn};

use crate::archive::{Archive, BytesPromise, Document};
use crate::model::{Comment, FeedDoc, WorkoutDetail};
use crate::slot::FetchSlot;

/// Social metadata shown under the detail text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkoutSocial {
    pub likes: usize,
    /// Oldest first.
    pub comments: Vec<Comment>,
}

/// What the detail area shows.
#[derive(Debug, Default)]
pub enum DetailState {
    #[default]
    Idle,
    Loading(u64),
    Ready {
        id: u64,
        detail: WorkoutDetail,
        social: Option<WorkoutSocial>,
    },
    Failed {
        id: u64,
        message: String,
    },
}

impl DetailState {
    pub fn selected(&self) -> Option<u64> {
        match self {
            DetailState::Idle => None,
            DetailState::Loading(id)
            | DetailState::Ready { id, .. }
            | DetailState::Failed { id, .. } => Some(*id),
        }
    }
}

enum DocState<T> {
    Pending(BytesPromise),
    Done(Option<T>),
}

struct SocialFetch {
    feed: DocState<FeedDoc>,
    comments: DocState<Vec<Comment>>,
}

enum Phase {
    Details(BytesPromise),
    Social(SocialFetch),
}

struct Inflight {
    seq: u64,
    id: u64,
    phase: Phase,
}

/// Owns the selected activity's record. Selecting supersedes whatever was
/// in flight; see [`FetchSlot`] for the staleness rule.
pub struct DetailLoader {
    archive: Archive,
    slot: FetchSlot,
    inflight: Option<Inflight>,
    state: DetailState,
}

impl DetailLoader {
    pub fn new(archive: Archive) -> Self {
        Self {
            archive,
            slot: FetchSlot::default(),
            inflight: None,
            state: DetailState::Idle,
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn selected(&self) -> Option<u64> {
        self.state.selected()
    }

    /// Begin fetching an activity's record, superseding any selection in
    /// flight.
    pub fn select(&mut self, ctx: &egui::Context, id: u64) {
        let seq = self.slot.begin();
        debug!(seq, id, "activity selected");
        self.state = DetailState::Loading(id);
        self.inflight = Some(Inflight {
            seq,
            id,
            phase: Phase::Details(self.archive.fetch(ctx, &Document::Details(id))),
        });
    }

    /// Poll the in-flight fetch. Returns true when the detail state changed
    /// this frame.
    pub fn poll(&mut self, ctx: &egui::Context) -> bool {
        enum Step {
            Pending,
            DetailsDone(crate::Result<Vec<u8>>),
            SocialDone(Option<FeedDoc>, Option<Vec<Comment>>),
        }

        let Some(inflight) = &mut self.inflight else {
            return false;
        };
        let seq = inflight.seq;
        let id = inflight.id;

        let step = match &mut inflight.phase {
            Phase::Details(promise) => match promise.ready_mut().and_then(Option::take) {
                Some(result) => Step::DetailsDone(result),
                None => Step::Pending,
            },
            Phase::Social(social) => {
                poll_doc(&mut social.feed, "feed");
                poll_doc(&mut social.comments, "comments");
                match (&mut social.feed, &mut social.comments) {
                    (DocState::Done(feed), DocState::Done(comments)) => {
                        Step::SocialDone(feed.take(), comments.take())
                    }
                    _ => Step::Pending,
                }
            }
        };

        match step {
            Step::Pending => false,
            Step::DetailsDone(result) => self.finish_details(ctx, seq, id, result),
            Step::SocialDone(feed, comments) => {
                self.inflight = None;
                self.apply_social(seq, social_from_docs(feed, comments))
            }
        }
    }

    fn finish_details(
        &mut self,
        ctx: &egui::Context,
        seq: u64,
        id: u64,
        result: crate::Result<Vec<u8>>,
    ) -> bool {
        if !self.slot.accepts(seq) {
            debug!(seq, id, "dropping stale details response");
            self.inflight = None;
            return false;
        }

        let decoded =
            result.and_then(|bytes| Ok(serde_json::from_slice::<WorkoutDetail>(&bytes)?));
        let detail = match decoded {
            Ok(detail) => detail,
            Err(err) => {
                warn!(id, %err, "details fetch failed");
                self.inflight = None;
                return self.apply(
                    seq,
                    DetailState::Failed {
                        id,
                        message: err.to_string(),
                    },
                );
            }
        };

        // The record is shown right away; the social documents fill in when
        // they arrive.
        match detail.feed_id {
            Some(feed) => {
                self.inflight = Some(Inflight {
                    seq,
                    id,
                    phase: Phase::Social(SocialFetch {
                        feed: DocState::Pending(
                            self.archive.fetch(ctx, &Document::Feed { workout: id, feed }),
                        ),
                        comments: DocState::Pending(
                            self.archive.fetch(ctx, &Document::Comments(id)),
                        ),
                    }),
                });
            }
            None => self.inflight = None,
        }
        self.apply(
            seq,
            DetailState::Ready {
                id,
                detail,
                social: None,
            },
        )
    }

    /// Replace the detail state, unless the completion is stale.
    fn apply(&mut self, seq: u64, state: DetailState) -> bool {
        if !self.slot.accepts(seq) {
            debug!(seq, "dropping stale detail response");
            return false;
        }
        self.state = state;
        true
    }

    /// Attach social data to the current record, unless the completion is
    /// stale.
    fn apply_social(&mut self, seq: u64, social: Option<WorkoutSocial>) -> bool {
        if !self.slot.accepts(seq) {
            debug!(seq, "dropping stale social response");
            return false;
        }
        if let DetailState::Ready { social: dest, .. } = &mut self.state {
            *dest = social;
            return true;
        }
        false
    }
}

fn poll_doc<T: serde::de::DeserializeOwned>(doc: &mut DocState<T>, what: &str) {
    let DocState::Pending(promise) = doc else {
        return;
    };
    let Some(result) = promise.ready_mut().and_then(Option::take) else {
        return;
    };
    let parsed = match result.and_then(|bytes| Ok(serde_json::from_slice::<T>(&bytes)?)) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(what, %err, "social document unavailable");
            None
        }
    };
    *doc = DocState::Done(parsed);
}

/// Merge the social documents into the display form. No feed document means
/// no social block; a missing comments document falls back to the comments
/// embedded in the feed. The export stores comments newest first, display
/// wants oldest first.
fn social_from_docs(
    feed: Option<FeedDoc>,
    comments: Option<Vec<Comment>>,
) -> Option<WorkoutSocial> {
    let feed = feed?;
    let mut comments = comments.unwrap_or(feed.comments);
    comments.reverse();
    Some(WorkoutSocial {
        likes: feed.likes.len(),
        comments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::DataRoot;
    use pretty_assertions::assert_eq;

    fn comment(from: &str, text: &str) -> Comment {
        Comment {
            from: from.to_owned(),
            text: text.to_owned(),
            date: None,
        }
    }

    fn detail_fixture() -> WorkoutDetail {
        serde_json::from_str(
            r#"{"sport": 0, "local_start_time": "2020-10-31 09:01:23", "distance": 5.0, "duration": 1800}"#,
        )
        .unwrap()
    }

    fn test_loader() -> DetailLoader {
        DetailLoader::new(Archive::new(DataRoot::parse("/nonexistent"), "u"))
    }

    #[test]
    fn comments_display_oldest_first() {
        let feed = FeedDoc::default();
        let social = social_from_docs(
            Some(feed),
            Some(vec![comment("Kari", "newest"), comment("Ola", "oldest")]),
        )
        .unwrap();
        assert_eq!(social.comments[0].text, "oldest");
        assert_eq!(social.comments[1].text, "newest");
    }

    #[test]
    fn missing_comments_document_falls_back_to_feed() {
        let feed: FeedDoc = serde_json::from_str(
            r#"{
                "likes": [{"from": "Kari"}],
                "comments": [{"from": "Ola", "text": "newest"}, {"from": "Kari", "text": "oldest"}]
            }"#,
        )
        .unwrap();
        let social = social_from_docs(Some(feed), None).unwrap();
        assert_eq!(social.likes, 1);
        assert_eq!(social.comments[0].text, "oldest");
    }

    #[test]
    fn no_feed_document_means_no_social_block() {
        assert_eq!(social_from_docs(None, Some(vec![comment("Kari", "hi")])), None);
    }

    #[test]
    fn stale_selection_is_discarded() {
        let mut loader = test_loader();
        let stale = loader.slot.begin();
        let fresh = loader.slot.begin();

        let applied = loader.apply(
            stale,
            DetailState::Ready {
                id: 1,
                detail: detail_fixture(),
                social: None,
            },
        );
        assert!(!applied);
        assert!(matches!(loader.state(), DetailState::Idle));

        let applied = loader.apply(
            fresh,
            DetailState::Ready {
                id: 2,
                detail: detail_fixture(),
                social: None,
            },
        );
        assert!(applied);
        assert_eq!(loader.selected(), Some(2));
    }

    #[test]
    fn stale_social_leaves_record_untouched() {
        let mut loader = test_loader();
        let stale = loader.slot.begin();
        let fresh = loader.slot.begin();
        loader.apply(
            fresh,
            DetailState::Ready {
                id: 1,
                detail: detail_fixture(),
                social: None,
            },
        );

        assert!(!loader.apply_social(stale, Some(WorkoutSocial::default())));
        let DetailState::Ready { social, .. } = loader.state() else {
            panic!("expected ready state");
        };
        assert_eq!(*social, None);

        assert!(loader.apply_social(fresh, Some(WorkoutSocial::default())));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn fetches_record_and_social_from_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let user_dir = tmp.path().join("u");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(
            user_dir.join("workout-42-details.json"),
            r#"{
                "sport": 2,
                "local_start_time": "2020-10-31 09:01:23",
                "distance": 20.0,
                "duration": 3600,
                "feed_id": 9
            }"#,
        )
        .unwrap();
        std::fs::write(
            user_dir.join("workout-42-feed-9.json"),
            r#"{"likes": [{"from": "Kari"}, {"from": "Ola"}]}"#,
        )
        .unwrap();
        std::fs::write(
            user_dir.join("workout-42-comments.json"),
            r#"[{"from": "Kari", "text": "newest"}, {"from": "Ola", "text": "oldest"}]"#,
        )
        .unwrap();

        let archive = Archive::new(DataRoot::parse(tmp.path().to_str().unwrap()), "u");
        let mut loader = DetailLoader::new(archive);
        let ctx = egui::Context::default();
        loader.select(&ctx, 42);
        assert!(matches!(loader.state(), DetailState::Loading(42)));

        let mut done = false;
        for _ in 0..500 {
            loader.poll(&ctx);
            if let DetailState::Ready {
                social: Some(_), ..
            } = loader.state()
            {
                done = true;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert!(done, "detail fetch did not finish");

        let DetailState::Ready { detail, social, .. } = loader.state() else {
            panic!("expected ready state");
        };
        assert_eq!(detail.title_line(), "Cycling sport");
        let social = social.as_ref().unwrap();
        assert_eq!(social.likes, 2);
        assert_eq!(social.comments[0].text, "oldest");
        assert_eq!(social.comments[1].text, "newest");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn missing_details_document_fails_the_selection() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("u")).unwrap();

        let archive = Archive::new(DataRoot::parse(tmp.path().to_str().unwrap()), "u");
        let mut loader = DetailLoader::new(archive);
        let ctx = egui::Context::default();
        loader.select(&ctx, 7);

        let mut done = false;
        for _ in 0..500 {
            if loader.poll(&ctx) {
                done = true;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert!(done, "detail fetch did not finish");
        let DetailState::Failed { id, message } = loader.state() else {
            panic!("expected failed state");
        };
        assert_eq!(*id, 7);
        assert!(message.contains("workout-7-details.json"));
    }
}
