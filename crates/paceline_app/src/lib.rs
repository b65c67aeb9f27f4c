//! Calendar viewer for an exported Endomondo workout archive.
//!
//! One [`PacelineApp`] owns every piece of ui state. Each frame polls the
//! loaders first, so documents finished since the last frame show up in the
//! same pass that was woken for them.

mod calendar;
mod detail_view;
mod lightbox;
mod route_map;

pub use calendar::Calendar;
pub use lightbox::Lightbox;
pub use route_map::RouteMap;

use chrono::{Local, NaiveDate};
use paceline::{Archive, Args, DetailLoader, HistoryLoader, Textures};

pub struct PacelineApp {
    archive: Archive,
    history: HistoryLoader,
    detail: DetailLoader,
    textures: Textures,
    calendar: Calendar,
    lightbox: Lightbox,
    map: RouteMap,
    requested_range: Option<(NaiveDate, NaiveDate)>,
}

impl PacelineApp {
    pub fn new(ctx: &egui::Context, archive: Archive, args: &Args) -> Self {
        if args.light {
            ctx.options_mut(|o| o.theme_preference = egui::ThemePreference::Light);
        }

        let focus = args.date.unwrap_or_else(|| Local::now().date_naive());
        let mut app = Self {
            history: HistoryLoader::new(archive.clone(), args.archive_end),
            detail: DetailLoader::new(archive.clone()),
            textures: Textures::default(),
            calendar: Calendar::new(focus),
            lightbox: Lightbox::default(),
            map: RouteMap::new(args.tiles.clone()),
            archive,
            requested_range: None,
        };
        if let Some(id) = args.workout {
            app.select_workout(ctx, id);
        }
        app
    }

    /// Select an activity. Closes any fullscreen picture left over from the
    /// previous selection.
    pub fn select_workout(&mut self, ctx: &egui::Context, id: u64) {
        self.lightbox.close();
        self.detail.select(ctx, id);
    }

    fn poll(&mut self, ctx: &egui::Context) {
        let range = self.calendar.grid_range();
        if self.requested_range != Some(range) {
            self.history.request_range(ctx, range.0, range.1);
            self.requested_range = Some(range);
        }
        self.history.poll();
        self.detail.poll(ctx);
    }
}

impl eframe::App for PacelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("Activities from Endomondo");
                    ui.add_space(8.0);

                    let clicked = self.calendar.show(
                        ui,
                        self.history.events(),
                        self.detail.selected(),
                        self.history.is_loading(),
                    );
                    if let Some(id) = clicked {
                        self.select_workout(ui.ctx(), id);
                    }

                    self.render_detail(ui);
                });
        });

        self.render_overlay(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paceline::DataRoot;
    use pretty_assertions::assert_eq;

    fn test_app(dir: &std::path::Path, args: &Args) -> (egui::Context, PacelineApp) {
        let ctx = egui::Context::default();
        let archive = Archive::new(DataRoot::parse(&dir.display().to_string()), "user0");
        let app = PacelineApp::new(&ctx, archive, args);
        (ctx, app)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn deep_link_preselects_the_workout() {
        let dir = tempfile::tempdir().unwrap();
        let (mut args, _) = Args::parse(&[]);
        args.workout = Some(42);
        let (_ctx, app) = test_app(dir.path(), &args);
        assert_eq!(app.detail.selected(), Some(42));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn selecting_an_activity_closes_the_picture_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let (args, _) = Args::parse(&[]);
        let (ctx, mut app) = test_app(dir.path(), &args);

        app.lightbox.open(0);
        app.select_workout(&ctx, 7);
        assert!(!app.lightbox.is_open());
        assert_eq!(app.detail.selected(), Some(7));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn first_poll_requests_the_visible_range() {
        let dir = tempfile::tempdir().unwrap();
        let (args, _) = Args::parse(&[]);
        let (ctx, mut app) = test_app(dir.path(), &args);

        assert_eq!(app.requested_range, None);
        app.poll(&ctx);
        assert_eq!(app.requested_range, Some(app.calendar.grid_range()));

        // the same range is not requested twice
        let first = app.requested_range;
        app.poll(&ctx);
        assert_eq!(app.requested_range, first);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn month_navigation_requests_the_new_range() {
        let dir = tempfile::tempdir().unwrap();
        let (args, _) = Args::parse(&[]);
        let (ctx, mut app) = test_app(dir.path(), &args);

        app.poll(&ctx);
        let first = app.requested_range;

        app.calendar.next_month();
        app.poll(&ctx);
        assert_eq!(app.requested_range, Some(app.calendar.grid_range()));
        assert_ne!(app.requested_range, first);
    }
}
