//! Route rendering over slippy-map tiles.

use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};
use paceline::{fit_camera, GeoBounds, PointList};
use tracing::debug;
use walkers::sources::{Attribution, TileSource};
use walkers::{HttpTiles, Map, MapMemory, Plugin, Position, Projector};

const MAP_HEIGHT: f32 = 500.0;
const FIT_PADDING: f32 = 40.0;
const ROUTE_COLOR: Color32 = Color32::from_rgb(0x43, 0x85, 0xf5);

pub const OSM_TILE_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Tile source backed by a `{z}/{x}/{y}` url template.
struct TemplateSource {
    template: String,
    attribution: &'static str,
}

impl TileSource for TemplateSource {
    fn tile_url(&self, tile_id: walkers::TileId) -> String {
        self.template
            .replace("{z}", &tile_id.zoom.to_string())
            .replace("{x}", &tile_id.x.to_string())
            .replace("{y}", &tile_id.y.to_string())
    }

    fn attribution(&self) -> Attribution {
        let url = if self.template == OSM_TILE_TEMPLATE {
            "https://www.openstreetmap.org/copyright"
        } else {
            ""
        };
        Attribution {
            text: self.attribution,
            url,
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// Attribution requires a 'static str, so custom templates leak one string
/// per process.
fn attribution_text(template: &str) -> &'static str {
    if template == OSM_TILE_TEMPLATE {
        "© OpenStreetMap contributors"
    } else {
        Box::leak(format!("© {}", host_of(template)).into_boxed_str())
    }
}

fn host_of(template: &str) -> &str {
    let rest = template
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(template);
    rest.split('/').next().unwrap_or(rest)
}

/// Map panel under the workout record. The camera fits the track once per
/// workout and then belongs to the user.
pub struct RouteMap {
    template: String,
    memory: MapMemory,
    tiles: Option<HttpTiles>,
    attribution: &'static str,
    fitted: Option<u64>,
}

impl RouteMap {
    pub fn new(template: Option<String>) -> Self {
        let template = template.unwrap_or_else(|| OSM_TILE_TEMPLATE.to_owned());
        let attribution = attribution_text(&template);
        Self {
            template,
            memory: MapMemory::default(),
            tiles: None,
            attribution,
            fitted: None,
        }
    }

    fn fit_once(&mut self, id: u64, points: &PointList, size: Vec2) {
        // a different workout invalidates the stored fit, trackless ones too
        if self.fitted.is_some_and(|fitted| fitted != id) {
            self.fitted = None;
        }
        if self.fitted == Some(id) || size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let Some(bounds) = GeoBounds::from_coords(points.valid()) else {
            return;
        };
        let fit = fit_camera(&bounds, size.x, size.y, FIT_PADDING);
        self.memory.center_at(walkers::lat_lon(fit.lat, fit.lon));
        if let Err(err) = self.memory.set_zoom(fit.zoom) {
            debug!(?err, zoom = fit.zoom, "camera zoom rejected");
        }
        self.fitted = Some(id);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, id: u64, points: &PointList) {
        let size = egui::vec2(ui.available_width(), MAP_HEIGHT);
        self.fit_once(id, points, size);

        let track = track_positions(points);
        let Some(first) = track.first().copied() else {
            return;
        };

        if self.tiles.is_none() {
            let source = TemplateSource {
                template: self.template.clone(),
                attribution: self.attribution,
            };
            self.tiles = Some(HttpTiles::new(source, ui.ctx().clone()));
        }
        let Some(tiles) = self.tiles.as_mut() else {
            return;
        };

        let map = Map::new(Some(tiles), &mut self.memory, first).with_plugin(RoutePlugin { track });
        let response = ui.add_sized(size, map);

        ui.painter().text(
            response.rect.max - egui::vec2(5.0, 5.0),
            Align2::RIGHT_BOTTOM,
            self.attribution,
            FontId::proportional(10.0),
            Color32::from_black_alpha(150),
        );
    }
}

/// The drawable track: points with both coordinates, in record order. The
/// first and last entries get the start and finish glyphs.
fn track_positions(points: &PointList) -> Vec<Position> {
    points
        .valid()
        .map(|(lat, lon)| walkers::lat_lon(lat, lon))
        .collect()
}

struct RoutePlugin {
    track: Vec<Position>,
}

impl Plugin for RoutePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
    ) {
        let painter = ui.painter().with_clip_rect(response.rect);
        let stroke = Stroke::new(3.0, ROUTE_COLOR);

        for pair in self.track.windows(2) {
            // skip antimeridian-crossing segments instead of drawing them
            // across the whole world
            if (pair[0].x() - pair[1].x()).abs() > 180.0 {
                continue;
            }
            let a = to_screen(projector, pair[0]);
            let b = to_screen(projector, pair[1]);
            painter.line_segment([a, b], stroke);
        }

        if let Some(first) = self.track.first() {
            draw_start_pin(&painter, to_screen(projector, *first));
        }
        if let Some(last) = self.track.last() {
            draw_finish_flag(&painter, to_screen(projector, *last));
        }
    }
}

fn to_screen(projector: &Projector, pos: Position) -> Pos2 {
    let v = projector.project(pos);
    egui::pos2(v.x, v.y)
}

fn draw_start_pin(painter: &egui::Painter, at: Pos2) {
    painter.circle_filled(at, 6.0, ROUTE_COLOR);
    painter.circle_stroke(at, 6.0, Stroke::new(1.5, Color32::WHITE));
}

fn draw_finish_flag(painter: &egui::Painter, at: Pos2) {
    let top = at - egui::vec2(0.0, 16.0);
    painter.line_segment([at, top], Stroke::new(2.0, Color32::from_gray(40)));

    let cell = 4.0;
    for row in 0..2 {
        for col in 0..3 {
            let color = if (row + col) % 2 == 0 {
                Color32::BLACK
            } else {
                Color32::WHITE
            };
            let min = top + egui::vec2(col as f32 * cell, row as f32 * cell);
            painter.rect_filled(Rect::from_min_size(min, Vec2::splat(cell)), 0.0, color);
        }
    }
}
