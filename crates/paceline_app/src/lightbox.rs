//! Fullscreen picture overlay with carousel controls.

use egui::{Color32, Sense, Vec2};
use paceline::{Archive, Picture, TextureState, Textures};

/// Space reserved under the picture for the control row.
const CONTROLS_HEIGHT: f32 = 72.0;

#[derive(Clone, Copy)]
enum Control {
    Previous,
    Close,
    Next,
}

/// The control row, left to right.
const CONTROLS: [Control; 3] = [Control::Previous, Control::Close, Control::Next];

impl Control {
    fn label(self) -> &'static str {
        match self {
            Control::Previous => "Previous",
            Control::Close => "Close",
            Control::Next => "Next",
        }
    }
}

/// Which picture of the open workout is showing fullscreen, if any.
/// Indexes into the workout's picture list; the record owns the pictures.
#[derive(Default)]
pub struct Lightbox {
    selected: Option<usize>,
}

impl Lightbox {
    pub fn open(&mut self, index: usize) {
        self.selected = Some(index);
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Step the carousel, wrapping at both ends.
    fn advance(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        let current = self.selected.unwrap_or(0) as isize;
        self.selected = Some((current + delta).rem_euclid(len as isize) as usize);
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        textures: &mut Textures,
        archive: &Archive,
        pictures: &[Picture],
    ) {
        let Some(index) = self.selected else {
            return;
        };
        if pictures.is_empty() {
            self.close();
            return;
        }
        let index = index.min(pictures.len() - 1);
        self.selected = Some(index);

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.close();
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            self.advance(-1, pictures.len());
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.advance(1, pictures.len());
        }
        let Some(index) = self.selected else {
            return;
        };

        let screen_rect = ctx.screen_rect();
        egui::Window::new("picture_overlay")
            .title_bar(false)
            .fixed_size(screen_rect.size())
            .fixed_pos(screen_rect.min)
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                // registered before the children so buttons win the click
                let backdrop =
                    ui.interact(screen_rect, ui.id().with("backdrop"), Sense::click());
                ui.painter()
                    .rect_filled(screen_rect, 0.0, Color32::from_black_alpha(230));

                let image_max = Vec2::new(
                    screen_rect.width(),
                    screen_rect.height() - CONTROLS_HEIGHT,
                );
                ui.allocate_ui(image_max, |ui| {
                    ui.centered_and_justified(|ui| {
                        match textures.get(ui.ctx(), archive, &pictures[index].url) {
                            TextureState::Loading(_) => {
                                ui.spinner();
                            }
                            TextureState::Failed(message) => {
                                ui.colored_label(Color32::LIGHT_RED, message);
                            }
                            TextureState::Ready(texture) => {
                                let size = fit_size(texture.size_vec2(), image_max);
                                ui.add(
                                    egui::Image::new(texture)
                                        .fit_to_exact_size(size)
                                        .sense(Sense::click()),
                                );
                            }
                        }
                    });
                });

                ui.horizontal(|ui| {
                    let pad = ((ui.available_width() - 340.0) / 2.0).max(0.0);
                    ui.add_space(pad);
                    for control in CONTROLS {
                        if ui.button(control.label()).clicked() {
                            match control {
                                Control::Previous => self.advance(-1, pictures.len()),
                                Control::Close => self.close(),
                                Control::Next => self.advance(1, pictures.len()),
                            }
                        }
                    }
                    ui.add_space(12.0);
                    ui.label(format!("{} / {}", index + 1, pictures.len()));
                });

                if backdrop.clicked() {
                    self.close();
                }
            });
    }
}

fn fit_size(image: Vec2, max: Vec2) -> Vec2 {
    let scale = (max.x / image.x).min(max.y / image.y).min(1.0);
    image * scale
}
