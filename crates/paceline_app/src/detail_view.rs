//! Detail area under the calendar: record text, thumbnails, route map and
//! the social block.

use egui::{RichText, Sense, Vec2};
use paceline::model::{format_distance, format_duration, format_start};
use paceline::{show_one_error_message, DetailState, TextureState, WorkoutSocial};

use crate::PacelineApp;

const THUMBS_PER_ROW: usize = 3;

impl PacelineApp {
    pub(crate) fn render_detail(&mut self, ui: &mut egui::Ui) {
        match self.detail.state() {
            DetailState::Idle => {}
            DetailState::Loading(_) => {
                ui.add_space(12.0);
                ui.spinner();
            }
            DetailState::Failed { message, .. } => {
                ui.add_space(12.0);
                ui.colored_label(ui.visuals().error_fg_color, message);
            }
            DetailState::Ready { id, detail, social } => {
                ui.add_space(12.0);
                ui.separator();

                let heading = detail
                    .start()
                    .map(format_start)
                    .unwrap_or_else(|| detail.local_start_time.clone());
                ui.heading(heading);
                ui.strong(detail.title_line());

                if let Some(message) = &detail.message {
                    ui.label(message);
                }
                if let Some(notes) = &detail.notes {
                    ui.label(notes);
                }

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.strong("Distance:");
                    ui.label(format_distance(detail.distance));
                    ui.add_space(16.0);
                    ui.strong("Duration:");
                    ui.label(format_duration(detail.duration));
                });

                if !detail.pictures.is_empty() {
                    ui.add_space(8.0);
                    let spacing = ui.spacing().item_spacing.x;
                    let cell = ((ui.available_width() - 2.0 * spacing)
                        / THUMBS_PER_ROW as f32)
                        .floor();

                    for (row_idx, row) in
                        detail.pictures.chunks(THUMBS_PER_ROW).enumerate()
                    {
                        ui.horizontal(|ui| {
                            for (col_idx, picture) in row.iter().enumerate() {
                                let index = row_idx * THUMBS_PER_ROW + col_idx;
                                match self.textures.get(ui.ctx(), &self.archive, &picture.url)
                                {
                                    TextureState::Loading(_) => {
                                        ui.add_sized(
                                            Vec2::splat(cell),
                                            egui::Spinner::new(),
                                        );
                                    }
                                    TextureState::Failed(message) => {
                                        show_one_error_message(ui, message);
                                        ui.add_sized(
                                            Vec2::splat(cell),
                                            egui::Label::new(
                                                RichText::new("picture unavailable").weak(),
                                            ),
                                        );
                                    }
                                    TextureState::Ready(texture) => {
                                        let response = ui.add(
                                            egui::Image::new(texture)
                                                .fit_to_exact_size(Vec2::splat(cell))
                                                .sense(Sense::click()),
                                        );
                                        if response.clicked() {
                                            self.lightbox.open(index);
                                        }
                                    }
                                }
                            }
                        });
                    }
                }

                ui.add_space(8.0);
                self.map.show(ui, *id, &detail.points);

                if let Some(social) = social {
                    render_social(ui, social);
                }
            }
        }
    }

    /// Fullscreen picture overlay, drawn over everything else.
    pub(crate) fn render_overlay(&mut self, ctx: &egui::Context) {
        let DetailState::Ready { detail, .. } = self.detail.state() else {
            return;
        };
        self.lightbox
            .show(ctx, &mut self.textures, &self.archive, &detail.pictures);
    }
}

fn render_social(ui: &mut egui::Ui, social: &WorkoutSocial) {
    ui.add_space(8.0);
    ui.separator();

    if social.likes == 1 {
        ui.label("1 like");
    } else {
        ui.label(format!("{} likes", social.likes));
    }

    for comment in &social.comments {
        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            ui.strong(&comment.from);
            if let Some(date) = &comment.date {
                ui.weak(date);
            }
        });
        ui.label(&comment.text);
    }
}
