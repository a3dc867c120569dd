use egui::{Align, Frame, Layout, RichText, Vec2};

use super::{LiveAuroraApp, PALETTE_BLACK, PALETTE_GREEN, PALETTE_WHITE};

const TITLE_TEXT_SIZE: f32 = 22.;
const LABEL_TEXT_SIZE: f32 = 16.;
// room left for the title and the forecast label
const TEXT_RESERVED_HEIGHT: f32 = 90.;

impl LiveAuroraApp {
    pub(crate) fn panes_view(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(Frame::new().fill(PALETTE_BLACK))
            .show(ctx, |ui| {
                let channels = self.viewer.channels();
                let panes = self.viewer.panes();
                if channels.is_empty() {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("No channels configured").color(PALETTE_WHITE));
                    });
                    return;
                }

                ui.columns(channels.len(), |columns| {
                    for ((column, channel), pane) in
                        columns.iter_mut().zip(channels).zip(panes)
                    {
                        column.with_layout(Layout::top_down(Align::Center), |ui| {
                            ui.label(
                                RichText::new(&channel.display_title)
                                    .size(TITLE_TEXT_SIZE)
                                    .color(PALETTE_WHITE),
                            );

                            let available = ui.available_size();
                            let side = available
                                .x
                                .min(available.y - TEXT_RESERVED_HEIGHT)
                                .max(0.);
                            match pane.displayed_frame() {
                                Some(texture) => {
                                    ui.add(
                                        egui::Image::from_texture(texture)
                                            .fit_to_exact_size(Vec2::splat(side)),
                                    );
                                }
                                None => {
                                    ui.allocate_space(Vec2::splat(side));
                                }
                            }

                            let label = pane.forecast_label().unwrap_or("Waiting for forecast");
                            ui.label(
                                RichText::new(label)
                                    .size(LABEL_TEXT_SIZE)
                                    .color(PALETTE_GREEN),
                            );
                        });
                    }
                });
            });
    }
}
