mod pane_view;

use std::time::{Duration, Instant};

use egui::{Color32, Key, ViewportCommand, Visuals};
use log::info;

use super::TextureFrameDecoder;
use crate::config::AppConfig;
use crate::viewer::ViewerState;

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(0, 0, 0);
pub(crate) const PALETTE_WHITE: Color32 = Color32::from_rgb(235, 235, 235);
pub(crate) const PALETTE_GREEN: Color32 = Color32::from_rgb(120, 220, 140);

/// `LiveAuroraApp` is the fullscreen kiosk window. It shows one pane per
/// channel and drives the viewer's poll tick from the egui event loop.
pub struct LiveAuroraApp {
    viewer: ViewerState<TextureFrameDecoder>,
    tick: Duration,
    last_tick: Option<Instant>,
}

impl LiveAuroraApp {
    pub fn new(app_config: AppConfig, cc: &eframe::CreationContext<'_>) -> Self {
        let mut visuals = Visuals::dark();
        visuals.panel_fill = PALETTE_BLACK;
        visuals.window_fill = PALETTE_BLACK;
        visuals.extreme_bg_color = PALETTE_BLACK;
        cc.egui_ctx.set_visuals(visuals);

        info!(
            "Watching {} channels, checking every {}s",
            app_config.channels.len(),
            app_config.check_interval_s
        );
        let viewer = ViewerState::new(
            app_config.channels.clone(),
            TextureFrameDecoder::new(cc.egui_ctx.clone()),
            app_config.check_interval(),
            app_config.signal_file.clone(),
        );

        Self {
            viewer,
            tick: app_config.tick(),
            last_tick: None,
        }
    }
}

impl eframe::App for LiveAuroraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if self
            .last_tick
            .is_none_or(|last| now.saturating_duration_since(last) >= self.tick)
        {
            self.viewer.poll_tick(now);
            self.last_tick = Some(now);
        }

        if ctx.input(|i| i.key_pressed(Key::Escape) || i.key_pressed(Key::Q)) {
            ctx.send_viewport_cmd(ViewportCommand::Close);
        }

        self.panes_view(ctx);

        // egui only repaints on input, so schedule the next tick ourselves
        let since_tick = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        ctx.request_repaint_after(self.tick.saturating_sub(since_tick));
    }
}
