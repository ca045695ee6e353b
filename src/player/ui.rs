//! egui overlay: page chrome plus the scene overlays projected from 3D.

use egui::{Align2, Color32, CornerRadius, Frame, Margin, RichText};

use crate::camera::Camera;
use crate::scene::{Overlay, OverlayContent};

pub const PAGE_TITLE: &str = "Excel Service Hub – 3D Cinematic Promo";
pub const START_LABEL: &str = "Start Cinematic";
pub const CONTACT_LABEL: &str = "Contact Us";

const ACCENT: Color32 = Color32::from_rgb(0x2d, 0xd4, 0xbf);
const CARD_FILL: Color32 = Color32::from_rgba_premultiplied(12, 20, 33, 210);
const CTA_FILL: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e);

/// Everything the overlay needs for one frame
pub struct UiFrame<'a> {
    pub started: bool,
    pub fps: Option<f32>,
    pub overlays: &'a [Overlay],
    pub camera: &'a Camera,
    pub contact: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    None,
    Start,
}

pub fn draw(ctx: &egui::Context, frame: &UiFrame) -> UiAction {
    let mut action = UiAction::None;

    egui::Window::new("header")
        .title_bar(false)
        .resizable(false)
        .fixed_pos(egui::pos2(16.0, 16.0))
        .frame(Frame::NONE)
        .show(ctx, |ui| {
            ui.label(RichText::new(PAGE_TITLE).size(22.0).strong().color(Color32::WHITE));
            ui.horizontal(|ui| {
                if !frame.started && ui.button(RichText::new(START_LABEL).size(16.0)).clicked() {
                    action = UiAction::Start;
                }
                ui.hyperlink_to(RichText::new(CONTACT_LABEL).size(16.0).color(ACCENT), frame.contact);
            });
        });

    if let Some(fps) = frame.fps {
        egui::Window::new("FPS")
            .title_bar(false)
            .resizable(false)
            .anchor(Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
            .frame(Frame::NONE)
            .show(ctx, |ui| {
                ui.label(RichText::new(format!("{:.0} FPS", fps)).size(12.0).color(Color32::GRAY));
            });
    }

    let screen = ctx.screen_rect();
    for (i, overlay) in frame.overlays.iter().enumerate() {
        if overlay.opacity <= 0.0 {
            continue;
        }
        let Some(at) = frame.camera.project(overlay.anchor, screen.width(), screen.height()) else {
            continue;
        };
        egui::Area::new(egui::Id::new(("overlay", i)))
            .fixed_pos(screen.min + egui::vec2(at.x, at.y))
            .pivot(Align2::CENTER_CENTER)
            .interactable(matches!(overlay.content, OverlayContent::Link { .. }))
            .show(ctx, |ui| {
                ui.multiply_opacity(overlay.opacity.clamp(0.0, 1.0));
                draw_overlay(ui, &overlay.content);
            });
    }

    action
}

fn draw_overlay(ui: &mut egui::Ui, content: &OverlayContent) {
    match content {
        OverlayContent::Label(text) => {
            ui.label(RichText::new(text).size(18.0).color(Color32::from_rgb(0xe2, 0xe8, 0xf0)));
        }
        OverlayContent::Card { title, subtitle, tiles } => {
            Frame::new()
                .fill(CARD_FILL)
                .corner_radius(CornerRadius::same(12))
                .inner_margin(Margin::same(16))
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new(title).size(30.0).strong().color(Color32::WHITE));
                        ui.label(RichText::new(subtitle).size(16.0).color(ACCENT));
                    });
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        for (name, description) in tiles {
                            Frame::new()
                                .fill(Color32::from_white_alpha(10))
                                .corner_radius(CornerRadius::same(8))
                                .inner_margin(Margin::same(10))
                                .show(ui, |ui| {
                                    ui.label(RichText::new(name).size(14.0).strong().color(Color32::WHITE));
                                    ui.label(RichText::new(description).size(11.0).color(Color32::GRAY));
                                });
                        }
                    });
                });
        }
        OverlayContent::Link { text, href } => {
            let button = egui::Button::new(RichText::new(text).size(18.0).color(Color32::from_rgb(0x0b, 0x0f, 0x14)))
                .fill(CTA_FILL)
                .corner_radius(CornerRadius::same(18));
            if ui.add(button).clicked() {
                ui.ctx().open_url(egui::OpenUrl::new_tab(href));
            }
        }
    }
}
