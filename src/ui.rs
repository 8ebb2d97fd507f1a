use egui::Context;
use crate::config::HudConfig;
use crate::controller::GameSession;
use crate::model::{CarType, Nitro, VehicleState};

/// Nitro state as shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NitroStatus {
    Ready,
    Active,
    /// Whole seconds left, rounded up
    Cooldown(u32),
}

impl NitroStatus {
    pub fn from_nitro(nitro: &Nitro) -> Self {
        match *nitro {
            Nitro::Ready => NitroStatus::Ready,
            Nitro::Active { .. } => NitroStatus::Active,
            Nitro::Cooldown { remaining } => NitroStatus::Cooldown(remaining.max(0.0).ceil() as u32),
        }
    }

    pub fn label(&self) -> String {
        match self {
            NitroStatus::Ready => "Nitro: Ready".to_string(),
            NitroStatus::Active => "Nitro: ACTIVE".to_string(),
            NitroStatus::Cooldown(secs) => format!("Nitro: cooldown {secs}s"),
        }
    }
}

/// Values displayed by the HUD; derived from the car state, never fed back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudReadout {
    pub speed_kmh: i32,
    pub nitro: NitroStatus,
}

impl HudReadout {
    pub fn project(state: &VehicleState, config: &HudConfig) -> Self {
        Self {
            speed_kmh: (state.forward_speed * config.kmh_scale).round() as i32,
            nitro: NitroStatus::from_nitro(&state.nitro),
        }
    }

    pub fn speed_label(&self) -> String {
        format!("{} km/h", self.speed_kmh)
    }
}

/// Draw the HUD and, while open, the car selection menu
pub fn draw_ui(ctx: &Context, session: &mut GameSession, dt: f32) {
    if let Some(hud) = session.hud() {
        draw_hud(ctx, &hud);
    }
    draw_debug_window(ctx, session, dt);
    if session.menu_open {
        if let Some(car) = draw_car_menu(ctx) {
            session.select_car(car);
        }
    }
}

fn draw_hud(ctx: &Context, hud: &HudReadout) {
    egui::Area::new(egui::Id::new("hud"))
        .anchor(egui::Align2::LEFT_BOTTOM, [12.0, -12.0])
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(egui::Color32::from_black_alpha(140))
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(hud.speed_label())
                            .size(28.0)
                            .strong()
                            .color(egui::Color32::WHITE),
                    );
                    let color = match hud.nitro {
                        NitroStatus::Active => egui::Color32::from_rgb(0xf9, 0x73, 0x16),
                        NitroStatus::Ready => egui::Color32::from_rgb(0x22, 0xc5, 0x5e),
                        NitroStatus::Cooldown(_) => egui::Color32::LIGHT_GRAY,
                    };
                    ui.label(egui::RichText::new(hud.nitro.label()).size(16.0).color(color));
                });
        });
}

fn draw_debug_window(ctx: &Context, session: &mut GameSession, dt: f32) {
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .default_open(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("FPS: {:.0}", if dt > 0.0 { 1.0 / dt } else { 0.0 }))
                    .small(),
            );
            if let Some(active) = session.vehicle() {
                let s = &active.state;
                ui.label(egui::RichText::new(format!("Car: {}", active.car.display_name())).small());
                ui.label(egui::RichText::new(format!("x: {:.2} vx: {:.3}", s.lateral_position, s.lateral_velocity)).small());
                ui.label(egui::RichText::new(format!("Speed: {:.3}", s.forward_speed)).small());
                ui.label(egui::RichText::new(format!("Drifting: {}", s.is_drifting)).small());
            }
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            ui.label(egui::RichText::new("A / Left - Steer left").small());
            ui.label(egui::RichText::new("D / Right - Steer right").small());
            ui.label(egui::RichText::new("Shift - Drift").small());
            ui.label(egui::RichText::new("Space - Nitro").small());
            if ui.button("Change car").clicked() {
                session.menu_open = true;
            }
        });
}

/// Returns the car picked this frame, if any
fn draw_car_menu(ctx: &Context) -> Option<CarType> {
    let mut picked = None;
    egui::Window::new("Choose your car")
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for car in CarType::ALL {
                    let c = car.body_color();
                    let fill = egui::Color32::from_rgb((c >> 16) as u8, (c >> 8) as u8, c as u8);
                    let button = egui::Button::new(
                        egui::RichText::new(car.display_name()).color(egui::Color32::WHITE).strong(),
                    )
                    .fill(fill)
                    .min_size(egui::vec2(96.0, 48.0));
                    if ui.add(button).clicked() {
                        picked = Some(car);
                    }
                }
            });
        });
    picked
}
