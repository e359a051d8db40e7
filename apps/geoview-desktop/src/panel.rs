use egui::{Align2, Color32, Context, RichText};
use geoview_common::Rgb;
use geoview_input::Action;
use geoview_viewer::ViewerState;
use geoview_viewer::panel::{self, ToggleButton};

fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

/// Draw the shape selector and the toggle panel. Returns the actions
/// clicked this frame; the caller dispatches them after the egui pass.
pub fn draw(ctx: &Context, state: &ViewerState) -> Vec<Action> {
    let mut clicked = Vec::new();

    egui::Window::new("Shapes")
        .anchor(Align2::LEFT_TOP, [12.0, 12.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            for button in panel::shape_buttons(state) {
                let text = RichText::new(button.label).color(color32(button.color));
                let response = ui
                    .selectable_label(button.active, text)
                    .on_hover_text(button.tooltip);
                if response.clicked() {
                    clicked.push(button.action);
                }
            }
            ui.separator();
            ui.small("1-8: shapes | R: rotation | W: wireframe");
        });

    egui::Window::new("View")
        .anchor(Align2::RIGHT_TOP, [-12.0, 12.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            toggle(ui, panel::rotate_toggle(state), &mut clicked);
            toggle(ui, panel::wireframe_toggle(state), &mut clicked);
        });

    clicked
}

fn toggle(ui: &mut egui::Ui, button: ToggleButton, clicked: &mut Vec<Action>) {
    if ui.button(button.label).clicked() {
        clicked.push(button.action);
    }
}
