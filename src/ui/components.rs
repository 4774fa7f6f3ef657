// Reusable UI components
// Chat entries, the connection badge and the send button

use crate::socket::ConnectionStatus;
use crate::state::ChatEntry;

/// Accent colour of service replies
const AI_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 150, 136);
/// Accent colour of user messages
const USER_COLOR: egui::Color32 = egui::Color32::from_rgb(33, 120, 220);

/// Render the connection status as coloured text
/// Colors: Connecting (yellow), Connected (green), Disconnected/Offline (red), Closed (gray)
pub fn connection_badge(ui: &mut egui::Ui, status: &ConnectionStatus) -> egui::Response {
    let color = match status {
        ConnectionStatus::Connecting => egui::Color32::from_rgb(220, 180, 0),
        ConnectionStatus::Connected => egui::Color32::from_rgb(0, 200, 0),
        ConnectionStatus::Disconnected(_) | ConnectionStatus::Failed(_) => {
            egui::Color32::from_rgb(220, 0, 0)
        }
        ConnectionStatus::Closed => egui::Color32::GRAY,
    };

    ui.colored_label(color, format!("● {}", status.label()))
        .on_hover_text(status.to_string())
}

/// Render one chat entry: role label above the text, tinted by role
pub fn chat_entry(ui: &mut egui::Ui, entry: &ChatEntry) {
    let accent = if entry.is_from_service() {
        AI_COLOR
    } else {
        USER_COLOR
    };
    let fill = egui::Color32::from_rgba_unmultiplied(accent.r(), accent.g(), accent.b(), 24);

    egui::Frame::none()
        .fill(fill)
        .rounding(egui::Rounding::same(6.0))
        .inner_margin(egui::Margin::same(8.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new(entry.role_label())
                    .strong()
                    .color(accent),
            );
            ui.add_space(2.0);
            ui.label(entry.text());
        });
}

/// Render the send button
pub fn send_button(ui: &mut egui::Ui) -> egui::Response {
    ui.button(egui::RichText::new("Send").strong())
}
