// Chat widget layout
// Heading, auxiliary id field, scrollable history and the message input row

use crate::config::WindowConfig;
use crate::socket::{ConnectionStatus, OutboundMessage};
use crate::state::ChatState;
use crate::ui::components::*;

/// Width kept free for the send button next to the message field
const SEND_BUTTON_ALLOWANCE: f32 = 72.0;

fn message_input_id() -> egui::Id {
    egui::Id::new("message_input")
}

/// Render the chat widget
/// Returns the message to send when the user submitted a non-blank draft
pub fn render_chat_layout(
    ctx: &egui::Context,
    state: &mut ChatState,
    status: &ConnectionStatus,
    window: &WindowConfig,
) -> Option<OutboundMessage> {
    render_header(ctx, status, &window.title);

    let mut submitted = None;
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.add_space(8.0);
        render_id_field(ui, state, &window.id_label);
        ui.add_space(8.0);
        ui.separator();
        ui.add_space(8.0);
        render_history(ui, state, window.history_height);
        ui.add_space(8.0);
        submitted = render_input_row(ui, state);
    });
    submitted
}

/// Render the heading with the connection badge on the right
fn render_header(ctx: &egui::Context, status: &ConnectionStatus, title: &str) {
    egui::TopBottomPanel::top("chat_header").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.heading(title);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add_space(8.0);
                connection_badge(ui, status);
            });
        });
        ui.add_space(4.0);
    });
}

/// Render the auxiliary identifier field
fn render_id_field(ui: &mut egui::Ui, state: &mut ChatState, label: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(format!("{}:", label)).strong());
        ui.add_space(8.0);
        ui.add(
            egui::TextEdit::singleline(&mut state.auxiliary_id)
                .id_source("auxiliary_id_input")
                .hint_text(format!("Enter {}", label)),
        );
    });
}

/// Render the conversation in a fixed-height area that follows new entries
fn render_history(ui: &mut egui::Ui, state: &ChatState, height: f32) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        egui::ScrollArea::vertical()
            .id_source("chat_history_scroll")
            .auto_shrink([false; 2])
            .min_scrolled_height(height)
            .max_height(height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if state.entries().is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.0);
                        ui.label(egui::RichText::new("No messages yet").italics().weak());
                    });
                }

                for entry in state.entries() {
                    chat_entry(ui, entry);
                    ui.add_space(4.0);
                }
            });
    });
}

/// Render the message field and send button
/// Enter submits and keeps focus in the field
fn render_input_row(ui: &mut egui::Ui, state: &mut ChatState) -> Option<OutboundMessage> {
    let mut submit = false;

    ui.horizontal(|ui| {
        let width = (ui.available_width() - SEND_BUTTON_ALLOWANCE).max(120.0);
        let input = ui.add(
            egui::TextEdit::singleline(&mut state.draft)
                .id(message_input_id())
                .hint_text("Type a message")
                .desired_width(width),
        );

        if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submit = true;
            input.request_focus();
        }
        if send_button(ui).clicked() {
            submit = true;
        }
    });

    if submit {
        state.submit()
    } else {
        None
    }
}
