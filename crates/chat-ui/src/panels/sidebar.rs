//! Session sidebar: new chat, session list, delete with confirmation.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};

use chat_types::session::{SessionId, SessionSummary};

use crate::state::UiState;
use crate::theme::*;

#[derive(Debug, Clone, PartialEq)]
pub enum SidebarAction {
    NewChat,
    Select(SessionId),
    Delete(SessionId),
    ToggleCollapsed,
}

/// Render the full sidebar.
pub fn sidebar_panel(
    ui: &mut egui::Ui,
    state: &mut UiState,
    sessions: &[SessionSummary],
    active_id: Option<&str>,
) -> Option<SidebarAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.label(RichText::new("Conversations").color(TEXT_PRIMARY).strong());
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui
                .small_button("«")
                .on_hover_text("Collapse sidebar")
                .clicked()
            {
                action = Some(SidebarAction::ToggleCollapsed);
            }
        });
    });

    let new_chat = egui::Button::new(RichText::new("+ New Chat").color(TEXT_PRIMARY))
        .fill(ACCENT)
        .corner_radius(PANEL_ROUNDING)
        .min_size(Vec2::new(ui.available_width(), 28.0));
    if ui.add(new_chat).clicked() {
        action = Some(SidebarAction::NewChat);
    }

    ui.separator();

    ScrollArea::vertical()
        .id_salt("sessions")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for summary in sessions {
                let selected = active_id == Some(summary.id.as_str());
                if let Some(a) = session_row(ui, state, summary, selected) {
                    action = Some(a);
                }
            }
        });

    action
}

/// Narrow strip shown while the sidebar is collapsed.
pub fn collapsed_strip(ui: &mut egui::Ui) -> Option<SidebarAction> {
    let mut action = None;
    ui.vertical_centered(|ui| {
        if ui.small_button("»").on_hover_text("Show conversations").clicked() {
            action = Some(SidebarAction::ToggleCollapsed);
        }
        if ui.small_button("+").on_hover_text("New chat").clicked() {
            action = Some(SidebarAction::NewChat);
        }
    });
    action
}

fn session_row(
    ui: &mut egui::Ui,
    state: &mut UiState,
    summary: &SessionSummary,
    selected: bool,
) -> Option<SidebarAction> {
    let mut action = None;
    let confirming = state.confirm_delete.as_deref() == Some(summary.id.as_str());

    egui::Frame::default()
        .fill(if selected { BG_SURFACE } else { BG_SIDEBAR })
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(6.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(mode_color(summary.mode)).small());
                let title = ui.selectable_label(selected, RichText::new(&summary.title).color(TEXT_PRIMARY));
                if title.clicked() && !selected {
                    action = Some(SidebarAction::Select(summary.id.clone()));
                }

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if confirming {
                        if ui.small_button(RichText::new("Delete").color(ERROR)).clicked() {
                            action = Some(SidebarAction::Delete(summary.id.clone()));
                            state.confirm_delete = None;
                        }
                        if ui.small_button("Cancel").clicked() {
                            state.confirm_delete = None;
                        }
                    } else if ui
                        .small_button(RichText::new("✕").color(TEXT_SECONDARY))
                        .on_hover_text("Delete conversation")
                        .clicked()
                    {
                        state.confirm_delete = Some(summary.id.clone());
                    }
                });
            });
            ui.label(
                RichText::new(format!(
                    "{} · {} message{}",
                    summary.mode.label(),
                    summary.message_count,
                    if summary.message_count == 1 { "" } else { "s" }
                ))
                .color(TEXT_SECONDARY)
                .small(),
            );
        });
    ui.add_space(2.0);

    action
}
