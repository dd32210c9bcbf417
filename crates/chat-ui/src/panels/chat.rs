//! Chat panel: header, message list with scroll affordances, input field.

use egui::{self, style::ScrollAnimation, Align, Key, Layout, RichText, ScrollArea, Vec2};

use chat_core::scroll::{ManualScroll, ScrollCommand, ScrollMetrics};
use chat_core::seed;
use chat_types::message::{Message, Role};
use chat_types::session::{ChatSession, Mode};

use crate::format::{self, Block, Span};
use crate::state::{HealthStatus, UiState};
use crate::theme::*;

/// What the user asked for this frame
#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    Send(String),
    SetMode(Mode),
}

/// Render the chat panel for `session`.
pub fn chat_panel(
    ui: &mut egui::Ui,
    state: &mut UiState,
    session: Option<&ChatSession>,
) -> Option<ChatAction> {
    let mut action = None;
    let now = ui.input(|i| i.time);
    let follow = state.scroll.tick(now);
    state.queue_scroll(follow);

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                header(ui, state, session, &mut action);
                ui.separator();

                let available_height = ui.available_height() - 90.0;
                message_list(ui, state, session, available_height, now, &mut action);
                scroll_affordances(ui, state, now);

                ui.add_space(6.0);
                if let Some(text) = input_row(ui, state) {
                    action = Some(ChatAction::Send(text));
                }
            });
        });

    if state.loading || state.scroll.is_manual(now) {
        ui.ctx().request_repaint();
    }

    action
}

fn header(
    ui: &mut egui::Ui,
    state: &UiState,
    session: Option<&ChatSession>,
    action: &mut Option<ChatAction>,
) {
    ui.horizontal(|ui| {
        let title = session.map(|s| s.title.as_str()).unwrap_or("Chat");
        ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());

        if let Some(session) = session {
            let mut mode = session.mode;
            egui::ComboBox::from_id_salt("mode_select")
                .selected_text(RichText::new(mode.label()).color(mode_color(mode)))
                .show_ui(ui, |ui| {
                    for m in Mode::all() {
                        ui.selectable_value(&mut mode, *m, m.label());
                    }
                });
            if mode != session.mode {
                *action = Some(ChatAction::SetMode(mode));
            }
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let health_color = match state.health {
                HealthStatus::Ready => SUCCESS,
                HealthStatus::Unavailable => ERROR,
                HealthStatus::Unknown => TEXT_SECONDARY,
            };
            ui.label(RichText::new(state.health.label()).color(health_color).small());
            ui.label(RichText::new("●").color(health_color).small());
            ui.separator();
            let status_color = if state.is_busy() { WARNING } else { TEXT_SECONDARY };
            ui.label(RichText::new(&state.status_text).color(status_color).small());
        });
    });
}

fn message_list(
    ui: &mut egui::Ui,
    state: &mut UiState,
    session: Option<&ChatSession>,
    max_height: f32,
    now: f64,
    action: &mut Option<ChatAction>,
) {
    let command = state.take_scroll();

    let mut area = ScrollArea::vertical()
        .id_salt("messages")
        .max_height(max_height)
        .auto_shrink([false, false]);
    if command == Some(ScrollCommand::ToTop) {
        area = area.vertical_scroll_offset(0.0);
    }

    let output = area.show(ui, |ui| {
        match session {
            Some(session) if !session.is_empty() => {
                let last_id = session.last_message().map(|m| m.id.as_str());
                for message in &session.messages {
                    let offer_suggestions = Some(message.id.as_str()) == last_id && !state.loading;
                    if let Some(text) = render_message(ui, message, offer_suggestions) {
                        *action = Some(ChatAction::Send(text));
                    }
                    ui.add_space(4.0);
                }
            }
            Some(session) => {
                if let Some(text) = quick_actions(ui, session.mode, state.loading) {
                    *action = Some(ChatAction::Send(text));
                }
            }
            None => {
                ui.label(RichText::new("No conversation selected").color(TEXT_SECONDARY));
            }
        }

        if state.loading {
            egui::Frame::default()
                .fill(BG_SECONDARY)
                .corner_radius(BUBBLE_ROUNDING)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Thinking...").color(TEXT_SECONDARY));
                    });
                });
        }

        match command {
            Some(ScrollCommand::ToBottom { animated: true }) => {
                ui.scroll_to_cursor(Some(Align::BOTTOM));
            }
            Some(ScrollCommand::ToBottom { animated: false }) => {
                ui.scroll_to_cursor_animation(Some(Align::BOTTOM), ScrollAnimation::none());
            }
            _ => {}
        }
    });

    state.scroll.observe(ScrollMetrics {
        offset: output.state.offset.y,
        content_height: output.content_size.y,
        viewport_height: output.inner_rect.height(),
    });

    if let Some(input) = manual_input(ui, output.inner_rect) {
        let cmd = state.scroll.on_manual_input(input, now);
        state.queue_scroll(cmd);
    }
}

/// Scroll input aimed at the message list. Keys only count while no text
/// field has focus.
fn manual_input(ui: &egui::Ui, list_rect: egui::Rect) -> Option<ManualScroll> {
    let hovered = ui.rect_contains_pointer(list_rect);
    let typing = ui.memory(|m| m.focused().is_some());
    ui.input(|i| {
        if hovered && i.raw_scroll_delta.y != 0.0 {
            return Some(ManualScroll::Wheel);
        }
        if typing {
            return None;
        }
        [
            (Key::PageUp, ManualScroll::PageUp),
            (Key::PageDown, ManualScroll::PageDown),
            (Key::Home, ManualScroll::Home),
            (Key::End, ManualScroll::End),
        ]
        .into_iter()
        .find(|(key, _)| i.key_pressed(*key))
        .map(|(_, input)| input)
    })
}

fn scroll_affordances(ui: &mut egui::Ui, state: &mut UiState, now: f64) {
    ui.horizontal(|ui| {
        if state.scroll.show_jump_to_top()
            && ui.small_button(RichText::new("⬆ Top").color(TEXT_SECONDARY)).clicked()
        {
            let cmd = state.scroll.jump_to_top(now);
            state.queue_scroll(Some(cmd));
        }

        if state.scroll.show_jump_to_bottom() {
            let (label, color) = if state.scroll.has_new_content() {
                ("⬇ New messages", ACCENT)
            } else {
                ("⬇ Bottom", TEXT_SECONDARY)
            };
            if ui.small_button(RichText::new(label).color(color)).clicked() {
                let cmd = state.scroll.jump_to_bottom();
                state.queue_scroll(Some(cmd));
            }
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if state.scroll.show_jump_to_top() || state.scroll.show_jump_to_bottom() {
                ui.label(
                    RichText::new(format!("{:.0}%", state.scroll.progress()))
                        .color(TEXT_SECONDARY)
                        .small(),
                );
            }
        });
    });
}

fn input_row(ui: &mut egui::Ui, state: &mut UiState) -> Option<String> {
    let mut submitted = None;

    ui.horizontal(|ui| {
        let input = egui::TextEdit::singleline(&mut state.input_text)
            .hint_text("Type a message...")
            .desired_width(ui.available_width() - 70.0)
            .font(egui::FontId::proportional(14.0));

        let response = ui.add(input);

        let send_enabled = state.submittable_input().is_some();
        let send_btn = ui.add_enabled(
            send_enabled,
            egui::Button::new(RichText::new("Send").color(TEXT_PRIMARY))
                .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                .corner_radius(PANEL_ROUNDING)
                .min_size(Vec2::new(60.0, 0.0)),
        );

        let enter = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
        if enter || send_btn.clicked() {
            if let Some(text) = state.submittable_input() {
                submitted = Some(text);
                state.input_text.clear();
            }
            response.request_focus();
        }
    });

    submitted
}

/// Returns a suggestion the user clicked.
fn render_message(ui: &mut egui::Ui, message: &Message, offer_suggestions: bool) -> Option<String> {
    let mut picked = None;
    let (label, label_color, bg) = match message.role {
        Role::User => ("You", TEXT_PRIMARY, USER_BUBBLE),
        Role::Assistant => ("Assistant", SUCCESS, BG_SECONDARY),
    };

    egui::Frame::default()
        .fill(bg)
        .corner_radius(BUBBLE_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(label).color(label_color).strong().small());
                ui.label(
                    RichText::new(message.created_at.format("%H:%M").to_string())
                        .color(TEXT_SECONDARY)
                        .small(),
                );
                if message.role == Role::Assistant {
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui
                            .small_button(RichText::new("Copy").color(TEXT_SECONDARY).small())
                            .on_hover_text("Copy to clipboard")
                            .clicked()
                        {
                            ui.ctx().copy_text(message.content.clone());
                            log::debug!("copied message {}", message.id);
                        }
                    });
                }
            });
            for block in format::blocks(message) {
                render_block(ui, &block);
            }

            if offer_suggestions && !message.suggestions.is_empty() {
                ui.add_space(4.0);
                ui.horizontal_wrapped(|ui| {
                    for suggestion in &message.suggestions {
                        if chip(ui, suggestion) {
                            picked = Some(suggestion.clone());
                        }
                    }
                });
            }
        });

    picked
}

fn chip(ui: &mut egui::Ui, text: &str) -> bool {
    let button = egui::Button::new(RichText::new(text).color(ACCENT).small())
        .fill(BG_SURFACE)
        .corner_radius(PANEL_ROUNDING);
    ui.add(button).clicked()
}

/// Starter prompts for an empty conversation. Returns the one clicked.
fn quick_actions(ui: &mut egui::Ui, mode: Mode, loading: bool) -> Option<String> {
    let mut picked = None;
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.label(
            RichText::new(format!("{} mode. Start a conversation or try a quick action.", mode.label()))
                .color(TEXT_SECONDARY)
                .italics(),
        );
        ui.add_space(8.0);
        ui.add_enabled_ui(!loading, |ui| {
            ui.horizontal_wrapped(|ui| {
                for prompt in seed::quick_actions(mode) {
                    if chip(ui, prompt) {
                        picked = Some(prompt.to_string());
                    }
                }
            });
        });
    });
    picked
}

fn render_block(ui: &mut egui::Ui, block: &Block) {
    match block {
        Block::Heading(spans) => rich_line(ui, None, spans, 16.0),
        Block::Paragraph(spans) => rich_line(ui, None, spans, 14.0),
        Block::Bullet(spans) => rich_line(ui, Some("•".to_string()), spans, 14.0),
        Block::Numbered(n, spans) => rich_line(ui, Some(format!("{}.", n)), spans, 14.0),
        Block::Code { text, .. } => {
            egui::Frame::default()
                .fill(BG_PRIMARY)
                .corner_radius(PANEL_ROUNDING)
                .inner_margin(6.0)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new(text).monospace().color(TEXT_PRIMARY));
                });
        }
    }
}

fn rich_line(ui: &mut egui::Ui, marker: Option<String>, spans: &[Span], size: f32) {
    ui.horizontal_wrapped(|ui| {
        if let Some(marker) = marker {
            ui.label(RichText::new(marker).color(ACCENT));
        }
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            ui.label(span_text(span, size));
        }
    });
}

fn span_text(span: &Span, size: f32) -> RichText {
    let mut rich = RichText::new(&span.text).color(TEXT_PRIMARY).size(size);
    if span.strong || size > 14.0 {
        rich = rich.strong();
    }
    if span.italic {
        rich = rich.italics();
    }
    if span.code {
        rich = rich.code();
    }
    rich
}
