//! Main egui application: composes the panels and drives the session store.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};

use chat_core::event_bus::EventBus;
use chat_core::persistence::PanelLayout;
use chat_core::ports::GatewayPort;
use chat_core::store::{send_message, SessionStore};
use chat_platform::gateway::HttpGateway;
use chat_platform::storage::auto_detect_storage;
use chat_types::config::ChatConfig;
use chat_ui::panels::chat::{self, ChatAction};
use chat_ui::panels::sidebar::{self, SidebarAction};
use chat_ui::state::UiState;
use chat_ui::theme;

/// Sidebar ratio changes smaller than this are not written back
const LAYOUT_EPSILON: f32 = 0.005;

/// Health check result handed back from the polling task
type HealthSlot = Rc<RefCell<Option<chat_types::Result<bool>>>>;

pub struct ChatApp {
    config: ChatConfig,
    ui_state: UiState,
    event_bus: EventBus,
    store: Rc<RefCell<SessionStore>>,
    gateway: Rc<dyn GatewayPort>,
    health: HealthSlot,
    health_in_flight: Rc<RefCell<bool>>,
    next_health_check: f64,
    first_frame: bool,
}

impl ChatApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut config = ChatConfig::default().with_backend_url(option_env!("CHAT_BACKEND_URL"));
        config.seed_mock_sessions = option_env!("CHAT_SEED_MOCK").is_some();
        log::info!("Backend: {}", config.gateway.base_url);

        let event_bus = EventBus::new();
        let storage = auto_detect_storage(&config.storage.backend);
        let store = SessionStore::open(&config, storage, event_bus.clone());
        let gateway: Rc<dyn GatewayPort> = Rc::new(HttpGateway::new(config.gateway.clone()));

        Self {
            ui_state: UiState::new(config.scroll.clone()),
            config,
            event_bus,
            store: Rc::new(RefCell::new(store)),
            gateway,
            health: Rc::new(RefCell::new(None)),
            health_in_flight: Rc::new(RefCell::new(false)),
            next_health_check: 0.0,
            first_frame: true,
        }
    }

    /// Send a message through the store (async)
    fn dispatch_message(&self, text: String, ctx: &egui::Context) {
        let store = self.store.clone();
        let gateway = self.gateway.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = send_message(&store, gateway.as_ref(), &text, None).await {
                log::warn!("Message not sent: {}", e);
            }
            ctx.request_repaint();
        });
    }

    /// Start a health check when one is due and none is running
    fn poll_health(&mut self, ctx: &egui::Context, now: f64) {
        if let Some(result) = self.health.borrow_mut().take() {
            self.ui_state.set_health(result);
        }

        if now < self.next_health_check || *self.health_in_flight.borrow() {
            return;
        }
        self.next_health_check = now + self.config.health_poll_secs;
        *self.health_in_flight.borrow_mut() = true;

        let gateway = self.gateway.clone();
        let slot = self.health.clone();
        let in_flight = self.health_in_flight.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = gateway.check_health().await;
            *slot.borrow_mut() = Some(result);
            *in_flight.borrow_mut() = false;
            ctx.request_repaint();
        });
    }

    fn apply_sidebar_action(&mut self, action: SidebarAction) {
        let mut store = self.store.borrow_mut();
        let result = match action {
            SidebarAction::NewChat => {
                store.create_session(Default::default());
                Ok(())
            }
            SidebarAction::Select(id) => store.select_session(&id),
            SidebarAction::Delete(id) => store.delete_session(&id),
            SidebarAction::ToggleCollapsed => {
                let collapsed = store.sidebar_collapsed();
                store.set_sidebar_collapsed(!collapsed);
                Ok(())
            }
        };
        if let Err(e) = result {
            log::warn!("Sidebar action failed: {}", e);
        }
    }

    fn apply_chat_action(&mut self, action: ChatAction, ctx: &egui::Context) {
        match action {
            ChatAction::Send(text) => self.dispatch_message(text, ctx),
            ChatAction::SetMode(mode) => {
                let mut store = self.store.borrow_mut();
                let Some(id) = store.active_id().map(str::to_string) else {
                    return;
                };
                if let Err(e) = store.set_session_mode(&id, mode) {
                    log::warn!("Mode change failed: {}", e);
                }
            }
        }
    }

    /// Persist the sidebar width once the user lets go of the divider
    fn remember_sidebar_width(&mut self, ctx: &egui::Context, width: f32) {
        let total = ctx.screen_rect().width();
        if total <= 0.0 || ctx.input(|i| i.pointer.any_down()) {
            return;
        }
        let ratio = width / total;
        let mut store = self.store.borrow_mut();
        if (store.layout().sidebar_ratio - ratio).abs() > LAYOUT_EPSILON {
            store.set_layout(PanelLayout { sidebar_ratio: ratio });
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        let now = ctx.input(|i| i.time);

        // Drain events from the session store
        if self.event_bus.has_pending() {
            self.ui_state.process_events(self.event_bus.drain(), now);
            ctx.request_repaint();
        }

        self.poll_health(ctx, now);
        ctx.request_repaint_after(Duration::from_secs_f64(self.config.health_poll_secs));

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("AI Assistant")
                        .strong()
                        .color(theme::ACCENT)
                        .size(16.0),
                );
                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "Backend: {} | Storage: {}",
                        self.config.gateway.base_url,
                        self.store.borrow().persistence().backend_name()
                    ))
                    .color(theme::TEXT_SECONDARY)
                    .small(),
                );
            });
        });

        // ── Sessions side panel ──────────────────────────────
        let (collapsed, ratio, summaries, active_id) = {
            let store = self.store.borrow();
            (
                store.sidebar_collapsed(),
                store.layout().sidebar_ratio,
                store.summaries(),
                store.active_id().map(str::to_string),
            )
        };

        let mut sidebar_action = None;
        if collapsed {
            SidePanel::left("sidebar_collapsed")
                .resizable(false)
                .exact_width(32.0)
                .show(ctx, |ui| {
                    sidebar_action = sidebar::collapsed_strip(ui);
                });
        } else {
            let total = ctx.screen_rect().width();
            let panel = SidePanel::left("sidebar")
                .resizable(true)
                .default_width(ratio * total)
                .width_range(
                    PanelLayout::MIN_SIDEBAR_RATIO * total..=PanelLayout::MAX_SIDEBAR_RATIO * total,
                )
                .show(ctx, |ui| {
                    sidebar_action = sidebar::sidebar_panel(
                        ui,
                        &mut self.ui_state,
                        &summaries,
                        active_id.as_deref(),
                    );
                });
            self.remember_sidebar_width(ctx, panel.response.rect.width());
        }
        if let Some(action) = sidebar_action {
            self.apply_sidebar_action(action);
            ctx.request_repaint();
        }

        // ── Main content ─────────────────────────────────────
        let mut chat_action = None;
        CentralPanel::default().show(ctx, |ui| {
            let store = self.store.borrow();
            chat_action = chat::chat_panel(ui, &mut self.ui_state, store.active_session());
        });
        if let Some(action) = chat_action {
            self.apply_chat_action(action, ctx);
            ctx.request_repaint();
        }
    }
}
