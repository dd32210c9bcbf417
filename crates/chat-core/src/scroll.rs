//! Scroll/viewport controller for the message list.
//!
//! A pure state machine: the UI reports scroll metrics, appended content,
//! loading transitions and manual input, and gets back an optional
//! [`ScrollCommand`] to apply. Time is passed in as seconds so the same code
//! runs under egui in the browser and in native tests.

use chat_types::config::ScrollConfig;

/// Where the viewport sits in the scrollable region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportPosition {
    AtTop,
    AtBottom,
    Scrolled,
}

/// A snapshot of the scrollable region, in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub offset: f32,
    pub content_height: f32,
    pub viewport_height: f32,
}

impl ScrollMetrics {
    pub fn max_offset(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    ToBottom { animated: bool },
    ToTop,
}

/// Scroll input that came from the user rather than from content growth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualScroll {
    Wheel,
    PageUp,
    PageDown,
    Home,
    End,
}

#[derive(Debug, Clone)]
pub struct ScrollController {
    config: ScrollConfig,
    at_top: bool,
    at_bottom: bool,
    scrollable: bool,
    progress: f32,
    loading: bool,
    new_content: bool,
    /// Auto-follow is suspended until this time
    manual_until: Option<f64>,
    last_follow: f64,
}

impl ScrollController {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            at_top: true,
            at_bottom: true,
            scrollable: false,
            progress: 100.0,
            loading: false,
            new_content: false,
            manual_until: None,
            last_follow: f64::NEG_INFINITY,
        }
    }

    // ─── Derived state ───────────────────────────────────────

    pub fn position(&self) -> ViewportPosition {
        if self.at_bottom {
            ViewportPosition::AtBottom
        } else if self.at_top {
            ViewportPosition::AtTop
        } else {
            ViewportPosition::Scrolled
        }
    }

    pub fn is_at_top(&self) -> bool {
        self.at_top
    }

    pub fn is_at_bottom(&self) -> bool {
        self.at_bottom
    }

    /// Scroll progress in percent, 100 when the content fits
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn has_new_content(&self) -> bool {
        self.new_content
    }

    pub fn show_jump_to_top(&self) -> bool {
        self.scrollable && !self.at_top
    }

    pub fn show_jump_to_bottom(&self) -> bool {
        !self.at_bottom
    }

    pub fn is_manual(&self, now: f64) -> bool {
        self.manual_until.is_some_and(|until| now < until)
    }

    /// Bottom of the list and not inside a manual-scroll cooldown
    pub fn is_following(&self, now: f64) -> bool {
        self.at_bottom && !self.is_manual(now)
    }

    // ─── Inputs ──────────────────────────────────────────────

    /// Recompute position flags from the latest metrics.
    pub fn observe(&mut self, metrics: ScrollMetrics) {
        let max = metrics.max_offset();
        let offset = metrics.offset.clamp(0.0, max);

        self.scrollable = max > 0.0;
        self.at_top = offset <= self.config.top_threshold;
        self.at_bottom = max - offset <= self.config.bottom_threshold;
        self.progress = if self.scrollable {
            (offset / max * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        if self.at_bottom {
            self.new_content = false;
        }
    }

    /// The user scrolled. Suspends auto-follow for the cooldown window.
    pub fn on_manual_input(&mut self, input: ManualScroll, now: f64) -> Option<ScrollCommand> {
        self.manual_until = Some(now + self.config.manual_cooldown_secs);
        match input {
            ManualScroll::Home => Some(ScrollCommand::ToTop),
            ManualScroll::End => {
                self.new_content = false;
                Some(ScrollCommand::ToBottom { animated: true })
            }
            ManualScroll::Wheel | ManualScroll::PageUp | ManualScroll::PageDown => None,
        }
    }

    /// A message was appended to the visible conversation.
    pub fn on_content_appended(&mut self, now: f64) -> Option<ScrollCommand> {
        if self.is_following(now) {
            Some(ScrollCommand::ToBottom { animated: true })
        } else {
            self.new_content = true;
            None
        }
    }

    /// Entering loading always pulls the view down to where the reply will land.
    pub fn on_loading_changed(&mut self, loading: bool, now: f64) -> Option<ScrollCommand> {
        self.loading = loading;
        if !loading {
            return None;
        }
        self.manual_until = None;
        self.new_content = false;
        self.last_follow = now;
        Some(ScrollCommand::ToBottom { animated: true })
    }

    /// Called once per frame. Expires the manual cooldown and, while loading
    /// at the bottom, re-asserts the bottom position on a fixed interval.
    pub fn tick(&mut self, now: f64) -> Option<ScrollCommand> {
        if self.manual_until.is_some_and(|until| now >= until) {
            self.manual_until = None;
        }

        if self.loading
            && self.is_following(now)
            && now - self.last_follow >= self.config.follow_interval_secs
        {
            self.last_follow = now;
            return Some(ScrollCommand::ToBottom { animated: false });
        }
        None
    }

    pub fn jump_to_bottom(&mut self) -> ScrollCommand {
        self.manual_until = None;
        self.new_content = false;
        ScrollCommand::ToBottom { animated: true }
    }

    pub fn jump_to_top(&mut self, now: f64) -> ScrollCommand {
        self.manual_until = Some(now + self.config.manual_cooldown_secs);
        ScrollCommand::ToTop
    }

    /// Forget the previous conversation's position (session switch).
    pub fn reset(&mut self) -> ScrollCommand {
        let loading = self.loading;
        *self = Self::new(self.config.clone());
        self.loading = loading;
        ScrollCommand::ToBottom { animated: false }
    }
}
