use tokio::sync::mpsc;
use crate::client::ChatClient;
use crate::config::Config;

/// Strip terminal control characters from reply text before display.
/// The service's reply is rendered verbatim otherwise, so a hostile
/// payload must not be able to smuggle escape sequences into the
/// terminal. Newlines and tabs survive; tabs become spaces.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .map(|c| if c == '\t' { ' ' } else { c })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
    Error,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// Outcome of one round trip, delivered from a request task back to the
/// UI loop. Replies are appended in arrival order, not send order.
#[derive(Debug)]
pub enum ReplyEvent {
    Reply(String),
    Failed(String),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub visible: bool,

    // Transcript state
    pub transcript: Vec<ChatMessage>,
    pub transcript_scroll: u16,
    pub chat_height: u16, // Height of transcript area for scroll calculations
    pub chat_width: u16,  // Width of transcript area for wrap calculations

    // Input state
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Outstanding round trips (overlapping sends are allowed)
    pub pending: usize,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Collaborators
    pub client: ChatClient,
    pub reply_tx: mpsc::UnboundedSender<ReplyEvent>,
}

impl App {
    pub fn new(config: &Config, reply_tx: mpsc::UnboundedSender<ReplyEvent>) -> Self {
        Self {
            should_quit: false,
            visible: config.open_on_start(),

            transcript: Vec::new(),
            transcript_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            input: String::new(),
            input_cursor: 0,

            pending: 0,

            animation_frame: 0,

            client: ChatClient::new(config.base_url()),
            reply_tx,
        }
    }

    // Visibility toggle. Both directions are idempotent.
    pub fn open(&mut self) {
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// Take the current input for dispatch. Trims it; a whitespace-only
    /// input is a no-op and the buffer is left untouched. Otherwise the
    /// user entry is appended, the input cleared, and the trimmed text
    /// returned for the caller to put on the wire.
    pub fn submit(&mut self) -> Option<String> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.transcript.push(ChatMessage {
            role: ChatRole::User,
            text: text.clone(),
        });
        self.input.clear();
        self.input_cursor = 0;
        self.pending += 1;
        self.scroll_to_bottom();

        Some(text)
    }

    /// Fold one finished round trip into the transcript.
    pub fn apply_reply(&mut self, event: ReplyEvent) {
        self.pending = self.pending.saturating_sub(1);

        let message = match event {
            ReplyEvent::Reply(text) => ChatMessage {
                role: ChatRole::Assistant,
                text,
            },
            ReplyEvent::Failed(reason) => ChatMessage {
                role: ChatRole::Error,
                text: reason,
            },
        };
        self.transcript.push(message);
        self.scroll_to_bottom();
    }

    // Transcript scrolling
    pub fn scroll_up(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max_scroll = self.total_lines().saturating_sub(self.visible_height());
        if self.transcript_scroll < max_scroll {
            self.transcript_scroll = self.transcript_scroll.saturating_add(1);
        }
    }

    /// Scroll so the newest entry (and the pending indicator) is visible.
    pub fn scroll_to_bottom(&mut self) {
        let total_lines = self.total_lines();
        let visible_height = self.visible_height();

        if total_lines > visible_height {
            self.transcript_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.transcript_scroll = 0;
        }
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered line count of the transcript at the current wrap width.
    fn total_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 40 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            40
        };

        let mut total_lines: u16 = 0;

        for msg in &self.transcript {
            total_lines += 1; // Role line ("You:" / "Assistant:")
            // Measure what actually gets drawn, not the raw payload
            for line in sanitize(&msg.text).lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1; // Empty line still takes one line
                } else {
                    total_lines += ((char_count.saturating_sub(1) / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.is_loading() {
            total_lines += 2; // "Assistant:" + "Thinking..."
        }

        total_lines
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
