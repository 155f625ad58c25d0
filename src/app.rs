use serde::Serialize;
use tokio::sync::mpsc;

use crate::catalog::{Catalog, CatalogFilter, Product};
use crate::config::GlowConfig;
use crate::provider;
use crate::selection::{SelectionStore, ToggleOutcome};
use crate::storage::SelectionStorage;
use crate::transcript::{NonEmptyString, Transcript};

/// Fixed instruction appended to the product projection when generating a routine.
const ROUTINE_INSTRUCTION: &str = "Please create a step-by-step routine using them.";

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Browse,
    Insert,
    Command,
}

/// Which pane the browse-mode cursor lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneFocus {
    #[default]
    Products,
    Selected,
}

#[derive(Debug, Default)]
struct DraftInput {
    text: String,
    cursor: usize,
}

impl DraftInput {
    fn text(&self) -> &str {
        &self.text
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn take_text(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_cursor_right(&mut self) {
        let moved = self.cursor.saturating_add(1);
        self.cursor = moved.clamp(0, self.text.chars().count());
    }

    fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index();
        self.text.insert(index, new_char);
        self.move_cursor_right();
    }

    fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }

        let before = self.text.chars().take(self.cursor - 1);
        let after = self.text.chars().skip(self.cursor);
        self.text = before.chain(after).collect();
        self.move_cursor_left();
    }

    fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    fn move_cursor_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor)
            .unwrap_or(self.text.len())
    }
}

#[derive(Debug)]
enum InputState {
    Browse(DraftInput),
    Insert(DraftInput),
    Command { draft: DraftInput, command: String },
}

impl Default for InputState {
    fn default() -> Self {
        Self::Browse(DraftInput::default())
    }
}

impl InputState {
    fn mode(&self) -> InputMode {
        match self {
            InputState::Browse(_) => InputMode::Browse,
            InputState::Insert(_) => InputMode::Insert,
            InputState::Command { .. } => InputMode::Command,
        }
    }

    fn draft(&self) -> &DraftInput {
        match self {
            InputState::Browse(draft) | InputState::Insert(draft) => draft,
            InputState::Command { draft, .. } => draft,
        }
    }

    fn draft_mut(&mut self) -> &mut DraftInput {
        match self {
            InputState::Browse(draft) | InputState::Insert(draft) => draft,
            InputState::Command { draft, .. } => draft,
        }
    }

    fn command(&self) -> Option<&str> {
        match self {
            InputState::Command { command, .. } => Some(command),
            _ => None,
        }
    }

    fn command_mut(&mut self) -> Option<&mut String> {
        match self {
            InputState::Command { command, .. } => Some(command),
            _ => None,
        }
    }

    fn into_browse(self) -> InputState {
        match self {
            InputState::Browse(draft) | InputState::Insert(draft) => InputState::Browse(draft),
            InputState::Command { draft, .. } => InputState::Browse(draft),
        }
    }

    fn into_insert(self) -> InputState {
        match self {
            InputState::Browse(draft) | InputState::Insert(draft) => InputState::Insert(draft),
            InputState::Command { draft, .. } => InputState::Insert(draft),
        }
    }

    fn into_command(self) -> InputState {
        let draft = match self {
            InputState::Browse(draft) | InputState::Insert(draft) => draft,
            InputState::Command { draft, .. } => draft,
        };
        InputState::Command {
            draft,
            command: String::new(),
        }
    }
}

/// Scroll position for the chat pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollState {
    /// Always keep the newest content visible.
    #[default]
    AutoBottom,
    /// Manual scroll offset from the top of the rendered transcript.
    Manual { offset_from_top: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient notice rendered inline at the bottom of the chat pane.
///
/// Guard messages and completion failures show up in the conversation, not in
/// a dialog, and are replaced when the next exchange starts.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug)]
enum ExchangeEvent {
    Completed { generation: u64, text: String },
    Failed { generation: u64, error: String },
}

#[derive(Debug)]
struct PendingExchange {
    receiver: mpsc::UnboundedReceiver<ExchangeEvent>,
    generation: u64,
}

#[derive(Debug, Default)]
enum ExchangeState {
    #[default]
    Idle,
    Pending(PendingExchange),
}

#[derive(Debug)]
pub(crate) struct InsertToken(());

#[derive(Debug)]
pub(crate) struct CommandToken(());

pub(crate) struct InsertMode<'a> {
    app: &'a mut App,
}

pub(crate) struct CommandMode<'a> {
    app: &'a mut App,
}

/// Proof that a command line was entered in Command mode.
#[derive(Debug)]
pub(crate) struct EnteredCommand {
    raw: String,
}

#[derive(Serialize)]
struct ProductSummary<'a> {
    name: &'a str,
    brand: &'a str,
    category: &'a str,
    description: &'a str,
}

/// Application state.
///
/// Owns the four stores (catalog, filter, selection, transcript) and runs the
/// exchange state machine: at most one completion request is in flight, and
/// each request carries a generation number so a superseded reply is dropped
/// instead of appended.
pub struct App {
    endpoint: String,
    http: reqwest::Client,

    catalog: Catalog,
    catalog_error: Option<String>,
    filter: CatalogFilter,
    selection: SelectionStore,
    storage: SelectionStorage,
    transcript: Transcript,

    input: InputState,
    focus: PaneFocus,
    product_cursor: usize,
    selected_cursor: usize,
    scroll: ScrollState,
    scroll_max: u16,
    should_quit: bool,
    status_message: Option<String>,
    notice: Option<Notice>,
    tick: usize,

    exchange: ExchangeState,
    next_generation: u64,
}

impl App {
    pub fn new(config: GlowConfig) -> Self {
        let (catalog, catalog_error) = match Catalog::load(&config.catalog_path) {
            Ok(catalog) => (catalog, None),
            Err(err) => {
                tracing::warn!("catalog unavailable: {err}");
                (Catalog::default(), Some(err.to_string()))
            }
        };

        let storage = SelectionStorage::new(&config.data_dir);
        let mut selection = SelectionStore::new();
        selection.replace(storage.load(&catalog));

        Self {
            endpoint: config.endpoint,
            http: reqwest::Client::new(),
            catalog,
            catalog_error,
            filter: CatalogFilter::default(),
            selection,
            storage,
            transcript: Transcript::seed(),
            input: InputState::default(),
            focus: PaneFocus::default(),
            product_cursor: 0,
            selected_cursor: 0,
            scroll: ScrollState::AutoBottom,
            scroll_max: 0,
            should_quit: false,
            status_message: None,
            notice: None,
            tick: 0,
            exchange: ExchangeState::Idle,
            next_generation: 1,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn tick_count(&self) -> usize {
        self.tick
    }

    /// Increment the animation tick.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn focus(&self) -> PaneFocus {
        self.focus
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.exchange, ExchangeState::Pending(_))
    }

    /// The visible subset under the current filter, in catalog order.
    pub fn visible_products(&self) -> Vec<&Product> {
        self.filter.visible(&self.catalog)
    }

    pub fn product_cursor(&self) -> usize {
        self.product_cursor
    }

    pub fn selected_cursor(&self) -> usize {
        self.selected_cursor
    }

    // --- filter -----------------------------------------------------------

    pub fn set_category(&mut self, category: Option<String>) {
        self.filter.set_category(category);
        self.clamp_cursors();
    }

    pub fn set_search(&mut self, keyword: impl Into<String>) {
        self.filter.set_search(keyword);
        self.clamp_cursors();
    }

    pub fn cycle_category(&mut self) {
        self.filter.cycle_category(&self.catalog);
        self.clamp_cursors();
        let label = self.filter.category().unwrap_or("all").to_string();
        self.set_status(format!("Category: {label}"));
    }

    fn clamp_cursors(&mut self) {
        let visible = self.filter.visible(&self.catalog).len();
        self.product_cursor = self.product_cursor.min(visible.saturating_sub(1));
        self.selected_cursor = self
            .selected_cursor
            .min(self.selection.len().saturating_sub(1));
    }

    // --- browse navigation ------------------------------------------------

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            PaneFocus::Products => PaneFocus::Selected,
            PaneFocus::Selected => PaneFocus::Products,
        };
    }

    pub fn move_cursor_down(&mut self) {
        match self.focus {
            PaneFocus::Products => {
                let count = self.filter.visible(&self.catalog).len();
                if count > 0 && self.product_cursor + 1 < count {
                    self.product_cursor += 1;
                }
            }
            PaneFocus::Selected => {
                let count = self.selection.len();
                if count > 0 && self.selected_cursor + 1 < count {
                    self.selected_cursor += 1;
                }
            }
        }
    }

    pub fn move_cursor_up(&mut self) {
        match self.focus {
            PaneFocus::Products => self.product_cursor = self.product_cursor.saturating_sub(1),
            PaneFocus::Selected => self.selected_cursor = self.selected_cursor.saturating_sub(1),
        }
    }

    // --- selection mutation -----------------------------------------------
    //
    // Every mutation is followed by a persistence write; the view refreshes
    // itself on the next frame.

    /// Keyboard activation of the focused card, equivalent to a click.
    pub fn activate_cursor(&mut self) {
        match self.focus {
            PaneFocus::Products => self.toggle_product_at_cursor(),
            PaneFocus::Selected => self.remove_selected_at_cursor(),
        }
    }

    pub fn toggle_product_at_cursor(&mut self) {
        let Some(id) = self
            .filter
            .visible(&self.catalog)
            .get(self.product_cursor)
            .map(|product| product.id)
        else {
            return;
        };
        self.toggle_product(id);
    }

    pub fn toggle_product(&mut self, id: u32) {
        match self.selection.toggle(id, &self.catalog) {
            ToggleOutcome::Added => self.set_status(format!("{} selected", self.selection.len())),
            ToggleOutcome::Removed => {
                self.clamp_cursors();
                self.set_status(format!("{} selected", self.selection.len()));
            }
            ToggleOutcome::UnknownId => return,
        }
        self.persist_selection();
    }

    pub fn remove_selected_at_cursor(&mut self) {
        let Some(id) = self
            .selection
            .all()
            .get(self.selected_cursor)
            .map(|product| product.id)
        else {
            return;
        };

        self.selection.remove_by_id(id);
        self.clamp_cursors();
        self.set_status(format!("{} selected", self.selection.len()));
        self.persist_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.selected_cursor = 0;
        self.set_status("Selection cleared");
        self.persist_selection();
    }

    fn persist_selection(&mut self) {
        if let Err(err) = self.storage.save(&self.selection) {
            tracing::warn!("failed to persist selection: {err}");
            self.set_status(format!("Could not save selection: {err}"));
        }
    }

    // --- chat scrolling -----------------------------------------------------

    pub fn update_scroll_max(&mut self, max: u16) {
        self.scroll_max = max;

        if let ScrollState::Manual { offset_from_top } = self.scroll {
            if offset_from_top >= max {
                self.scroll = ScrollState::AutoBottom;
            }
        }
    }

    pub fn scroll_offset_from_top(&self) -> u16 {
        match self.scroll {
            ScrollState::AutoBottom => self.scroll_max,
            ScrollState::Manual { offset_from_top } => offset_from_top.min(self.scroll_max),
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = match self.scroll {
            ScrollState::AutoBottom => ScrollState::Manual {
                offset_from_top: self.scroll_max.saturating_sub(3),
            },
            ScrollState::Manual { offset_from_top } => ScrollState::Manual {
                offset_from_top: offset_from_top.saturating_sub(3),
            },
        };
    }

    pub fn scroll_down(&mut self) {
        let ScrollState::Manual { offset_from_top } = self.scroll else {
            return;
        };

        let new_offset = offset_from_top.saturating_add(3);
        if new_offset >= self.scroll_max {
            self.scroll = ScrollState::AutoBottom;
        } else {
            self.scroll = ScrollState::Manual {
                offset_from_top: new_offset,
            };
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = ScrollState::Manual { offset_from_top: 0 };
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = ScrollState::AutoBottom;
    }

    // --- exchange state machine ---------------------------------------------

    /// Project the selection and ask for a routine.
    ///
    /// Guard: an empty selection produces a conversation-surface notice and
    /// never touches the network; no turn is appended.
    pub fn generate_routine(&mut self) {
        if self.is_pending() {
            self.set_status("Already generating a response");
            return;
        }

        if self.selection.is_empty() {
            self.notice = Some(Notice::info("Please select some products first!"));
            return;
        }

        let content = routine_request_content(self.selection.all());
        self.transcript
            .append_user(NonEmptyString::from_string_or(content, ROUTINE_INSTRUCTION));
        self.scroll_to_bottom();
        self.start_exchange();
    }

    /// Submit a follow-up question. Empty or whitespace-only input is a
    /// silent no-op; returns whether a turn was queued.
    pub fn submit_question(&mut self, raw: &str) -> bool {
        if self.is_pending() {
            self.set_status("Already generating a response");
            return false;
        }

        let Ok(content) = NonEmptyString::new(raw.trim()) else {
            return false;
        };

        self.transcript.append_user(content);
        self.scroll_to_bottom();
        self.start_exchange();
        true
    }

    /// Spawn one request carrying the full transcript snapshot.
    fn start_exchange(&mut self) {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.notice = None;

        let (tx, rx) = mpsc::unbounded_channel();
        self.exchange = ExchangeState::Pending(PendingExchange {
            receiver: rx,
            generation,
        });

        let client = self.http.clone();
        let endpoint = self.endpoint.clone();
        let turns = self.transcript.snapshot().to_vec();

        tokio::spawn(async move {
            let event = match provider::request_completion(&client, &endpoint, &turns).await {
                Ok(text) => ExchangeEvent::Completed { generation, text },
                Err(err) => ExchangeEvent::Failed {
                    generation,
                    error: err.to_string(),
                },
            };
            let _ = tx.send(event);
        });
    }

    /// Poll the in-flight exchange; called once per event-loop tick.
    pub fn process_exchange_events(&mut self) {
        let ExchangeState::Pending(pending) = &mut self.exchange else {
            return;
        };
        let current_generation = pending.generation;

        let event = match pending.receiver.try_recv() {
            Ok(event) => event,
            Err(mpsc::error::TryRecvError::Empty) => return,
            Err(mpsc::error::TryRecvError::Disconnected) => ExchangeEvent::Failed {
                generation: current_generation,
                error: "exchange task dropped".to_string(),
            },
        };

        self.exchange = ExchangeState::Idle;
        self.finish_exchange(event, current_generation);
    }

    fn finish_exchange(&mut self, event: ExchangeEvent, current_generation: u64) {
        match event {
            ExchangeEvent::Completed { generation, text } => {
                if generation != current_generation {
                    tracing::debug!("dropping stale completion (generation {generation})");
                    return;
                }
                self.transcript.append_assistant(NonEmptyString::from_string_or(
                    text,
                    provider::NO_RESPONSE_PLACEHOLDER,
                ));
                self.scroll_to_bottom();
            }
            ExchangeEvent::Failed { generation, error } => {
                if generation != current_generation {
                    return;
                }
                tracing::error!("completion request failed: {error}");
                self.notice = Some(Notice::error("Failed to get AI response."));
            }
        }

        // Selection (not the transcript) is persisted after every exchange.
        self.persist_selection();
    }

    /// Drop the in-flight exchange, if any. A reply that arrives later
    /// belongs to a dead generation and is never appended.
    fn abandon_exchange(&mut self) {
        self.exchange = ExchangeState::Idle;
    }

    // --- input modes --------------------------------------------------------

    pub fn input_mode(&self) -> InputMode {
        self.input.mode()
    }

    pub(crate) fn insert_token(&self) -> Option<InsertToken> {
        matches!(&self.input, InputState::Insert(_)).then_some(InsertToken(()))
    }

    pub(crate) fn command_token(&self) -> Option<CommandToken> {
        matches!(&self.input, InputState::Command { .. }).then_some(CommandToken(()))
    }

    pub(crate) fn insert_mode(&mut self, _token: InsertToken) -> InsertMode<'_> {
        InsertMode { app: self }
    }

    pub(crate) fn command_mode(&mut self, _token: CommandToken) -> CommandMode<'_> {
        CommandMode { app: self }
    }

    pub fn enter_browse_mode(&mut self) {
        self.input = std::mem::take(&mut self.input).into_browse();
    }

    pub fn enter_insert_mode(&mut self) {
        self.input = std::mem::take(&mut self.input).into_insert();
    }

    pub fn enter_command_mode(&mut self) {
        self.input = std::mem::take(&mut self.input).into_command();
    }

    pub fn draft_text(&self) -> &str {
        self.input.draft().text()
    }

    pub fn draft_cursor(&self) -> usize {
        self.input.draft().cursor()
    }

    pub fn command_text(&self) -> Option<&str> {
        self.input.command()
    }

    pub(crate) fn process_command(&mut self, command: EnteredCommand) {
        let parts: Vec<&str> = command.raw.split_whitespace().collect();

        match parts.first().copied() {
            Some("q" | "quit") => {
                self.request_quit();
            }
            Some("clear") => {
                self.abandon_exchange();
                self.transcript.reset();
                self.notice = None;
                self.scroll_to_bottom();
                self.set_status("Conversation cleared");
            }
            Some("category" | "cat") => match parts.get(1).copied() {
                Some("all") | None => {
                    self.set_category(None);
                    self.set_status("Category: all");
                }
                Some(name) => {
                    if self.catalog.categories().contains(&name) {
                        self.set_category(Some(name.to_string()));
                        self.set_status(format!("Category: {name}"));
                    } else {
                        self.set_status(format!("Unknown category: {name}"));
                    }
                }
            },
            Some("search") => {
                let keyword = parts[1..].join(" ");
                let cleared = keyword.is_empty();
                self.set_search(keyword);
                if cleared {
                    self.set_status("Search cleared");
                } else {
                    let count = self.visible_products().len();
                    self.set_status(format!("{count} matching products"));
                }
            }
            Some("routine") => {
                self.generate_routine();
            }
            Some("help") => {
                self.set_status("Commands: :q(uit), :clear, :category <name|all>, :search <kw>, :routine");
            }
            Some(cmd) => {
                self.set_status(format!("Unknown command: {cmd}"));
            }
            None => {}
        }
    }
}

/// Structured textual encoding of the selected products, exactly as the
/// endpoint expects to see it.
fn routine_request_content(selection: &[Product]) -> String {
    let data: Vec<ProductSummary> = selection
        .iter()
        .map(|product| ProductSummary {
            name: &product.name,
            brand: &product.brand,
            category: &product.category,
            description: &product.description,
        })
        .collect();

    let products_json = serde_json::to_string_pretty(&data).unwrap_or_else(|_| "[]".to_string());
    format!("Here are the products: {products_json}\n{ROUTINE_INSTRUCTION}")
}

impl<'a> InsertMode<'a> {
    fn draft_mut(&mut self) -> &mut DraftInput {
        self.app.input.draft_mut()
    }

    pub fn move_cursor_left(&mut self) {
        self.draft_mut().move_cursor_left();
    }

    pub fn move_cursor_right(&mut self) {
        self.draft_mut().move_cursor_right();
    }

    pub fn enter_char(&mut self, new_char: char) {
        self.draft_mut().enter_char(new_char);
    }

    pub fn delete_char(&mut self) {
        self.draft_mut().delete_char();
    }

    pub fn reset_cursor(&mut self) {
        self.draft_mut().reset_cursor();
    }

    pub fn move_cursor_end(&mut self) {
        self.draft_mut().move_cursor_end();
    }

    pub fn clear_line(&mut self) {
        self.draft_mut().clear();
    }

    /// Submit the draft as a follow-up question. A blank draft is a silent
    /// no-op; the draft is only consumed when a turn is queued.
    pub fn submit(self) {
        if self.app.draft_text().trim().is_empty() {
            return;
        }

        let raw = self.app.input.draft_mut().take_text();
        if !self.app.submit_question(&raw) {
            // Refused (exchange pending); put the draft back.
            self.app.input.draft_mut().text = raw;
            self.app.input.draft_mut().move_cursor_end();
        }
    }
}

impl<'a> CommandMode<'a> {
    fn command_mut(&mut self) -> Option<&mut String> {
        self.app.input.command_mut()
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(command) = self.command_mut() {
            command.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(command) = self.command_mut() {
            command.pop();
        }
    }

    pub fn take_command(self) -> Option<EnteredCommand> {
        match std::mem::take(&mut self.app.input) {
            InputState::Command { draft, command } => {
                self.app.input = InputState::Browse(draft);
                Some(EnteredCommand { raw: command })
            }
            other => {
                self.app.input = other;
                None
            }
        }
    }
}
