mod scheduler;

use crate::{
    components::Component,
    config::Config,
    presale::{CountdownState, InboundReferral, Quote, ReferralLink, ReferralRegistry, referral},
    ui::{
        bottom_bar::BottomBar,
        modal::{Modal, ModalCommand},
        purchase::{PurchaseCommand, PurchasePanel},
        referral::{ReferralCommand, ReferralPanel},
        top::TopBar,
    },
};
pub type AppResult<T> = color_eyre::Result<T>;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
};
use std::sync::mpsc;
use tokio::runtime::Runtime;
use tokio::time::Duration;
use tracing::{debug, info};
use url::Url;

pub use navigation::FocusedPane;
pub use scheduler::{Scheduler, TimerKind};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Owns the session: the referral registry, background timers and the panes.
pub struct App {
    running: bool,
    pub state: AppState,
    pub registry: ReferralRegistry,
    config: Config,
    page: Url,
    top_bar: TopBar,
    purchase: PurchasePanel,
    referral: ReferralPanel,
    bottom_bar: BottomBar,
    modal: Modal,
    scheduler: Scheduler,
    message_rx: mpsc::Receiver<Message>,
    /// Sequence number of the notification currently on screen.
    notification_seq: u64,
    // Dropped after the scheduler so timer tasks are aborted first.
    #[allow(dead_code)]
    runtime: Runtime,
}

impl App {
    pub fn new(config: Config, landing: Url) -> AppResult<Self> {
        let runtime = Runtime::new()?;
        let (message_tx, message_rx) = mpsc::channel();
        let scheduler = Scheduler::new(message_tx, runtime.handle().clone());

        let mut app = Self {
            running: false,
            state: AppState::default(),
            registry: ReferralRegistry::new(),
            page: page_base(&landing),
            config,
            top_bar: TopBar::default(),
            purchase: PurchasePanel::default(),
            referral: ReferralPanel::default(),
            bottom_bar: BottomBar,
            modal: Modal,
            scheduler,
            message_rx,
            notification_seq: 0,
            runtime,
        };

        {
            let mut ctx = AppContext {
                state: &mut app.state,
                registry: &mut app.registry,
                config: &app.config,
                page: &app.page,
            };
            app.top_bar.init(&mut ctx)?;
            app.purchase.init(&mut ctx)?;
            app.referral.init(&mut ctx)?;
            app.bottom_bar.init(&mut ctx)?;
            app.modal.init(&mut ctx)?;
        }

        app.start_countdown();
        app.visit(&landing);
        Ok(app)
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        self.running = true;
        info!(page = %self.page, "session started");
        while self.running {
            self.tick()?;
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        info!(
            codes = self.registry.len(),
            countdown_running = self.scheduler.is_running(TimerKind::CountdownTick),
            "session ended"
        );
        self.scheduler.stop_all();
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[1]);

        let view = AppView {
            state: &self.state,
            config: &self.config,
            registry: &self.registry,
            page: &self.page,
        };

        self.top_bar.render(frame, layout[0], &view);
        self.purchase.render(frame, panes[0], &view);
        self.referral.render(frame, panes[1], &view);
        self.bottom_bar.render(frame, layout[2], &view);
        if self.state.modal.is_some() {
            let area = frame.area();
            self.modal.render(frame, area, &view);
        }
    }

    fn handle_events(&mut self) -> AppResult<()> {
        if !event::poll(POLL_INTERVAL)? {
            return Ok(());
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key)?,
            Event::Paste(text) => self.on_paste(text)?,
            Event::Mouse(_) | Event::Resize(_, _) => {}
            _ => {}
        }
        Ok(())
    }

    fn on_key_event(&mut self, key: KeyEvent) -> AppResult<()> {
        if matches!(
            (key.modifiers, key.code),
            (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C'))
        ) {
            self.dispatch(Action::Quit);
            return Ok(());
        }

        if self.state.modal.is_some() {
            if let Some(command) = Modal::command_from_key(key) {
                self.modal_command(command)?;
            }
            return Ok(());
        }

        let global = match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Tab) => Some(Action::FocusNextPane),
            (_, KeyCode::BackTab) | (KeyModifiers::SHIFT, KeyCode::Tab) => {
                Some(Action::FocusPreviousPane)
            }
            (_, KeyCode::F(1)) => Some(Action::OpenModal(ModalKind::Guide)),
            (_, KeyCode::F(2)) => Some(Action::OpenModal(ModalKind::ReferralStats {
                issued: self.registry.len(),
            })),
            _ => None,
        };
        if let Some(action) = global {
            self.dispatch(action);
            return Ok(());
        }

        match self.state.navigation.focused_pane {
            FocusedPane::Purchase => {
                if let Some(command) = PurchasePanel::command_from_key(key) {
                    self.purchase_command(command)?;
                    return Ok(());
                }
            }
            FocusedPane::Referral => {
                if let Some(command) = ReferralPanel::command_from_key(key) {
                    self.referral_command(command)?;
                    return Ok(());
                }
            }
            FocusedPane::Top | FocusedPane::BottomBar => {}
        }

        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => self.dispatch(Action::Quit),
            (KeyModifiers::NONE, KeyCode::Char('q')) if !self.state.navigation.is_input() => {
                self.dispatch(Action::Quit)
            }
            (KeyModifiers::NONE, KeyCode::Char(d))
                if d.is_ascii_digit() && !self.state.navigation.is_input() =>
            {
                if let Some(pane) = d
                    .to_digit(10)
                    .and_then(|n| FocusedPane::from_number(n as usize))
                {
                    self.dispatch(Action::FocusPane(pane));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_paste(&mut self, text: String) -> AppResult<()> {
        match self.state.navigation.focused_pane {
            FocusedPane::Referral if self.state.modal.is_none() => {
                self.referral_command(ReferralCommand::InsertText(text))
            }
            FocusedPane::Purchase if self.state.modal.is_none() => {
                self.purchase_command(PurchaseCommand::InsertText(text))
            }
            _ => Ok(()),
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::FocusPane(pane) => self.state.navigation.focused_pane = pane,
            Action::FocusNextPane => self.state.navigation.focus_next(),
            Action::FocusPreviousPane => self.state.navigation.focus_previous(),
            Action::OpenModal(kind) => {
                debug!(modal = kind.title(), "modal opened");
                self.state.modal = Some(kind);
            }
            Action::CloseModal => self.state.modal = None,
            Action::Visit(url) => {
                self.state.modal = None;
                self.visit(&url);
            }
            Action::StopCountdown => {
                if self.scheduler.stop(TimerKind::CountdownTick) {
                    info!("presale countdown reached its target");
                }
            }
        }
    }

    fn modal_command(&mut self, command: ModalCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            registry: &mut self.registry,
            config: &self.config,
            page: &self.page,
        };
        if let Some(action) = self.modal.update(&command, &mut ctx)? {
            self.dispatch(action);
        }
        Ok(())
    }

    fn purchase_command(&mut self, command: PurchaseCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            registry: &mut self.registry,
            config: &self.config,
            page: &self.page,
        };
        if let Some(action) = self.purchase.update(&command, &mut ctx)? {
            self.dispatch(action);
        }
        Ok(())
    }

    fn referral_command(&mut self, command: ReferralCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            registry: &mut self.registry,
            config: &self.config,
            page: &self.page,
        };
        if let Some(action) = self.referral.update(&command, &mut ctx)? {
            self.dispatch(action);
        }
        Ok(())
    }

    /// Page-load handling for `url`: announces an inbound referral once and
    /// schedules its dismissal. Unknown or missing `ref` values do nothing.
    pub fn visit(&mut self, url: &Url) {
        let Some(inbound) = referral::detect_inbound(&self.registry, url, self.config.referral_reward)
        else {
            return;
        };
        self.state.notification = Some(inbound.message(&self.config.token_symbol));
        self.state.inbound = Some(inbound);
        self.notification_seq += 1;
        self.scheduler.start_once(
            TimerKind::NotificationDismiss,
            Duration::from_secs(self.config.notification_secs),
            Message::NotificationExpired(self.notification_seq),
        );
    }

    /// `TopBar::init` has already computed the initial state.
    fn start_countdown(&mut self) {
        if !self.state.countdown.is_ended() {
            self.scheduler.start_repeating(TimerKind::CountdownTick, COUNTDOWN_PERIOD, || {
                Message::CountdownTick
            });
        }
    }

    fn tick(&mut self) -> AppResult<()> {
        self.drain_messages();
        {
            let mut ctx = AppContext {
                state: &mut self.state,
                registry: &mut self.registry,
                config: &self.config,
                page: &self.page,
            };
            if let Some(action) = self.top_bar.tick(&mut ctx)? {
                self.dispatch(action);
            }
        }
        {
            let mut ctx = AppContext {
                state: &mut self.state,
                registry: &mut self.registry,
                config: &self.config,
                page: &self.page,
            };
            if let Some(action) = self.purchase.tick(&mut ctx)? {
                self.dispatch(action);
            }
        }
        {
            let mut ctx = AppContext {
                state: &mut self.state,
                registry: &mut self.registry,
                config: &self.config,
                page: &self.page,
            };
            if let Some(action) = self.referral.tick(&mut ctx)? {
                self.dispatch(action);
            }
        }
        Ok(())
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.message_rx.try_recv() {
            match message {
                Message::CountdownTick => self.state.countdown_due = true,
                Message::NotificationExpired(seq) if seq == self.notification_seq => {
                    self.state.notification = None;
                }
                Message::NotificationExpired(seq) => {
                    debug!(seq, current = self.notification_seq, "stale dismissal ignored");
                }
            }
        }
    }
}

/// Origin and path of the landing URL; query and fragment are dropped.
fn page_base(landing: &Url) -> Url {
    let mut page = landing.clone();
    page.set_query(None);
    page.set_fragment(None);
    page
}

/// State shared across components.
#[derive(Debug)]
pub struct AppState {
    pub navigation: NavigationState,
    pub countdown: CountdownState,
    /// Set by the tick timer, cleared once the top bar recomputes.
    pub countdown_due: bool,
    pub notification: Option<String>,
    pub inbound: Option<InboundReferral>,
    pub modal: Option<ModalKind>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            navigation: NavigationState::default(),
            countdown: CountdownState::Ended,
            countdown_due: false,
            notification: None,
            inbound: None,
            modal: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct NavigationState {
    pub focused_pane: FocusedPane,
}

impl NavigationState {
    pub fn focus_next(&mut self) {
        self.focused_pane = match self.focused_pane {
            FocusedPane::Top => FocusedPane::Purchase,
            FocusedPane::Purchase => FocusedPane::Referral,
            FocusedPane::Referral => FocusedPane::BottomBar,
            FocusedPane::BottomBar => FocusedPane::Top,
        };
    }

    pub fn focus_previous(&mut self) {
        self.focused_pane = match self.focused_pane {
            FocusedPane::Top => FocusedPane::BottomBar,
            FocusedPane::Purchase => FocusedPane::Top,
            FocusedPane::Referral => FocusedPane::Purchase,
            FocusedPane::BottomBar => FocusedPane::Referral,
        };
    }

    /// Whether typed characters belong to a text field.
    pub fn is_input(&self) -> bool {
        matches!(
            self.focused_pane,
            FocusedPane::Purchase | FocusedPane::Referral
        )
    }
}

/// Mutable context passed to components while handling logic.
pub struct AppContext<'a> {
    pub state: &'a mut AppState,
    pub registry: &'a mut ReferralRegistry,
    pub config: &'a Config,
    pub page: &'a Url,
}

/// Read-only context used during rendering.
pub struct AppView<'a> {
    pub state: &'a AppState,
    pub config: &'a Config,
    pub registry: &'a ReferralRegistry,
    pub page: &'a Url,
}

#[derive(Debug, Clone)]
pub enum Message {
    CountdownTick,
    NotificationExpired(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalKind {
    ReferralLink(ReferralLink),
    Purchase(Quote),
    Guide,
    ReferralStats { issued: usize },
}

impl ModalKind {
    pub fn title(&self) -> &'static str {
        match self {
            ModalKind::ReferralLink(_) => "Your Referral Link",
            ModalKind::Purchase(_) => "Purchase Summary",
            ModalKind::Guide => "How to Buy",
            ModalKind::ReferralStats { .. } => "Referral Statistics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    FocusPane(FocusedPane),
    FocusNextPane,
    FocusPreviousPane,
    OpenModal(ModalKind),
    CloseModal,
    Visit(Url),
    StopCountdown,
}

mod navigation {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum FocusedPane {
        Top,
        Purchase,
        Referral,
        BottomBar,
    }

    impl FocusedPane {
        pub fn from_number(number: usize) -> Option<Self> {
            match number {
                1 => Some(Self::Top),
                2 => Some(Self::Purchase),
                3 => Some(Self::Referral),
                4 => Some(Self::BottomBar),
                _ => None,
            }
        }
    }

    impl Default for FocusedPane {
        fn default() -> Self {
            Self::Purchase
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ratatui::{Terminal, backend::TestBackend};

    const ADDRESS: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

    fn app_at(landing: &str) -> App {
        App::new(Config::default(), Url::parse(landing).unwrap()).unwrap()
    }

    fn tick_with(app: &mut App, message: Message) {
        let (tx, rx) = mpsc::channel();
        tx.send(message).unwrap();
        app.message_rx = rx;
        app.tick().unwrap();
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn landing_without_ref_shows_no_notification() {
        let app = app_at("https://presale.example/?utm=launch");
        assert!(app.state.notification.is_none());
        assert_eq!(app.page.as_str(), "https://presale.example/");
    }

    #[test]
    fn raw_address_ref_is_announced_on_load() {
        let app = app_at(&format!("https://presale.example/?ref={ADDRESS}"));
        assert_eq!(
            app.state.notification.as_deref(),
            Some(
                "You were invited by 0xAAAA...AAAA! Both of you will earn 2,500 WLFG tokens after presale completion."
            )
        );
        assert!(app.scheduler.is_running(TimerKind::NotificationDismiss));
    }

    #[test]
    fn typed_amount_updates_the_quote() {
        let mut app = app_at("https://presale.example/");
        type_text(&mut app, "1.0");
        let rendered = screen(&mut app);
        assert!(rendered.contains("247,500 WLFG (+22,500 bonus)"), "{rendered}");

        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.state.modal, Some(ModalKind::Purchase(_))));
        let rendered = screen(&mut app);
        assert!(rendered.contains("1 ETH"), "{rendered}");
        press(&mut app, KeyCode::Esc);
        assert!(app.state.modal.is_none());
    }

    #[test]
    fn generated_link_can_be_visited_in_session() {
        let mut app = app_at("https://presale.example/");
        dispatch_focus(&mut app, FocusedPane::Referral);
        type_text(&mut app, ADDRESS);
        press(&mut app, KeyCode::Enter);

        let Some(ModalKind::ReferralLink(link)) = app.state.modal.clone() else {
            panic!("expected the referral link modal");
        };
        assert_eq!(app.registry.resolve_code(link.code.as_str()), Some(ADDRESS));
        assert!(app.state.notification.is_none());

        // Enter on the link dialog opens the link as a visitor would.
        press(&mut app, KeyCode::Enter);
        assert!(app.state.modal.is_none());
        assert_eq!(
            app.state.inbound.as_ref().map(|inbound| inbound.referrer.as_str()),
            Some(ADDRESS)
        );
        let rendered = screen(&mut app);
        assert!(rendered.contains("You were invited by 0xAAAA...AAAA!"), "{rendered}");
    }

    #[test]
    fn invalid_wallet_reports_inline_error() {
        let mut app = app_at("https://presale.example/");
        dispatch_focus(&mut app, FocusedPane::Referral);
        type_text(&mut app, "0x1234");
        press(&mut app, KeyCode::Enter);
        assert!(app.state.modal.is_none());
        assert!(app.registry.is_empty());
        let rendered = screen(&mut app);
        assert!(rendered.contains("valid Ethereum wallet address"), "{rendered}");
    }

    #[test]
    fn unknown_short_code_visit_is_silent() {
        let mut app = app_at("https://presale.example/");
        app.visit(&Url::parse("https://presale.example/?ref=abc123").unwrap());
        assert!(app.state.notification.is_none());
        assert!(!app.scheduler.is_running(TimerKind::NotificationDismiss));
    }

    #[test]
    fn expired_notification_is_cleared() {
        let mut app = app_at(&format!("https://presale.example/?ref={ADDRESS}"));
        assert!(app.state.notification.is_some());
        let seq = app.notification_seq;
        tick_with(&mut app, Message::NotificationExpired(seq));
        assert!(app.state.notification.is_none());
        assert!(app.state.inbound.is_some());
    }

    #[test]
    fn stale_dismissal_keeps_the_newer_notification() {
        let mut app = app_at(&format!("https://presale.example/?ref={ADDRESS}"));
        let first = app.notification_seq;
        app.visit(&Url::parse(&format!("https://presale.example/?ref={ADDRESS}")).unwrap());
        assert_eq!(app.notification_seq, first + 1);

        tick_with(&mut app, Message::NotificationExpired(first));
        assert!(app.state.notification.is_some());
        tick_with(&mut app, Message::NotificationExpired(first + 1));
        assert!(app.state.notification.is_none());
    }

    #[test]
    fn countdown_stops_its_timer_once_the_sale_ends() {
        let config = Config {
            sale_ends_at: Utc::now() + chrono::Duration::milliseconds(300),
            ..Config::default()
        };
        let mut app = App::new(config, Url::parse("https://presale.example/").unwrap()).unwrap();
        assert!(!app.state.countdown.is_ended());
        assert!(app.scheduler.is_running(TimerKind::CountdownTick));

        std::thread::sleep(std::time::Duration::from_millis(400));
        tick_with(&mut app, Message::CountdownTick);
        assert!(app.state.countdown.is_ended());
        assert!(!app.state.countdown_due);
        assert!(!app.scheduler.is_running(TimerKind::CountdownTick));
        let rendered = screen(&mut app);
        assert!(rendered.contains("Presale has ended"), "{rendered}");
    }

    #[test]
    fn ended_sale_does_not_start_the_countdown() {
        let app = app_at("https://presale.example/");
        // the default sale date is in the past
        assert!(app.state.countdown.is_ended());
        assert!(!app.scheduler.is_running(TimerKind::CountdownTick));
    }

    #[test]
    fn focus_cycles_and_quits_outside_inputs() {
        let mut app = app_at("https://presale.example/");
        app.running = true;
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.state.navigation.focused_pane, FocusedPane::Referral);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.state.navigation.focused_pane, FocusedPane::BottomBar);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    fn dispatch_focus(app: &mut App, pane: FocusedPane) {
        app.dispatch(Action::FocusPane(pane));
    }
}
