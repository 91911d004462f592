use super::util::pane_title_style;
use crate::{
    app::{Action, AppContext, AppResult, AppView, FocusedPane, ModalKind},
    components::Component,
    presale::{Currency, Quote, QuoteOutcome, quote::group_thousands},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};

const EMPTY_AMOUNT: &str = "Please enter the amount you wish to purchase.";

#[derive(Debug)]
pub struct PurchasePanel {
    amount: String,
    currency: Currency,
    outcome: QuoteOutcome,
    error: Option<String>,
}

impl Default for PurchasePanel {
    fn default() -> Self {
        Self {
            amount: String::new(),
            currency: Currency::default(),
            outcome: QuoteOutcome::Empty,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PurchaseCommand {
    InputChar(char),
    InsertText(String),
    Backspace,
    Clear,
    NextCurrency,
    PreviousCurrency,
    Buy,
}

impl PurchasePanel {
    pub fn command_from_key(event: KeyEvent) -> Option<PurchaseCommand> {
        match (event.modifiers, event.code) {
            (_, KeyCode::Enter) => Some(PurchaseCommand::Buy),
            (_, KeyCode::Backspace) => Some(PurchaseCommand::Backspace),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(PurchaseCommand::Clear),
            (_, KeyCode::Right) | (KeyModifiers::NONE, KeyCode::Char(']')) => {
                Some(PurchaseCommand::NextCurrency)
            }
            (_, KeyCode::Left) | (KeyModifiers::NONE, KeyCode::Char('[')) => {
                Some(PurchaseCommand::PreviousCurrency)
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c))
                if c.is_ascii_digit() || c == '.' =>
            {
                Some(PurchaseCommand::InputChar(c))
            }
            _ => None,
        }
    }

    /// Digits and at most one decimal point; anything else is dropped.
    fn push_char(&mut self, ch: char) {
        if ch.is_ascii_digit() || (ch == '.' && !self.amount.contains('.')) {
            self.amount.push(ch);
        }
    }

    fn requote(&mut self, ctx: &AppContext<'_>) {
        self.outcome = Quote::compute(&ctx.config.rates, self.currency, &self.amount);
        self.error = self.outcome.message();
    }

    fn buy(&mut self) -> Option<Action> {
        match &self.outcome {
            QuoteOutcome::Empty => {
                self.error = Some(EMPTY_AMOUNT.into());
                None
            }
            QuoteOutcome::BelowMinimum { .. } => {
                self.error = self.outcome.message();
                None
            }
            QuoteOutcome::Priced(quote) => {
                self.error = None;
                Some(Action::OpenModal(ModalKind::Purchase(quote.clone())))
            }
        }
    }

    fn rate_line(&self, ctx: &AppView<'_>) -> String {
        let rate = ctx.config.rates.get(self.currency);
        format!(
            "1 {} = {} {} • minimum {} {} • bonus {}%",
            self.currency.label(),
            group_thousands(&rate.rate.to_string()),
            ctx.config.token_symbol,
            rate.min,
            self.currency.label(),
            ctx.config.rates.bonus_bps as f64 / 100.0
        )
    }
}

impl Component for PurchasePanel {
    type Command = PurchaseCommand;

    fn init(&mut self, ctx: &mut AppContext<'_>) -> AppResult<()> {
        self.requote(ctx);
        self.error = None;
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            PurchaseCommand::InputChar(c) => self.push_char(*c),
            PurchaseCommand::InsertText(text) => text.chars().for_each(|ch| self.push_char(ch)),
            PurchaseCommand::Backspace => {
                self.amount.pop();
            }
            PurchaseCommand::Clear => self.amount.clear(),
            PurchaseCommand::NextCurrency => self.currency = self.currency.next(),
            PurchaseCommand::PreviousCurrency => self.currency = self.currency.previous(),
            PurchaseCommand::Buy => return Ok(self.buy()),
        }
        self.requote(ctx);
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let is_focused = matches!(ctx.state.navigation.focused_pane, FocusedPane::Purchase);
        let block = Block::default().borders(Borders::ALL).title(
            Line::from(format!("[2] Buy {}", ctx.config.token_symbol))
                .style(pane_title_style(is_focused)),
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(1),
            ])
            .split(inner);

        let selected = Currency::ALL
            .iter()
            .position(|c| *c == self.currency)
            .unwrap_or(0);
        let tabs = Tabs::new(Currency::ALL.iter().map(|c| Line::from(c.label())))
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, layout[0]);

        let input_style = if is_focused {
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let mut input = vec![
            Span::styled("Amount: ", Style::default().fg(Color::Gray)),
            Span::styled(
                if self.amount.is_empty() {
                    "0".to_string()
                } else {
                    self.amount.clone()
                },
                input_style,
            ),
        ];
        if is_focused {
            input.push(Span::styled(" ▌", Style::default().fg(Color::LightCyan)));
        }
        input.push(Span::raw(format!(" {}", self.currency.label())));
        frame.render_widget(Paragraph::new(Line::from(input)), layout[1]);

        let receive = Line::from(vec![
            Span::styled("You receive: ", Style::default().fg(Color::Gray)),
            Span::styled(
                self.outcome.display(&ctx.config.token_symbol),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(receive), layout[2]);

        frame.render_widget(
            Paragraph::new(self.rate_line(ctx)).style(Style::default().fg(Color::DarkGray)),
            layout[3],
        );

        let status = match &self.error {
            Some(message) => Paragraph::new(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            None => Paragraph::new(Span::styled(
                "Enter to buy • ←/→ currency",
                Style::default().fg(Color::Gray),
            )),
        };
        frame.render_widget(status, layout[4]);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::AppState, config::Config, presale::ReferralRegistry};
    use url::Url;

    struct Harness {
        state: AppState,
        registry: ReferralRegistry,
        config: Config,
        page: Url,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                state: AppState::default(),
                registry: ReferralRegistry::new(),
                config: Config::default(),
                page: Url::parse("https://presale.example/").unwrap(),
            }
        }

        fn send(&mut self, panel: &mut PurchasePanel, command: PurchaseCommand) -> Option<Action> {
            let mut ctx = AppContext {
                state: &mut self.state,
                registry: &mut self.registry,
                config: &self.config,
                page: &self.page,
            };
            panel.update(&command, &mut ctx).unwrap()
        }
    }

    fn typed(harness: &mut Harness, panel: &mut PurchasePanel, text: &str) {
        harness.send(panel, PurchaseCommand::InsertText(text.into()));
    }

    #[test]
    fn buying_without_amount_asks_for_one() {
        let mut harness = Harness::new();
        let mut panel = PurchasePanel::default();
        assert!(harness.send(&mut panel, PurchaseCommand::Buy).is_none());
        assert_eq!(panel.error.as_deref(), Some(EMPTY_AMOUNT));
    }

    #[test]
    fn minimum_message_follows_currency() {
        let mut harness = Harness::new();
        let mut panel = PurchasePanel::default();
        harness.send(&mut panel, PurchaseCommand::NextCurrency);
        typed(&mut harness, &mut panel, "150");
        assert_eq!(panel.error.as_deref(), Some("Minimum purchase is 200 USDT."));
        assert!(harness.send(&mut panel, PurchaseCommand::Buy).is_none());

        harness.send(&mut panel, PurchaseCommand::PreviousCurrency);
        assert_eq!(panel.currency, Currency::Eth);
        assert!(panel.error.is_none());
        assert_eq!(panel.outcome.display("WLFG"), "37,125,000 WLFG (+3,375,000 bonus)");
    }

    #[test]
    fn priced_quote_opens_summary() {
        let mut harness = Harness::new();
        let mut panel = PurchasePanel::default();
        harness.send(&mut panel, PurchaseCommand::PreviousCurrency);
        harness.send(&mut panel, PurchaseCommand::PreviousCurrency);
        assert_eq!(panel.currency, Currency::Usdc);
        typed(&mut harness, &mut panel, "2x00");
        let action = harness.send(&mut panel, PurchaseCommand::Buy);
        let Some(Action::OpenModal(ModalKind::Purchase(quote))) = action else {
            panic!("expected purchase summary, got {action:?}");
        };
        assert_eq!(quote.allocation("WLFG"), "19,360 WLFG (+1,760 bonus)");
    }

    #[test]
    fn second_decimal_point_is_ignored() {
        let mut harness = Harness::new();
        let mut panel = PurchasePanel::default();
        for ch in "1.2.3".chars() {
            harness.send(&mut panel, PurchaseCommand::InputChar(ch));
        }
        assert_eq!(panel.amount, "1.23");

        harness.send(&mut panel, PurchaseCommand::Clear);
        typed(&mut harness, &mut panel, "1.2.");
        assert_eq!(panel.amount, "1.2");
        assert_eq!(panel.outcome.display("WLFG"), "297,000 WLFG (+27,000 bonus)");
    }

    #[test]
    fn keys_map_to_commands() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert!(matches!(
            PurchasePanel::command_from_key(key(KeyCode::Char('7'))),
            Some(PurchaseCommand::InputChar('7'))
        ));
        assert!(PurchasePanel::command_from_key(key(KeyCode::Char('q'))).is_none());
        assert!(matches!(
            PurchasePanel::command_from_key(key(KeyCode::Right)),
            Some(PurchaseCommand::NextCurrency)
        ));
    }
}
