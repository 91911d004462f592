use super::util::centered_rect;
use crate::{
    app::{Action, AppContext, AppResult, AppView, ModalKind},
    components::Component,
    presale::quote::group_thousands,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Dialog drawn over the panes while `AppState::modal` is set.
#[derive(Debug, Default)]
pub struct Modal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalCommand {
    Confirm,
    Close,
}

impl Modal {
    pub fn command_from_key(event: KeyEvent) -> Option<ModalCommand> {
        match event.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(ModalCommand::Close),
            KeyCode::Enter => Some(ModalCommand::Confirm),
            _ => None,
        }
    }

    fn body(kind: &ModalKind, ctx: &AppView<'_>) -> Vec<Line<'static>> {
        let muted = Style::default().fg(Color::Gray);
        let strong = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let symbol = ctx.config.token_symbol.clone();
        let reward = group_thousands(&ctx.config.referral_reward.to_string());
        match kind {
            ModalKind::ReferralLink(link) => vec![
                Line::from(Span::styled(
                    "Share this link with friends to earn rewards together!",
                    muted,
                )),
                Line::from(""),
                Line::from(Span::styled(link.url.to_string(), strong.fg(Color::Cyan))),
                Line::from(vec![
                    Span::styled("Code ", muted),
                    Span::styled(link.code.to_string(), strong),
                    Span::styled(format!(" for {}", link.address.abbreviated()), muted),
                ]),
                Line::from(""),
                Line::from(Span::styled("How it works:", strong)),
                Line::from(" • Share your link with friends"),
                Line::from(format!(
                    " • When they visit and make a purchase, you both earn {reward} {symbol}"
                )),
                Line::from(" • Codes are kept for this session only"),
            ],
            ModalKind::Purchase(quote) => vec![
                Line::from(vec![
                    Span::styled("You send:    ", muted),
                    Span::styled(quote.payment(), strong),
                ]),
                Line::from(vec![
                    Span::styled("You receive: ", muted),
                    Span::styled(quote.allocation(&symbol), strong.fg(Color::Yellow)),
                ]),
                Line::from(Span::styled(
                    format!("             {}", quote.breakdown(&symbol)),
                    muted,
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "This is a quote only. No payment is taken by this tool.",
                    muted,
                )),
            ],
            ModalKind::Guide => vec![
                Line::from(Span::styled("1. Pick a payment currency with ←/→", strong)),
                Line::from(format!(
                    "2. Type the amount you want to spend; the {symbol} allocation updates as you type"
                )),
                Line::from("3. Press Enter to review the purchase summary"),
                Line::from(""),
                Line::from(Span::styled("Referrals", strong)),
                Line::from("Focus the referral pane, paste your 0x wallet address and press Enter."),
            ],
            ModalKind::ReferralStats { issued } => vec![
                Line::from(vec![
                    Span::styled("Codes issued this session: ", muted),
                    Span::styled(issued.to_string(), strong),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    "Referral codes exist only while this session runs. Nothing is sent to a server or recorded on-chain.",
                    muted,
                )),
            ],
        }
    }
}

impl Component for Modal {
    type Command = ModalCommand;

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        let action = match (command, &ctx.state.modal) {
            (ModalCommand::Confirm, Some(ModalKind::ReferralLink(link))) => {
                Action::Visit(link.url.clone())
            }
            _ => Action::CloseModal,
        };
        Ok(Some(action))
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let Some(kind) = ctx.state.modal.as_ref() else {
            return;
        };
        let modal_area = centered_rect(84, 14, area);
        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .title(Span::styled(
                kind.title(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let body = Paragraph::new(Self::body(kind, ctx)).wrap(Wrap { trim: false });
        frame.render_widget(body, chunks[0]);

        let hint = match kind {
            ModalKind::ReferralLink(_) => "Enter opens the link as a visitor • Esc closes",
            _ => "Enter or Esc closes",
        };
        let footer = Paragraph::new(Span::styled(hint, Style::default().fg(Color::Gray)))
            .alignment(Alignment::Center);
        frame.render_widget(footer, chunks[1]);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}
