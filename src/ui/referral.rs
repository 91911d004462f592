use super::util::pane_title_style;
use crate::{
    app::{Action, AppContext, AppResult, AppView, FocusedPane, ModalKind},
    components::Component,
    presale::{ReferralLink, quote::group_thousands, referral},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracing::debug;

#[derive(Debug, Default)]
pub struct ReferralPanel {
    input: String,
    link: Option<ReferralLink>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ReferralCommand {
    InputChar(char),
    InsertText(String),
    Backspace,
    Clear,
    Generate,
}

impl ReferralPanel {
    pub fn command_from_key(event: KeyEvent) -> Option<ReferralCommand> {
        match (event.modifiers, event.code) {
            (_, KeyCode::Enter) => Some(ReferralCommand::Generate),
            (_, KeyCode::Backspace) => Some(ReferralCommand::Backspace),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(ReferralCommand::Clear),
            (modifiers, KeyCode::Char(c)) if !modifiers.contains(KeyModifiers::CONTROL) => {
                Some(ReferralCommand::InputChar(c))
            }
            _ => None,
        }
    }

    fn generate(&mut self, ctx: &mut AppContext<'_>) -> Option<Action> {
        match referral::generate_link(ctx.registry, ctx.page, &self.input) {
            Ok(link) => {
                self.error = None;
                self.link = Some(link.clone());
                Some(Action::OpenModal(ModalKind::ReferralLink(link)))
            }
            Err(err) => {
                debug!(error = %err, "referral input rejected");
                self.error = Some(err.to_string());
                None
            }
        }
    }
}

impl Component for ReferralPanel {
    type Command = ReferralCommand;

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            ReferralCommand::InputChar(c) => {
                self.error = None;
                self.input.push(*c);
            }
            ReferralCommand::InsertText(text) => {
                self.error = None;
                let cleaned: String = text
                    .chars()
                    .filter(|ch| !matches!(ch, '\r' | '\n'))
                    .collect();
                self.input.push_str(&cleaned);
            }
            ReferralCommand::Backspace => {
                self.error = None;
                self.input.pop();
            }
            ReferralCommand::Clear => {
                self.error = None;
                self.input.clear();
            }
            ReferralCommand::Generate => return Ok(self.generate(ctx)),
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let is_focused = matches!(ctx.state.navigation.focused_pane, FocusedPane::Referral);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Line::from("[3] Referral").style(pane_title_style(is_focused)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(2),
            ])
            .split(inner);

        let intro = Paragraph::new(format!(
            "Share a link and both of you earn {} {}.",
            group_thousands(&ctx.config.referral_reward.to_string()),
            ctx.config.token_symbol
        ))
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
        frame.render_widget(intro, layout[0]);

        let placeholder = if self.input.is_empty() {
            "0x…"
        } else {
            self.input.as_str()
        };
        let mut spans = vec![
            Span::styled(
                "Wallet: ",
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                placeholder.to_string(),
                if is_focused {
                    Style::default()
                        .fg(Color::White)
                        .bg(Color::Blue)
                        .add_modifier(Modifier::BOLD)
                } else if self.input.is_empty() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::White)
                },
            ),
        ];
        if is_focused {
            spans.push(Span::styled(
                " ▌",
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).wrap(Wrap { trim: false }),
            layout[1],
        );

        let link_text = match &self.link {
            Some(link) => format!("Last link: {}", link.url),
            None => "No link generated yet".to_string(),
        };
        frame.render_widget(
            Paragraph::new(link_text)
                .style(Style::default().fg(Color::Gray))
                .wrap(Wrap { trim: false }),
            layout[2],
        );

        let status = match &self.error {
            Some(message) => Paragraph::new(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            None => Paragraph::new(Span::styled(
                "Enter to generate • Ctrl+U to clear",
                Style::default().fg(Color::Gray),
            )),
        };
        frame.render_widget(status.wrap(Wrap { trim: true }), layout[3]);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}
