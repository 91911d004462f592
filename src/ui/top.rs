use super::util::pane_title_style;
use crate::{
    app::{Action, AppContext, AppResult, AppView, FocusedPane},
    components::Component,
    presale::{Countdown, CountdownState, ReferralSource, address::abbreviate},
};
use chrono::Utc;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

#[derive(Debug)]
pub struct TopBar {
    title: String,
    countdown: Option<Countdown>,
}

impl Default for TopBar {
    fn default() -> Self {
        Self {
            title: "presale-tui".to_string(),
            countdown: None,
        }
    }
}

impl TopBar {
    fn countdown_line(state: &CountdownState) -> Line<'static> {
        match state {
            CountdownState::Running { .. } => Line::from(vec![
                Span::styled("Presale ends in ", Style::default().fg(Color::Gray)),
                Span::styled(
                    state.to_string(),
                    Style::default()
                        .fg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            CountdownState::Ended => Line::from(Span::styled(
                state.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
        }
    }
}

impl Component for TopBar {
    type Command = ();

    fn init(&mut self, ctx: &mut AppContext<'_>) -> AppResult<()> {
        self.title = format!("presale-tui • {} presale", ctx.config.token_symbol);
        let countdown = Countdown::new(ctx.config.sale_ends_at);
        ctx.state.countdown = countdown.remaining(Utc::now());
        self.countdown = Some(countdown);
        Ok(())
    }

    fn update(
        &mut self,
        _command: &Self::Command,
        _ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let is_focused = matches!(ctx.state.navigation.focused_pane, FocusedPane::Top);
        let title = Line::from(format!("[1] {}", self.title)).style(pane_title_style(is_focused));

        let mut lines = vec![Self::countdown_line(&ctx.state.countdown)];
        let status = match (&ctx.state.notification, &ctx.state.inbound) {
            (Some(message), _) => Line::from(Span::styled(
                format!("🎉 {message}"),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            (None, Some(inbound)) => {
                let via = match inbound.source {
                    ReferralSource::ShortCode => "short code",
                    ReferralSource::RawAddress => "wallet address",
                };
                Line::from(format!(
                    "Referred by {} via {via}",
                    abbreviate(&inbound.referrer)
                ))
            }
            (None, None) if ctx.registry.is_empty() => Line::from("No referral codes issued yet"),
            (None, None) => Line::from(format!(
                "Referral codes issued this session: {}",
                ctx.registry.len()
            )),
        };
        lines.push(status);
        lines.push(Line::from(Span::styled(
            format!("Links point to {}", ctx.page),
            Style::default().fg(Color::DarkGray),
        )));

        let widget = Paragraph::new(lines)
            .style(Style::default().fg(Color::Gray))
            .block(Block::bordered().title(title));
        frame.render_widget(widget, area);
    }

    /// Recomputes the countdown when the tick timer has fired and asks for
    /// the timer to stop once the sale is over.
    fn tick(&mut self, ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        if !ctx.state.countdown_due {
            return Ok(None);
        }
        ctx.state.countdown_due = false;
        let Some(countdown) = self.countdown else {
            return Ok(None);
        };
        ctx.state.countdown = countdown.remaining(Utc::now());
        Ok(ctx.state.countdown.is_ended().then_some(Action::StopCountdown))
    }
}
