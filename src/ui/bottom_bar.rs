use super::util::pane_title_style;
use crate::{
    app::{Action, AppContext, AppResult, AppView, FocusedPane},
    components::Component,
};
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::Line,
    widgets::{Block, Paragraph},
};

#[derive(Debug, Default)]
pub struct BottomBar;

impl BottomBar {
    fn keymap(ctx: &AppView<'_>) -> &'static str {
        match ctx.state.navigation.focused_pane {
            FocusedPane::Purchase => {
                "Tab Focus • 0-9 . Amount • ←/→ Currency • Enter Buy • F1 Guide • F2 Stats • Esc Quit"
            }
            FocusedPane::Referral => {
                "Tab Focus • Type/paste wallet • Enter Generate link • Ctrl+U Clear • F1 Guide • F2 Stats"
            }
            FocusedPane::Top | FocusedPane::BottomBar => {
                "q Quit • Tab Focus • 1..4 Focus pane • F1 Guide • F2 Stats"
            }
        }
    }
}

impl Component for BottomBar {
    type Command = ();

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
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
        let is_focused = matches!(ctx.state.navigation.focused_pane, FocusedPane::BottomBar);
        let mut style = pane_title_style(is_focused);
        if is_focused {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        let widget = Paragraph::new(Line::from(Self::keymap(ctx)))
            .block(Block::bordered().title(Line::from("[4] Keymap").style(style)));
        frame.render_widget(widget, area);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}
