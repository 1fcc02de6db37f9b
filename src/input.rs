use crossterm::event::KeyCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    NextSymbol,
    PrevSymbol,
    SwitchSymbol(String),
    ToggleLive,
    SetLive(bool),
    ResetStats,
    Quit,
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Right | KeyCode::Tab => Some(UiCommand::NextSymbol),
        KeyCode::Left | KeyCode::BackTab => Some(UiCommand::PrevSymbol),
        KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Char(' ') => Some(UiCommand::ToggleLive),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'n' | 'l' => Some(UiCommand::NextSymbol),
            'p' | 'h' => Some(UiCommand::PrevSymbol),
            'a' => Some(UiCommand::ToggleLive),
            'r' => Some(UiCommand::ResetStats),
            'q' => Some(UiCommand::Quit),
            _ => None,
        },
        _ => None,
    }
}
