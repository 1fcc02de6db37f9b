use crossterm::event::KeyCode;
use digit_oracle::input::{parse_main_command, UiCommand};

#[test]
fn parse_main_command_maps_case_insensitive_char_keys() {
    assert_eq!(parse_main_command(&KeyCode::Char('q')), Some(UiCommand::Quit));
    assert_eq!(parse_main_command(&KeyCode::Char('Q')), Some(UiCommand::Quit));
    assert_eq!(
        parse_main_command(&KeyCode::Char('R')),
        Some(UiCommand::ResetStats)
    );
    assert_eq!(
        parse_main_command(&KeyCode::Char('A')),
        Some(UiCommand::ToggleLive)
    );
}

#[test]
fn parse_main_command_maps_symbol_navigation_keys() {
    for key in [KeyCode::Right, KeyCode::Tab, KeyCode::Char('n'), KeyCode::Char('l')] {
        assert_eq!(parse_main_command(&key), Some(UiCommand::NextSymbol));
    }
    for key in [KeyCode::Left, KeyCode::BackTab, KeyCode::Char('p'), KeyCode::Char('H')] {
        assert_eq!(parse_main_command(&key), Some(UiCommand::PrevSymbol));
    }
}

#[test]
fn parse_main_command_space_toggles_live_and_esc_quits() {
    assert_eq!(
        parse_main_command(&KeyCode::Char(' ')),
        Some(UiCommand::ToggleLive)
    );
    assert_eq!(parse_main_command(&KeyCode::Esc), Some(UiCommand::Quit));
}

#[test]
fn parse_main_command_ignores_unmapped_keys() {
    assert_eq!(parse_main_command(&KeyCode::Char('x')), None);
    assert_eq!(parse_main_command(&KeyCode::Enter), None);
    assert_eq!(parse_main_command(&KeyCode::Up), None);
}
