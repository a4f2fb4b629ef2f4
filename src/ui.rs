use crate::client::AppSnapshot;
use chrono::Local;
use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use itertools::Itertools;
use lucky_slip::{
    BET_AMOUNTS,
    BET_MULTIPLIER,
    GAME_ICONS,
    GRANT_AMOUNT,
    HistoryEntry,
    RoundStatus,
    icon_def,
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::io::stdout;
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;

const GRID_COLUMNS: usize = 4;

pub enum UserEvent {
    Quit,
    Redraw,
    MoveSelection { dx: i32, dy: i32 },
    PlaceBet { icon_idx: usize },
    ChooseAmount(u64),
    ClearBets,
    StartRound,
    CloseResult,
    OpenWallet,
    GrantFunds,
    OpenHistory,
}

pub struct UiState {
    mode: Mode,
    selected_icon: usize,
    overlay_active: bool,
    history_len: usize,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            mode: Mode::Normal,
            selected_icon: 0,
            overlay_active: false,
            history_len: 0,
            terminal: None,
        }
    }
}

impl UiState {
    pub fn selected_icon(&self) -> usize {
        self.selected_icon
    }

    fn move_selection(&mut self, dx: i32, dy: i32) {
        let count = GAME_ICONS.len() as i32;
        let idx = self.selected_icon as i32 + dx + dy * GRID_COLUMNS as i32;
        self.selected_icon = idx.rem_euclid(count) as usize;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    WalletModal,
    HistoryModal(HistoryState),
    QuitModal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct HistoryState {
    scroll: usize,
}

pub type InputEventReceiver = mpsc::UnboundedReceiver<std::io::Result<Event>>;

/// Blocking terminal reads happen on a dedicated thread so the async loop can
/// keep servicing phase timers.
pub fn input_event_stream() -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            let ev = event::read();
            let failed = ev.is_err();
            if tx.send(ev).is_err() || failed {
                break;
            }
        }
    });
    rx
}

pub async fn next_raw_event(rx: &mut InputEventReceiver) -> Result<Event> {
    match rx.recv().await {
        Some(ev) => Ok(ev?),
        None => Err(eyre!("terminal input closed")),
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableMouseCapture,
        crossterm::terminal::LeaveAlternateScreen
    )?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    state.overlay_active = snap.game.round.status != RoundStatus::Idle;
    state.history_len = snap.game.history.len();
    if let Mode::HistoryModal(hs) = &mut state.mode {
        hs.scroll = hs.scroll.min(state.history_len.saturating_sub(1));
    }
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

/// Maps a raw terminal event onto a game intent, updating modal state along
/// the way. `None` means the event is irrelevant.
pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => interpret_key(state, key),
        Event::Resize(_, _) => Some(UserEvent::Redraw),
        _ => None,
    }
}

fn interpret_key(state: &mut UiState, key: KeyEvent) -> Option<UserEvent> {
    // raw mode swallows SIGINT
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(UserEvent::Quit);
    }
    match &mut state.mode {
        Mode::QuitModal => {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::WalletModal => {
            return match key.code {
                KeyCode::Enter | KeyCode::Char('a') => Some(UserEvent::GrantFunds),
                KeyCode::Esc | KeyCode::Char('w') | KeyCode::Char('q') => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::HistoryModal(hs) => {
            return match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    hs.scroll = hs.scroll.saturating_sub(1);
                    Some(UserEvent::Redraw)
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if hs.scroll + 1 < state.history_len {
                        hs.scroll += 1;
                    }
                    Some(UserEvent::Redraw)
                }
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('q') => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::Normal => {}
    }

    if state.overlay_active {
        return match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('c') => {
                Some(UserEvent::CloseResult)
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                state.mode = Mode::QuitModal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        };
    }

    Some(match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            UserEvent::Redraw
        }
        KeyCode::Left => UserEvent::MoveSelection { dx: -1, dy: 0 },
        KeyCode::Right => UserEvent::MoveSelection { dx: 1, dy: 0 },
        KeyCode::Up => UserEvent::MoveSelection { dx: 0, dy: -1 },
        KeyCode::Down => UserEvent::MoveSelection { dx: 0, dy: 1 },
        KeyCode::Enter | KeyCode::Char(' ') => UserEvent::PlaceBet {
            icon_idx: state.selected_icon,
        },
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            UserEvent::ChooseAmount(BET_AMOUNTS[idx])
        }
        KeyCode::Char('x') | KeyCode::Backspace => UserEvent::ClearBets,
        KeyCode::Char('p') => UserEvent::StartRound,
        KeyCode::Char('w') => {
            state.mode = Mode::WalletModal;
            UserEvent::OpenWallet
        }
        KeyCode::Char('h') => {
            state.mode = Mode::HistoryModal(HistoryState::default());
            UserEvent::OpenHistory
        }
        _ => return None,
    })
}

/// Applies selection moves locally; everything else goes to the controller.
pub fn apply_local(state: &mut UiState, ev: &UserEvent) -> bool {
    if let UserEvent::MoveSelection { dx, dy } = ev {
        state.move_selection(*dx, *dy);
        return true;
    }
    false
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    // Clear the whole frame to avoid leftover fragments
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // header
            Constraint::Length(3),  // prediction
            Constraint::Length(18), // icon grid, 3 rows
            Constraint::Length(3),  // chips + stake
            Constraint::Length(6),  // errors + help
        ])
        .split(f.area());

    draw_header(f, chunks[0], snap);
    draw_prediction(f, chunks[1], snap);
    draw_grid(f, chunks[2], state, snap);
    draw_bet_bar(f, chunks[3], snap);
    draw_bottom(f, chunks[4], snap);
    draw_modals(f, state, snap);
}

fn draw_header(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let wallet = &snap.game.wallet;
    let line = Line::from(vec![
        Span::styled(
            "LUCKY SLIP",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Balance: "),
        Span::styled(
            format!("₹{}", wallet.balance),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " | Won: ₹{} | Played: ₹{} | {}",
            wallet.total_won, wallet.total_bet, snap.status
        )),
    ]);
    let header = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(header, area);
}

fn draw_prediction(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let text = if snap.insight.is_empty() {
        Line::styled("Consulting the stars...", Style::default().fg(Color::DarkGray))
    } else {
        Line::styled(
            format!("\"{}\"", snap.insight),
            Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::ITALIC),
        )
    };
    let banner = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Prediction"));
    f.render_widget(banner, area);
}

fn draw_grid(f: &mut Frame, area: Rect, state: &UiState, snap: &AppSnapshot) {
    let rows = GAME_ICONS.len().div_ceil(GRID_COLUMNS);
    let row_h = area.height / rows as u16;
    let col_w = area.width / GRID_COLUMNS as u16;
    let round = &snap.game.round;
    for (i, def) in GAME_ICONS.iter().enumerate() {
        let (r, c) = (i / GRID_COLUMNS, i % GRID_COLUMNS);
        let rect = Rect::new(
            area.x + c as u16 * col_w,
            area.y + r as u16 * row_h,
            col_w,
            row_h,
        );
        let selected = i == state.selected_icon;
        let winner = round.status == RoundStatus::Result
            && round.winning_icon == Some(def.id);
        let inner_w = col_w.saturating_sub(2) as usize;
        let mut lines = vec![
            Line::from(def.emoji),
            Line::styled(
                fit(&def.display_name.to_uppercase(), inner_w),
                Style::default().fg(Color::Gray),
            ),
        ];
        match round.bet_on(def.id) {
            Some(amount) => lines.push(Line::styled(
                format!("₹{amount}"),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            None => lines.push(Line::from("")),
        }
        if winner {
            lines.push(Line::styled(
                "WINNER",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        let border_style = if winner {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(fit(def.description, inner_w));
        let cell = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(cell, rect);
    }
}

fn draw_bet_bar(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut spans: Vec<Span> = Vec::new();
    for (i, amount) in BET_AMOUNTS.iter().enumerate() {
        let label = format!(" {}:₹{} ", i + 1, amount);
        if *amount == snap.selected_bet_amount {
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(Color::Gray)));
        }
    }
    spans.push(Span::raw(format!(
        "   Total Stake: ₹{}",
        snap.game.round.total_stake
    )));
    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Chips"));
    f.render_widget(bar, area);
}

fn draw_bottom(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(area);

    let mut lines: Vec<Line> = Vec::new();
    if snap.errors.is_empty() {
        lines.push(Line::from("No errors"));
    } else {
        lines.push(Line::from(snap.errors.iter().join(" | ")));
    }
    let color = if snap.errors.is_empty() {
        Color::DarkGray
    } else {
        Color::Red
    };
    let errors = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Errors"));
    f.render_widget(errors.style(Style::default().fg(color)), chunks[0]);

    let help = Paragraph::new(
        "arrows select | Enter/Space bet | 1-5 chip | x clear | p place bets | w wallet | h history | q quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, chunks[1]);
}

fn draw_modals(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    if state.overlay_active {
        draw_round_overlay(f, snap);
    }
    match &state.mode {
        Mode::WalletModal => draw_wallet_modal(f, snap),
        Mode::HistoryModal(hs) => draw_history_modal(f, hs, snap),
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
            let p = Paragraph::new("Quit the game? (Y/N)");
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::Normal => {}
    }
}

fn draw_round_overlay(f: &mut Frame, snap: &AppSnapshot) {
    let round = &snap.game.round;
    let title = match round.status {
        RoundStatus::Spinning => "Mixing Slips...",
        RoundStatus::Revealing => "Opening Slip...",
        RoundStatus::Result | RoundStatus::Idle => "Result Revealed!",
    };
    let mut lines = vec![Line::from("")];
    match round.winning_icon {
        Some(winner) => {
            let def = icon_def(winner);
            lines.push(Line::from(def.emoji));
            lines.push(Line::styled(
                def.display_name.to_uppercase(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        None => {
            lines.push(Line::styled(
                "?",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
            lines.push(Line::from(""));
        }
    }
    if round.status == RoundStatus::Result {
        lines.push(Line::from(""));
        let stake_on_winner = round.winning_icon.and_then(|w| round.bet_on(w));
        match stake_on_winner {
            Some(amount) => {
                lines.push(Line::styled(
                    "YOU WON! 🎉",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ));
                let payout = snap
                    .game
                    .last_payout()
                    .unwrap_or(amount.saturating_mul(BET_MULTIPLIER));
                lines.push(Line::from(format!("Payout: ₹{payout}")));
            }
            None => lines.push(Line::styled(
                "Better luck next time!",
                Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC),
            )),
        }
        lines.push(Line::from(""));
        lines.push(Line::from("Enter = CLOSE"));
    }
    let area = centered_rect(40, 50, f.area());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn draw_wallet_modal(f: &mut Frame, snap: &AppSnapshot) {
    let wallet = &snap.game.wallet;
    let area = centered_rect(50, 50, f.area());
    let block = Block::default().borders(Borders::ALL).title("Wallet Hub");
    let lines = vec![
        Line::from("Available Funds"),
        Line::styled(
            format!("₹{}", wallet.balance),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from(format!("Total Winnings: ₹{}", wallet.total_won)),
        Line::from(format!("Volume Played:  ₹{}", wallet.total_bet)),
        Line::from(""),
        Line::from(format!("Enter/a = ADD ₹{GRANT_AMOUNT} INSTANTLY   Esc = close")),
    ];
    f.render_widget(Clear, area);
    f.render_widget(block.clone(), area);
    f.render_widget(Paragraph::new(lines), block.inner(area));
}

fn draw_history_modal(f: &mut Frame, hs: &HistoryState, snap: &AppSnapshot) {
    let area = centered_rect(60, 70, f.area());
    let block = Block::default().borders(Borders::ALL).title("Game History");
    let mut lines = Vec::new();
    if snap.game.history.is_empty() {
        lines.push(Line::styled(
            "No rounds played yet",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        for entry in snap.game.history.iter().skip(hs.scroll) {
            lines.push(history_line(entry));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("↑/↓ scroll  Esc = close"));
    }
    f.render_widget(Clear, area);
    f.render_widget(block.clone(), area);
    f.render_widget(Paragraph::new(lines), block.inner(area));
}

fn history_line(entry: &HistoryEntry) -> Line<'static> {
    let def = icon_def(entry.winning_icon);
    let time = entry.timestamp.with_timezone(&Local).format("%H:%M:%S");
    let (amount, label, style) = if entry.is_win() {
        (
            format!("+₹{}", entry.payout),
            "Jackpot!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            format!("- ₹{}", entry.total_staked()),
            "Missed",
            Style::default().fg(Color::DarkGray),
        )
    };
    Line::from(vec![
        Span::raw(format!(
            "#{:<3} {} {:<13} {}  ",
            entry.round, def.emoji, def.display_name, time
        )),
        Span::styled(format!("{amount} {label}"), style),
    ])
}

/// Truncates `text` to `width` terminal columns.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let next = format!("{out}{ch}");
        if next.width() + 1 > width {
            break;
        }
        out = next;
    }
    out.push('…');
    out
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    let vertical = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1]);

    vertical[1]
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn interpret_event__enter_places_bet_on_selected_icon() {
        // given
        let mut state = UiState::default();
        state.move_selection(1, 1);

        // when
        let ev = interpret_event(&mut state, press(KeyCode::Enter));

        // then
        assert!(matches!(ev, Some(UserEvent::PlaceBet { icon_idx: 5 })));
    }

    #[test]
    fn interpret_event__enter_closes_result_when_overlay_shown() {
        let mut state = UiState {
            overlay_active: true,
            ..UiState::default()
        };
        let ev = interpret_event(&mut state, press(KeyCode::Enter));
        assert!(matches!(ev, Some(UserEvent::CloseResult)));
    }

    #[test]
    fn interpret_event__digits_choose_chip_amounts() {
        let mut state = UiState::default();
        let ev = interpret_event(&mut state, press(KeyCode::Char('4')));
        assert!(matches!(ev, Some(UserEvent::ChooseAmount(500))));
    }

    #[test]
    fn interpret_event__wallet_modal_grants_funds() {
        // given
        let mut state = UiState::default();
        interpret_event(&mut state, press(KeyCode::Char('w')));

        // when
        let ev = interpret_event(&mut state, press(KeyCode::Enter));

        // then
        assert!(matches!(ev, Some(UserEvent::GrantFunds)));
        assert_eq!(state.mode, Mode::WalletModal);
    }

    #[test]
    fn interpret_event__quit_requires_confirmation() {
        // given
        let mut state = UiState::default();

        // when
        let first = interpret_event(&mut state, press(KeyCode::Char('q')));
        let second = interpret_event(&mut state, press(KeyCode::Char('y')));

        // then
        assert!(matches!(first, Some(UserEvent::Redraw)));
        assert!(matches!(second, Some(UserEvent::Quit)));
    }

    #[test]
    fn interpret_event__ctrl_c_quits_immediately() {
        let mut state = UiState::default();
        let ev = interpret_event(
            &mut state,
            Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(matches!(ev, Some(UserEvent::Quit)));
    }

    #[test]
    fn move_selection__wraps_around_grid() {
        let mut state = UiState::default();
        state.move_selection(-1, 0);
        assert_eq!(state.selected_icon(), 11);
        state.move_selection(0, 1);
        assert_eq!(state.selected_icon(), 3);
    }

    #[test]
    fn fit__truncates_wide_text() {
        assert_eq!(fit("Rose", 10), "Rose");
        assert_eq!(fit("Wealth Reservoir", 8), "Wealth …");
    }
}
