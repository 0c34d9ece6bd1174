use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use gridscape::Vec2;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum HostAction {
    Quit,
    ToggleHud,
    TogglePause,
    /// Signed count of scroll steps (wheel notches / arrow presses).
    ScrollSteps(f32),
    /// Signed count of viewport pages.
    ScrollPages(f32),
    ScrollTop,
    ScrollBottom,
    Pointer { col: u16, row: u16 },
    Resize { cols: u16, rows: u16 },
}

pub(crate) fn collect_events_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<Event>> {
    let mut out = Vec::new();

    // tiny timeout keeps the frame loop responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        out.push(event::read()?);
        if out.len() >= 64 {
            break;
        }
    }
    Ok(out)
}

pub(crate) fn map_event(ev: Event) -> Option<HostAction> {
    match ev {
        Event::Key(k) if k.kind != KeyEventKind::Release => {
            if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
                return Some(HostAction::Quit);
            }
            match k.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(HostAction::Quit),
                KeyCode::Char('h') | KeyCode::Char('H') => Some(HostAction::ToggleHud),
                KeyCode::Char(' ') => Some(HostAction::TogglePause),
                KeyCode::Down | KeyCode::Char('j') => Some(HostAction::ScrollSteps(1.0)),
                KeyCode::Up | KeyCode::Char('k') => Some(HostAction::ScrollSteps(-1.0)),
                KeyCode::PageDown => Some(HostAction::ScrollPages(0.9)),
                KeyCode::PageUp => Some(HostAction::ScrollPages(-0.9)),
                KeyCode::Home | KeyCode::Char('r') | KeyCode::Char('R') => {
                    Some(HostAction::ScrollTop)
                }
                KeyCode::End => Some(HostAction::ScrollBottom),
                _ => None,
            }
        }
        Event::Mouse(m) => match m.kind {
            MouseEventKind::ScrollDown => Some(HostAction::ScrollSteps(1.0)),
            MouseEventKind::ScrollUp => Some(HostAction::ScrollSteps(-1.0)),
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                Some(HostAction::Pointer {
                    col: m.column,
                    row: m.row,
                })
            }
            _ => None,
        },
        Event::Resize(cols, rows) => Some(HostAction::Resize { cols, rows }),
        _ => None,
    }
}

/// Terminal cell to normalized device coordinates, y up.
pub(crate) fn pointer_ndc(col: u16, row: u16, cols: u16, rows: u16) -> Vec2 {
    let w = cols.max(1) as f32;
    let h = rows.max(1) as f32;
    let x = (col as f32 + 0.5) / w * 2.0 - 1.0;
    let y = -((row as f32 + 0.5) / h) * 2.0 + 1.0;
    Vec2::new(x, y)
}
