#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;

use crate::domain::models::Event;

/// Terminal input the picker reacts to. Keys other than Ctrl+C are handed to
/// `AppState` as textarea input, which decides per focused pane.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(keyevent) => {
            if keyevent.kind == KeyEventKind::Release {
                return None;
            }
            if keyevent.code == KeyCode::Char('c')
                && keyevent.modifiers.contains(KeyModifiers::CONTROL)
            {
                return Some(Event::KeyboardCTRLC());
            }

            return Some(Event::KeyboardCharInput(keyevent.into()));
        }
        CrosstermEvent::Mouse(mouseevent) => match mouseevent.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                return Some(Event::MouseClick(mouseevent.column, mouseevent.row));
            }
            MouseEventKind::ScrollUp => return Some(Event::UIScrollUp()),
            MouseEventKind::ScrollDown => return Some(Event::UIScrollDown()),
            _ => return None,
        },
        CrosstermEvent::Paste(text) => return Some(Event::KeyboardPaste(text)),
        CrosstermEvent::Resize(_, _) => return Some(Event::UIResize()),
        _ => return None,
    }
}

/// Merges worker replies, terminal input and a redraw tick into one stream.
pub struct EventsService {
    terminal: EventStream,
    worker: mpsc::UnboundedReceiver<Event>,
}

impl EventsService {
    pub fn new(worker: mpsc::UnboundedReceiver<Event>) -> EventsService {
        return EventsService {
            terminal: EventStream::new(),
            worker,
        };
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let evt = tokio::select! {
                event = self.worker.recv() => event,
                event = self.terminal.next() => match event {
                    Some(Ok(input)) => translate(input),
                    Some(Err(err)) => {
                        tracing::warn!(error = ?err, "Unable to read terminal event");
                        None
                    }
                    None => None,
                },
                _ = time::sleep(time::Duration::from_millis(500)) => Some(Event::UITick())
            };

            if let Some(event) = evt {
                return Ok(event);
            }
        }
    }
}
