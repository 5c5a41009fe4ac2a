//! Commands queued into the world inbox
//!
//! Commands take effect on the next `World::tick`, never immediately.

use std::path::PathBuf;
use std::sync::mpsc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::PersistError;

/// Held movement keys for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    /// Unnormalized direction, +y is down
    pub fn axis(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir
    }
}

/// Completion signal for a save or load command.
/// The caller polls it without blocking.
#[derive(Debug)]
pub struct ReplySlot {
    rx: mpsc::Receiver<Result<(), PersistError>>,
}

impl ReplySlot {
    fn pair() -> (mpsc::SyncSender<Result<(), PersistError>>, Self) {
        let (tx, rx) = mpsc::sync_channel(1);
        (tx, Self { rx })
    }

    /// `None` until the world has processed the command
    pub fn poll(&self) -> Option<Result<(), PersistError>> {
        self.rx.try_recv().ok()
    }
}

/// Tagged world command
#[derive(Debug)]
pub enum Command {
    Input(InputState),
    /// Pick upgrade option 0 or 1
    ChooseUpgrade(usize),
    Restart,
    TogglePause,
    SaveSnapshot {
        path: PathBuf,
        reply: mpsc::SyncSender<Result<(), PersistError>>,
    },
    LoadSnapshot {
        path: PathBuf,
        reply: mpsc::SyncSender<Result<(), PersistError>>,
    },
}

impl Command {
    pub fn save_snapshot(path: impl Into<PathBuf>) -> (Self, ReplySlot) {
        let (reply, slot) = ReplySlot::pair();
        (
            Command::SaveSnapshot {
                path: path.into(),
                reply,
            },
            slot,
        )
    }

    pub fn load_snapshot(path: impl Into<PathBuf>) -> (Self, ReplySlot) {
        let (reply, slot) = ReplySlot::pair();
        (
            Command::LoadSnapshot {
                path: path.into(),
                reply,
            },
            slot,
        )
    }
}

/// Everything the player did during one tick, as recorded in replays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    pub input: InputState,
    pub restart: bool,
    pub toggle_pause: bool,
    pub choose: Option<u8>,
}

impl FrameInput {
    /// Commands in issue order: input, restart, pause, upgrade choice
    pub fn commands(&self) -> Vec<Command> {
        let mut out = vec![Command::Input(self.input)];
        if self.restart {
            out.push(Command::Restart);
        }
        if self.toggle_pause {
            out.push(Command::TogglePause);
        }
        if let Some(choice) = self.choose {
            out.push(Command::ChooseUpgrade(usize::from(choice)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_command_order() {
        let frame = FrameInput {
            input: InputState {
                right: true,
                ..Default::default()
            },
            restart: true,
            toggle_pause: true,
            choose: Some(1),
        };
        let cmds = frame.commands();
        assert_eq!(cmds.len(), 4);
        assert!(matches!(cmds[0], Command::Input(i) if i.right));
        assert!(matches!(cmds[1], Command::Restart));
        assert!(matches!(cmds[2], Command::TogglePause));
        assert!(matches!(cmds[3], Command::ChooseUpgrade(1)));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let input = InputState {
            up: true,
            down: true,
            left: true,
            right: false,
        };
        assert_eq!(input.axis(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_reply_slot_empty_until_sent() {
        let (cmd, slot) = Command::save_snapshot("x.json");
        assert!(slot.poll().is_none());
        if let Command::SaveSnapshot { reply, .. } = cmd {
            reply.try_send(Ok(())).unwrap();
        }
        assert!(matches!(slot.poll(), Some(Ok(()))));
    }
}
