//! The VT screen and query responder: an ANSI/CSI/OSC/APC byte-stream
//! interpreter feeding a styled cell grid with scrollback (`screen`), and a
//! reverse path that answers terminal-probe sequences on behalf of a
//! detached PTY (`query`).
//!
//! Neither side ever fails on malformed input — parsing always
//! resynchronizes rather than raising, since a PTY byte stream is not
//! something the reader controls.

pub mod palette;
pub mod query;
pub mod screen;
pub mod width;

pub use query::{respond, CursorReport, QueryState};
pub use screen::{Cell, Color, Screen, Snapshot, StyledLine, StyledSpan};
