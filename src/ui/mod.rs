//! Client-side presentation state; rendered by the `tui` binary.

pub mod board;

pub use board::{Board, DueChoice, MemberFilter, Notice, NoticeLevel, Source, StatusFilter};
