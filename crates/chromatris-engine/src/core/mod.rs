pub use self::{block::*, piece::*, position::*, theme::*};

pub(crate) mod block;
pub(crate) mod piece;
pub(crate) mod position;
pub(crate) mod theme;
