//! Darts duel: board scoring, 501 rules, bot opponent

pub mod aim;
pub mod board;
pub mod bot;
pub mod rules;

pub use aim::power_throw;
pub use board::{BoardGeometry, Hit, Ring, SECTOR_ORDER};
pub use bot::BotPolicy;
pub use rules::{
    DartMatch, Side, Throw, ThrowOutcome, ThrowRejection, ThrowReport, Turn, TurnState, can_finish,
};
