//! Heart Arcade demo
//!
//! Autoplays the three levels in unlock order against an in-memory rewards
//! ledger. Usage: `heart-arcade [seed] [settings.json]`

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use heart_arcade::rewards::top_up_intro_hearts;
use heart_arcade::session::GameEngine;
use heart_arcade::sim::{
    DartMatch, MatchGame, PlaceOutcome, PlacementGame, Side, SwapOutcome, ThrowOutcome,
};
use heart_arcade::{InMemoryRewards, LevelCode, LevelRewards, Session, SessionPhase, Settings};

/// Safety stop for a darts match that never checks out
const MAX_DART_TURNS: usize = 400;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) => s.parse::<u64>()?,
        None => 42,
    };
    let settings = match args.next() {
        Some(path) => Settings::from_json(&std::fs::read_to_string(path)?)?,
        None => Settings::default(),
    };
    log::info!(
        "Heart Arcade starting (seed {}, {} difficulty)",
        seed,
        settings.difficulty.as_str()
    );

    let mut rewards = InMemoryRewards::new();
    let balance = top_up_intro_hearts(&mut rewards).await?;
    println!("Intro hearts: {}", balance);

    let mut picker = Pcg32::seed_from_u64(seed ^ 0x5eed);

    for level in LevelCode::ALL {
        if !rewards.is_unlocked(level) {
            println!("{}: locked", level);
            continue;
        }
        let phase = match level {
            LevelCode::Candy => {
                let game = MatchGame::new(&settings.candy, seed)?;
                play_candy(Session::new(game), &mut rewards, &mut picker).await?
            }
            LevelCode::BlockPuzzle => {
                let game = PlacementGame::new(&settings.block_puzzle, seed)?;
                play_block_puzzle(Session::new(game), &mut rewards).await?
            }
            LevelCode::Dart => {
                let game = DartMatch::new(&settings.darts, seed)?;
                play_darts(Session::new(game), &mut rewards, &mut picker).await?
            }
        };
        println!("{}: {:?}", level, phase);
    }

    println!(
        "Balance: {} hearts ({} levels completed)",
        rewards.balance().await?,
        rewards.levels_completed()
    );
    Ok(())
}

async fn play_candy(
    mut session: Session<MatchGame>,
    rewards: &mut InMemoryRewards,
    picker: &mut Pcg32,
) -> Result<SessionPhase, Box<dyn std::error::Error>> {
    while session.phase() == SessionPhase::Playing {
        let swaps = session.game().valid_swaps();
        if swaps.is_empty() {
            log::warn!("no swap makes a run, giving up");
            break;
        }
        let (a, b) = swaps[picker.random_range(0..swaps.len())];
        match session.game_mut().attempt_swap(a, b) {
            SwapOutcome::Matched(resolution) => log::debug!(
                "swap {:?}<->{:?} cleared {} hearts",
                a,
                b,
                resolution.cleared_count()
            ),
            other => log::debug!("swap {:?}<->{:?} not applied: {:?}", a, b, other),
        }
        session.settle(rewards).await?;
    }
    let game = session.game();
    println!(
        "  collected {} hearts with {} moves left",
        game.collected().total(),
        game.moves_left()
    );
    Ok(session.phase())
}

/// Greedy: take the placement that clears the most lines, else the first fit
fn best_placement(game: &PlacementGame) -> Option<(usize, isize, isize)> {
    let mut best: Option<((usize, isize, isize), u32)> = None;
    for index in 0..game.hand().len() {
        for (row, col) in game.legal_placements(index) {
            let mut trial = game.clone();
            let lines = match trial.place(index, row, col) {
                PlaceOutcome::Placed(report) => report.lines(),
                PlaceOutcome::Rejected(_) => continue,
            };
            if best.is_none_or(|(_, most)| lines > most) {
                best = Some(((index, row, col), lines));
            }
        }
    }
    best.map(|(spot, _)| spot)
}

async fn play_block_puzzle(
    mut session: Session<PlacementGame>,
    rewards: &mut InMemoryRewards,
) -> Result<SessionPhase, Box<dyn std::error::Error>> {
    while session.phase() == SessionPhase::Playing {
        let Some((index, row, col)) = best_placement(session.game()) else {
            log::warn!("no piece fits, giving up");
            break;
        };
        if let PlaceOutcome::Rejected(reason) = session.game_mut().place(index, row, col) {
            log::debug!("placing piece {} at ({}, {}) rejected: {:?}", index, row, col, reason);
        }
        session.settle(rewards).await?;
    }
    let game = session.game();
    println!(
        "  cleared {} / {} lines with {} moves left",
        game.lines_cleared(),
        game.target_lines(),
        game.moves_left()
    );
    Ok(session.phase())
}

/// The player aims like the bot and releases the meter near the top
fn player_throw(game: &mut DartMatch, picker: &mut Pcg32) {
    let score = game.score(Side::Player);
    let aim: Vec2 = game.bot().aim(score, game.geometry(), picker);
    let power = picker.random_range(94..=100);
    match game.throw_with_power(aim, power) {
        ThrowOutcome::Scored(report) => log::debug!(
            "player hit {} (x{}) at power {}, {:?}",
            report.throw.hit.sector,
            report.throw.hit.multiplier,
            power,
            report.state
        ),
        ThrowOutcome::Rejected(reason) => log::debug!("player throw rejected: {:?}", reason),
    }
}

async fn play_darts(
    mut session: Session<DartMatch>,
    rewards: &mut InMemoryRewards,
    picker: &mut Pcg32,
) -> Result<SessionPhase, Box<dyn std::error::Error>> {
    while session.phase() == SessionPhase::Playing {
        if session.game().history().len() >= MAX_DART_TURNS {
            log::warn!("no checkout after {} turns, stopping", MAX_DART_TURNS);
            break;
        }
        match session.game().active() {
            Side::Player => player_throw(session.game_mut(), picker),
            Side::Bot => {
                let throws = session.game_mut().play_bot_turn();
                if throws.is_empty() {
                    log::debug!("bot turn produced no throws");
                }
                for report in throws {
                    log::debug!(
                        "bot hit {} (x{}), {:?}",
                        report.throw.hit.sector,
                        report.throw.hit.multiplier,
                        report.state
                    );
                }
            }
        }
        session.settle(rewards).await?;
    }
    let game = session.game();
    println!(
        "  player {} / bot {} after {} turns (score {:?})",
        game.score(Side::Player),
        game.score(Side::Bot),
        game.history().len(),
        game.completion_score()
    );
    Ok(session.phase())
}
