//! Match command - play the engine against a random bot
//!
//! Each game deals two fresh hands from the preset table. Turns alternate
//! who commits first; the side moving second sees the first side's card and
//! power. Rounds are resolved with the duel rules, and the game ends when a
//! side is knocked out or the cards run out. Higher health wins, equal
//! health is a draw.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), play_turn(), compute_match_statistics()
//! - Level 4: bot move, formatting utilities

use anyhow::{Context, Result};
use clap::Args;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use powerduel_ai::{EngineConfig, Move, MoveEngine};
use powerduel_core::{deal_hand, simulate_duel, Hand, Play};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Number of games to play (alternating who moves first)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// How a game ended, from the engine's side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GameOutcome {
    EngineWins,
    BotWins,
    Draw,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    outcome: GameOutcome,
    rounds: usize,
    engine_health: i32,
    bot_health: i32,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    engine_wins: usize,
    bot_wins: usize,
    draws: usize,
    avg_rounds: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Build the engine
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, config: EngineConfig, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Starting match: engine vs random bot ({} games, population={}, generations={})",
        args.games,
        config.evolution.population_size,
        config.generations
    );

    let mut engine = MoveEngine::new(config).context("Failed to start engine")?;
    let results = play_match(&mut engine, args.games, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in the match
fn play_match(engine: &mut MoveEngine, games: usize, seed: Option<u64>) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let mut records = Vec::with_capacity(games);

    for game_num in 0..games {
        // Alternate who commits first
        let engine_first = game_num % 2 == 0;
        let record = play_single_game(engine, game_num + 1, engine_first, &mut rng)?;

        tracing::info!(
            "Game {}: {:?} ({} rounds, health {} vs {})",
            record.game_number,
            record.outcome,
            record.rounds,
            record.engine_health,
            record.bot_health
        );

        records.push(record);
    }

    Ok(compute_match_statistics(records))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Deal two hands and play until someone is knocked out or the cards run out
fn play_single_game(
    engine: &mut MoveEngine,
    game_number: usize,
    engine_first: bool,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut engine_hand = deal_hand(rng);
    let mut bot_hand = deal_hand(rng);
    let mut engine_first = engine_first;
    let mut rounds = 0;

    while !engine_hand.is_defeated()
        && !bot_hand.is_defeated()
        && engine_hand.playable_count() > 0
        && bot_hand.playable_count() > 0
    {
        play_turn(engine, &mut engine_hand, &mut bot_hand, engine_first, rng)?;
        rounds += 1;
        engine_first = !engine_first;
    }

    let outcome = if engine_hand.health > bot_hand.health {
        GameOutcome::EngineWins
    } else if bot_hand.health > engine_hand.health {
        GameOutcome::BotWins
    } else {
        GameOutcome::Draw
    };

    Ok(GameRecord {
        game_number,
        outcome,
        rounds,
        engine_health: engine_hand.health,
        bot_health: bot_hand.health,
    })
}

/// Both sides commit a card, then the round is resolved
fn play_turn(
    engine: &mut MoveEngine,
    engine_hand: &mut Hand,
    bot_hand: &mut Hand,
    engine_first: bool,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    if engine_first {
        let mv = engine.choose_move(engine_hand, bot_hand)?;
        engine_hand.commit(mv.card, mv.power);
        let mv = bot_move(bot_hand, rng);
        bot_hand.commit(mv.card, mv.power);
    } else {
        let mv = bot_move(bot_hand, rng);
        bot_hand.commit(mv.card, mv.power);
        let mv = engine.choose_move(engine_hand, bot_hand)?;
        engine_hand.commit(mv.card, mv.power);
    }

    let ours = committed_play(engine_hand)?;
    let theirs = committed_play(bot_hand)?;
    let outcome = simulate_duel(&[ours], &[theirs], engine_hand.health, bot_hand.health);
    engine_hand.health = outcome.acting_health;
    bot_hand.health = outcome.opposing_health;

    engine_hand.clear_selection();
    bot_hand.clear_selection();
    Ok(())
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let count = |outcome: GameOutcome| games.iter().filter(|g| g.outcome == outcome).count();
    let engine_wins = count(GameOutcome::EngineWins);
    let bot_wins = count(GameOutcome::BotWins);
    let draws = count(GameOutcome::Draw);

    let total_rounds: usize = games.iter().map(|g| g.rounds).sum();
    let avg_rounds = if games.is_empty() {
        0.0
    } else {
        total_rounds as f32 / games.len() as f32
    };

    MatchResults {
        games,
        engine_wins,
        bot_wins,
        draws,
        avg_rounds,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Uniformly random playable card with a uniformly random share of the power
fn bot_move<R: Rng>(hand: &Hand, rng: &mut R) -> Move {
    let card = hand
        .playable_indices()
        .choose(rng)
        .copied()
        .unwrap_or_default();
    Move {
        card,
        power: rng.gen_range(0..=hand.power),
    }
}

fn committed_play(hand: &Hand) -> Result<Play> {
    let selection = hand.selection.context("no card committed this turn")?;
    Ok(Play::new(&hand.cards[selection.card], selection.power))
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(part: usize, total: usize) -> f32 {
    if total > 0 {
        part as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        outcome: String,
        rounds: usize,
        engine_health: i32,
        bot_health: i32,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        engine_wins: usize,
        bot_wins: usize,
        draws: usize,
        avg_rounds: f32,
        engine_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        total_games: total,
        engine_wins: results.engine_wins,
        bot_wins: results.bot_wins,
        draws: results.draws,
        avg_rounds: results.avg_rounds,
        engine_win_rate: percent(results.engine_wins, total) / 100.0,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                outcome: format!("{:?}", g.outcome),
                rounds: g.rounds,
                engine_health: g.engine_health,
                bot_health: g.bot_health,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    println!(
        "Engine wins: {} ({:.1}%)",
        results.engine_wins,
        percent(results.engine_wins, total)
    );
    println!(
        "Bot wins:    {} ({:.1}%)",
        results.bot_wins,
        percent(results.bot_wins, total)
    );
    println!(
        "Draws:       {} ({:.1}%)",
        results.draws,
        percent(results.draws, total)
    );
    println!("Avg rounds:  {:.1}", results.avg_rounds);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {:?} in {} rounds (health {} vs {})",
            game.game_number, game.outcome, game.rounds, game.engine_health, game.bot_health
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
