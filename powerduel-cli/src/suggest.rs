//! Suggest command - choose one move for a pair of hands
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_hands(), report_move()
//! - Level 3: hands_from_file(), hands_from_args()
//! - Level 4: parsing and formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;

use powerduel_ai::{EngineConfig, Move, MoveEngine};
use powerduel_core::{Card, Hand, MAX_HEALTH, MAX_POWER};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SuggestArgs {
    /// JSON file holding {"acting": <hand>, "opposing": <hand>}
    #[arg(long, value_name = "FILE", conflicts_with_all = ["acting", "opposing"])]
    pub hands: Option<PathBuf>,

    /// Acting hand cards as value:damage pairs, e.g. 3:2,5:3,7:6,9:8
    #[arg(long, value_name = "CARDS", required_unless_present = "hands")]
    pub acting: Option<String>,

    /// Opposing hand cards as value:damage pairs
    #[arg(long, value_name = "CARDS", required_unless_present = "hands")]
    pub opposing: Option<String>,

    #[arg(long, default_value_t = MAX_HEALTH)]
    pub acting_health: i32,

    #[arg(long, default_value_t = MAX_POWER)]
    pub acting_power: u32,

    #[arg(long, default_value_t = MAX_HEALTH)]
    pub opposing_health: i32,

    #[arg(long, default_value_t = MAX_POWER)]
    pub opposing_power: u32,

    /// Card the opponent already committed this turn, as index:power
    #[arg(long, value_name = "CARD:POWER")]
    pub opposing_selected: Option<String>,

    /// Output the move as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Deserialize)]
struct HandsFile {
    acting: Hand,
    opposing: Hand,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run suggest command
///
/// 1. Build both hands
/// 2. Ask the engine for a move
/// 3. Report it
pub fn run(args: SuggestArgs, config: EngineConfig) -> Result<()> {
    let (acting, opposing) = load_hands(&args)?;

    tracing::info!(
        acting_cards = acting.playable_count(),
        opposing_cards = opposing.playable_count(),
        "Choosing move"
    );

    let mut engine = MoveEngine::new(config).context("Failed to start engine")?;
    let chosen = engine
        .choose_move(&acting, &opposing)
        .context("Engine could not choose a move")?;

    report_move(&acting, chosen, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_hands(args: &SuggestArgs) -> Result<(Hand, Hand)> {
    let (acting, opposing) = match &args.hands {
        Some(path) => hands_from_file(path)?,
        None => hands_from_args(args)?,
    };

    acting.validate().context("Invalid acting hand")?;
    opposing.validate().context("Invalid opposing hand")?;

    Ok((acting, opposing))
}

fn report_move(acting: &Hand, chosen: Move, json: bool) -> Result<()> {
    let card = acting.cards[chosen.card];

    if json {
        #[derive(serde::Serialize)]
        struct JsonMove {
            card: usize,
            power: u32,
            value: u32,
            damage: u32,
        }

        let output = JsonMove {
            card: chosen.card,
            power: chosen.power,
            value: card.value,
            damage: card.damage,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Play card {} (value {}, damage {}) with power {}",
            chosen.card, card.value, card.damage, chosen.power
        );
    }

    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn hands_from_file(path: &Path) -> Result<(Hand, Hand)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read hands file: {}", path.display()))?;
    let file: HandsFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse hands file: {}", path.display()))?;
    Ok((file.acting, file.opposing))
}

fn hands_from_args(args: &SuggestArgs) -> Result<(Hand, Hand)> {
    let (Some(acting), Some(opposing)) = (&args.acting, &args.opposing) else {
        bail!("either --hands or both --acting and --opposing are required");
    };

    let acting = Hand::new(
        args.acting_health,
        args.acting_power,
        parse_cards(acting).context("Invalid --acting")?,
    );
    let mut opposing = Hand::new(
        args.opposing_health,
        args.opposing_power,
        parse_cards(opposing).context("Invalid --opposing")?,
    );

    if let Some(spec) = &args.opposing_selected {
        let (card, power) = parse_selection(spec).context("Invalid --opposing-selected")?;
        if card >= opposing.cards.len() {
            bail!(
                "selected card {} is out of range for {} opposing cards",
                card,
                opposing.cards.len()
            );
        }
        if power > opposing.power {
            bail!(
                "selected power {} exceeds the opposing budget {}",
                power,
                opposing.power
            );
        }
        opposing.commit(card, power);
    }

    Ok((acting, opposing))
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Parse "value:damage,value:damage,..."
fn parse_cards(spec: &str) -> Result<Vec<Card>> {
    let cards = spec
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| -> Result<Card> {
            let (value, damage) = pair
                .split_once(':')
                .with_context(|| format!("expected value:damage, got '{}'", pair))?;
            let value = value
                .trim()
                .parse::<u32>()
                .with_context(|| format!("bad value in '{}'", pair))?;
            let damage = damage
                .trim()
                .parse::<u32>()
                .with_context(|| format!("bad damage in '{}'", pair))?;
            Ok(Card::new(value, damage))
        })
        .collect::<Result<Vec<_>>>()?;

    if cards.is_empty() {
        bail!("no cards given");
    }
    Ok(cards)
}

/// Parse "index:power"
fn parse_selection(spec: &str) -> Result<(usize, u32)> {
    let (card, power) = spec
        .split_once(':')
        .with_context(|| format!("expected index:power, got '{}'", spec))?;
    Ok((card.trim().parse::<usize>()?, power.trim().parse::<u32>()?))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(acting: &str, opposing: &str) -> SuggestArgs {
        SuggestArgs {
            hands: None,
            acting: Some(acting.to_string()),
            opposing: Some(opposing.to_string()),
            acting_health: 12,
            acting_power: 12,
            opposing_health: 10,
            opposing_power: 8,
            opposing_selected: None,
            json: false,
        }
    }

    #[test]
    fn test_parse_cards() {
        let cards = parse_cards("3:2, 5:3,7:6").unwrap();
        assert_eq!(cards, vec![Card::new(3, 2), Card::new(5, 3), Card::new(7, 6)]);
    }

    #[test]
    fn test_parse_cards_rejects_garbage() {
        assert!(parse_cards("3-2").is_err());
        assert!(parse_cards("3:x").is_err());
        assert!(parse_cards(" , ").is_err());
    }

    #[test]
    fn test_hands_from_args() {
        let (acting, opposing) = hands_from_args(&args("3:2,5:3", "4:2,6:5")).unwrap();
        assert_eq!(acting.power, 12);
        assert_eq!(opposing.health, 10);
        assert_eq!(opposing.cards.len(), 2);
        assert!(opposing.selection.is_none());
    }

    #[test]
    fn test_opposing_selection_is_committed() {
        let mut a = args("3:2,5:3", "4:2,6:5");
        a.opposing_selected = Some("1:3".to_string());

        let (_, opposing) = hands_from_args(&a).unwrap();
        assert!(!opposing.cards[1].playable);
        assert_eq!(opposing.power, 5);
        assert!(opposing.validate().is_ok());

        a.opposing_selected = Some("1:9".to_string());
        assert!(hands_from_args(&a).is_err());
        a.opposing_selected = Some("4:0".to_string());
        assert!(hands_from_args(&a).is_err());
    }

    #[test]
    fn test_hands_file_defaults_selection() {
        let json = r#"{
            "acting": {"health": 12, "power": 12, "cards": [{"value": 3, "damage": 2}]},
            "opposing": {"health": 9, "power": 4,
                         "cards": [{"value": 4, "damage": 2, "playable": false}]}
        }"#;
        let file: HandsFile = serde_json::from_str(json).unwrap();
        assert!(file.acting.selection.is_none());
        assert!(file.acting.cards[0].playable);
        assert!(!file.opposing.cards[0].playable);
    }
}
