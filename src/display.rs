use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::cards::{Card, Combo, Suit};
use crate::catalog::grid_hand;
use crate::labels::{action_labels, format_bb};
use crate::scorer::ScoreResult;
use crate::solution::{ActionKind, DecisionNode, SolutionMeta};
use crate::spot::SpotSimulation;
use crate::strategy::{argmax, summarize};

pub fn card_display(card: &Card) -> String {
    let text = card.pretty();
    match card.suit {
        Suit::Spades => text.white().to_string(),
        Suit::Hearts => text.red().to_string(),
        Suit::Diamonds => text.blue().to_string(),
        Suit::Clubs => text.green().to_string(),
    }
}

pub fn combo_display(combo: &Combo) -> String {
    combo
        .cards()
        .iter()
        .map(card_display)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn styled_action(label: &str) -> String {
    let upper = label.to_uppercase();
    if upper.starts_with("ALL-IN") {
        label.red().bold().to_string()
    } else if upper.starts_with("RAISE") {
        label.red().to_string()
    } else if upper == "CALL" {
        label.green().bold().to_string()
    } else if upper == "FOLD" {
        label.dimmed().to_string()
    } else if upper == "CHECK" {
        label.yellow().bold().to_string()
    } else {
        label.bold().to_string()
    }
}

fn seat_name(meta: &SolutionMeta, seat: usize) -> String {
    let n = meta.seat_count();
    if seat + 1 == n {
        "BB".to_string()
    } else if n == 2 || seat + 2 == n {
        "SB".to_string()
    } else {
        format!("Seat {}", seat + 1)
    }
}

/// The table as the hero finds it: who did what, and where the hero sits.
pub fn spot_table(meta: &SolutionMeta, spot: &SpotSimulation) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Seat"),
        Cell::new("Stack").set_alignment(CellAlignment::Right),
        Cell::new("Action"),
    ]);

    for seat in 0..meta.seat_count() {
        let acted = spot.villain_actions.iter().filter(|a| a.seat == seat).last();
        let action = if seat == spot.hero_seat {
            format!("{} {}", "HERO".cyan().bold(), combo_display(&spot.combo))
        } else if let Some(a) = acted {
            styled_action(&a.label)
        } else {
            String::new()
        };
        table.add_row(vec![
            Cell::new(seat_name(meta, seat)),
            Cell::new(format!("{}bb", format_bb(meta.stack_bb(seat)))).set_alignment(CellAlignment::Right),
            Cell::new(action),
        ]);
    }

    format!(
        "  {} {} ({})\n{}",
        meta.name.bold(),
        spot.spot_type.as_str().dimmed(),
        meta.phase.dimmed(),
        table
    )
}

/// Frequencies and EVs of the given hands at a node.
pub fn strategy_table(meta: &SolutionMeta, node: &DecisionNode, hands: &[String]) -> String {
    let labels = action_labels(meta, node);
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("Hand")];
    for label in &labels {
        header.push(Cell::new(styled_action(label)).set_alignment(CellAlignment::Center));
    }
    header.push(Cell::new("Type"));
    table.set_header(header);

    for hand in hands {
        let Some(s) = summarize(node, hand) else {
            continue;
        };
        let mut row = vec![Cell::new(hand.bold().to_string())];
        for (i, freq) in s.frequencies.iter().enumerate() {
            let ev = s
                .evs
                .as_ref()
                .and_then(|e| e.get(i))
                .map(|ev| format!(" ({:+.2})", ev))
                .unwrap_or_default();
            let text = format!("{:.0}%{}", freq * 100.0, ev);
            let text = if s.dominant == Some(i) {
                text.bold().to_string()
            } else {
                text
            };
            row.push(Cell::new(text).set_alignment(CellAlignment::Right));
        }
        row.push(Cell::new(if s.pure { "pure" } else { "mixed" }));
        table.add_row(row);
    }

    table.to_string()
}

/// 13x13 matrix coloured by each hand's most frequent action.
pub fn strategy_grid(node: &DecisionNode, title: &str) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    for row_idx in 0..13 {
        let mut row = Vec::with_capacity(13);
        for col in 0..13 {
            let hand = grid_hand(row_idx * 13 + col);
            let kind = node
                .hand(&hand)
                .filter(|h| h.total_frequency() > 0.0)
                .and_then(|h| argmax(&h.played))
                .and_then(|i| node.actions.get(i))
                .map(|a| a.kind);
            let text = match kind {
                Some(ActionKind::Raise) => hand.red().bold().to_string(),
                Some(ActionKind::Call) => hand.green().bold().to_string(),
                Some(ActionKind::Check) => hand.yellow().to_string(),
                Some(ActionKind::Fold) => hand.blue().to_string(),
                None => hand.dimmed().to_string(),
            };
            row.push(Cell::new(text).set_alignment(CellAlignment::Center));
        }
        table.add_row(row);
    }

    format!("  {}\n{}", title.bold(), table)
}

pub fn score_line(result: &ScoreResult, labels: &[String]) -> String {
    let verdict = if result.is_correct {
        "Correct".green().bold()
    } else {
        "Wrong".red().bold()
    };
    let best = result
        .dominant_index
        .and_then(|i| labels.get(i))
        .map(|l| styled_action(l))
        .unwrap_or_default();
    let ev = result
        .chosen_ev
        .map(|ev| format!("EV {:+.2}bb", ev))
        .unwrap_or_default();
    format!(
        "  {}  played {:.0}% of the time  {}  {} {}",
        verdict,
        result.chosen_frequency * 100.0,
        ev,
        if result.pure { "solver plays" } else { "top action" },
        best
    )
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::{Action, HandData};

    fn node() -> DecisionNode {
        DecisionNode::new(
            0,
            vec![
                Action::new(ActionKind::Fold, 0.0, None),
                Action::new(ActionKind::Raise, 2.0, None),
            ],
        )
        .with_hand("AA", HandData::new(vec![0.0, 1.0], vec![0.0, 2.5]))
        .with_hand("72o", HandData::new(vec![1.0, 0.0], vec![0.0, -0.4]))
    }

    #[test]
    fn strategy_views_list_hands() {
        colored::control::set_override(false);
        let meta: SolutionMeta = serde_json::from_str(
            r#"{"id":"t","settings":{"stacks":[20,20],"blinds":{"big":1,"small":0.5}}}"#,
        )
        .unwrap();
        let table = strategy_table(&meta, &node(), &["AA".to_string(), "KK".to_string()]);
        assert!(table.contains("Raise 2"));
        assert!(table.contains("100% (+2.50)"));
        assert!(!table.contains("KK"));

        let grid = strategy_grid(&node(), "root");
        assert!(grid.contains("AKs"));
        assert!(grid.contains("root"));
    }
}
