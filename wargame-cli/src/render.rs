//! Text and JSON presentation of boards, moves and search diagnostics

use anyhow::Result;
use serde::Serialize;

use wargame_core::{Action, Coord, GameState};
use wargame_search::{Decision, GameOutcome, TurnRecord};

// ============================================================================
// BOARD
// ============================================================================

/// Grid with row letters and column digits, e.g. `A: dA9 dT9 dF9  .   .`
pub fn board(state: &GameState) -> String {
    let dim = state.dim();
    let mut lines = vec![
        format!("Next player: {}", state.next_player()),
        format!(
            "Turns played: {}/{}",
            state.turns_played(),
            state.rules().max_turns
        ),
        String::new(),
    ];

    let header: String = (0..dim)
        .map(|col| format!(" {:^3}", label(Coord::new(0, col as i8), 1)))
        .collect();
    lines.push(format!("   {header}"));

    for row in 0..dim {
        let cells: String = (0..dim)
            .map(|col| match state.get(Coord::new(row as i8, col as i8)) {
                Some(unit) => format!(" {:<3}", unit.to_string()),
                None => "  . ".to_string(),
            })
            .collect();
        lines.push(format!("{}: {cells}", label(Coord::new(row as i8, 0), 0)));
    }
    lines.join("\n")
}

/// One character of a coordinate's text form
fn label(coord: Coord, index: usize) -> char {
    coord.to_string().chars().nth(index).unwrap_or('?')
}

// ============================================================================
// MOVES AND OUTCOMES
// ============================================================================

pub fn action_name(action: &Action) -> &'static str {
    match action {
        Action::OrdinaryMove => "move",
        Action::Attack => "attack",
        Action::Repair => "repair",
        Action::SelfDestruct => "self-destruct",
        Action::Rejected(_) => "rejected",
    }
}

/// `Turn 3: Attacker C4 B4 (attack), score 12.5, 0.42s`
pub fn turn_line(record: &TurnRecord) -> String {
    let mut line = format!(
        "Turn {}: {} {} ({})",
        record.turn,
        record.player,
        record.mv,
        action_name(&record.action)
    );
    if let Some(score) = record.score {
        line.push_str(&format!(", score {score:.1}"));
    }
    line.push_str(&format!(", {:.2}s", record.elapsed.as_secs_f64()));
    line
}

pub fn outcome_text(outcome: &GameOutcome) -> String {
    let mut lines = vec![
        "\n=== Game Over ===".to_string(),
        format!("Winner:       {}", outcome.winner),
        format!("Turns played: {}", outcome.turns_played),
    ];
    if let Some(forfeit) = outcome.forfeit {
        lines.push(format!("{} {}", forfeit.player, forfeit.reason));
    }
    lines.join("\n")
}

pub fn outcome_json(outcome: &GameOutcome) -> Result<String> {
    #[derive(Serialize)]
    struct JsonMove {
        turn: u32,
        player: String,
        mv: String,
        action: &'static str,
        score: Option<f64>,
        elapsed_ms: u64,
    }

    #[derive(Serialize)]
    struct JsonOutcome {
        winner: String,
        turns_played: u32,
        forfeit: Option<String>,
        forfeit_reason: Option<String>,
        moves: Vec<JsonMove>,
    }

    let output = JsonOutcome {
        winner: outcome.winner.to_string(),
        turns_played: outcome.turns_played,
        forfeit: outcome.forfeit.map(|f| f.player.to_string()),
        forfeit_reason: outcome.forfeit.map(|f| f.reason.to_string()),
        moves: outcome
            .history
            .iter()
            .map(|r| JsonMove {
                turn: r.turn,
                player: r.player.to_string(),
                mv: r.mv.to_string(),
                action: action_name(&r.action),
                score: r.score,
                elapsed_ms: r.elapsed.as_millis() as u64,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

pub fn diagnostics_text(decision: &Decision) -> String {
    let diag = &decision.diagnostics;
    let depths: Vec<String> = diag
        .build
        .sorted_depths()
        .iter()
        .map(|(depth, count)| {
            let marker = if count.complete { "" } else { "+" };
            format!("{depth}={}{marker}", count.nodes)
        })
        .collect();
    let evals: Vec<String> = diag
        .cumulative
        .sorted()
        .iter()
        .map(|(depth, count)| format!("{depth}={count}"))
        .collect();

    [
        format!("Move:             {} ({})", decision.mv, diag.player),
        format!(
            "Heuristic score:  {:.1} ({}, {:?})",
            decision.score, diag.heuristic, diag.algorithm
        ),
        format!(
            "Elapsed:          {:.2}s (build {:.2}s, search {:.2}s)",
            diag.elapsed.as_secs_f64(),
            diag.build_time.as_secs_f64(),
            diag.algorithm_time.as_secs_f64()
        ),
        format!("Time ratio:       {:.2}", diag.time_ratio),
        format!(
            "Tree:             {} nodes, branching factor {:.1}, {:?}",
            diag.tree_size, diag.branching_factor, diag.build.status
        ),
        format!("Depth counts:     {}", depths.join(" ")),
        format!("Evals this turn:  {}", diag.evaluations.total),
        format!("Cumulative evals: {}", diag.cumulative.total),
        format!("Evals per depth:  {}", evals.join(" ")),
        format!("Eval perf.:       {:.1}k/s", diag.eval_rate / 1000.0),
    ]
    .join("\n")
}

pub fn diagnostics_json(decision: &Decision) -> Result<String> {
    #[derive(Serialize)]
    struct JsonDepth {
        depth: u32,
        nodes: usize,
        complete: bool,
    }

    #[derive(Serialize)]
    struct JsonDiagnostics {
        mv: String,
        player: String,
        score: f64,
        heuristic: String,
        tree_size: usize,
        branching_factor: f64,
        deadline_reached: bool,
        depths: Vec<JsonDepth>,
        evaluations: u64,
        evaluations_per_depth: Vec<(u32, u64)>,
        time_ratio: f64,
        elapsed_ms: u64,
    }

    let diag = &decision.diagnostics;
    let output = JsonDiagnostics {
        mv: decision.mv.to_string(),
        player: diag.player.to_string(),
        score: decision.score,
        heuristic: diag.heuristic.to_string(),
        tree_size: diag.tree_size,
        branching_factor: diag.branching_factor,
        deadline_reached: diag.build.status == wargame_search::BuildStatus::DeadlineReached,
        depths: diag
            .build
            .sorted_depths()
            .into_iter()
            .map(|(depth, count)| JsonDepth {
                depth,
                nodes: count.nodes,
                complete: count.complete,
            })
            .collect(),
        evaluations: diag.evaluations.total,
        evaluations_per_depth: diag.evaluations.sorted(),
        time_ratio: diag.time_ratio,
        elapsed_ms: diag.elapsed.as_millis() as u64,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}
