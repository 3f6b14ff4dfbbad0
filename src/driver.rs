//! Line-oriented analysis driver and batch expectation harness.
//!
//! Interactive mode reads one position per line from stdin: a FEN
//! optionally followed by `white` or `black` naming the intended winner
//! (default: the color that just moved). `quit` terminates, `#` lines are
//! skipped. Batch mode replays an expectation-coded positions file and
//! reports mismatches plus stage/node statistics.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

use colored::Colorize;

use crate::game_state::chess_types::Color;
use crate::game_state::game_state::GameState;
use crate::search::analysis::Analyzer;
use crate::search::search_state::{Search, SearchResult, SearchStage};
use crate::utils::long_algebraic::format_variation;

pub const DEFAULT_NODE_LIMIT: u64 = 500_000;
pub const TEST_NODE_LIMIT: u64 = 10_000_000;
pub const DEFAULT_TESTS_FILE: &str = "data/test-positions.txt";

#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// `-u`: print nothing for winnable verdicts.
    pub suppress_winnable: bool,
    /// `--min`: search for the shortest helpmate.
    pub shortest: bool,
    /// `--quick`: skip the deep iterative-deepening stage.
    pub quick: bool,
    /// `--timeout`: print a game-adjudication verdict.
    pub adjudicate: bool,
    /// `--limit`: global node budget per analyzed position.
    pub limit: Option<u64>,
    pub tests_file: PathBuf,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            suppress_winnable: false,
            shortest: false,
            quick: false,
            adjudicate: false,
            limit: None,
            tests_file: PathBuf::from(DEFAULT_TESTS_FILE),
        }
    }
}

pub fn run_stdio_loop(options: &DriverOptions) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let mut analyzer = Analyzer::new();
    let mut search = Search::new();
    search.set_limit(options.limit.unwrap_or(DEFAULT_NODE_LIMIT));

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed == "quit" {
            break;
        }

        match analyze_line(&mut analyzer, &mut search, trimmed, options) {
            Ok(Some(report)) => {
                writeln!(stdout, "{report}")?;
                stdout.flush()?;
            }
            Ok(None) => {}
            // A bad line does not abort the session.
            Err(err) => eprintln!("error: {err} ({trimmed})"),
        }
    }

    Ok(())
}

/// Split an input line into a position and the intended winner.
pub fn parse_line(line: &str) -> Result<(GameState, Color), String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 6 {
        return Err("expected a six-field FEN".to_owned());
    }
    if tokens.len() > 7 {
        return Err("unexpected trailing input".to_owned());
    }

    let fen = tokens[..6].join(" ");
    let pos = GameState::from_fen(&fen)?;

    let winner = match tokens.get(6) {
        None => pos.side_to_move.opposite(),
        Some(&"white") => Color::White,
        Some(&"black") => Color::Black,
        Some(other) => return Err(format!("unrecognized winner token: {other}")),
    };

    Ok((pos, winner))
}

fn analyze_line(
    analyzer: &mut Analyzer,
    search: &mut Search,
    line: &str,
    options: &DriverOptions,
) -> Result<Option<String>, String> {
    let (pos, winner) = parse_line(line)?;
    search.set_winner(winner);

    let started = Instant::now();
    let result = if options.shortest {
        analyzer.find_shortest(&pos, search)
    } else if options.quick {
        analyzer.quick_analysis(&pos, search)
    } else {
        analyzer.full_analysis(&pos, search)
    }
    .map_err(|e| e.to_string())?;
    let micros = started.elapsed().as_micros();

    if options.adjudicate {
        // Undetermined is conservatively adjudicated as winnable.
        let verdict = match (result, winner) {
            (SearchResult::Unwinnable, _) => "1/2-1/2",
            (_, Color::White) => "1-0",
            (_, Color::Black) => "0-1",
        };
        return Ok(Some(format!("{verdict} ({line})")));
    }

    if result == SearchResult::Winnable && options.suppress_winnable {
        return Ok(None);
    }

    Ok(Some(format!(
        "{} nodes {} time {} ({line})",
        render_verdict(result, search)?,
        search.nb_nodes(),
        micros
    )))
}

fn render_verdict(result: SearchResult, search: &Search) -> Result<String, String> {
    match result {
        SearchResult::Winnable => {
            let pv = search.principal_variation();
            if pv.is_empty() {
                Ok("winnable#".to_owned())
            } else {
                Ok(format!("winnable {}#", format_variation(pv)?))
            }
        }
        SearchResult::Unwinnable => Ok("unwinnable".to_owned()),
        SearchResult::Undetermined => Ok("undetermined".to_owned()),
    }
}

#[derive(Default)]
struct HarnessStats {
    total_positions: u64,
    total_solved: u64,
    total_nodes: u64,
    max_nodes: u64,
    pre_static: u64,
    static_: u64,
}

/// Batch mode: every line holds a two-character expectation code followed
/// by a FEN. `WB` means both players can still helpmate, `W-` only White,
/// `-B` only Black, `--` a dead draw. Both colors are analyzed.
pub fn run_test_harness(options: &DriverOptions) -> io::Result<()> {
    let file = File::open(&options.tests_file)?;
    let reader = BufReader::new(file);

    let mut analyzer = Analyzer::new();
    let mut search = Search::new();
    search.set_limit(options.limit.unwrap_or(TEST_NODE_LIMIT));

    let mut stats = HarnessStats::default();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((expectation, fen)) = trimmed.split_once(char::is_whitespace) else {
            eprintln!("error: malformed test line ({trimmed})");
            continue;
        };
        let expectation: Vec<char> = expectation.chars().collect();
        if expectation.len() != 2 {
            eprintln!("error: malformed expectation code ({trimmed})");
            continue;
        }

        for (winner, expected_winnable) in [
            (Color::White, expectation[0] == 'W'),
            (Color::Black, expectation[1] == 'B'),
        ] {
            if let Err(err) = run_test_case(
                &mut analyzer,
                &mut search,
                fen.trim(),
                winner,
                expected_winnable,
                options,
                &mut stats,
            ) {
                eprintln!("error: {err} ({trimmed})");
            }
        }
    }

    print_harness_summary(&stats);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_test_case(
    analyzer: &mut Analyzer,
    search: &mut Search,
    fen: &str,
    winner: Color,
    expected_winnable: bool,
    options: &DriverOptions,
    stats: &mut HarnessStats,
) -> Result<(), String> {
    let pos = GameState::from_fen(fen)?;
    search.set_winner(winner);

    let result = if options.quick {
        analyzer.quick_analysis(&pos, search)
    } else {
        analyzer.full_analysis(&pos, search)
    }
    .map_err(|e| e.to_string())?;

    let winner_str = match winner {
        Color::White => "white",
        Color::Black => "black",
    };

    stats.total_positions += 1;

    if result == SearchResult::Undetermined {
        println!(
            "undetermined nodes {} ({fen} {winner_str})",
            search.nb_nodes()
        );
        return Ok(());
    }

    let mismatch = (result == SearchResult::Unwinnable && expected_winnable)
        || (result == SearchResult::Winnable && !expected_winnable);
    if mismatch {
        println!(
            "{} {} nodes {} ({fen} {winner_str})",
            "Test failed!".red().bold(),
            render_verdict(result, search)?,
            search.nb_nodes()
        );
    }

    let nodes = search.nb_nodes();
    stats.total_solved += 1;
    stats.total_nodes += nodes;
    stats.max_nodes = stats.max_nodes.max(nodes);
    match search.stage() {
        SearchStage::PreStatic => stats.pre_static += 1,
        SearchStage::Static => stats.static_ += 1,
        SearchStage::PostStatic => {}
    }

    Ok(())
}

fn print_harness_summary(stats: &HarnessStats) {
    let post_static = stats
        .total_solved
        .saturating_sub(stats.pre_static + stats.static_);

    println!("\n{}", "POSITIONS COUNT:".bold());
    println!(
        "     solved: {}/{}",
        stats.total_solved, stats.total_positions
    );
    println!(
        "   unsolved: {}",
        stats.total_positions - stats.total_solved
    );
    println!(" pre-static: {}", stats.pre_static);
    println!("     static: {}", stats.static_);
    println!("post-static: {}", post_static);

    println!("\n{}", "NODES COUNT:".bold());
    println!("total nodes: {}", stats.total_nodes);
    if stats.total_positions > 0 {
        println!("nodes (avg): {}", stats.total_nodes / stats.total_positions);
    }
    println!("nodes (max): {}", stats.max_nodes);
}

#[cfg(test)]
mod tests {
    use super::parse_line;
    use crate::game_state::chess_types::Color;

    #[test]
    fn winner_token_is_optional_and_defaults_to_the_mover_before() {
        let (pos, winner) =
            parse_line("4k3/R7/4K3/8/8/8/8/8 w - - 0 1").expect("line should parse");
        assert_eq!(pos.side_to_move, Color::White);
        assert_eq!(winner, Color::Black);

        let (_, winner) =
            parse_line("4k3/R7/4K3/8/8/8/8/8 w - - 0 1 white").expect("line should parse");
        assert_eq!(winner, Color::White);

        let (_, winner) =
            parse_line("4k3/R7/4K3/8/8/8/8/8 w - - 0 1 black").expect("line should parse");
        assert_eq!(winner, Color::Black);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse_line("not a fen").is_err());
        assert!(parse_line("4k3/R7/4K3/8/8/8/8/8 w - - 0 1 purple").is_err());
        assert!(parse_line("4k3/R7/4K3/8/8/8/8/8 w - - 0 1 white extra").is_err());
    }
}
