//! Analysis Formatter: the prompt sent to the model for a new match and the
//! report posted to chat.

use gameinsight_core::{
  record::{MatchInfo, Outcome},
  stats::{Coverage, MatchStats, StatAverages, WinLossAverages},
};

/// System prompt for single-match coaching feedback.
pub const COACHING_SYSTEM_PROMPT: &str = "\
You are an experienced Rocket League coach writing a short post-match review. \
Your feedback must be specific, grounded in the numbers, and something the player \
can act on in the very next game.

You receive the stats of the match that just finished and, when available, the \
player's averages in recent WINS and in recent LOSSES.

Compare the wins and losses columns to find what separates the player's good games \
from bad ones. For example, 55 average boost in wins against 45 in losses points at \
boost management; 60% defensive third in losses against 50% in wins suggests the \
player sits back too much when things go wrong.

Cover:
1. What worked: where this match looks like the player's wins.
2. What hurt: where this match looks like the player's losses.
3. The adjustment: strategic advice backed by the numbers. Say \"challenge earlier \
on kickoff follow-ups\", not \"spend 22% of the time in the offensive third\".

Guidelines:
- Be encouraging but let the data lead.
- Name the two or three largest win/loss differences.
- Give two clear action items.
- Stay concise, four to six sentences of substance.
- Use Rocket League terminology.
- Let the result of this match shape the tone.

Answer in markdown using these headings:

**Key Strengths:**
**Areas for Improvement:**
**Actionable Tips:**
**Next Game Goal:**";

/// System prompt for answering chat questions with the query tools.
pub const CHAT_SYSTEM_PROMPT: &str = "\
You are a Rocket League coach answering questions in a Discord channel. You can \
look up the player's stored matches with tools.

When analysing:
1. Compare against the player's win/loss patterns (get_win_loss_comparison).
2. Look across scoring, boost, positioning and movement.
3. For questions about a specific game, drill in with get_match_details.
4. End with concrete recommendations.

Keep answers short enough for chat (two to four paragraphs). Chain several tool \
calls when one is not enough. Be direct.

Tools:
- get_latest_match: the most recent match
- get_win_loss_comparison: averages in recent wins vs recent losses
- query_matches: search recent matches by result, goals, saves, date
- get_player_averages: overall recent averages
- get_match_details: everything stored about one match";

/// Build the user prompt for one freshly ingested match.
pub fn build_prompt(stats: &MatchStats, history: &WinLossAverages, info: &MatchInfo) -> String {
  let c = &stats.core;
  let b = &stats.boost;
  let p = &stats.positioning;
  let m = &stats.movement;

  let mut out = String::from("Analyze this Rocket League match.\n\n");
  out.push_str(
    "Context: stats are grouped by gameplay domain. Core is scoring impact. Boost is \
     efficiency and recovery (boost ranges 0 to 100; small pads give 12, large pads \
     refill to 100). Positioning is rotation and field control. Movement is speed and \
     pressure.\n\n",
  );

  out.push_str(&format!(
    "**MATCH INFO:**\n- Playlist: {}\n- Result: {}\n- Duration: {} seconds\n\n",
    info.playlist,
    result_label(info.result),
    info.duration
  ));

  out.push_str(&format!(
    "**THIS MATCH:**\n\
     Core: {}G / {}A / {}S | {} shots ({:.1}%)\n\
     Boost: Avg={:.1}, Zero={:.1}%\n\
     Positioning: Def={:.1}%, Off={:.1}%\n\
     Movement: Speed={:.0}, Supersonic={:.1}s\n",
    c.goals,
    c.assists,
    c.saves,
    c.shots,
    c.shooting_percentage,
    b.avg_boost,
    b.percent_zero_boost,
    p.percent_defensive_third,
    p.percent_offensive_third,
    m.avg_speed,
    m.time_supersonic,
  ));

  out.push_str(&format!(
    "\n**YOUR PATTERNS (last {} wins vs last {} losses):**\n\
     Wins and losses are separate recency windows and may cover different date ranges.\n",
    history.total_wins(),
    history.total_losses()
  ));

  match history.coverage() {
    Coverage::Both => {
      out.push_str(&averages_block("WINS", &history.wins));
      out.push_str(&averages_block("LOSSES", &history.losses));
    }
    Coverage::WinsOnly => out.push_str(&format!(
      "\nOnly win data available ({} wins). Focus on keeping the winning patterns.\n",
      history.total_wins()
    )),
    Coverage::LossesOnly => out.push_str(&format!(
      "\nOnly loss data available ({} losses). Focus on breaking the losing patterns.\n",
      history.total_losses()
    )),
    Coverage::Neither => out.push_str(
      "\n**NOTE:** No historical data yet. Give general feedback based on this match.\n",
    ),
  }

  out.push_str("\nIdentify patterns and provide actionable coaching feedback.");
  out
}

fn averages_block(label: &str, a: &StatAverages) -> String {
  format!(
    "\nIn {label} you average:\n\
     - Goals: {:.2} | Assists: {:.2} | Saves: {:.2}\n\
     - Shooting %: {:.1}%\n\
     - Avg Boost: {:.1} | Zero Boost Time: {:.1}%\n\
     - Defensive Third: {:.1}% | Offensive Third: {:.1}%\n\
     - Avg Speed: {:.0} | Time Supersonic: {:.1}s\n",
    a.goals,
    a.assists,
    a.saves,
    a.shooting_percentage,
    a.avg_boost,
    a.percent_zero_boost,
    a.percent_defensive_third,
    a.percent_offensive_third,
    a.avg_speed,
    a.time_supersonic,
  )
}

fn result_label(o: Outcome) -> String { o.to_string().to_uppercase() }

/// The chat report for one analysed match.
pub fn build_message(feedback: &str, info: &MatchInfo, stats: &MatchStats) -> String {
  let emoji = match info.result {
    Outcome::Win => "🏆",
    Outcome::Loss => "💪",
  };
  let c = &stats.core;

  format!(
    "🎮 **GameInsight Match Report** {emoji}\n\n\
     **Match:** {} | {}\n\
     **Stats:** {}G / {}A / {}S | {} shots ({:.0}%)\n\n\
     **Coach's Analysis:**\n{feedback}\n\n\
     ---\n\
     _Next match starts soon, let's get it!_ 🚀\n",
    info.playlist,
    result_label(info.result),
    c.goals,
    c.assists,
    c.saves,
    c.shots,
    c.shooting_percentage,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn info(result: Outcome) -> MatchInfo {
    MatchInfo { playlist: "Ranked Doubles".into(), result, duration: 305 }
  }

  fn stats() -> MatchStats {
    let mut s = MatchStats::default();
    s.core.goals = 2;
    s.core.assists = 1;
    s.core.saves = 3;
    s.core.shots = 4;
    s.core.shooting_percentage = 50.0;
    s.boost.avg_boost = 47.26;
    s.movement.avg_speed = 1523.6;
    s
  }

  fn history(wins: u32, losses: u32) -> WinLossAverages {
    let mut wl = WinLossAverages::default();
    wl.wins.count = wins;
    wl.wins.goals = 1.75;
    wl.losses.count = losses;
    wl.losses.goals = 0.5;
    wl
  }

  #[test]
  fn prompt_contains_match_line() {
    let p = build_prompt(&stats(), &history(0, 0), &info(Outcome::Win));
    assert!(p.contains("- Playlist: Ranked Doubles"));
    assert!(p.contains("- Result: WIN"));
    assert!(p.contains("- Duration: 305 seconds"));
    assert!(p.contains("Core: 2G / 1A / 3S | 4 shots (50.0%)"));
    assert!(p.contains("Boost: Avg=47.3"));
    assert!(p.contains("Speed=1524"));
  }

  #[test]
  fn prompt_branches_on_coverage() {
    let both = build_prompt(&stats(), &history(4, 2), &info(Outcome::Loss));
    assert!(both.contains("last 4 wins vs last 2 losses"));
    assert!(both.contains("In WINS you average:\n- Goals: 1.75"));
    assert!(both.contains("In LOSSES you average:\n- Goals: 0.50"));

    let wins = build_prompt(&stats(), &history(3, 0), &info(Outcome::Win));
    assert!(wins.contains("Only win data available (3 wins)"));
    assert!(!wins.contains("In WINS"));

    let losses = build_prompt(&stats(), &history(0, 5), &info(Outcome::Loss));
    assert!(losses.contains("Only loss data available (5 losses)"));

    let none = build_prompt(&stats(), &history(0, 0), &info(Outcome::Loss));
    assert!(none.contains("No historical data yet"));
    assert!(none.contains("last 0 wins vs last 0 losses"));
  }

  #[test]
  fn prompt_always_notes_independent_windows() {
    for (w, l) in [(0, 0), (1, 0), (0, 1), (2, 2)] {
      let p = build_prompt(&stats(), &history(w, l), &info(Outcome::Win));
      assert!(p.contains("separate recency windows"), "{w}/{l}");
      assert!(p.ends_with("provide actionable coaching feedback."));
    }
  }

  #[test]
  fn message_layout() {
    let msg = build_message("Rotate faster.", &info(Outcome::Win), &stats());
    assert!(msg.starts_with("🎮 **GameInsight Match Report** 🏆"));
    assert!(msg.contains("**Match:** Ranked Doubles | WIN"));
    assert!(msg.contains("**Stats:** 2G / 1A / 3S | 4 shots (50%)"));
    assert!(msg.contains("**Coach's Analysis:**\nRotate faster."));

    let loss = build_message("x", &info(Outcome::Loss), &stats());
    assert!(loss.contains("💪"));
    assert!(loss.contains("| LOSS"));
  }
}
