use std::fmt::Write;

use backend::{ContestCard, ContestDetail, ProfileOverview, UserEntry};
use chrono::{DateTime, Utc};
use common::{
    ContestStatus, JoinEligibility, RankMovement, RankedParticipant, format_count,
    format_time_remaining,
};
use console::{Color, style};

fn status_color(status: ContestStatus) -> Color {
    match status {
        ContestStatus::Active => Color::Green,
        ContestStatus::Draft => Color::Yellow,
        ContestStatus::Ended => Color::Red,
        ContestStatus::Archived => Color::Color256(8),
    }
}

pub fn status_badge(status: ContestStatus) -> String {
    style(format!("[{}]", status.label()))
        .fg(status_color(status))
        .bold()
        .to_string()
}

fn movement(p: &RankedParticipant) -> String {
    match p.movement() {
        RankMovement::Up(n) => style(format!("▲{n}")).green().to_string(),
        RankMovement::Down(n) => style(format!("▼{n}")).red().to_string(),
        RankMovement::Same => style("–").dim().to_string(),
    }
}

pub fn board(participants: &[RankedParticipant]) -> String {
    if participants.is_empty() {
        return style("  No participants yet").dim().to_string();
    }
    let mut out = String::new();
    for p in participants {
        let _ = writeln!(
            out,
            "  {:>3}. {:<24} {:>8} views  {}",
            p.rank,
            format!("{} (@{})", p.full_name, p.display_handle()),
            format_count(p.views),
            movement(p),
        );
    }
    out.trim_end().to_string()
}

pub fn card(card: &ContestCard) -> String {
    let c = &card.contest;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}  {}",
        status_badge(card.status),
        style(&c.name).bold(),
        style(c.id).dim()
    );
    let _ = write!(out, "  {}", card.time_left);
    if card.prize_per_winner > 0 {
        let _ = write!(out, "  ·  ${} per winner", card.prize_per_winner);
    }
    if let Some(category) = &c.music_category {
        let _ = write!(out, "  ·  {category}");
    }
    let _ = writeln!(out);
    let _ = write!(out, "{}", board(&card.top_participants));
    out
}

pub fn detail(detail: &ContestDetail) -> String {
    let c = &detail.contest;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        status_badge(detail.status),
        style(&c.name).bold()
    );
    if let Some(description) = c.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "{description}");
    }
    match (detail.status, &detail.time_remaining, &detail.starts_in) {
        (ContestStatus::Active, Some(left), _) => {
            let _ = writeln!(out, "Ends in {}", format_time_remaining(left));
        }
        (ContestStatus::Draft, _, Some(until)) => {
            let _ = writeln!(out, "Starts in {}", format_time_remaining(until));
        }
        _ => {}
    }

    let _ = writeln!(out, "\n{}", style("Prizes").underlined());
    for title in c.prize_titles() {
        let _ = writeln!(out, "  #{} {}", title.rank, title.title);
    }
    if c.prize_per_winner() > 0 {
        let _ = writeln!(out, "  ${} per winner", c.prize_per_winner());
    }
    if let Some(hashtags) = c.hashtags.as_ref().filter(|h| !h.is_empty()) {
        let tags: Vec<String> = hashtags
            .iter()
            .map(|h| format!("#{}", h.trim_start_matches('#')))
            .collect();
        let _ = writeln!(out, "\nHashtags: {}", tags.join(" "));
    }

    let _ = writeln!(out, "\n{}", style("Leaderboard").underlined());
    let _ = write!(out, "{}", board(&detail.participants));
    out
}

pub fn eligibility(eligibility: JoinEligibility) -> String {
    let message = eligibility.message();
    match eligibility {
        JoinEligibility::Eligible => style(message).green().to_string(),
        JoinEligibility::Closed => style(message).red().to_string(),
        _ => style(message).yellow().to_string(),
    }
}

pub fn entries(entries: &[UserEntry]) -> String {
    if entries.is_empty() {
        return "No contest entries yet".to_string();
    }
    let mut out = String::new();
    for e in entries {
        let name = e
            .contest
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown Contest");
        let badge = e.status.map(status_badge).unwrap_or_default();
        let _ = writeln!(
            out,
            "{badge} {name}  {}",
            e.link.url.as_deref().unwrap_or("")
        );
    }
    out.trim_end().to_string()
}

pub fn profile(overview: &ProfileOverview, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let name = overview
        .profile
        .as_ref()
        .and_then(|p| p.full_name.as_deref())
        .unwrap_or("Unnamed user");
    let role = match &overview.profile {
        Some(p) if p.is_organizer() => format!(" {}", style("(organizer)").cyan()),
        _ => String::new(),
    };
    let _ = writeln!(out, "{}{role}", style(name).bold());
    match &overview.tiktok {
        Some(t) => {
            let _ = writeln!(
                out,
                "TikTok: @{}",
                t.username.as_deref().unwrap_or("connected")
            );
        }
        None => {
            let _ = writeln!(out, "TikTok: {}", style("not connected").dim());
        }
    }
    let _ = writeln!(out, "\n{}", style("Joined contests").underlined());
    if overview.joined.is_empty() {
        let _ = write!(out, "  none");
    }
    for (contest, status) in &overview.joined {
        let _ = writeln!(
            out,
            "  {} {}  {}",
            status_badge(*status),
            contest.name,
            contest.time_left_label(now)
        );
    }

    let totals = &overview.totals;
    let _ = writeln!(
        out,
        "\n{}  {} submissions · {} views",
        style("My submissions").underlined(),
        totals.count,
        format_count(totals.views)
    );
    if overview.submissions.is_empty() {
        let _ = write!(out, "  No submissions yet");
    }
    for s in &overview.submissions {
        let _ = writeln!(
            out,
            "  {}  {}  {} views · {} likes",
            s.title.as_deref().unwrap_or("Untitled"),
            style(s.contest_name()).dim(),
            format_count(s.views.unwrap_or(0)),
            format_count(s.likes.unwrap_or(0))
        );
    }
    out.trim_end().to_string()
}
