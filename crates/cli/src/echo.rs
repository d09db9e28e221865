use std::time::Duration;

use glean_core::MatchResult;
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Glean".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Find the content blocks of a page that mention your keywords\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled value
pub fn print_field(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print timing information with color coding
pub fn print_timing(label: &str, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    if ms < 50.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "fast".dimmed());
    } else if ms < 100.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow());
    } else {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "slow".bright_red());
    }
}

/// Print a summary of the matched blocks
pub fn print_match_summary(result: &MatchResult) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Match Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_field("Blocks", &result.matched_blocks().to_string());
    print_field("Keyword hits", &result.total_keywords().to_string());

    match result {
        MatchResult::Best(best) => {
            if let Some(heading) = &best.heading {
                print_field("Heading", heading);
            }
            if let Some(url) = &best.article_url {
                print_field("URL", url);
            }
        }
        MatchResult::All(all) => {
            for (i, block) in all.matches.iter().enumerate() {
                let heading = block.heading.as_deref().unwrap_or("(no heading)");
                eprintln!(
                    "  {} {} {}",
                    format!("{:>3}.", i + 1).dimmed(),
                    heading.bright_white(),
                    format!("[{}]", block.total_count()).dimmed()
                );
            }
        }
    }
    eprintln!();
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
