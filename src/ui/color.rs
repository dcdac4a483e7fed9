//! Color and formatting utilities for terminal output

use crate::core::types::Rating;

pub struct Colors;

impl Colors {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const DIM: &'static str = "\x1b[2m";

    pub const RED: &'static str = "\x1b[31m";
    pub const GREEN: &'static str = "\x1b[32m";
    pub const YELLOW: &'static str = "\x1b[33m";
    pub const BLUE: &'static str = "\x1b[34m";
    pub const CYAN: &'static str = "\x1b[36m";

    pub const BRIGHT_BLACK: &'static str = "\x1b[90m";
    pub const BRIGHT_RED: &'static str = "\x1b[91m";
    pub const BRIGHT_GREEN: &'static str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &'static str = "\x1b[93m";
}

/// Apply color to text if terminal supports it
pub fn colorize(text: &str, color: &str) -> String {
    if supports_formatting() {
        format!("{}{}{}", color, text, Colors::RESET)
    } else {
        text.to_string()
    }
}

/// Color of a carbon rating, from bright green (A) to red (F)
pub fn rating_color(rating: Rating) -> &'static str {
    match rating {
        Rating::A => Colors::BRIGHT_GREEN,
        Rating::B => Colors::GREEN,
        Rating::C => Colors::BRIGHT_YELLOW,
        Rating::D => Colors::YELLOW,
        Rating::E => Colors::BRIGHT_RED,
        Rating::F => Colors::RED,
    }
}

/// Green for significant results, dim otherwise
pub fn significance_color(significant: bool) -> &'static str {
    if significant {
        Colors::GREEN
    } else {
        Colors::BRIGHT_BLACK
    }
}

/// Terminal capability detection
pub fn supports_formatting() -> bool {
    use std::io::IsTerminal;

    let under_test = cfg!(test) || std::env::var("RUST_TEST_TIME_UNIT").is_ok();
    formatting_enabled(
        |name| std::env::var(name).ok(),
        under_test,
        std::io::stdout().is_terminal(),
    )
}

/// Decide on formatting from environment lookups and the terminal state
fn formatting_enabled(
    var: impl Fn(&str) -> Option<String>,
    under_test: bool,
    is_terminal: bool,
) -> bool {
    // Check if colors are explicitly disabled
    if var("NO_COLOR").is_some() || var("FORCE_COLOR").as_deref() == Some("0") {
        return false;
    }

    // Force enable if explicitly requested
    if var("FORCE_COLOR").is_some() {
        return true;
    }

    // Disable formatting when running tests
    if under_test {
        return false;
    }

    // Check if output is being redirected
    if !is_terminal {
        return false;
    }

    if let Some(term) = var("TERM") {
        if term == "dumb" || term.is_empty() {
            return false;
        }

        if term.contains("color")
            || term.contains("256")
            || term.starts_with("xterm")
            || term.starts_with("screen")
            || term.starts_with("tmux")
            || term == "linux"
        {
            return true;
        }
    }

    if let Some(term_program) = var("TERM_PROGRAM") {
        match term_program.as_str() {
            "Apple_Terminal" | "iTerm.app" | "vscode" | "Hyper" | "Alacritty" | "kitty"
            | "WezTerm" => return true,
            _ => {}
        }
    }

    // Default: assume no support if we can't detect
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize_disabled_under_test() {
        // cfg!(test) always disables formatting
        assert!(!supports_formatting());
        assert_eq!(colorize("test", Colors::RED), "test");
        assert_eq!(colorize("", Colors::BOLD), "");
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_formatting_enabled_no_color_wins() {
        assert!(!formatting_enabled(
            env(&[("NO_COLOR", "1"), ("FORCE_COLOR", "1"), ("TERM", "xterm")]),
            false,
            true
        ));
        assert!(!formatting_enabled(env(&[("FORCE_COLOR", "0")]), false, true));
    }

    #[test]
    fn test_formatting_enabled_force_color() {
        assert!(formatting_enabled(env(&[("FORCE_COLOR", "1")]), true, false));
    }

    #[test]
    fn test_formatting_enabled_terminal_detection() {
        let xterm = [("TERM", "xterm-256color")];
        assert!(formatting_enabled(env(&xterm), false, true));
        // Redirected output or a test run
        assert!(!formatting_enabled(env(&xterm), false, false));
        assert!(!formatting_enabled(env(&xterm), true, true));

        assert!(!formatting_enabled(env(&[("TERM", "dumb")]), false, true));
        assert!(formatting_enabled(env(&[("TERM_PROGRAM", "vscode")]), false, true));
        assert!(!formatting_enabled(env(&[]), false, true));
    }

    #[test]
    fn test_rating_colors_are_distinct() {
        let colors: Vec<&str> = Rating::ALL.iter().map(|&r| rating_color(r)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(rating_color(Rating::A), Colors::BRIGHT_GREEN);
        assert_eq!(rating_color(Rating::F), Colors::RED);
    }

    #[test]
    fn test_significance_color() {
        assert_eq!(significance_color(true), Colors::GREEN);
        assert_eq!(significance_color(false), Colors::BRIGHT_BLACK);
    }

    #[test]
    fn test_color_constants_are_ansi() {
        for color in [
            Colors::RESET,
            Colors::BOLD,
            Colors::DIM,
            Colors::RED,
            Colors::GREEN,
            Colors::YELLOW,
            Colors::BLUE,
            Colors::CYAN,
            Colors::BRIGHT_BLACK,
            Colors::BRIGHT_RED,
            Colors::BRIGHT_GREEN,
            Colors::BRIGHT_YELLOW,
        ] {
            assert!(color.starts_with("\x1b["));
            assert!(color.ends_with('m'));
        }
    }
}
