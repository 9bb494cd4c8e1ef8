//! Text styling for scan and analyze output.
//!
//! The renderer asks for a style by what the text means (a legal verdict, an
//! unresolved origin) and never by color. Plain output maps every role to an
//! empty string.

const RESET: &str = "\x1b[0m";
const BOLD_WHITE: &str = "\x1b[1;97m";
const DIM: &str = "\x1b[90m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const ORANGE: &str = "\x1b[38;5;208m";
const CYAN: &str = "\x1b[36m";

/// Escape sequences keyed by the meaning of the styled text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    /// Headings, rare names and system names.
    pub emphasis: &'static str,
    /// Stations, coordinates and other secondary details.
    pub detail: &'static str,
    /// Legal verdicts.
    pub legal: &'static str,
    /// Illegal verdicts.
    pub illegal: &'static str,
    /// Origins the directory could not resolve.
    pub not_found: &'static str,
    /// PowerPlay eligibility and contribution points.
    pub powerplay: &'static str,
    /// Trips long enough to sell at the target.
    pub in_range: &'static str,
    /// Ends any of the above.
    pub reset: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            emphasis: BOLD_WHITE,
            detail: DIM,
            legal: GREEN,
            illegal: RED,
            not_found: ORANGE,
            powerplay: CYAN,
            in_range: GREEN,
            reset: RESET,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            emphasis: "",
            detail: "",
            legal: "",
            illegal: "",
            not_found: "",
            powerplay: "",
            in_range: "",
            reset: "",
        }
    }

    /// Colored unless `NO_COLOR` is set or `TERM` is `dumb`.
    #[must_use]
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some();
        let term = std::env::var("TERM").ok();
        Self::for_terminal(no_color, term.as_deref())
    }

    /// Choose a palette from the `NO_COLOR` flag and the `TERM` value.
    #[must_use]
    pub fn for_terminal(no_color: bool, term: Option<&str>) -> Self {
        let dumb = term.is_some_and(|term| term.eq_ignore_ascii_case("dumb"));
        if no_color || dumb {
            Self::plain()
        } else {
            Self::colored()
        }
    }

    /// Wrap `text` in `style` and a trailing reset.
    pub fn paint(&self, style: &str, text: impl std::fmt::Display) -> String {
        format!("{style}{text}{}", self.reset)
    }
}

/// Credits and divisors with comma thousands separators.
///
/// ```
/// # use rare_router_cli::terminal::format_credits;
/// assert_eq!(format_credits(6500), "6,500");
/// ```
#[must_use]
pub fn format_credits(amount: u64) -> String {
    let digits = amount.to_string();
    let lead = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    out.push_str(&digits[..lead]);
    for group in digits.as_bytes()[lead..].chunks(3) {
        out.push(',');
        out.extend(group.iter().map(|&b| char::from(b)));
    }
    out
}
