//! Terminal output settings.

/// Output verbosity options
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    /// Whether to show informational output (skips, status lines)
    pub show_info: bool,
}

/// Decide whether to override `colored`'s TTY detection.
///
/// Flags win over the environment. `NO_COLOR` (any value,
/// <https://no-color.org/>) beats `CLICOLOR_FORCE`, which beats `CLICOLOR=0`
/// (<https://bixense.com/clicolors/>). `None` leaves the decision to the TTY
/// check.
pub fn color_override(
    force_color: bool,
    no_color: bool,
    env: impl Fn(&str) -> Option<String>,
) -> Option<bool> {
    if force_color {
        return Some(true);
    }
    if no_color || env("NO_COLOR").is_some() {
        return Some(false);
    }
    if let Some(force) = env("CLICOLOR_FORCE") {
        return (!force.is_empty() && force != "0").then_some(true);
    }
    (env("CLICOLOR").as_deref() == Some("0")).then_some(false)
}

/// Apply [`color_override`] against the process environment.
pub fn configure_colors(force_color: bool, no_color: bool) {
    let env = |key: &str| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned());
    if let Some(enabled) = color_override(force_color, no_color, env) {
        colored::control::set_override(enabled);
    }
}
