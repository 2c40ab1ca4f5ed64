/// Terminal color setup honoring `NO_COLOR` and `CLICOLOR`/`CLICOLOR_FORCE`.
///
/// Output goes to stdout for `discover`/`env` (often captured by `eval`), so
/// colors default to off unless stdout is a terminal.
use colored::control;
use std::io::IsTerminal;

pub fn init_colors() {
    control::set_override(colors_wanted(
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("CLICOLOR_FORCE").ok().as_deref(),
        std::env::var("CLICOLOR").ok().as_deref(),
        std::io::stdout().is_terminal(),
    ));
}

fn colors_wanted(
    no_color: bool,
    clicolor_force: Option<&str>,
    clicolor: Option<&str>,
    is_tty: bool,
) -> bool {
    if no_color {
        return false;
    }
    if clicolor_force.is_some_and(|v| v != "0") {
        return true;
    }
    if clicolor == Some("0") {
        return false;
    }
    is_tty
}
