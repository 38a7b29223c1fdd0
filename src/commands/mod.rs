/// `snapshot`: write the listing once
pub mod snapshot;
/// `watch`: keep the listing current until interrupted
pub mod watch;

use colored::Colorize;

/// Print a green check mark followed by `message`
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a blue info marker followed by `message`
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
