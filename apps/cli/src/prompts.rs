//! Blocking stdin prompts.
//!
//! All interactivity lives here; the answer-parsing helpers are pure so the
//! business logic downstream only ever sees resolved values.

use std::io::{self, Write};

use gamelink_steam::users::LocalUser;

/// Prints a question and reads one trimmed line from stdin.
pub fn prompt(question: &str) -> io::Result<String> {
    print!("{question}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Asks a yes/no question; an empty answer takes the default.
pub fn confirm(question: &str, default_yes: bool) -> bool {
    let suffix = if default_yes { " [Y]/n " } else { " y/[N] " };
    match prompt(&format!("{question}{suffix}")) {
        Ok(answer) => parse_yes_no(&answer, default_yes),
        Err(_) => default_yes,
    }
}

/// Offers the locally logged-in accounts as a numbered pick-list.
///
/// Returns `None` when there are no local users or the user chooses manual
/// entry.
pub fn choose_local_user(users: &[LocalUser]) -> Option<LocalUser> {
    if users.is_empty() {
        return None;
    }

    loop {
        println!("\nFound local Steam accounts:");
        for (i, u) in users.iter().enumerate() {
            println!("{}) {} ({})", i + 1, u.account_name, u.id);
        }
        println!("X) Enter an account manually...");

        let answer = prompt("Choice: ").ok()?;
        match parse_choice(&answer, users.len()) {
            Choice::Index(i) => return Some(users[i].clone()),
            Choice::Manual => return None,
            Choice::Invalid => println!("Invalid input: {answer}"),
        }
    }
}

/// Parsed pick-list answer.
#[derive(Debug, PartialEq, Eq)]
pub enum Choice {
    Index(usize),
    Manual,
    Invalid,
}

/// Interprets a pick-list answer: a 1-based index or `x` for manual entry.
pub fn parse_choice(input: &str, len: usize) -> Choice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("x") {
        return Choice::Manual;
    }
    match input.parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Choice::Index(n - 1),
        _ => Choice::Invalid,
    }
}

/// Interprets a yes/no answer; anything unrecognized takes the default.
pub fn parse_yes_no(input: &str, default_yes: bool) -> bool {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default_yes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_explicit_answers() {
        assert!(parse_yes_no("y", false));
        assert!(parse_yes_no("YES", false));
        assert!(!parse_yes_no("n", true));
        assert!(!parse_yes_no("No", true));
    }

    #[test]
    fn yes_no_default_on_empty_or_garbage() {
        assert!(parse_yes_no("", true));
        assert!(!parse_yes_no("", false));
        assert!(parse_yes_no("maybe", true));
        assert!(!parse_yes_no("maybe", false));
    }

    #[test]
    fn choice_index_bounds() {
        assert_eq!(parse_choice("1", 3), Choice::Index(0));
        assert_eq!(parse_choice("3", 3), Choice::Index(2));
        assert_eq!(parse_choice("0", 3), Choice::Invalid);
        assert_eq!(parse_choice("4", 3), Choice::Invalid);
    }

    #[test]
    fn choice_manual_entry() {
        assert_eq!(parse_choice("x", 3), Choice::Manual);
        assert_eq!(parse_choice("X", 3), Choice::Manual);
    }

    #[test]
    fn choice_garbage_is_invalid() {
        assert_eq!(parse_choice("abc", 3), Choice::Invalid);
        assert_eq!(parse_choice("", 3), Choice::Invalid);
    }
}
