/// What a line typed at the prompt asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum UserInput<'a> {
    Quit,
    Empty,
    Message(&'a str),
}

pub fn parse_input(line: &str) -> UserInput<'_> {
    let text = line.trim();
    if text.is_empty() {
        UserInput::Empty
    } else if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
        UserInput::Quit
    } else {
        UserInput::Message(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_commands_ignore_case() {
        assert_eq!(parse_input("exit"), UserInput::Quit);
        assert_eq!(parse_input("QUIT"), UserInput::Quit);
        assert_eq!(parse_input("  Exit \r"), UserInput::Quit);
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(parse_input(""), UserInput::Empty);
        assert_eq!(parse_input(" \t "), UserInput::Empty);
    }

    #[test]
    fn anything_else_is_a_message() {
        assert_eq!(parse_input(" hello there \n"), UserInput::Message("hello there"));
        assert_eq!(parse_input("exit now"), UserInput::Message("exit now"));
    }
}
