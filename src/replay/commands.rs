/// A debugger command typed at a suspension prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Continue,
    Step(i64),
    Next(i64),
    Finish,
    Break {
        line: i64,
        source: String,
        condition: Option<String>,
        one_shot: bool,
    },
    Delete { line: i64, source: String },
    Where,
    Quit,
}

impl Command {
    /// Whether the command resumes execution rather than staying at the prompt.
    pub fn resumes(&self) -> bool {
        matches!(
            self,
            Command::Continue | Command::Step(_) | Command::Next(_) | Command::Finish | Command::Quit
        )
    }
}

/// Parse one prompt line. An empty line steps once.
pub fn parse_command(input: &str) -> Result<Command, String> {
    let words = shlex::split(input).ok_or_else(|| format!("unbalanced quotes: {input}"))?;
    let Some((head, rest)) = words.split_first() else {
        return Ok(Command::Step(1));
    };

    match head.as_str() {
        "c" | "continue" => Ok(Command::Continue),
        "s" | "step" => Ok(Command::Step(parse_count(rest)?)),
        "n" | "next" => Ok(Command::Next(parse_count(rest)?)),
        "f" | "finish" | "o" | "out" => Ok(Command::Finish),
        "b" | "break" => parse_break(rest, false),
        "tb" | "tbreak" => parse_break(rest, true),
        "d" | "delete" => match rest {
            [line, source] => Ok(Command::Delete {
                line: parse_line(line)?,
                source: source.clone(),
            }),
            _ => Err("usage: delete <line> <file>".to_string()),
        },
        "w" | "where" | "bt" => Ok(Command::Where),
        "q" | "quit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_count(rest: &[String]) -> Result<i64, String> {
    match rest {
        [] => Ok(1),
        [count] => count
            .parse()
            .map_err(|_| format!("invalid count: {count}")),
        _ => Err("expected at most one count".to_string()),
    }
}

fn parse_line(text: &str) -> Result<i64, String> {
    text.parse().map_err(|_| format!("invalid line number: {text}"))
}

fn parse_break(rest: &[String], one_shot: bool) -> Result<Command, String> {
    let [line, source, condition @ ..] = rest else {
        return Err("usage: break <line> <file> [condition]".to_string());
    };
    let condition = if condition.is_empty() {
        None
    } else {
        Some(shlex::try_join(condition.iter().map(String::as_str)).map_err(|e| e.to_string())?)
    };
    Ok(Command::Break {
        line: parse_line(line)?,
        source: source.clone(),
        condition,
        one_shot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_steps_once() {
        assert_eq!(parse_command(""), Ok(Command::Step(1)));
        assert_eq!(parse_command("   "), Ok(Command::Step(1)));
    }

    #[test]
    fn counts_default_to_one() {
        assert_eq!(parse_command("n"), Ok(Command::Next(1)));
        assert_eq!(parse_command("step 3"), Ok(Command::Step(3)));
        assert!(parse_command("step x").is_err());
    }

    #[test]
    fn break_keeps_condition_tokens() {
        let Ok(Command::Break {
            line,
            source,
            condition: Some(condition),
            one_shot,
        }) = parse_command("tb 12 'scripts/main file.lua' name == 'a b'")
        else {
            panic!("expected a conditional breakpoint");
        };
        assert_eq!(line, 12);
        assert_eq!(source, "scripts/main file.lua");
        assert!(one_shot);
        assert_eq!(
            shlex::split(&condition),
            Some(vec!["name".to_string(), "==".to_string(), "a b".to_string()])
        );
        assert_eq!(
            parse_command("b 4 main.lua"),
            Ok(Command::Break {
                line: 4,
                source: "main.lua".to_string(),
                condition: None,
                one_shot: false,
            })
        );
    }
}
