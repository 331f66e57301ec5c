//! Command line tokenization

/// A tokenized command line. Index 0 is the command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArgs {
    args: Vec<String>,
    raw: String,
}

impl CommandArgs {
    /// Tokenize a command line.
    ///
    /// Tokens are whitespace-separated; double quotes group a token and
    /// are stripped; `//` starts a comment that runs to end of line.
    pub fn tokenize(line: &str) -> Self {
        let mut args = Vec::new();
        let mut chars = line.chars().peekable();

        loop {
            // skip whitespace
            while chars.next_if(|c| c.is_whitespace()).is_some() {}

            match chars.peek() {
                None => break,
                Some('/') => {
                    let mut ahead = chars.clone();
                    ahead.next();
                    if ahead.peek() == Some(&'/') {
                        break; // comment
                    }
                }
                Some('"') => {
                    chars.next();
                    let mut token = String::new();
                    for c in chars.by_ref() {
                        if c == '"' {
                            break;
                        }
                        token.push(c);
                    }
                    args.push(token);
                    continue;
                }
                _ => {}
            }

            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            args.push(token);
        }

        Self {
            args,
            raw: line.to_string(),
        }
    }

    /// Number of arguments, including the command name.
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    /// Argument by index (0 = command name). Empty string out of range.
    pub fn argv(&self, index: usize) -> &str {
        self.args.get(index).map(|s| s.as_str()).unwrap_or("")
    }

    /// The command name.
    pub fn name(&self) -> &str {
        self.argv(0)
    }

    /// All arguments after the command name, joined by spaces.
    pub fn args(&self) -> String {
        if self.args.len() > 1 {
            self.args[1..].join(" ")
        } else {
            String::new()
        }
    }

    /// The untokenized command line.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokenize() {
        let args = CommandArgs::tokenize("set rate 8000");
        assert_eq!(args.argc(), 3);
        assert_eq!(args.name(), "set");
        assert_eq!(args.argv(1), "rate");
        assert_eq!(args.argv(2), "8000");
        assert_eq!(args.argv(99), "");
    }

    #[test]
    fn test_quoted_token() {
        let args = CommandArgs::tokenize("set skin \"male/grunt\"");
        assert_eq!(args.argc(), 3);
        assert_eq!(args.argv(2), "male/grunt");

        let args = CommandArgs::tokenize("set name \"two words\"");
        assert_eq!(args.argv(2), "two words");
    }

    #[test]
    fn test_empty_quoted_token() {
        let args = CommandArgs::tokenize("set game \"\"");
        assert_eq!(args.argc(), 3);
        assert_eq!(args.argv(2), "");
    }

    #[test]
    fn test_comment_terminates_line() {
        let args = CommandArgs::tokenize("set rate 8000 // network rate");
        assert_eq!(args.argc(), 3);

        let args = CommandArgs::tokenize("// generated by q2rust, do not modify");
        assert!(args.is_empty());
    }

    #[test]
    fn test_args_join() {
        let args = CommandArgs::tokenize("say hello there");
        assert_eq!(args.args(), "hello there");
        let args = CommandArgs::tokenize("say");
        assert_eq!(args.args(), "");
    }
}
