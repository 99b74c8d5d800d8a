//! Line-oriented prompts over any reader and writer

use std::io::{self, BufRead, Write};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Ask for one line. Empty input yields the default; `None` at end of input.
    pub fn prompt(&mut self, message: &str, default: Option<&str>) -> io::Result<Option<String>> {
        match default {
            Some(d) if !d.is_empty() => write!(self.output, ">>> {} [{}]: ", message, d)?,
            _ => write!(self.output, ">>> {}: ", message)?,
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let answer = line.trim();
        if answer.is_empty() {
            Ok(Some(default.unwrap_or("").to_string()))
        } else {
            Ok(Some(answer.to_string()))
        }
    }

    /// Yes/no question, repeated until answered
    pub fn confirm(&mut self, question: &str, default_yes: bool) -> io::Result<Option<bool>> {
        let options = if default_yes { "(Y/n)" } else { "(y/N)" };
        loop {
            let Some(answer) = self.prompt(&format!("{} {}", question, options), None)? else {
                return Ok(None);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(Some(default_yes)),
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => self.say("Please answer 'y' or 'n'.")?,
            }
        }
    }

    /// Numbered menu; returns the 1-based choice, or 0 for the quit entry
    pub fn select(
        &mut self,
        title: &str,
        options: &[&str],
        quit_label: &str,
    ) -> io::Result<Option<usize>> {
        writeln!(self.output)?;
        writeln!(self.output, "=== {} ===", title)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option)?;
        }
        writeln!(self.output, "  0) {}", quit_label)?;

        loop {
            let Some(answer) = self.prompt("Choose", None)? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(choice) if choice <= options.len() => return Ok(Some(choice)),
                _ => self.say(&format!("Enter a number between 0 and {}.", options.len()))?,
            }
        }
    }
}

/// Split "vi, en" or "vi en" into language codes
pub fn parse_language_list(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_prompt_default_and_eof() {
        let mut p = prompter("\n  value  \n");
        assert_eq!(p.prompt("Folder", Some("downloads")).unwrap().as_deref(), Some("downloads"));
        assert_eq!(p.prompt("Folder", None).unwrap().as_deref(), Some("value"));
        assert_eq!(p.prompt("Folder", None).unwrap(), None);

        let (_, out) = p.into_inner();
        assert!(String::from_utf8(out).unwrap().starts_with(">>> Folder [downloads]: "));
    }

    #[test]
    fn test_confirm_repeats_on_bad_input() {
        let mut p = prompter("maybe\nY\n\n");
        assert_eq!(p.confirm("Overwrite?", false).unwrap(), Some(true));
        assert_eq!(p.confirm("Overwrite?", false).unwrap(), Some(false));
    }

    #[test]
    fn test_select_validates_range() {
        let mut p = prompter("7\nx\n2\n");
        assert_eq!(p.select("Menu", &["a", "b"], "Quit").unwrap(), Some(2));
    }

    #[test]
    fn test_parse_language_list() {
        assert_eq!(parse_language_list(" vi, en  ja,,"), vec!["vi", "en", "ja"]);
        assert!(parse_language_list("  ").is_empty());
    }
}
