//! Linguistic annotation seam.
//!
//! The pipeline never looks inside a tagger: it hands over normalized text and
//! receives an ordered sequence of [`Token`]s. Two implementations ship with
//! the crate, the built-in [`LexiconAnnotator`](crate::LexiconAnnotator) and
//! [`CommandAnnotator`], which delegates to any external process speaking a
//! small JSON protocol.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;

/// A surface form with the grammatical category assigned by the annotator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    #[serde(alias = "pos_", alias = "tag")]
    pub pos: String,
}

impl Token {
    pub fn new(text: impl Into<String>, pos: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            pos: pos.into(),
        }
    }

    /// True when the surface form is non-empty and made only of letters.
    pub fn is_alphabetic(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_alphabetic)
    }
}

/// Produces tokens for one normalized document.
///
/// Implementations are built once and shared by reference across documents
/// (and across worker threads with `--parallel`).
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<Vec<Token>, AnnotationError>;
}

/// Drops numeric, symbolic and empty tokens, keeping input order.
pub fn alphabetic_tokens(tokens: Vec<Token>) -> Vec<Token> {
    tokens.into_iter().filter(Token::is_alphabetic).collect()
}

/// Runs an external tagger per document.
///
/// The normalized text is written to the child's stdin; the child must print
/// a JSON array of `{"text": ..., "pos": ...}` objects on stdout and exit with
/// status 0.
#[derive(Debug, Clone)]
pub struct CommandAnnotator {
    program: String,
    args: Vec<String>,
}

impl CommandAnnotator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandAnnotator {
            program: program.into(),
            args,
        }
    }

    /// Splits a command line on whitespace: first word is the program.
    pub fn from_command_line(line: &str) -> Result<Self, AnnotationError> {
        let mut parts = line.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or_else(|| AnnotationError::Unavailable("empty annotator command".to_string()))?;
        Ok(CommandAnnotator::new(program, parts.collect()))
    }
}

impl Annotator for CommandAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<Token>, AnnotationError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AnnotationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // stdin is fed from its own thread while stdout is drained below.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = text.to_owned();
            thread::spawn(move || match stdin.write_all(input.as_bytes()) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            })
        });

        let output = child
            .wait_with_output()
            .map_err(|source| AnnotationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(handle) = writer {
            if let Ok(Err(e)) = handle.join() {
                debug!("annotator stdin write failed: {e}");
            }
        }

        if !output.status.success() {
            return Err(AnnotationError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let tokens: Vec<Token> = serde_json::from_slice(&output.stdout)?;
        debug!("{} returned {} tokens", self.program, tokens.len());
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabetic_filter_keeps_order() {
        let tokens = vec![
            Token::new("le", "DET"),
            Token::new("2024", "NUM"),
            Token::new("", "X"),
            Token::new("«", "PUNCT"),
            Token::new("l’", "DET"),
            Token::new("été", "NOUN"),
        ];
        let kept = alphabetic_tokens(tokens);
        let texts: Vec<&str> = kept.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["le", "été"]);
    }

    #[test]
    fn token_json_accepts_spacy_style_keys() {
        let json = r#"[{"text": "chat", "pos_": "NOUN"}, {"text": "dort", "tag": "VERB"}]"#;
        let tokens: Vec<Token> = serde_json::from_str(json).unwrap();
        assert_eq!(tokens[0], Token::new("chat", "NOUN"));
        assert_eq!(tokens[1], Token::new("dort", "VERB"));
    }

    #[test]
    fn empty_command_line_is_rejected() {
        assert!(matches!(
            CommandAnnotator::from_command_line("   "),
            Err(AnnotationError::Unavailable(_))
        ));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let a = CommandAnnotator::new("corpus-stats-no-such-tagger", vec![]);
        assert!(matches!(
            a.annotate("le chat"),
            Err(AnnotationError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_an_exit_error() {
        let a = CommandAnnotator::from_command_line("false").unwrap();
        assert!(matches!(a.annotate("le chat"), Err(AnnotationError::Exit { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn parses_tagger_output() {
        let a = CommandAnnotator::from_command_line(
            r#"echo [{"text":"chat","pos":"NOUN"},{"text":"dort","pos":"VERB"}]"#,
        )
        .unwrap();
        let tokens = a.annotate("chat dort").unwrap();
        assert_eq!(
            tokens,
            vec![Token::new("chat", "NOUN"), Token::new("dort", "VERB")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_json_output_is_malformed() {
        let a = CommandAnnotator::from_command_line("echo not-json").unwrap();
        assert!(matches!(
            a.annotate("x"),
            Err(AnnotationError::Malformed(_))
        ));
    }
}
