//! CoNLL-U serialization.

use std::fmt::{self, Write as _};
use std::io;

use lexis_types::{EmitterConfig, PLACEHOLDER, RULESET_VERSION};

use super::model::{Column, Document, Misc, Sentence, Token, TOK_KEY_ATTR};

/// Header comment naming the ruleset version.
pub const RULESET_COMMENT: &str = "lexis_ruleset";

/// Packs sentences into a document.
///
/// Sentences are taken by value and are not changed; the result serializes
/// byte-identically for identical input.
pub fn emit(sentences: Vec<Sentence>, cfg: &EmitterConfig) -> Document {
    let ruleset = cfg.version_header.then_some(RULESET_VERSION);
    Document::new(ruleset, sentences)
}

/// Escapes characters that would break a MISC value.
pub(crate) fn escape_misc_value(value: &str, out: &mut impl fmt::Write) -> fmt::Result {
    for c in value.chars() {
        match c {
            '%' => out.write_str("%25")?,
            '|' => out.write_str("%7C")?,
            '\t' => out.write_str("%09")?,
            '\n' => out.write_str("%0A")?,
            '\r' => out.write_str("%0D")?,
            _ => out.write_char(c)?,
        }
    }
    Ok(())
}

impl fmt::Display for Misc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(TOK_KEY_ATTR)?;
        f.write_char('=')?;
        escape_misc_value(self.tok_key().as_str(), f)?;
        for (k, v) in self.extra() {
            write!(f, "|{k}=")?;
            escape_misc_value(v, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.id(), self.form())?;
        for column in Column::ALL {
            f.write_char('\t')?;
            f.write_str(self.get(column).unwrap_or(PLACEHOLDER))?;
        }
        write!(f, "\t{}", self.misc())
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# sent_id = {}", self.id())?;
        writeln!(f, "# text = {}", self.text())?;
        for token in self.tokens() {
            writeln!(f, "{token}")?;
        }
        f.write_char('\n')
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(version) = self.ruleset() {
            writeln!(f, "# {RULESET_COMMENT} = {version}")?;
        }
        for sentence in self.sentences() {
            write!(f, "{sentence}")?;
        }
        Ok(())
    }
}

impl Document {
    /// Writes the document to `w`, one sentence at a time.
    pub fn write_to<W: io::Write>(&self, mut w: W) -> io::Result<()> {
        if let Some(version) = self.ruleset() {
            writeln!(w, "# {RULESET_COMMENT} = {version}")?;
        }
        for sentence in self.sentences() {
            write!(w, "{sentence}")?;
        }
        w.flush()
    }
}
