//! Folding the decoded fields of one field record into an [`Entry`].

use crate::pdic::types::models::{Entry, WordFlags};

/// Decoded text fields of one field record, before assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    /// Full headword, possibly `keyword<TAB>word`.
    pub headword: String,
    pub trans: String,
    pub exp: Option<String>,
    pub pron: Option<String>,
}

/// Builds the output entry.
///
/// The headword splits on its first TAB: the part before is the search key,
/// the part after is the display word. Without a TAB both are the headword.
pub fn assemble_entry(fields: RawFields, flags: WordFlags) -> Entry {
    let (keyword, word) = match fields.headword.split_once('\t') {
        Some((keyword, word)) => (keyword.to_string(), word.to_string()),
        None => (fields.headword.clone(), fields.headword),
    };

    Entry {
        keyword,
        word,
        trans: fields.trans,
        exp: fields.exp,
        pron: fields.pron,
        level: flags.level(),
        memory: flags.memory(),
        modify: flags.modify(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(headword: &str) -> RawFields {
        RawFields {
            headword: headword.to_string(),
            trans: "t".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn plain_headword_is_both_keyword_and_word() {
        let entry = assemble_entry(fields("cat"), WordFlags(0));
        assert_eq!(entry.keyword, "cat");
        assert_eq!(entry.word, "cat");
        assert_eq!(entry.trans, "t");
    }

    #[test]
    fn splits_on_first_tab_only() {
        let entry = assemble_entry(fields("ねこ\t猫\tcat"), WordFlags(0));
        assert_eq!(entry.keyword, "ねこ");
        assert_eq!(entry.word, "猫\tcat");
    }

    #[test]
    fn maps_flag_bits() {
        let entry = assemble_entry(fields("x"), WordFlags(0x7a));
        assert_eq!(entry.level, 0x0a);
        assert!(entry.memory);
        assert!(entry.modify);

        let entry = assemble_entry(fields("x"), WordFlags(0x13));
        assert_eq!(entry.level, 3);
        assert!(!entry.memory);
        assert!(!entry.modify);
    }
}
