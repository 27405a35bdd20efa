//! Validation of accession-less HGVS strings as uploaded to MaveDB.
//!
//! Only the grammar is checked, no reference sequence is consulted.  Supported
//! are single variants such as `c.76A>C` or `p.Leu5Gly`, bracketed
//! multi-variants (`c.[1A>G;2C>T]`), `;`-joined fully prefixed variants
//! (`c.1A>G;c.2C>T`) and the special identifiers `_wt` and `_sy`.

use regex::Regex;

use super::IdentifierRole;

/// Identifier of the wild type sequence.
pub const WILD_TYPE: &str = "_wt";
/// Identifier of synonymous protein variants.
pub const SYNONYMOUS: &str = "_sy";

/// Nucleotide bases accepted in edits.
const BASES: &str = "[ACGTN]";
/// Three-letter amino acid codes accepted in protein edits.
const AMINO_ACIDS: &str =
    "(?:Ala|Arg|Asn|Asp|Cys|Gln|Glu|Gly|His|Ile|Leu|Lys|Met|Phe|Pro|Ser|Thr|Trp|Tyr|Val|Sec|Pyl|Xaa|Ter)";
/// Genomic positions.
const POS_GENOMIC: &str = r"\d+";
/// Transcript positions, with UTR prefixes and intronic offsets.
const POS_TRANSCRIPT: &str = r"[-*]?\d+(?:[+-]\d+)?";

/// Build the alternatives of nucleotide edits for positions matching `pos`.
fn nucleotide_edit(pos: &str) -> String {
    format!(
        "^(?:{pos}{b}>{b}|{pos}(?:_{pos})?(?:=|del{b}*|dup{b}*|delins{b}+)|{pos}_{pos}(?:ins{b}+|inv))$",
        pos = pos,
        b = BASES
    )
}

/// Build the alternatives of protein edits.
fn protein_edit() -> String {
    let aa = AMINO_ACIDS;
    let pos = format!(r"{aa}\d+");
    format!(
        r"^(?:=|{pos}(?:{aa}|\*|=)|{pos}(?:_{pos})?(?:del|dup|delins{aa}+)|{pos}_{pos}ins{aa}+|{pos}{aa}?fs(?:(?:Ter|\*)\d*)?)$"
    )
}

lazy_static::lazy_static! {
    static ref RE_GENOMIC: Regex =
        Regex::new(&nucleotide_edit(POS_GENOMIC)).expect("invalid regex in source code");
    static ref RE_TRANSCRIPT: Regex =
        Regex::new(&nucleotide_edit(POS_TRANSCRIPT)).expect("invalid regex in source code");
    static ref RE_PROTEIN: Regex =
        Regex::new(&protein_edit()).expect("invalid regex in source code");
}

/// HGVS reference sequence type, taken from the string prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
pub enum Prefix {
    /// `g.`
    #[strum(serialize = "g.")]
    Genomic,
    /// `c.`
    #[strum(serialize = "c.")]
    Coding,
    /// `n.`
    #[strum(serialize = "n.")]
    NonCoding,
    /// `p.`
    #[strum(serialize = "p.")]
    Protein,
}

impl Prefix {
    /// Parse from the letter before the dot.
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "g" => Some(Prefix::Genomic),
            "c" => Some(Prefix::Coding),
            "n" => Some(Prefix::NonCoding),
            "p" => Some(Prefix::Protein),
            _ => None,
        }
    }

    /// Whether the prefix denotes a transcript level variant.
    pub fn is_transcript(&self) -> bool {
        matches!(self, Prefix::Coding | Prefix::NonCoding)
    }

    /// Whether an identifier column with `role` accepts this prefix.
    pub fn is_allowed_for(&self, role: IdentifierRole) -> bool {
        match role {
            IdentifierRole::Nucleotide => {
                matches!(self, Prefix::Genomic | Prefix::Coding | Prefix::NonCoding)
            }
            IdentifierRole::Transcript => self.is_transcript(),
            IdentifierRole::Protein => *self == Prefix::Protein,
        }
    }

    fn edit_regex(&self) -> &'static Regex {
        match self {
            Prefix::Genomic => &*RE_GENOMIC,
            Prefix::Coding | Prefix::NonCoding => &*RE_TRANSCRIPT,
            Prefix::Protein => &*RE_PROTEIN,
        }
    }
}

/// A string that does not parse under the HGVS grammar of its column.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {role} HGVS string: {reason}")]
pub struct Error {
    /// The offending string.
    pub value: String,
    /// The kind of variant the string was validated as.
    pub role: IdentifierRole,
    /// Human readable reason.
    pub reason: String,
}

impl Error {
    pub fn new(value: &str, role: IdentifierRole, reason: &str) -> Self {
        Self {
            value: value.to_owned(),
            role,
            reason: reason.to_owned(),
        }
    }
}

/// Return the prefix of `value` without validating the rest.
///
/// `None` for special identifiers and strings without a known prefix.
pub fn prefix(value: &str) -> Option<Prefix> {
    value
        .trim()
        .split_once('.')
        .and_then(|(letter, _)| Prefix::from_letter(&letter.to_ascii_lowercase()))
}

/// Validate `value` as HGVS string of `role` kind.
///
/// Returns the common prefix of the variant(s), or `None` for the special
/// identifiers `_wt` and `_sy`.
pub fn validate(value: &str, role: IdentifierRole) -> Result<Option<Prefix>, Error> {
    let value = value.trim();
    if value == WILD_TYPE {
        return Ok(None);
    }
    if value == SYNONYMOUS {
        return if role == IdentifierRole::Protein {
            Ok(None)
        } else {
            Err(Error::new(
                value,
                role,
                "synonymous variants are only valid for protein identifiers",
            ))
        };
    }

    let bracketed = value
        .split_once('.')
        .map(|(_, rest)| rest.starts_with('['))
        .unwrap_or(false);
    if bracketed || !value.contains(';') {
        return validate_variant(value, value, role).map(Some);
    }

    let mut common: Option<Prefix> = None;
    for member in value.split(';') {
        let prefix = validate_variant(member.trim(), value, role)?;
        if common.map_or(false, |common| common != prefix) {
            return Err(Error::new(
                value,
                role,
                "all variants of a multi-variant must use the same prefix",
            ));
        }
        common = Some(prefix);
    }
    Ok(common)
}

/// Validate a single prefixed variant or bracketed variant list.
///
/// `whole` is the complete cell used in error messages.
fn validate_variant(variant: &str, whole: &str, role: IdentifierRole) -> Result<Prefix, Error> {
    let (letter, rest) = variant
        .split_once('.')
        .ok_or_else(|| Error::new(whole, role, "missing prefix such as 'c.' or 'p.'"))?;
    let prefix = Prefix::from_letter(letter)
        .ok_or_else(|| Error::new(whole, role, &format!("unknown prefix '{letter}.'")))?;
    if !prefix.is_allowed_for(role) {
        return Err(Error::new(
            whole,
            role,
            &format!("prefix '{prefix}' is not valid for {role} identifiers"),
        ));
    }

    if let Some(inner) = rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        for edit in inner.split(';') {
            check_edit(prefix, edit.trim(), whole, role)?;
        }
    } else {
        check_edit(prefix, rest, whole, role)?;
    }

    Ok(prefix)
}

fn check_edit(prefix: Prefix, edit: &str, whole: &str, role: IdentifierRole) -> Result<(), Error> {
    // predicted consequences, e.g. `p.(Leu5Gly)`
    let edit = if prefix == Prefix::Protein {
        edit.strip_prefix('(')
            .and_then(|e| e.strip_suffix(')'))
            .unwrap_or(edit)
    } else {
        edit
    };

    if prefix.edit_regex().is_match(edit) {
        Ok(())
    } else {
        Err(Error::new(
            whole,
            role,
            &format!("'{edit}' is not a valid '{prefix}' variant description"),
        ))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{prefix, validate, Prefix};
    use crate::variants::IdentifierRole::{self, *};

    #[rstest]
    #[case::sub("c.76A>C", Nucleotide, Some(Prefix::Coding))]
    #[case::genomic("g.1234G>T", Nucleotide, Some(Prefix::Genomic))]
    #[case::non_coding("n.5C>T", Nucleotide, Some(Prefix::NonCoding))]
    #[case::utr("c.-14G>C", Transcript, Some(Prefix::Coding))]
    #[case::downstream("c.*21del", Transcript, Some(Prefix::Coding))]
    #[case::intronic("c.88+1G>T", Nucleotide, Some(Prefix::Coding))]
    #[case::no_change("c.76=", Nucleotide, Some(Prefix::Coding))]
    #[case::del_range("c.76_78delACT", Nucleotide, Some(Prefix::Coding))]
    #[case::dup("g.10dup", Nucleotide, Some(Prefix::Genomic))]
    #[case::ins("c.76_77insT", Nucleotide, Some(Prefix::Coding))]
    #[case::delins("c.76_77delinsTT", Nucleotide, Some(Prefix::Coding))]
    #[case::inv("g.100_120inv", Nucleotide, Some(Prefix::Genomic))]
    #[case::multi("c.[1A>G;2C>T]", Nucleotide, Some(Prefix::Coding))]
    #[case::joined("c.1A>G;c.2C>T", Nucleotide, Some(Prefix::Coding))]
    #[case::pro_sub("p.Leu5Gly", Protein, Some(Prefix::Protein))]
    #[case::pro_silent("p.Leu5=", Protein, Some(Prefix::Protein))]
    #[case::pro_nonsense("p.Trp24*", Protein, Some(Prefix::Protein))]
    #[case::pro_ter("p.Trp24Ter", Protein, Some(Prefix::Protein))]
    #[case::pro_del("p.Lys2_Gly3del", Protein, Some(Prefix::Protein))]
    #[case::pro_ins("p.Lys2_Gly3insAlaSer", Protein, Some(Prefix::Protein))]
    #[case::pro_delins("p.Cys28delinsTrpVal", Protein, Some(Prefix::Protein))]
    #[case::pro_fs("p.Arg97ProfsTer23", Protein, Some(Prefix::Protein))]
    #[case::pro_fs_short("p.Arg97fs", Protein, Some(Prefix::Protein))]
    #[case::pro_predicted("p.(Leu5Gly)", Protein, Some(Prefix::Protein))]
    #[case::pro_unchanged("p.=", Protein, Some(Prefix::Protein))]
    #[case::pro_multi("p.[Leu5Gly;Ala6Val]", Protein, Some(Prefix::Protein))]
    #[case::wild_type("_wt", Nucleotide, None)]
    #[case::synonymous("_sy", Protein, None)]
    fn validate_ok(
        #[case] value: &str,
        #[case] role: IdentifierRole,
        #[case] expected: Option<Prefix>,
    ) {
        assert_eq!(validate(value, role), Ok(expected), "value = {value}");
    }

    #[rstest]
    #[case::garbage("x", Nucleotide)]
    #[case::no_edit("c.", Nucleotide)]
    #[case::bad_base("c.1A>X", Nucleotide)]
    #[case::unknown_prefix("r.1a>g", Nucleotide)]
    #[case::protein_in_nt("p.Leu5Gly", Nucleotide)]
    #[case::genomic_in_tx("g.1A>G", Transcript)]
    #[case::nt_in_pro("c.1A>G", Protein)]
    #[case::one_letter_aa("p.L5G", Protein)]
    #[case::ins_single_pos("c.76insT", Nucleotide)]
    #[case::genomic_offset("g.1+1A>G", Nucleotide)]
    #[case::empty_list("c.[]", Nucleotide)]
    #[case::bad_member("c.[1A>G;2C>Z]", Nucleotide)]
    #[case::mixed_members("c.1A>G;g.2C>T", Nucleotide)]
    #[case::synonymous_nt("_sy", Nucleotide)]
    fn validate_err(#[case] value: &str, #[case] role: IdentifierRole) {
        assert!(validate(value, role).is_err(), "value = {value}");
    }

    #[test]
    fn validate_error_message() {
        let err = validate("c.1A>X", Nucleotide).unwrap_err();

        insta::assert_snapshot!(
            err.to_string(),
            @"'c.1A>X' is not a valid nucleotide HGVS string: '1A>X' is not a valid 'c.' variant description"
        );
    }

    #[rstest]
    #[case("c.1A>G", Some(Prefix::Coding))]
    #[case(" G.1A>G", Some(Prefix::Genomic))]
    #[case("n.1A>G", Some(Prefix::NonCoding))]
    #[case("p.Leu5Gly", Some(Prefix::Protein))]
    #[case("_wt", None)]
    #[case("x", None)]
    fn prefix_of(#[case] value: &str, #[case] expected: Option<Prefix>) {
        assert_eq!(prefix(value), expected);
    }
}
