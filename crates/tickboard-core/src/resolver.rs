//! Regional-exchange symbol qualification.

use std::collections::BTreeSet;

use crate::domain::Symbol;

/// Default membership set: B3-listed tickers the dashboard serves.
const B3_MEMBERS: [&str; 12] = [
    "ABEV3", "B3SA3", "BBAS3", "BBDC4", "ELET3", "ITSA4", "ITUB4", "MGLU3", "PETR3", "PETR4",
    "SUZB3", "VALE3",
];

const B3_SUFFIX: &str = ".SA";

/// Maps a caller-facing ticker to its upstream-qualified identifier.
///
/// Total and pure: members of the regional set gain the exchange suffix
/// exactly once, everything else resolves to itself. Matching is exact on
/// the normalized symbol; an already-qualified member like `PETR4.SA` is
/// not in the set and therefore resolves unchanged.
#[derive(Debug, Clone)]
pub struct SymbolResolver {
    members: BTreeSet<String>,
    suffix: String,
}

impl SymbolResolver {
    /// Build a resolver from a membership set and an exchange suffix.
    ///
    /// Members and suffix are normalized to uppercase so they line up with
    /// [`Symbol`] normalization; characters the symbol grammar rejects are
    /// stripped from the suffix.
    pub fn new(members: impl IntoIterator<Item = String>, suffix: &str) -> Self {
        let suffix = suffix
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '.' || *ch == '-')
            .collect::<String>()
            .to_ascii_uppercase();

        Self {
            members: members
                .into_iter()
                .map(|member| member.trim().to_ascii_uppercase())
                .filter(|member| !member.is_empty())
                .collect(),
            suffix,
        }
    }

    /// Resolver for the default B3 membership set.
    pub fn b3() -> Self {
        Self::new(B3_MEMBERS.iter().map(|s| (*s).to_owned()), B3_SUFFIX)
    }

    /// Resolve a caller-facing symbol into its upstream identifier.
    pub fn resolve(&self, symbol: &Symbol) -> Symbol {
        if self.members.contains(symbol.as_str()) {
            symbol.suffixed(&self.suffix)
        } else {
            symbol.clone()
        }
    }

    pub fn is_member(&self, symbol: &Symbol) -> bool {
        self.members.contains(symbol.as_str())
    }
}
