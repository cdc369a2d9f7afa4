use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// Operator mnemonics with a fixed spelling.
///
/// `ct`/`dt` are resolved by the caller since they need the enclosing class
/// name; codes missing here fall back to their raw `__<code>` form, the
/// table was never closed over everything the toolchains emit.
static SPELLINGS: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    FxHashMap::from_iter([
        ("nw", "operator new"),
        ("nwa", "operator new[]"),
        ("dl", "operator delete"),
        ("dla", "operator delete[]"),
        ("pl", "operator+"),
        ("mi", "operator-"),
        ("ml", "operator*"),
        ("dv", "operator/"),
        ("md", "operator%"),
        ("er", "operator^"),
        ("ad", "operator&"),
        ("or", "operator|"),
        ("co", "operator~"),
        ("nt", "operator!"),
        ("as", "operator="),
        ("lt", "operator<"),
        ("gt", "operator>"),
        ("apl", "operator+="),
        ("ami", "operator-="),
        ("amu", "operator*="),
        ("adv", "operator/="),
        ("amd", "operator%="),
        ("aer", "operator^="),
        ("aad", "operator&="),
        ("aor", "operator|="),
        ("ls", "operator<<"),
        ("rs", "operator>>"),
        ("ars", "operator>>="),
        ("als", "operator<<="),
        ("eq", "operator=="),
        ("ne", "operator!="),
        ("le", "operator<="),
        ("ge", "operator>="),
        ("aa", "operator&&"),
        ("oo", "operator||"),
        ("pp", "operator++"),
        ("mm", "operator--"),
        ("cm", "operator,"),
        ("rm", "operator->*"),
        ("rf", "operator->"),
        ("cl", "operator()"),
        ("vc", "operator[]"),
        ("vt", "__vtable"),
    ])
});

pub(super) fn spelling(code: &str) -> Option<&'static str> {
    SPELLINGS.get(code).copied()
}
