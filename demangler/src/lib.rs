//! Symbol demangler for the Metrowerks CodeWarrior C++ mangling scheme.
//!
//! CodeWarrior's scheme, as emitted by GameCube/Wii-era toolchains, differs
//! from both the Itanium and msvc families: identifiers are length prefixed,
//! template arguments are decoded from inside the name text, and a handful
//! of digit codes are ambiguous between literals and types. [demangle]
//! decodes a linker symbol into a plain declaration string:
//!
//! ```
//! use demangler::{demangle, DemangleOptions};
//!
//! let options = DemangleOptions::default();
//! let demangled = demangle("GetSfxHandle__6CActorCFv", &options);
//! assert_eq!(demangled.as_deref(), Some("CActor::GetSfxHandle() const"));
//! ```

pub mod mwcc;

/// Options for [demangle].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemangleOptions {
    /// Replace `(void)` parameter lists with `()`.
    pub omit_empty_parameters: bool,

    /// Enable Metrowerks extension types (`__int128`, `__vec2x32float__`).
    ///
    /// Off by default since their codes collide with template argument
    /// literals and can't always be told apart.
    pub mw_extensions: bool,
}

impl Default for DemangleOptions {
    fn default() -> Self {
        DemangleOptions {
            omit_empty_parameters: true,
            mw_extensions: false,
        }
    }
}

/// Demangle a CodeWarrior symbol.
///
/// Returns [None] when the input isn't a valid mangled name; partial output
/// is never produced.
pub fn demangle(s: &str, options: &DemangleOptions) -> Option<String> {
    mwcc::demangle(s, options)
}
