//! Metrowerks CodeWarrior symbol demangler
//!
//! ```text
//! <symbol> = [<static-var>] [__] <base-name> __ [<qualified-name>] [C] [F <args>] [_ <type>]
//!
//! <static-var> = @GUARD@ <symbol> @ <identifier>  // guard of a static local (Wii CW)
//!              | @LOCAL@ <symbol> @ <identifier>  // the static local itself
//!
//! <base-name> = <identifier> [<template-args>]
//!             | <operator>                        // a leading __ marks a special function
//!
//! <operator> = ct | dt                            // constructor / destructor
//!            | nw | nwa | dl | dla                // new / new[] / delete / delete[]
//!            | pl | mi | eq | ne | ..             // spelled out in ops.rs, open ended
//!            | op <arg>                           // conversion operator
//!
//! <qualified-name> = <name>
//!                  | Q <count> <name>{count}      // nested names, count is one digit
//!
//! <name> = <length> <identifier> [<template-args>]
//!
//! <template-args> = < <arg> [, <arg>]* >
//!
//! <arg> = - <digits>                              // negative literal
//!       | <qualifier>* <digits>                   // literal when followed by ',' or the
//!                                                 // end of the text, a name length otherwise
//!       | <qualifier>* <type>
//!
//! <qualifier> = P | R | C | V | U | S             // pointer, reference, const, volatile,
//!                                                 // unsigned, signed
//!
//! <type> = i | b | c | s | l | x | f | d | w | v | e
//!        | 1 | 2                                  // extension types, behind an option
//!        | <qualified-name>
//!        | A <length> _ <type>                    // array
//!        | F <args> _ <type>                      // function
//!        | M <qualified-name> F <this> <args> _ <type>  // member function
//! ```
//!
//! Identifiers are length prefixed and template arguments live inside the
//! counted text, so decoding nests by re-entering the argument decoder
//! rather than by balancing brackets.

mod ops;

use crate::DemangleOptions;

/// Max recursion depth
const MAX_DEPTH: usize = 256;

/// How a run of leading digits in an argument should be read.
///
/// The same syntax serves all three meanings. They are told apart only by
/// what follows the digits and by [DemangleOptions::mw_extensions].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DigitLed {
    /// Numeric literal template argument.
    Literal,
    /// Metrowerks extension type.
    Extension(&'static str),
    /// Length prefix of a named type.
    NameLength,
}

fn classify_digit_led(num: usize, rest: &str, options: &DemangleOptions) -> DigitLed {
    if !rest.is_empty() && !rest.starts_with(',') {
        return DigitLed::NameLength;
    }

    if options.mw_extensions {
        let ext = match num {
            1 => Some("__int128"),
            2 => Some("__vec2x32float__"),
            _ => None,
        };

        if let Some(ext) = ext {
            return DigitLed::Extension(ext);
        }
    }

    DigitLed::Literal
}

fn parse_digits(s: &str) -> Option<(usize, &str)> {
    let mut val = 0usize;
    let mut rest = s;

    while let Some(digit @ b'0'..=b'9') = rest.as_bytes().first() {
        val = val.checked_mul(10)?.checked_add(usize::from(digit - b'0'))?;
        rest = &rest[1..];
    }

    // there must be at least one digit
    if rest.len() == s.len() {
        return None;
    }

    Some((val, rest))
}

/// Consume leading qualifier codes into a declarator prefix/suffix pair.
///
/// Qualifiers accumulate in the prefix until a pointer or reference flushes
/// them into the suffix: whatever was read up to that point binds to the
/// pointer itself and has to appear on its right.
fn parse_qualifiers(mut s: &str) -> (String, String, &str) {
    let mut pre = String::new();
    let mut post = String::new();

    while let Some(b) = s.as_bytes().first() {
        match b {
            b'P' | b'R' => {
                let marker = if *b == b'P' { '*' } else { '&' };

                if pre.is_empty() {
                    post.insert(0, marker);
                } else {
                    post.insert_str(0, &format!("{marker} {}", pre.trim_end()));
                    pre.clear();
                }
            }
            b'C' => pre.push_str("const "),
            b'V' => pre.push_str("volatile "),
            b'U' => pre.push_str("unsigned "),
            b'S' => pre.push_str("signed "),
            _ => break,
        }

        s = &s[1..];
    }

    let trimmed = post.trim_end().len();
    post.truncate(trimmed);

    (pre, post, s)
}

/// Decode the `<..>` block of a name, returning the bare name and the
/// rendered argument text.
///
/// The block spans from the first `<` to the last `>`: nesting needs no
/// bracket matching here because inner argument lists sit inside length
/// counted names.
fn demangle_template_args<'a>(
    s: &'a str,
    options: &DemangleOptions,
    depth: usize,
) -> Option<(&'a str, String)> {
    let start_idx = match s.find('<') {
        Some(idx) => idx,
        None => return Some((s, String::new())),
    };

    let end_idx = s.rfind('>')?;
    if end_idx < start_idx {
        return None;
    }

    let name = &s[..start_idx];
    let mut args = &s[start_idx + 1..end_idx];
    let mut tmpl_args = String::from("<");

    while !args.is_empty() {
        let (arg, arg_post, rest) = demangle_arg(args, options, depth + 1)?;

        tmpl_args += &arg;
        tmpl_args += &arg_post;

        if rest.is_empty() {
            break;
        }

        tmpl_args += ", ";
        args = &rest[1..];
    }

    tmpl_args += ">";
    Some((name, tmpl_args))
}

fn demangle_name<'a>(
    s: &'a str,
    options: &DemangleOptions,
    depth: usize,
) -> Option<(&'a str, String, &'a str)> {
    let (size, rest) = parse_digits(s)?;
    let name = rest.get(..size)?;

    let (name, args) = demangle_template_args(name, options, depth)?;
    Some((name, format!("{name}{args}"), &rest[size..]))
}

/// Decode either a plain name or a `Q`-counted sequence of nested names.
///
/// The returned base name is the last component, which is what encloses
/// constructors, destructors and operators.
fn demangle_qualified_name<'a>(
    s: &'a str,
    options: &DemangleOptions,
    depth: usize,
) -> Option<(String, String, &'a str)> {
    if !s.starts_with('Q') {
        let (name, full, rest) = demangle_name(s, options, depth)?;
        return Some((name.to_string(), full, rest));
    }

    if s.len() < 3 {
        return None;
    }

    let count = (s.as_bytes()[1] as char).to_digit(10)? as usize;
    let mut rest = &s[2..];
    let mut last_name = "";
    let mut qualified = String::new();

    for i in 0..count {
        let (name, full, tail) = demangle_name(rest, options, depth)?;

        qualified += &full;
        last_name = name;
        rest = tail;

        if i + 1 < count {
            qualified += "::";
        }
    }

    Some((last_name.to_string(), qualified, rest))
}

/// Decode one argument or type into its declarator prefix/suffix pair.
fn demangle_arg<'a>(
    s: &'a str,
    options: &DemangleOptions,
    depth: usize,
) -> Option<(String, String, &'a str)> {
    // nesting depth is attacker controlled, don't let it run away
    if depth > MAX_DEPTH {
        return None;
    }

    // negative literal
    if let Some(rest) = s.strip_prefix('-') {
        let (num, rest) = parse_digits(rest)?;
        return Some((format!("-{num}"), String::new(), rest));
    }

    let mut result = String::new();
    let (mut pre, mut post, mut s) = parse_qualifiers(s);
    result += &pre;

    if s.as_bytes().first().map_or(false, u8::is_ascii_digit) {
        let (num, rest) = parse_digits(s)?;

        match classify_digit_led(num, rest, options) {
            DigitLed::Literal => {
                result += &num.to_string();
                result += &post;
                return Some((result, String::new(), rest));
            }
            DigitLed::Extension(tipe) => {
                result += tipe;
                return Some((result, post, rest));
            }
            DigitLed::NameLength => {
                let (_, qualified, rest) = demangle_name(s, options, depth)?;
                result += &qualified;
                result += &post;
                return Some((result, String::new(), rest));
            }
        }
    }

    if s.starts_with('Q') {
        let (_, qualified, rest) = demangle_qualified_name(s, options, depth)?;
        result += &qualified;
        result += &post;
        return Some((result, String::new(), rest));
    }

    let mut is_member = false;
    let mut const_member = false;

    if let Some(rest) = s.strip_prefix('M') {
        is_member = true;

        let (_, member, rest) = demangle_qualified_name(rest, options, depth)?;
        pre = format!("{member}::*{pre}");

        if !rest.starts_with('F') {
            return None;
        }
        s = rest;
    }

    if is_member || s.starts_with('F') {
        s = &s[1..];

        if is_member {
            // the member function's `this` pair: "const void*, const void*"
            // on const members, "const void*, void*" otherwise
            if let Some(rest) = s.strip_prefix("PCvPCv") {
                const_member = true;
                s = rest;
            } else if let Some(rest) = s.strip_prefix("PCvPv") {
                s = rest;
            } else {
                return None;
            }
        } else if post.starts_with('*') {
            // the star binds to the function, not to its return type
            post = post[1..].trim_start().to_string();
            pre = format!("*{pre}");
        } else {
            return None;
        }

        let (args, rest) = demangle_function_args(s, options, depth + 1)?;
        let rest = rest.strip_prefix('_')?;
        let (ret_pre, ret_post, rest) = demangle_arg(rest, options, depth + 1)?;

        let cnst = if const_member { " const" } else { "" };
        return Some((
            format!("{ret_pre} ({pre}{post}"),
            format!(")({args}){cnst}{ret_post}"),
            rest,
        ));
    }

    if let Some(rest) = s.strip_prefix('A') {
        let (count, rest) = parse_digits(rest)?;
        let rest = rest.strip_prefix('_')?;
        let (arg_pre, arg_post, rest) = demangle_arg(rest, options, depth + 1)?;

        // `*`/`&` bind tighter than `[]`, keep them grouped
        if !post.is_empty() {
            post = format!("({post})");
        }

        return Some((
            format!("{pre}{arg_pre}{post}"),
            format!("[{count}]{arg_post}"),
            rest,
        ));
    }

    let tipe = match s.as_bytes().first()? {
        b'i' => "int",
        b'b' => "bool",
        b'c' => "char",
        b's' => "short",
        b'l' => "long",
        b'x' => "long long",
        b'f' => "float",
        b'd' => "double",
        b'w' => "wchar_t",
        b'v' => "void",
        b'e' => "...",
        b'1' if options.mw_extensions => "__int128",
        b'2' if options.mw_extensions => "__vec2x32float__",
        // argument list terminator, left unconsumed for the caller
        b'_' => return Some((result, String::new(), s)),
        _ => return None,
    };

    result += tipe;
    result += &post;
    Some((result, String::new(), &s[1..]))
}

/// Decode a `, `-joined parameter list, stopping on an empty remainder or a
/// terminator.
///
/// The `,` terminator is inherited when the list sits inside a template
/// argument scan.
fn demangle_function_args<'a>(
    mut s: &'a str,
    options: &DemangleOptions,
    depth: usize,
) -> Option<(String, &'a str)> {
    let mut result = String::new();

    while !s.is_empty() {
        if !result.is_empty() {
            result += ", ";
        }

        let (arg, arg_post, rest) = demangle_arg(s, options, depth + 1)?;
        result += &arg;
        result += &arg_post;
        s = rest;

        if s.starts_with('_') || s.starts_with(',') {
            break;
        }
    }

    Some((result, s))
}

/// Resolve a special function token: a conversion operator, a constructor or
/// destructor, or an operator mnemonic.
fn demangle_special_function(
    s: &str,
    class_name: &str,
    options: &DemangleOptions,
) -> Option<String> {
    if let Some(rest) = s.strip_prefix("op") {
        let (arg_pre, arg_post, _) = demangle_arg(rest, options, 0)?;
        return Some(format!("operator {arg_pre}{arg_post}"));
    }

    let (op, args) = demangle_template_args(s, options, 0)?;

    // these two need the enclosing class
    match op {
        "dt" => return Some(format!("~{class_name}{args}")),
        "ct" => return Some(format!("{class_name}{args}")),
        _ => {}
    }

    // the mnemonic table is open ended, unknown codes keep their raw form
    Some(match ops::spelling(op) {
        Some(name) => format!("{name}{args}"),
        None => format!("__{op}{args}"),
    })
}

/// Find the first double underscore separating the function name from its
/// signature, skipping any that sit inside template arguments.
fn find_split(s: &str, special: bool, options: &DemangleOptions) -> Option<usize> {
    let mut start = 0;

    // a conversion operator embeds a whole type in the name, skip past it
    if special && s.starts_with("op") {
        let (_, _, rest) = demangle_arg(&s[2..], options, 0)?;
        start = s.len() - rest.len();
    }

    let bytes = s.as_bytes();
    let mut depth = 0i32;

    for i in start..bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth -= 1,
            b'_' if depth == 0 && bytes.get(i + 1) == Some(&b'_') => return Some(i),
            _ => {}
        }
    }

    None
}

/// Demangle a symbol name.
///
/// Returns [None] if the input is not a valid mangled name.
pub fn demangle(s: &str, options: &DemangleOptions) -> Option<String> {
    if !s.is_ascii() {
        return None;
    }

    let mut s = s;
    let mut special = false;
    let mut cnst = false;
    let mut fn_name: String;
    let mut return_type_pre = String::new();
    let mut return_type_post = String::new();
    let mut qualified = String::new();
    let mut static_var = String::new();

    // Wii CW static locals carry a @GUARD@/@LOCAL@ marker with the variable
    // label after the final '@'
    let guard = s.starts_with("@GUARD@");
    if guard || s.starts_with("@LOCAL@") {
        s = &s[7..];
        let idx = s.rfind('@')?;
        let var = &s[idx + 1..];

        static_var = if guard {
            format!("{var} guard")
        } else {
            var.to_string()
        };
        s = &s[..idx];
    }

    if let Some(rest) = s.strip_prefix("__") {
        special = true;
        s = rest;
    }

    {
        let mut idx = find_split(s, special, options)?;

        // function names may themselves end in underscores
        while s.as_bytes().get(idx + 2) == Some(&b'_') {
            idx += 1;
        }

        let fn_name_out = &s[..idx];
        let mut rest = &s[idx..];

        if special {
            if fn_name_out == "init" {
                // legacy static init, the name runs through a second double
                // underscore
                let rest_idx = rest[2..].find("__")?;
                fn_name = s[..rest_idx + 6].to_string();
                rest = &rest[rest_idx + 2..];
            } else {
                fn_name = fn_name_out.to_string();
            }
        } else {
            let (name, args) = demangle_template_args(fn_name_out, options, 0)?;
            fn_name = format!("{name}{args}");
        }

        // GC CW static locals: var$localstaticN$fn
        if let Some(first_idx) = fn_name.find('$') {
            let second_idx = fn_name[first_idx + 1..].find('$')?;

            let var = &fn_name[..first_idx];
            let var_type = &fn_name[first_idx + 1..first_idx + 1 + second_idx];

            if !var_type.starts_with("localstatic") {
                return None;
            }

            static_var = if var == "init" {
                // $localstatic doesn't carry the variable name in guard/init
                format!("{var_type} guard")
            } else {
                var.to_string()
            };
            fn_name = fn_name[first_idx + 1 + second_idx + 1..].to_string();
        }

        s = &rest[2..];
    }

    let mut class_name = String::new();
    if !s.starts_with('F') {
        let (name, qualified_name, rest) = demangle_qualified_name(s, options, 0)?;
        class_name = name;
        qualified = qualified_name;
        s = rest;
    }

    if special {
        fn_name = demangle_special_function(&fn_name, &class_name, options)?;
    }

    if let Some(rest) = s.strip_prefix('C') {
        cnst = true;
        s = rest;
    }

    if let Some(rest) = s.strip_prefix('F') {
        let (args, rest) = demangle_function_args(rest, options, 0)?;

        if options.omit_empty_parameters && args == "void" {
            fn_name = format!("{fn_name}()");
        } else {
            fn_name = format!("{fn_name}({args})");
        }
        s = rest;
    }

    if let Some(rest) = s.strip_prefix('_') {
        let (ret_pre, ret_post, rest) = demangle_arg(rest, options, 0)?;
        return_type_pre = ret_pre;
        return_type_post = ret_post;
        s = rest;
    }

    // the whole symbol has to be accounted for
    if !s.is_empty() {
        return None;
    }

    if cnst {
        fn_name = format!("{fn_name} const");
    }
    if !qualified.is_empty() {
        fn_name = format!("{qualified}::{fn_name}");
    }
    if !return_type_pre.is_empty() {
        fn_name = format!("{return_type_pre} {fn_name}{return_type_post}");
    }
    if !static_var.is_empty() {
        fn_name = format!("{fn_name}::{static_var}");
    }

    Some(fn_name)
}
