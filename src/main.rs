use demangler::DemangleOptions;

macro_rules! exit {
    ($code:expr => $($arg:tt)*) => {{
        eprintln!($($arg)*);
        std::process::exit($code)
    }};
}

const HELP: &str = "OVERVIEW: CodeWarrior C++ symbol demangler

USAGE: cwdemangler [options] <SYMBOL>

OPTIONS:
  -h, --help           Print usage information
      --keep_void      Print `(void)` parameter lists instead of `()`
      --mw_extensions  Enable Metrowerks extension types";

const ABBRV: &[&str] = &["-h"];
const NAMES: &[&str] = &["--help", "--keep_void", "--mw_extensions"];

#[derive(Debug, Clone)]
struct Cli {
    /// Mangled symbol to decode.
    symbol: String,

    /// Render `(void)` parameter lists verbatim.
    keep_void: bool,

    /// Enable Metrowerks extension types.
    mw_extensions: bool,
}

impl Cli {
    fn parse() -> Self {
        let mut symbol: Option<String> = None;
        let mut keep_void = false;
        let mut mw_extensions = false;

        let mut args = std::env::args().skip(1).peekable();

        if args.peek().is_none() {
            exit!(0 => "{HELP}");
        }

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => exit!(0 => "{HELP}"),
                "--keep_void" => keep_void = true,
                "--mw_extensions" => mw_extensions = true,
                unknown if unknown.starts_with('-') => {
                    let mut distance = u32::MAX;
                    let mut best_guess = "";
                    for name in NAMES.iter().chain(ABBRV) {
                        let d = triple_accel::levenshtein_exp(unknown.as_bytes(), name.as_bytes());
                        if d < distance {
                            distance = d;
                            best_guess = name;
                        }
                    }

                    // A guess that's less than 3 `steps` away from a correct arg.
                    if distance < 4 {
                        exit!(1 => "Unknown cmd arg '{unknown}' did you mean '{best_guess}'?")
                    } else {
                        exit!(1 => "Unknown cmd arg '{unknown}' was entered.");
                    }
                }
                positional => {
                    if symbol.is_some() {
                        exit!(1 => "Symbol already given.");
                    }

                    // symbols are often pasted with shell quoting still attached
                    symbol = Some(positional.replace(['\'', '"'], ""));
                }
            }
        }

        let symbol = match symbol {
            Some(symbol) => symbol,
            None => exit!(1 => "Missing a symbol to demangle.\n\n{HELP}"),
        };

        Cli {
            symbol,
            keep_void,
            mw_extensions,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let options = DemangleOptions {
        omit_empty_parameters: !cli.keep_void,
        mw_extensions: cli.mw_extensions,
    };

    match demangler::demangle(&cli.symbol, &options) {
        Some(demangled) => println!("{demangled}"),
        None => println!("Failed to demangle symbol"),
    }
}
